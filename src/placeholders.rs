//! Placeholder substitution for format templates.
//!
//! Templates are literal text with `%name` tokens, e.g.
//! `"W: (%quality at %essid) %ip"`. Expansion scans the template left to
//! right exactly once:
//!
//! - any character other than `%` is copied through,
//! - at a `%`, the placeholder whose name matches at that position is
//!   substituted with its value (values are never expanded again),
//! - a `%` that matches nothing is copied through literally.
//!
//! When several names match at the same position the longest one wins, so
//! `%timezone` is never read as `%time` followed by `zone`. Names of equal
//! length resolve in the order they were supplied.
//!
//! All writes go through a [`RenderBuffer`], so expansion can never exceed
//! the buffer's capacity no matter how long the values are.

use std::borrow::Cow;

use crate::buffer::{Overflow, RenderBuffer};

/// The character that introduces a placeholder.
pub const INTRODUCER: char = '%';

/// Where a placeholder value came from.
///
/// Values read from files or produced by external commands are untrusted
/// and get escaped/sanitised by the renderer before expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Trusted,
    Untrusted,
}

/// One `%name` → value pair for a single render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Name without the introducer (`"time"` matches `%time`).
    pub name: &'a str,
    pub value: Cow<'a, str>,
    pub provenance: Provenance,
}

impl<'a> Placeholder<'a> {
    pub fn new(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            value: value.into(),
            provenance: Provenance::Trusted,
        }
    }

    /// A value taken verbatim from the environment (file contents, command output).
    pub fn untrusted(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            value: value.into(),
            provenance: Provenance::Untrusted,
        }
    }

    pub fn is_trusted(&self) -> bool {
        self.provenance == Provenance::Trusted
    }
}

/// Find the placeholder matching at the start of `rest` (the text right
/// after an introducer). Longest name wins; ties go to the earliest entry.
fn longest_match<'p, 'a>(rest: &str, placeholders: &'p [Placeholder<'a>]) -> Option<&'p Placeholder<'a>> {
    let mut best: Option<&Placeholder> = None;
    for placeholder in placeholders {
        if placeholder.name.is_empty() || !rest.starts_with(placeholder.name) {
            continue;
        }
        match best {
            Some(current) if current.name.len() >= placeholder.name.len() => {}
            _ => best = Some(placeholder),
        }
    }
    best
}

/// Expand `template` into `buf`.
///
/// Returns the first [`Overflow`] if the expansion was cut short; the
/// buffer then holds everything up to the last fragment that fit, followed
/// by the truncation marker.
pub fn expand_into(
    template: &str,
    placeholders: &[Placeholder<'_>],
    buf: &mut RenderBuffer,
) -> Result<(), Overflow> {
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        if c != INTRODUCER {
            let mut utf8 = [0u8; 4];
            buf.try_push_str(c.encode_utf8(&mut utf8))?;
            continue;
        }
        match longest_match(rest, placeholders) {
            Some(placeholder) => {
                buf.try_push_str(&placeholder.value)?;
                rest = &rest[placeholder.name.len()..];
            }
            None => {
                let mut utf8 = [0u8; 4];
                buf.try_push_str(INTRODUCER.encode_utf8(&mut utf8))?;
            }
        }
    }
    Ok(())
}

/// Expand `template` into a fresh default-capacity buffer.
///
/// Overflow truncates the result (see [`crate::buffer`]).
pub fn expand(template: &str, placeholders: &[Placeholder<'_>]) -> String {
    let mut buf = RenderBuffer::new();
    let _ = expand_into(template, placeholders, &mut buf);
    buf.finish()
}

/// Iterate over the `%name` tokens of a template that start with an ASCII
/// letter or digit, yielding the text after the introducer up to the next
/// character that cannot be part of a name.
///
/// Used by configuration validation to reject unknown placeholders.
pub fn tokens(template: &str) -> impl Iterator<Item = &str> {
    template
        .match_indices(INTRODUCER)
        .filter_map(move |(idx, _)| {
            let rest = &template[idx + INTRODUCER.len_utf8()..];
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let token = &rest[..end];
            token
                .chars()
                .next()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|_| token)
        })
}
