//! Markup escaping for free-form text.
//!
//! With `markup = "pango"` the bar interprets `full_text` as Pango markup, so
//! text we did not write ourselves (command output, file contents) must have
//! its markup-significant characters replaced by entities before it is
//! embedded. Escaping is applied exactly once, by the renderer, to
//! placeholder values marked untrusted. Templates themselves are configuration
//! and may contain deliberate markup.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;

/// Whether rendered text is interpreted as markup by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    #[default]
    None,
    Pango,
}

impl MarkupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkupMode::None => "none",
            MarkupMode::Pango => "pango",
        }
    }

    /// Escape `raw` if this mode requires it, identity otherwise.
    pub fn apply<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        match self {
            MarkupMode::None => Cow::Borrowed(raw),
            MarkupMode::Pango => escape(raw),
        }
    }
}

impl fmt::Display for MarkupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '\'' | '"') || is_escaped_control(c)
}

/// C0 controls other than tab, newline and carriage return are not valid in
/// markup and are written as numeric character references.
fn is_escaped_control(c: char) -> bool {
    matches!(c, '\x01'..='\x08' | '\x0b'..='\x0c' | '\x0e'..='\x1f')
}

/// Replace markup-significant characters with entities.
///
/// Not idempotent: escaping `&lt;` again yields `&amp;lt;`, which a markup
/// parser shows as the literal text `&lt;`.
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(needs_escape) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            c if is_escaped_control(c) => {
                let _ = write!(escaped, "&#x{:x};", c as u32);
            }
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
