//! Turns a collector's [`Sample`] into a finished [`ModuleOutput`].
//!
//! Rendering happens in a fixed order: untrusted placeholder values are made
//! inert for the active format, the requested color is resolved, the
//! template is expanded into a bounded buffer (inside a color bracket for
//! text formats) and the per-module block attributes are copied over.
//! Nothing here touches the system or keeps state between calls.

use log::debug;
use std::borrow::Cow;

use crate::block::ModuleOutput;
use crate::buffer::{RenderBuffer, BUFFER_CAPACITY};
use crate::color::{self, ColorSpan};
use crate::modules::{Module, Sample};
use crate::output::ProtocolState;
use crate::placeholders::{expand_into, Placeholder};
use crate::utils::sanitize_for_format;

/// Renders modules for one protocol state.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'s> {
    state: &'s ProtocolState,
    capacity: usize,
}

impl<'s> Renderer<'s> {
    pub fn new(state: &'s ProtocolState) -> Self {
        Self {
            state,
            capacity: BUFFER_CAPACITY,
        }
    }

    /// Use render buffers of `capacity` bytes instead of the default.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn state(&self) -> &ProtocolState {
        self.state
    }

    /// Render one module's sample.
    pub fn render(&self, module: &Module, sample: &Sample<'_>) -> ModuleOutput {
        let placeholders = self.prepare(&sample.placeholders);
        let color = sample.color.as_ref().and_then(|tag| {
            color::resolve(
                tag,
                Some(module.palette()),
                &self.state.palette,
                self.state.colors_enabled(),
            )
        });

        let (full_text, truncated) =
            self.expand(sample.template, &placeholders, color, sample.trim);
        let config = &module.config;
        let output = ModuleOutput {
            name: module.block_name().to_string(),
            instance: module.instance().map(str::to_string),
            full_text,
            color: color
                .filter(|_| self.state.format.is_json())
                .map(str::to_string),
            separator: config.separator,
            separator_block_width: config.separator_block_width,
            min_width: config.min_width.clone(),
            align: config.align,
            truncated,
        };
        if truncated {
            debug!("{}: output cut at {} bytes", output.id(), self.capacity);
        }
        output
    }

    /// Escape or sanitise untrusted values; trusted ones pass unchanged.
    fn prepare<'a>(&self, placeholders: &[Placeholder<'a>]) -> Vec<Placeholder<'a>> {
        placeholders
            .iter()
            .map(|placeholder| {
                if placeholder.is_trusted() {
                    return placeholder.clone();
                }
                Placeholder {
                    value: Cow::Owned(self.make_inert(&placeholder.value)),
                    ..placeholder.clone()
                }
            })
            .collect()
    }

    fn make_inert(&self, raw: &str) -> String {
        let clean = if self.state.format.is_json() {
            Cow::Borrowed(raw)
        } else {
            sanitize_for_format(raw, self.state.format)
        };
        self.state.markup.apply(&clean).into_owned()
    }

    fn expand(
        &self,
        template: &str,
        placeholders: &[Placeholder<'_>],
        color: Option<&str>,
        trim: bool,
    ) -> (String, bool) {
        let mut buf = RenderBuffer::with_capacity(self.capacity);
        {
            let mut span = if self.state.format.is_json() {
                ColorSpan::plain(&mut buf)
            } else {
                ColorSpan::open(&mut buf, self.state.format, color)
            };
            let start = span.len();
            if let Err(overflow) = expand_into(template, placeholders, &mut span) {
                debug!("{}", overflow);
            }
            if trim {
                span.trim_since(start);
            }
        }
        let truncated = buf.is_truncated();
        (buf.finish(), truncated)
    }
}
