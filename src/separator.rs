//! Separators between modules.
//!
//! Text formats put the configured separator string between adjacent
//! modules, never before the first or after the last one. The JSON format
//! has no separator text; each block carries a `separator` attribute.

use crate::block::ModuleOutput;
use crate::buffer::RenderBuffer;
use crate::color::{self, ColorSpan, ColorTag};
use crate::output::ProtocolState;

/// The separator string decorated with `color_separator` for text formats.
///
/// Only the general color applies; modules cannot override it.
pub fn decorated_separator(state: &ProtocolState) -> String {
    if state.separator.is_empty() {
        return String::new();
    }
    let color = color::resolve(&ColorTag::Separator, None, &state.palette, state.colors_enabled());
    let mut buf = RenderBuffer::new();
    {
        let mut span = ColorSpan::open(&mut buf, state.format, color);
        span.push_str(&state.separator);
    }
    buf.finish()
}

/// Join rendered texts with `separator`: N texts, N-1 separators.
pub fn join<'a, I>(texts: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut line = String::new();
    for (idx, text) in texts.into_iter().enumerate() {
        if idx > 0 {
            line.push_str(separator);
        }
        line.push_str(text);
    }
    line
}

/// The `separator` attribute of a JSON block.
///
/// An explicit module setting wins. Otherwise an empty global separator is
/// sent as an explicit `false`, since the bar treats a missing attribute as
/// "draw the default separator".
pub fn json_attribute(output: &ModuleOutput, global_separator: &str) -> Option<bool> {
    output
        .separator
        .or_else(|| global_separator.is_empty().then_some(false))
}
