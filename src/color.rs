//! Color resolution and decoration.
//!
//! Collectors request a semantic [`ColorTag`]; the concrete color is looked
//! up module override first, then the general configuration, and dropped
//! when neither has one or colors are globally disabled.
//!
//! Text formats get the color as an inline bracket around the text. The
//! bracket is opened through [`ColorSpan`], which reserves room for the
//! closing sequence and writes it when the span is dropped, so early
//! returns and truncation can never leave a color open. The JSON format
//! instead carries the color as a separate `color` field and nothing is
//! ever mixed into the text.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::buffer::RenderBuffer;
use crate::output::OutputFormat;

/// Semantic color request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorTag {
    Good,
    Degraded,
    Bad,
    Separator,
    /// A literal color value supplied by the module itself.
    Custom(String),
}

/// A set of configured color values. Used both for the general section and
/// for per-module overrides; `None` means "not configured here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub good: Option<String>,
    pub degraded: Option<String>,
    pub bad: Option<String>,
    pub separator: Option<String>,
}

impl Palette {
    pub fn get<'a>(&'a self, tag: &'a ColorTag) -> Option<&'a str> {
        let value = match tag {
            ColorTag::Good => self.good.as_deref(),
            ColorTag::Degraded => self.degraded.as_deref(),
            ColorTag::Bad => self.bad.as_deref(),
            ColorTag::Separator => self.separator.as_deref(),
            ColorTag::Custom(value) => Some(value.as_str()),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Resolve a tag to a concrete color: module override, then general value,
/// then nothing.
pub fn resolve<'a>(
    tag: &'a ColorTag,
    module: Option<&'a Palette>,
    general: &'a Palette,
    enabled: bool,
) -> Option<&'a str> {
    if !enabled {
        return None;
    }
    module
        .and_then(|palette| palette.get(tag))
        .or_else(|| general.get(tag))
}

/// Check a `#rrggbb` (or, where allowed, `#aarrggbb`) color value.
pub fn is_valid_color(value: &str, allow_alpha: bool) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    let len_ok = hex.len() == 6 || (allow_alpha && hex.len() == 8);
    len_ok && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Nearest 3-bit ANSI color for a `#rrggbb` value: one bit per channel,
/// set when the channel is at least half intensity.
pub fn ansi_color_index(color: &str) -> Option<u8> {
    let hex = color.strip_prefix('#')?;
    let rgb = u32::from_str_radix(hex.get(hex.len().checked_sub(6)?..)?, 16).ok()?;
    let red = ((rgb >> 16) & 0xff) >= 0x80;
    let green = ((rgb >> 8) & 0xff) >= 0x80;
    let blue = (rgb & 0xff) >= 0x80;
    Some(u8::from(red) | (u8::from(green) << 1) | (u8::from(blue) << 2))
}

/// Inline start/end sequences for `color` in a text format.
///
/// Returns `None` for JSON and `none` output, and for colors the terminal
/// conversion cannot read.
pub fn bracket(format: OutputFormat, color: &str) -> Option<(String, &'static str)> {
    match format {
        OutputFormat::Dzen2 => Some((format!("^fg({})", color), "^fg()")),
        OutputFormat::Xmobar => Some((format!("<fc={}>", color), "</fc>")),
        OutputFormat::Lemonbar => Some((format!("%{{F{}}}", color), "%{F-}")),
        OutputFormat::Term => {
            ansi_color_index(color).map(|index| (format!("\x1b[3{};1m", index), "\x1b[0m"))
        }
        OutputFormat::I3bar | OutputFormat::None => None,
    }
}

/// Scoped color bracket over a [`RenderBuffer`].
///
/// Writes the start sequence on open and the end sequence on drop. If the
/// buffer cannot hold both, the span renders uncolored.
pub struct ColorSpan<'b> {
    buf: &'b mut RenderBuffer,
    end: &'static str,
}

impl<'b> ColorSpan<'b> {
    pub fn open(buf: &'b mut RenderBuffer, format: OutputFormat, color: Option<&str>) -> Self {
        let Some((start, end)) = color.and_then(|c| bracket(format, c)) else {
            return Self { buf, end: "" };
        };
        if buf.remaining() < start.len() + end.len() || buf.reserve(end.len()).is_err() {
            return Self { buf, end: "" };
        }
        buf.push_str(&start);
        Self { buf, end }
    }

    /// Text span that never colors anything.
    pub fn plain(buf: &'b mut RenderBuffer) -> Self {
        Self { buf, end: "" }
    }
}

impl Deref for ColorSpan<'_> {
    type Target = RenderBuffer;

    fn deref(&self) -> &RenderBuffer {
        self.buf
    }
}

impl DerefMut for ColorSpan<'_> {
    fn deref_mut(&mut self) -> &mut RenderBuffer {
        self.buf
    }
}

impl Drop for ColorSpan<'_> {
    fn drop(&mut self) {
        if !self.end.is_empty() {
            self.buf.push_reserved(self.end);
        }
    }
}

/// Text plus its structured color, ready for an emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorated {
    pub text: String,
    /// Only set for JSON output.
    pub color: Option<String>,
}

/// Apply an already resolved color to `text` for `format`.
pub fn decorate(text: &str, color: Option<&str>, format: OutputFormat) -> Decorated {
    if format.is_json() {
        return Decorated {
            text: text.to_string(),
            color: color.map(str::to_string),
        };
    }
    let mut buf = RenderBuffer::new();
    {
        let mut span = ColorSpan::open(&mut buf, format, color);
        span.push_str(text);
    }
    Decorated {
        text: buf.finish(),
        color: None,
    }
}
