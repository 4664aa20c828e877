//! Output formats and the process-wide protocol state.
//!
//! The protocol state is fixed once at startup from configuration and only
//! read afterwards by the renderer and the emitters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::Palette;
use crate::config::GeneralConfig;
use crate::error::BarlineError;
use crate::markup::MarkupMode;

/// Separator value meaning "whatever the output format uses by default".
pub const DEFAULT_SEPARATOR_KEYWORD: &str = "default";

/// Wire encoding of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Streaming JSON (i3bar / swaybar protocol)
    I3bar,
    Dzen2,
    Xmobar,
    Lemonbar,
    /// ANSI terminal
    Term,
    /// Plain text, no colors
    None,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::I3bar,
        OutputFormat::Dzen2,
        OutputFormat::Xmobar,
        OutputFormat::Lemonbar,
        OutputFormat::Term,
        OutputFormat::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::I3bar => "i3bar",
            OutputFormat::Dzen2 => "dzen2",
            OutputFormat::Xmobar => "xmobar",
            OutputFormat::Lemonbar => "lemonbar",
            OutputFormat::Term => "term",
            OutputFormat::None => "none",
        }
    }

    /// Whether colors travel as structured fields instead of inline sequences.
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::I3bar)
    }

    /// Separator used when the configuration says `"default"`.
    ///
    /// For i3bar any non-empty value means "let the bar draw its separator".
    pub fn default_separator(&self) -> &'static str {
        match self {
            OutputFormat::Dzen2 => "^p(5;-2)^ro(2)^p()^p(5)",
            OutputFormat::I3bar => DEFAULT_SEPARATOR_KEYWORD,
            _ => " | ",
        }
    }

    /// How collectors must write a literal percent sign.
    pub fn percent_sign(&self) -> &'static str {
        match self {
            OutputFormat::Lemonbar => "%%",
            _ => "%",
        }
    }

    /// Whether this format accepts `#aarrggbb` colors.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, OutputFormat::Lemonbar)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = BarlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BarlineError::config(format!("Unknown output format: \"{}\"", s)))
    }
}

/// Everything the rendering core needs to know about the active protocol.
#[derive(Debug, Clone)]
pub struct ProtocolState {
    pub format: OutputFormat,
    pub markup: MarkupMode,
    colors: bool,
    /// Separator with `"default"` already resolved for `format`.
    pub separator: String,
    /// General color values (`color_good`, ...).
    pub palette: Palette,
}

impl ProtocolState {
    pub fn new(format: OutputFormat, general: &GeneralConfig) -> Self {
        let separator = if general.separator.eq_ignore_ascii_case(DEFAULT_SEPARATOR_KEYWORD) {
            format.default_separator().to_string()
        } else {
            general.separator.clone()
        };

        Self {
            format,
            markup: general.markup,
            colors: general.colors,
            separator,
            palette: general.palette(),
        }
    }

    /// Global color switch. Plain `none` output never carries colors.
    pub fn colors_enabled(&self) -> bool {
        self.colors && self.format != OutputFormat::None
    }

    pub fn percent_sign(&self) -> &'static str {
        self.format.percent_sign()
    }
}
