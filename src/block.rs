//! The rendered result of one module for one cycle.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Text alignment inside a block wider than its text (JSON protocol only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Minimum block width: pixels, or a sample text whose rendered width is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawMinWidth")]
pub enum MinWidth {
    Pixels(u32),
    Text(String),
}

/// `min_width` exactly as written in the configuration file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawMinWidth {
    Number(i64),
    Text(String),
}

impl TryFrom<RawMinWidth> for MinWidth {
    type Error = String;

    fn try_from(raw: RawMinWidth) -> Result<Self, Self::Error> {
        match raw {
            RawMinWidth::Number(n) if n > 0 => u32::try_from(n)
                .map(MinWidth::Pixels)
                .map_err(|_| format!("min_width {} is too large", n)),
            RawMinWidth::Number(n) => Err(format!(
                "invalid min_width {}: expected positive integer or string",
                n
            )),
            RawMinWidth::Text(text) if text.is_empty() => {
                Err("empty min_width: expected positive integer or non-empty string".to_string())
            }
            RawMinWidth::Text(text) if text == "0" => Err(
                "invalid min_width \"0\": expected positive integer or string".to_string(),
            ),
            // A numeric string is a pixel width, anything else a sample text.
            RawMinWidth::Text(text) => match text.parse::<u32>() {
                Ok(n) if n > 0 => Ok(MinWidth::Pixels(n)),
                _ => Ok(MinWidth::Text(text)),
            },
        }
    }
}

/// One module's rendered field.
///
/// `full_text` is final: escaped when markup is active and, for text
/// formats, already wrapped in its color bracket. For JSON output the
/// resolved color travels separately in `color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutput {
    /// Module kind as reported to the bar (`"battery"`, `"disk_info"`, ...)
    pub name: String,
    /// Distinguishes several modules of the same kind (`"wlan0"`, `"/home"`)
    pub instance: Option<String>,
    pub full_text: String,
    pub color: Option<String>,
    /// Explicit per-module separator setting; `None` means "bar default"
    pub separator: Option<bool>,
    pub separator_block_width: Option<u32>,
    pub min_width: Option<MinWidth>,
    pub align: Option<Align>,
    /// Whether the text exceeded its render buffer
    pub truncated: bool,
}

impl ModuleOutput {
    pub fn new(name: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: None,
            full_text: full_text.into(),
            color: None,
            separator: None,
            separator_block_width: None,
            min_width: None,
            align: None,
            truncated: false,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_separator(mut self, separator: bool) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Stable identifier of this module instance (`"ethernet_eth0"`).
    pub fn id(&self) -> String {
        match &self.instance {
            Some(instance) => format!("{}_{}", self.name, instance),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ModuleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        min_width: MinWidth,
    }

    fn parse(toml_value: &str) -> Result<MinWidth, toml::de::Error> {
        toml::from_str::<Wrapper>(&format!("min_width = {}", toml_value)).map(|w| w.min_width)
    }

    #[test]
    fn test_min_width_number() {
        assert_eq!(parse("100").unwrap(), MinWidth::Pixels(100));
        assert!(parse("0").is_err());
        assert!(parse("-3").is_err());
    }

    #[test]
    fn test_min_width_string() {
        assert_eq!(
            parse(r#""E: 255.255.255.255""#).unwrap(),
            MinWidth::Text("E: 255.255.255.255".to_string())
        );
        assert_eq!(parse(r#""120""#).unwrap(), MinWidth::Pixels(120));
        assert!(parse(r#""""#).is_err());
        assert!(parse(r#""0""#).is_err());
    }

    #[test]
    fn test_min_width_serializes_untagged() {
        assert_eq!(serde_json::to_string(&MinWidth::Pixels(9)).unwrap(), "9");
        assert_eq!(
            serde_json::to_string(&MinWidth::Text("abc".into())).unwrap(),
            "\"abc\""
        );
    }

    #[test]
    fn test_id() {
        let output = ModuleOutput::new("ethernet", "E: up").with_instance("eth0");
        assert_eq!(output.id(), "ethernet_eth0");
        assert_eq!(ModuleOutput::new("load", "0.5").id(), "load");
    }
}
