use crate::block::{Align, MinWidth};
use crate::color::{self, Palette};
use crate::error::{BarlineError, Result};
use crate::markup::MarkupMode;
use crate::modules::ModuleSpec;
use crate::output::OutputFormat;
use crate::placeholders;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Value of `output_format` that asks for detection at startup.
pub const AUTO_OUTPUT_FORMAT: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Modules to display, left to right (`"<kind>"` or `"<kind> <title>"`)
    pub order: Vec<String>,

    /// Settings shared by every module
    pub general: GeneralConfig,

    /// Per-module settings keyed by the order entry
    #[serde(rename = "module", skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, ModuleConfig>,
}

/// The `[general]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Wire format, or `"auto"` to detect it from the environment
    pub output_format: String,

    /// Global color switch
    pub colors: bool,

    /// Seconds between two cycles
    pub interval: u64,

    /// Text between modules; `"default"` picks the format's own separator
    pub separator: String,

    pub markup: MarkupMode,

    pub color_good: String,
    pub color_degraded: String,
    pub color_bad: String,
    pub color_separator: String,
}

/// One `[module."<kind> <title>"]` section.
///
/// The settings every module understands are typed fields; everything else
/// (formats, thresholds, paths) stays in `options` and is read by the
/// module's collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<MinWidth>,

    /// Whether the bar draws a separator after this block (JSON only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator_block_width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_good: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_degraded: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_bad: Option<String>,

    #[serde(flatten)]
    pub options: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            order: vec![
                "disk /".to_string(),
                "load".to_string(),
                "memory".to_string(),
                "time".to_string(),
            ],
            general: GeneralConfig::default(),
            modules: BTreeMap::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            output_format: AUTO_OUTPUT_FORMAT.to_string(),
            colors: true,
            interval: 5,
            separator: crate::output::DEFAULT_SEPARATOR_KEYWORD.to_string(),
            markup: MarkupMode::None,
            color_good: "#00FF00".to_string(),
            color_degraded: "#FFFF00".to_string(),
            color_bad: "#FF0000".to_string(),
            color_separator: "#333333".to_string(),
        }
    }
}

impl GeneralConfig {
    /// The configured output format, `None` for auto-detection.
    pub fn output_format(&self) -> Result<Option<OutputFormat>> {
        if self.output_format.eq_ignore_ascii_case(AUTO_OUTPUT_FORMAT) {
            Ok(None)
        } else {
            self.output_format.parse().map(Some)
        }
    }

    pub fn palette(&self) -> Palette {
        Palette {
            good: Some(self.color_good.clone()),
            degraded: Some(self.color_degraded.clone()),
            bad: Some(self.color_bad.clone()),
            separator: Some(self.color_separator.clone()),
        }
    }
}

impl ModuleConfig {
    /// Per-module color overrides.
    pub fn palette(&self) -> Palette {
        Palette {
            good: self.color_good.clone(),
            degraded: self.color_degraded.clone(),
            bad: self.color_bad.clone(),
            separator: None,
        }
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(toml::Value::as_str)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// A number option; integers are accepted where floats are expected.
    pub fn f64(&self, key: &str) -> Option<f64> {
        match self.options.get(key)? {
            toml::Value::Float(f) => Some(*f),
            toml::Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.f64(key).unwrap_or(default)
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Format templates set in this section (`format`, `format_down`, ...).
    ///
    /// `format_time` is a strftime pattern, not a template.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().filter_map(|(key, value)| {
            let template = value.as_str()?;
            (key.starts_with("format") && key != "format_time").then_some((key.as_str(), template))
        })
    }
}

// Configuration loading
impl Config {
    /// Load configuration from `explicit` or the standard locations, or use
    /// defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Some(config_path) = Self::find_config_file() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BarlineError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // 1. Environment variable
        if let Ok(path) = std::env::var("BARLINE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("barline").join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Home directory
        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir.join(".barline.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Get default config file path (for creating new config)
    pub fn default_config_path() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("barline").join("config.toml"))
        } else {
            Err(BarlineError::config("Could not determine config directory"))
        }
    }

    /// Settings for an order entry; defaults when the section is absent.
    pub fn module(&self, entry: &str) -> ModuleConfig {
        self.modules.get(entry).cloned().unwrap_or_default()
    }

    /// Reject configurations that could only fail later, per cycle.
    pub fn validate(&self) -> Result<()> {
        if self.order.is_empty() {
            return Err(BarlineError::config("order is empty"));
        }
        if self.general.interval == 0 {
            return Err(BarlineError::config("interval must be greater than 0"));
        }

        let format = self.general.output_format()?;
        let allow_alpha = format.is_some_and(|f| f.supports_alpha());

        let general = self.general.palette();
        for (key, value) in palette_entries(&general) {
            check_color("general", key, value, allow_alpha)?;
        }

        for entry in &self.order {
            let spec: ModuleSpec = entry.parse()?;
            let Some(module) = self.modules.get(entry) else {
                continue;
            };
            for (key, value) in palette_entries(&module.palette()) {
                check_color(entry, key, value, allow_alpha)?;
            }
            for (key, template) in module.templates() {
                if let Some(token) = placeholders::tokens(template)
                    .find(|token| !spec.kind.accepts(token))
                {
                    return Err(BarlineError::config(format!(
                        "{}: unknown placeholder %{} in {}",
                        entry, token, key
                    )));
                }
            }
        }

        for name in self.modules.keys() {
            if !self.order.contains(name) {
                warn!("Module \"{}\" is configured but not in order, ignoring", name);
            }
        }

        Ok(())
    }

    /// Generate example config file content
    pub fn example_toml() -> &'static str {
        r##"# Barline Configuration File
#
# All values shown in [general] are the defaults - you can override only
# what you need.

# Modules to display, left to right. An entry is "<kind>" or "<kind> <title>".
order = [
    "wireless wlan0",
    "ethernet eth0",
    "battery 0",
    "disk /",
    "cpu_usage",
    "load",
    "memory",
    "volume master",
    "time",
]

[general]
# auto, i3bar, dzen2, xmobar, lemonbar, term or none
output_format = "auto"
colors = true
# Seconds between updates
interval = 5
# "default" uses the separator of the output format; "" disables it
separator = "default"
# none or pango
markup = "none"
color_good = "#00FF00"
color_degraded = "#FFFF00"
color_bad = "#FF0000"
color_separator = "#333333"

[module."wireless wlan0"]
format_up = "W: (%quality at %essid, %bitrate) %ip"
format_down = "W: down"

[module."ethernet eth0"]
format_up = "E: %ip (%speed)"
format_down = "E: down"

[module."battery 0"]
format = "%status %percentage %remaining"
format_down = "No battery"
low_threshold = 10
threshold_type = "percentage"   # percentage or time (minutes)

[module."disk /"]
format = "%avail"
prefix_type = "binary"          # binary, decimal or custom
low_threshold = 10
threshold_type = "percentage_avail"

[module."cpu_usage"]
format = "%usage"
max_threshold = 95
degraded_threshold = 90

[module."load"]
format = "%1min"
max_threshold = 5.0

[module."memory"]
format = "%used | %available"
threshold_degraded = "1G"
threshold_critical = "5%"
format_degraded = "MEMORY < %available"

[module."volume master"]
format = "♪: %volume"
format_muted = "♪: muted (%volume)"
device = "default"
mixer = "Master"
mixer_idx = 0

[module."time"]
format_time = "%Y-%m-%d %H:%M:%S"

# Optional JSON-only block settings, valid in every module section:
# align = "left"                 # left, right or center
# min_width = 100                # pixels, or a sample text like "E: 255.255.255.255"
# separator = false
# separator_block_width = 9
# color_bad = "#FF5555"          # overrides the general color for this module
"##
    }
}

fn palette_entries(palette: &Palette) -> [(&'static str, Option<&str>); 4] {
    [
        ("color_good", palette.good.as_deref()),
        ("color_degraded", palette.degraded.as_deref()),
        ("color_bad", palette.bad.as_deref()),
        ("color_separator", palette.separator.as_deref()),
    ]
}

fn check_color(section: &str, key: &str, value: Option<&str>, allow_alpha: bool) -> Result<()> {
    match value {
        Some(value) if !value.is_empty() && !color::is_valid_color(value, allow_alpha) => {
            Err(BarlineError::config(format!(
                "{}: invalid {} \"{}\": expected #rrggbb",
                section, key, value
            )))
        }
        _ => Ok(()),
    }
}
