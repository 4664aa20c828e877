//! Status modules.
//!
//! An order entry `"<kind> <title>"` names a module kind and, for most
//! kinds, the thing it watches (a disk path, an interface, a battery
//! number). Each kind has a collector that samples the system through
//! [`SystemMetricsProvider`] and returns a [`Sample`]: the template to
//! render, its placeholder values and the color it asks for. Collectors
//! never produce protocol-specific text; that is the renderer's job.

mod battery;
mod cpu_temperature;
mod cpu_usage;
mod disk;
mod ethernet;
mod exec;
mod load;
mod memory;
mod read_file;
mod static_text;
mod time;
mod volume;
mod watch;
mod wireless;

use std::fmt;
use std::str::FromStr;

use crate::color::{ColorTag, Palette};
use crate::config::{Config, ModuleConfig};
use crate::error::{BarlineError, Result};
use crate::placeholders::Placeholder;
use crate::system::SystemMetricsProvider;

/// Every module kind that can appear in `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Time,
    Load,
    CpuUsage,
    Memory,
    Disk,
    CpuTemperature,
    Battery,
    Ethernet,
    PathExists,
    RunWatch,
    ReadFile,
    Exec,
    Static,
    Wireless,
    Volume,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 15] = [
        ModuleKind::Time,
        ModuleKind::Load,
        ModuleKind::CpuUsage,
        ModuleKind::Memory,
        ModuleKind::Disk,
        ModuleKind::CpuTemperature,
        ModuleKind::Battery,
        ModuleKind::Ethernet,
        ModuleKind::PathExists,
        ModuleKind::RunWatch,
        ModuleKind::ReadFile,
        ModuleKind::Exec,
        ModuleKind::Static,
        ModuleKind::Wireless,
        ModuleKind::Volume,
    ];

    /// Name used in order entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Time => "time",
            ModuleKind::Load => "load",
            ModuleKind::CpuUsage => "cpu_usage",
            ModuleKind::Memory => "memory",
            ModuleKind::Disk => "disk",
            ModuleKind::CpuTemperature => "cpu_temperature",
            ModuleKind::Battery => "battery",
            ModuleKind::Ethernet => "ethernet",
            ModuleKind::PathExists => "path_exists",
            ModuleKind::RunWatch => "run_watch",
            ModuleKind::ReadFile => "read_file",
            ModuleKind::Exec => "exec",
            ModuleKind::Static => "static",
            ModuleKind::Wireless => "wireless",
            ModuleKind::Volume => "volume",
        }
    }

    /// Block `name` reported to the bar.
    pub fn block_name(&self) -> &'static str {
        match self {
            ModuleKind::Disk => "disk_info",
            other => other.as_str(),
        }
    }

    /// Placeholder names (without `%`) this kind supplies.
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            ModuleKind::Time => time::PLACEHOLDERS,
            ModuleKind::Load => load::PLACEHOLDERS,
            ModuleKind::CpuUsage => cpu_usage::PLACEHOLDERS,
            ModuleKind::Memory => memory::PLACEHOLDERS,
            ModuleKind::Disk => disk::PLACEHOLDERS,
            ModuleKind::CpuTemperature => cpu_temperature::PLACEHOLDERS,
            ModuleKind::Battery => battery::PLACEHOLDERS,
            ModuleKind::Ethernet => ethernet::PLACEHOLDERS,
            ModuleKind::PathExists | ModuleKind::RunWatch => watch::PLACEHOLDERS,
            ModuleKind::ReadFile => read_file::PLACEHOLDERS,
            ModuleKind::Exec => exec::PLACEHOLDERS,
            ModuleKind::Static => static_text::PLACEHOLDERS,
            ModuleKind::Wireless => wireless::PLACEHOLDERS,
            ModuleKind::Volume => volume::PLACEHOLDERS,
        }
    }

    /// Whether a `%token` in a template would be substituted by this kind.
    pub fn accepts(&self, token: &str) -> bool {
        self.placeholders().iter().any(|name| token.starts_with(name))
    }

    /// Kinds that watch a specific thing and need it named in the title.
    pub fn requires_title(&self) -> bool {
        matches!(
            self,
            ModuleKind::Disk
                | ModuleKind::Ethernet
                | ModuleKind::Wireless
                | ModuleKind::PathExists
                | ModuleKind::RunWatch
                | ModuleKind::ReadFile
                | ModuleKind::Exec
        )
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = BarlineError;

    fn from_str(s: &str) -> Result<Self> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BarlineError::config(format!("Unknown module kind \"{}\"", s)))
    }
}

/// A parsed order entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub kind: ModuleKind,
    pub title: Option<String>,
}

impl FromStr for ModuleSpec {
    type Err = BarlineError;

    fn from_str(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let (kind, title) = match entry.split_once(char::is_whitespace) {
            Some((kind, title)) => (kind, Some(title.trim().to_string())),
            None => (entry, None),
        };
        let kind: ModuleKind = kind.parse()?;
        if kind.requires_title() && title.is_none() {
            return Err(BarlineError::config(format!(
                "Module \"{}\" needs a title, e.g. \"{} <name>\"",
                entry, kind
            )));
        }
        Ok(ModuleSpec { kind, title })
    }
}

/// What a collector wants rendered for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub template: &'a str,
    pub placeholders: Vec<Placeholder<'a>>,
    pub color: Option<ColorTag>,
    /// Strip surrounding whitespace left by empty placeholders
    pub trim: bool,
}

impl<'a> Sample<'a> {
    pub fn new(template: &'a str, placeholders: Vec<Placeholder<'a>>) -> Self {
        Self {
            template,
            placeholders,
            color: None,
            trim: false,
        }
    }

    pub fn with_color(mut self, color: ColorTag) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color_if(self, condition: bool, color: ColorTag) -> Self {
        if condition {
            self.with_color(color)
        } else {
            self
        }
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }
}

/// Everything a collector may look at.
pub struct Context<'a> {
    pub config: &'a ModuleConfig,
    pub title: Option<&'a str>,
    pub system: &'a dyn SystemMetricsProvider,
    /// How a literal percent sign must be written in the active format
    pub percent: &'static str,
}

impl<'a> Context<'a> {
    pub fn title(&self) -> &'a str {
        self.title.unwrap_or("")
    }

    /// A string option, or `default`.
    pub fn option(&self, key: &str, default: &'a str) -> &'a str {
        self.config.str_or(key, default)
    }

    /// `%title` as a placeholder. Titles are free-form and may carry
    /// markup characters.
    pub fn title_placeholder(&self) -> Placeholder<'a> {
        Placeholder::untrusted("title", self.title())
    }

    /// The module's `format_down` (or `default`) in the bad color.
    pub fn failure(&self, default: &'a str) -> Sample<'a> {
        Sample::new(
            self.option("format_down", default),
            vec![self.title_placeholder()],
        )
        .with_color(ColorTag::Bad)
    }

    /// A percentage with the format's percent sign.
    pub fn percentage(&self, value: f64, decimals: usize) -> String {
        format!("{:.*}{}", decimals, value, self.percent)
    }
}

/// A configured module: order entry, settings and color overrides.
#[derive(Debug, Clone)]
pub struct Module {
    pub spec: ModuleSpec,
    pub config: ModuleConfig,
    palette: Palette,
}

impl Module {
    pub fn new(spec: ModuleSpec, config: ModuleConfig) -> Self {
        let palette = config.palette();
        Self {
            spec,
            config,
            palette,
        }
    }

    /// Build the modules of `config.order`, left to right.
    pub fn from_config(config: &Config) -> Result<Vec<Module>> {
        config
            .order
            .iter()
            .map(|entry| Ok(Module::new(entry.parse()?, config.module(entry))))
            .collect()
    }

    pub fn block_name(&self) -> &'static str {
        self.spec.kind.block_name()
    }

    pub fn instance(&self) -> Option<&str> {
        self.spec.title.as_deref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Sample the system for this cycle.
    pub fn collect<'a>(
        &'a self,
        system: &'a dyn SystemMetricsProvider,
        percent: &'static str,
    ) -> Sample<'a> {
        let ctx = Context {
            config: &self.config,
            title: self.spec.title.as_deref(),
            system,
            percent,
        };
        match self.spec.kind {
            ModuleKind::Time => time::collect(&ctx),
            ModuleKind::Load => load::collect(&ctx),
            ModuleKind::CpuUsage => cpu_usage::collect(&ctx),
            ModuleKind::Memory => memory::collect(&ctx),
            ModuleKind::Disk => disk::collect(&ctx),
            ModuleKind::CpuTemperature => cpu_temperature::collect(&ctx),
            ModuleKind::Battery => battery::collect(&ctx),
            ModuleKind::Ethernet => ethernet::collect(&ctx),
            ModuleKind::PathExists => watch::collect_path_exists(&ctx),
            ModuleKind::RunWatch => watch::collect_run_watch(&ctx),
            ModuleKind::ReadFile => read_file::collect(&ctx),
            ModuleKind::Exec => exec::collect(&ctx),
            ModuleKind::Static => static_text::collect(&ctx),
            ModuleKind::Wireless => wireless::collect(&ctx),
            ModuleKind::Volume => volume::collect(&ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_entry() {
        let spec: ModuleSpec = "disk /home".parse().unwrap();
        assert_eq!(spec.kind, ModuleKind::Disk);
        assert_eq!(spec.title.as_deref(), Some("/home"));

        let spec: ModuleSpec = "load".parse().unwrap();
        assert_eq!(spec.kind, ModuleKind::Load);
        assert_eq!(spec.title, None);

        let spec: ModuleSpec = "static my label".parse().unwrap();
        assert_eq!(spec.title.as_deref(), Some("my label"));
    }

    #[test]
    fn test_parse_spec_errors() {
        assert!("ipv6 eth0".parse::<ModuleSpec>().is_err());
        assert!("wireless".parse::<ModuleSpec>().is_err());
        assert!("disk".parse::<ModuleSpec>().is_err());
        assert!("".parse::<ModuleSpec>().is_err());
    }

    #[test]
    fn test_accepts_prefix_of_known_name() {
        assert!(ModuleKind::Load.accepts("1min"));
        assert!(ModuleKind::Load.accepts("15minutes"));
        assert!(!ModuleKind::Load.accepts("min"));
        assert!(ModuleKind::Disk.accepts("percentage_used_of_avail"));
    }

    #[test]
    fn test_block_names() {
        assert_eq!(ModuleKind::Disk.block_name(), "disk_info");
        assert_eq!(ModuleKind::Battery.block_name(), "battery");
    }

    #[test]
    fn test_every_kind_has_placeholders() {
        for kind in ModuleKind::ALL {
            assert!(!kind.placeholders().is_empty(), "{}", kind);
            assert_eq!(kind.as_str().parse::<ModuleKind>().unwrap(), kind);
        }
    }
}
