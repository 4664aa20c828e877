//! # barline
//!
//! A status line generator for i3bar, swaybar, dzen2, xmobar, lemonbar and
//! terminals.
//!
//! ## Features
//!
//! - **Modules**: time, load, CPU usage and temperature, memory, disks,
//!   batteries, ethernet and wireless links, volume, watched paths and
//!   pidfiles, files and command output
//! - **Templates**: `%placeholder` format strings per module
//! - **Protocols**: streaming i3bar JSON or one of several text dialects,
//!   with colors as inline brackets or JSON fields
//! - **Bounded rendering**: every module renders into a fixed-size buffer
//!   and is truncated with a visible marker, never overrun
//! - **Configuration**: TOML with sensible defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use barline::placeholders::{expand, Placeholder};
//!
//! let text = expand(
//!     "W: (%quality at %essid) %ip",
//!     &[
//!         Placeholder::new("quality", "42%"),
//!         Placeholder::new("essid", "home"),
//!         Placeholder::new("ip", "192.168.1.5"),
//!     ],
//! );
//! assert_eq!(text, "W: (42% at home) 192.168.1.5");
//! ```

pub mod block;
/// Fixed-capacity render buffer
pub mod buffer;
pub mod color;
/// Configuration loading and validation
pub mod config;
/// Output format auto-detection
pub mod detect;
pub mod emitter;
pub mod error;
pub mod markup;
pub mod modules;
pub mod output;
pub mod placeholders;
pub mod render;
pub mod separator;
pub mod status;
/// Access to the running system
pub mod system;
pub mod utils;
pub mod version;

pub use block::ModuleOutput;
pub use buffer::RenderBuffer;
pub use config::Config;
pub use emitter::Emitter;
pub use error::{BarlineError, Result};
pub use modules::{Module, Sample};
pub use output::{OutputFormat, ProtocolState};
pub use placeholders::{expand, Placeholder};
pub use render::Renderer;
pub use status::{Shutdown, StatusLine};
pub use system::{LocalSystem, SystemMetricsProvider};
pub use version::{short_version, version_string};
