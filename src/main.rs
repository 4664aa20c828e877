//! # barline
//!
//! Prints a status line for i3bar, swaybar, dzen2, xmobar, lemonbar or a
//! terminal, refreshed every `interval` seconds.
//!
//! ## Usage
//!
//! ```bash
//! barline                       # config from the usual places
//! barline -c ~/bar.toml --run-once
//! barline generate-config       # write an example config
//! ```

use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use barline::config::Config;
use barline::detect::detect_output_format;
use barline::emitter;
use barline::error::Result;
use barline::output::ProtocolState;
use barline::status::{Shutdown, StatusLine};
use barline::system::LocalSystem;
use barline::version::{short_version, version_string};

/// barline - a status line generator for bars and terminals
#[derive(Parser)]
#[command(name = "barline")]
#[command(version = env!("BARLINE_VERSION"))]
#[command(about = "A status line generator for i3bar, swaybar, dzen2, xmobar, lemonbar and terminals", long_about = None)]
#[command(
    after_help = "Config search order: --config, $BARLINE_CONFIG, ~/.config/barline/config.toml, ~/.barline.toml\n\nExample:\n  bar {\n      status_command barline\n  }"
)]
struct Cli {
    /// Configuration file to use
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a single status line and exit
    #[arg(long = "run-once")]
    run_once: bool,

    /// Show detailed version information
    #[arg(long = "version-full")]
    version_full: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example config file
    GenerateConfig,
}

fn main() -> ExitCode {
    // WARN by default, RUST_LOG overrides; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_broken_pipe() => {
            info!("Output closed, exiting");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("barline: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.version_full {
        print!("{}", version_string());
        return Ok(());
    }

    if let Some(Commands::GenerateConfig) = cli.command {
        return generate_config();
    }

    debug!("barline {}", short_version());
    let config = Config::load(cli.config.as_deref())?;
    let format = match config.general.output_format()? {
        Some(format) => format,
        None => detect_output_format(),
    };
    let state = ProtocolState::new(format, &config.general);

    let mut emitter = emitter::for_state(&state);
    let status = StatusLine::new(&config, state, Box::new(LocalSystem::new()))?;
    let shutdown = Shutdown::install()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    status.run(&mut out, emitter.as_mut(), &shutdown, cli.run_once)
}

fn generate_config() -> Result<()> {
    let config_path = Config::default_config_path()?;
    if config_path.exists() {
        println!("Config file already exists at {}", config_path.display());
        println!("Remove it first to generate a fresh example.");
        return Ok(());
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, Config::example_toml())?;
    println!("Config file generated at {}", config_path.display());
    Ok(())
}
