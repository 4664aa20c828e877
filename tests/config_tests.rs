//! Configuration discovery and validation.
//!
//! Tests that touch `BARLINE_CONFIG` or the isolated config directory run
//! serially; they share the process environment.


use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

use barline::config::Config;
use barline::error::BarlineError;
use barline::modules::Module;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn test_defaults_without_any_file() {
    let _guard = test_support::init();
    env::remove_var("BARLINE_CONFIG");
    let _ = fs::remove_file(test_support::get_test_config_dir().join("barline/config.toml"));

    let config = Config::load(None).unwrap();
    assert_eq!(config.order, Config::default().order);
    assert_eq!(config.general.interval, 5);
}

#[test]
#[serial]
fn test_env_var_takes_precedence_over_xdg() {
    let _guard = test_support::init();
    let xdg = test_support::get_test_config_dir().join("barline");
    fs::create_dir_all(&xdg).unwrap();
    fs::write(xdg.join("config.toml"), "order = [\"time\"]\n").unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "env.toml", "order = [\"load\"]\n");
    env::set_var("BARLINE_CONFIG", &path);
    let config = Config::load(None).unwrap();
    assert_eq!(config.order, vec!["load".to_string()]);

    env::remove_var("BARLINE_CONFIG");
    let config = Config::load(None).unwrap();
    assert_eq!(config.order, vec!["time".to_string()]);

    fs::remove_file(xdg.join("config.toml")).unwrap();
}

#[test]
#[serial]
fn test_explicit_path_wins_and_must_exist() {
    let _guard = test_support::init();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bar.toml", "order = [\"static hi\"]\n");
    env::set_var("BARLINE_CONFIG", dir.path().join("other.toml"));

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.order, vec!["static hi".to_string()]);

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        Config::load(Some(&missing)),
        Err(BarlineError::Config(_))
    ));
    env::remove_var("BARLINE_CONFIG");
}

#[test]
fn test_generated_example_builds_every_module() {
    let config = Config::from_toml(Config::example_toml()).unwrap();
    let modules = Module::from_config(&config).unwrap();
    assert_eq!(modules.len(), config.order.len());
}

#[test]
fn test_syntax_error_is_parse_error() {
    let err = Config::from_toml("order = [").unwrap_err();
    assert!(matches!(err, BarlineError::ConfigParse(_)));
}

#[test]
fn test_validation_errors() {
    let cases = [
        ("order = []", "order is empty"),
        ("order = [\"ipv6 eth0\"]", "Unknown module kind"),
        ("order = [\"disk\"]", "needs a title"),
        ("order = [\"load\"]\n[general]\ninterval = 0", "interval"),
        ("order = [\"load\"]\n[general]\noutput_format = \"wmii\"", "Unknown output format"),
        (
            "order = [\"load\"]\n[module.load]\nformat = \"%1min %bogus\"",
            "unknown placeholder %bogus",
        ),
        (
            "order = [\"load\"]\n[module.load]\ncolor_bad = \"red\"",
            "color_bad",
        ),
    ];
    for (toml, expected) in cases {
        let err = Config::from_toml(toml).unwrap_err().to_string();
        assert!(err.contains(expected), "{:?} gave {:?}", toml, err);
    }
}

#[test]
fn test_invalid_block_attributes_rejected() {
    for bad in ["min_width = 0", "min_width = \"\"", "min_width = \"0\"", "align = \"middle\""] {
        let toml = format!("order = [\"load\"]\n[module.load]\n{}", bad);
        assert!(Config::from_toml(&toml).is_err(), "{} accepted", bad);
    }
}
