use std::env;
use std::fs;
use std::process::Command;

/// Trimmed stdout of a successful command, or `"unknown"`.
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    // VERSION file wins over Cargo.toml
    let version = fs::read_to_string("VERSION")
        .map(|v| v.trim().to_string())
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "unknown".to_string());

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    let git_branch = command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .map(|output| output.status.success() && !output.stdout.is_empty())
        .unwrap_or(false);
    let build_date = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let rustc_version = command_output("rustc", &["--version"]);

    println!("cargo:rustc-env=BARLINE_VERSION={}", version);
    println!("cargo:rustc-env=BARLINE_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BARLINE_GIT_BRANCH={}", git_branch);
    println!("cargo:rustc-env=BARLINE_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=BARLINE_BUILD_DATE={}", build_date);
    println!("cargo:rustc-env=BARLINE_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=BARLINE_RUSTC_VERSION={}", rustc_version);

    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
