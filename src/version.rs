//! Build information injected by `build.rs`.

use std::fmt;

use crate::output::OutputFormat;

pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub git_dirty: bool,
    pub build_date: &'static str,
    pub build_profile: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("BARLINE_VERSION"),
            git_hash: env!("BARLINE_GIT_HASH"),
            git_branch: env!("BARLINE_GIT_BRANCH"),
            git_dirty: env!("BARLINE_GIT_DIRTY") == "true",
            build_date: env!("BARLINE_BUILD_DATE"),
            build_profile: env!("BARLINE_BUILD_PROFILE"),
            rustc_version: env!("BARLINE_RUSTC_VERSION"),
        }
    }

    /// `v0.4.0 (abc1234)`, with `+dirty` for uncommitted builds.
    pub fn short(&self) -> String {
        let dirty = if self.git_dirty { "+dirty" } else { "" };
        format!("v{} ({}{})", self.version, self.git_hash, dirty)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "barline v{}", self.version)?;
        writeln!(
            f,
            "Git: {} ({}){}",
            self.git_hash,
            self.git_branch,
            if self.git_dirty { " +uncommitted changes" } else { "" }
        )?;
        writeln!(f, "Built: {} ({})", self.build_date, self.build_profile)?;
        writeln!(f, "Rustc: {}", self.rustc_version)?;
        let formats: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.as_str()).collect();
        writeln!(f, "Output formats: {}", formats.join(", "))
    }
}

/// Multi-line text for `--version-full`.
pub fn version_string() -> String {
    BuildInfo::current().to_string()
}

/// One-line version for logs.
pub fn short_version() -> String {
    BuildInfo::current().short()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_present() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
        assert!(!info.git_hash.is_empty());
        assert!(!info.build_date.is_empty());
    }

    #[test]
    fn test_short_version() {
        let info = BuildInfo::current();
        let short = short_version();
        assert!(short.starts_with('v'));
        assert!(short.contains(info.version));
        assert_eq!(short.contains("+dirty"), info.git_dirty);
    }

    #[test]
    fn test_version_string_lists_formats() {
        let text = version_string();
        assert!(text.starts_with("barline v"));
        assert!(text.contains("Rustc:"));
        assert!(text.contains("i3bar, dzen2"));
    }
}
