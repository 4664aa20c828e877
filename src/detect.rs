//! `output_format = "auto"`: guess the consumer of our stdout.
//!
//! A terminal gets `term`. Otherwise the parent process is inspected (and,
//! when it is a shell wrapper, the grandparent), then every process sharing
//! our parent, looking for a known bar.

use log::{debug, info};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use crate::output::OutputFormat;

const PROC_DIR: &str = "/proc";

/// Bar process names and the format they read.
const KNOWN_BARS: &[(&str, OutputFormat)] = &[
    ("i3bar", OutputFormat::I3bar),
    ("swaybar", OutputFormat::I3bar),
    ("dzen2", OutputFormat::Dzen2),
    ("xmobar", OutputFormat::Xmobar),
    ("lemonbar", OutputFormat::Lemonbar),
];

/// Command name and parent pid from the contents of `/proc/<pid>/stat`.
///
/// The name is in parentheses and may itself contain spaces or `)`, so the
/// fields are split after the last `)`.
pub fn parse_stat(stat: &str) -> Option<(&str, i32)> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let comm = stat.get(open + 1..close)?;
    let mut fields = stat.get(close + 1..)?.split_whitespace();
    let _state = fields.next()?;
    let ppid = fields.next()?.parse().ok()?;
    Some((comm, ppid))
}

/// Format read by a process called `comm`, if it is a known bar.
pub fn format_for_process(comm: &str) -> Option<OutputFormat> {
    KNOWN_BARS
        .iter()
        .find(|(name, _)| *name == comm)
        .map(|(_, format)| *format)
}

fn read_stat(proc_dir: &Path, pid: i32) -> Option<(String, i32)> {
    let stat = fs::read_to_string(proc_dir.join(pid.to_string()).join("stat")).ok()?;
    parse_stat(&stat).map(|(comm, ppid)| (comm.to_string(), ppid))
}

/// Look for a bar among the ancestors and siblings of `pid` in `proc_dir`.
pub fn detect_from_proc(proc_dir: &Path, pid: i32) -> Option<OutputFormat> {
    let (_, parent) = read_stat(proc_dir, pid)?;
    let (parent_comm, grandparent) = read_stat(proc_dir, parent)?;
    debug!("Parent process {} is {}", parent, parent_comm);

    if let Some(format) = format_for_process(&parent_comm) {
        return Some(format);
    }
    if parent_comm == "sh" {
        if let Some(format) = read_stat(proc_dir, grandparent)
            .and_then(|(comm, _)| format_for_process(&comm))
        {
            return Some(format);
        }
    }

    // `barline | dzen2` makes the bar our sibling
    let entries = fs::read_dir(proc_dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
        .filter(|other| *other != pid)
        .filter_map(|other| read_stat(proc_dir, other))
        .filter(|(_, ppid)| *ppid == parent)
        .find_map(|(comm, _)| format_for_process(&comm))
}

/// Pick the output format for `auto`.
pub fn detect_output_format() -> OutputFormat {
    if io::stdout().is_terminal() {
        info!("stdout is a terminal, using term output");
        return OutputFormat::Term;
    }
    let format = detect_from_proc(Path::new(PROC_DIR), std::process::id() as i32)
        .unwrap_or(OutputFormat::None);
    info!("Auto-detected output format: {}", format);
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_stat() {
        let stat = "1234 (i3bar) S 1000 1234 1234 0 -1 4194560 1024 0 0 0";
        assert_eq!(parse_stat(stat), Some(("i3bar", 1000)));

        let stat = "77 (weird ) name) R 5 77 77";
        assert_eq!(parse_stat(stat), Some(("weird ) name", 5)));

        assert_eq!(parse_stat("garbage"), None);
    }

    #[test]
    fn test_known_bars() {
        assert_eq!(format_for_process("swaybar"), Some(OutputFormat::I3bar));
        assert_eq!(format_for_process("xmobar"), Some(OutputFormat::Xmobar));
        assert_eq!(format_for_process("bash"), None);
    }

    fn fake_proc(processes: &[(i32, &str, i32)]) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        for (pid, comm, ppid) in processes {
            let pid_dir = dir.path().join(pid.to_string());
            fs::create_dir(&pid_dir).unwrap();
            fs::write(pid_dir.join("stat"), format!("{} ({}) S {} 0 0", pid, comm, ppid)).unwrap();
        }
        let path = dir.path().to_path_buf();
        (dir, path)
    }

    #[test]
    fn test_parent_is_bar() {
        let (_dir, proc_dir) = fake_proc(&[(10, "barline", 5), (5, "i3bar", 1)]);
        assert_eq!(detect_from_proc(&proc_dir, 10), Some(OutputFormat::I3bar));
    }

    #[test]
    fn test_shell_wrapper_checks_grandparent() {
        let (_dir, proc_dir) =
            fake_proc(&[(10, "barline", 6), (6, "sh", 5), (5, "swaybar", 1)]);
        assert_eq!(detect_from_proc(&proc_dir, 10), Some(OutputFormat::I3bar));
    }

    #[test]
    fn test_sibling_in_pipeline() {
        let (_dir, proc_dir) =
            fake_proc(&[(10, "barline", 5), (11, "dzen2", 5), (5, "bash", 1)]);
        assert_eq!(detect_from_proc(&proc_dir, 10), Some(OutputFormat::Dzen2));
    }

    #[test]
    fn test_nothing_recognised() {
        let (_dir, proc_dir) = fake_proc(&[(10, "barline", 5), (5, "bash", 1)]);
        assert_eq!(detect_from_proc(&proc_dir, 10), None);
    }
}
