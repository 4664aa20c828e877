use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::output::OutputFormat;

const MAX_EXPONENT: usize = 4;

static IEC_SYMBOLS: [&str; MAX_EXPONENT + 1] = ["", "Ki", "Mi", "Gi", "Ti"];
static SI_SYMBOLS: [&str; MAX_EXPONENT + 1] = ["", "k", "M", "G", "T"];
static CUSTOM_SYMBOLS: [&str; MAX_EXPONENT + 1] = ["", "K", "M", "G", "T"];

/// How byte counts are scaled for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixType {
    /// Powers of 1024 with IEC symbols (`GiB`)
    Binary,
    /// Powers of 1000 with SI symbols (`GB`)
    Decimal,
    /// Powers of 1024 with SI-looking symbols (`GB`)
    Custom,
}

impl PrefixType {
    /// Parse a `prefix_type` option; anything unknown is binary.
    pub fn from_option(value: &str) -> Self {
        if value.eq_ignore_ascii_case("decimal") {
            PrefixType::Decimal
        } else if value.eq_ignore_ascii_case("custom") {
            PrefixType::Custom
        } else {
            PrefixType::Binary
        }
    }

    pub fn base(&self) -> f64 {
        match self {
            PrefixType::Decimal => 1000.0,
            PrefixType::Binary | PrefixType::Custom => 1024.0,
        }
    }

    fn symbols(&self) -> &'static [&'static str; MAX_EXPONENT + 1] {
        match self {
            PrefixType::Binary => &IEC_SYMBOLS,
            PrefixType::Decimal => &SI_SYMBOLS,
            PrefixType::Custom => &CUSTOM_SYMBOLS,
        }
    }
}

/// Human readable byte count with one decimal (`"12.5 GiB"`).
pub fn format_bytes(bytes: u64, prefix: PrefixType) -> String {
    let base = prefix.base();
    let mut size = bytes as f64;
    let mut exponent = 0;
    while size >= base && exponent < MAX_EXPONENT {
        size /= base;
        exponent += 1;
    }
    format!("{:.1} {}B", size, prefix.symbols()[exponent])
}

/// Binary byte count, scaled no further than `unit` (`"Mi"`, `"Gi"`, ...)
/// and printed with `decimals` decimals. `"auto"` scales as far as possible.
pub fn format_bytes_in_unit(bytes: u64, unit: &str, decimals: usize) -> String {
    let mut size = bytes as f64;
    let mut exponent = 0;
    while size >= 1024.0 && exponent < MAX_EXPONENT {
        if IEC_SYMBOLS[exponent].eq_ignore_ascii_case(unit) {
            break;
        }
        size /= 1024.0;
        exponent += 1;
    }
    format!("{:.*} {}B", decimals, size, IEC_SYMBOLS[exponent])
}

/// Resolve a size threshold against `total`: either a percentage (`"10%"`)
/// or an absolute value with an optional binary suffix (`"512M"`, `"1G"`).
pub fn parse_size_threshold(value: &str, total: u64) -> Option<u64> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let amount: u64 = value[..digits_end].parse().ok()?;
    let factor: u64 = match value[digits_end..].trim_start().chars().next() {
        None => 1,
        Some('%') => return Some(total.saturating_mul(amount) / 100),
        Some('K' | 'k') => 1 << 10,
        Some('M' | 'm') => 1 << 20,
        Some('G' | 'g') => 1 << 30,
        Some('T' | 't') => 1 << 40,
        Some(_) => 1,
    };
    Some(amount.saturating_mul(factor))
}

/// Remove ANSI escape sequences and control characters (newlines included)
/// from untrusted text.
pub fn sanitize_for_terminal(input: &str) -> Cow<'_, str> {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    static CONTROL: OnceLock<Regex> = OnceLock::new();

    let ansi = ANSI.get_or_init(|| {
        Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)?|[@-Z\\-_])")
            .expect("static regex")
    });
    let control = CONTROL.get_or_init(|| {
        Regex::new(r"[\x00-\x1f\x7f\x{80}-\x{9f}]")
            .expect("static regex")
    });

    match ansi.replace_all(input, "") {
        Cow::Borrowed(text) => control.replace_all(text, ""),
        Cow::Owned(text) => Cow::Owned(control.replace_all(&text, "").into_owned()),
    }
}

/// Make untrusted text inert for a text dialect: terminal sequences are
/// stripped and the dialect's own command character is doubled.
pub fn sanitize_for_format(input: &str, format: OutputFormat) -> Cow<'_, str> {
    let clean = sanitize_for_terminal(input);
    let command = match format {
        OutputFormat::Lemonbar => '%',
        OutputFormat::Dzen2 => '^',
        _ => return clean,
    };
    if !clean.contains(command) {
        return clean;
    }
    let doubled: String = clean
        .chars()
        .flat_map(|c| std::iter::repeat(c).take(if c == command { 2 } else { 1 }))
        .collect();
    Cow::Owned(doubled)
}

/// Hours, minutes and (unless hidden) seconds of a duration: `"01:05:09"`.
pub fn format_hms(total_seconds: i64, hide_seconds: bool) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hide_seconds {
        format!("{:02}:{:02}", hours, minutes)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512, PrefixType::Binary), "512.0 B");
        assert_eq!(format_bytes(1536, PrefixType::Binary), "1.5 KiB");
        assert_eq!(format_bytes(1_500_000, PrefixType::Decimal), "1.5 MB");
        assert_eq!(format_bytes(3 << 30, PrefixType::Custom), "3.0 GB");
        assert!(format_bytes(u64::MAX, PrefixType::Binary).ends_with("TiB"));
    }

    #[test]
    fn test_format_bytes_in_unit() {
        assert_eq!(format_bytes_in_unit(3 << 30, "auto", 1), "3.0 GiB");
        assert_eq!(format_bytes_in_unit(3 << 30, "Mi", 0), "3072 MiB");
        assert_eq!(format_bytes_in_unit(3 << 30, "", 2), "3221225472.00 B");
    }

    #[test]
    fn test_parse_size_threshold() {
        assert_eq!(parse_size_threshold("10%", 1000), Some(100));
        assert_eq!(parse_size_threshold("1G", 0), Some(1 << 30));
        assert_eq!(parse_size_threshold("512 m", 0), Some(512 << 20));
        assert_eq!(parse_size_threshold("2048", 0), Some(2048));
        assert_eq!(parse_size_threshold("lots", 0), None);
    }

    #[test]
    fn test_sanitize_for_terminal() {
        assert_eq!(sanitize_for_terminal("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(sanitize_for_terminal("a\x07b\x1b]0;title\x07c"), "abc");
        assert_eq!(sanitize_for_terminal("tab\tok"), "tabok");
        assert!(matches!(sanitize_for_terminal("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_for_format() {
        assert_eq!(sanitize_for_format("50%{F-}", OutputFormat::Lemonbar), "50%%{F-}");
        assert_eq!(sanitize_for_format("^fg(red)", OutputFormat::Dzen2), "^^fg(red)");
        assert_eq!(sanitize_for_format("50%", OutputFormat::Term), "50%");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(3_909, false), "01:05:09");
        assert_eq!(format_hms(3_909, true), "01:05");
        assert_eq!(format_hms(-5, false), "00:00:00");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
