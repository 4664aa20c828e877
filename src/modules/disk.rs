use log::warn;
use std::path::Path;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;
use crate::system::DiskStats;
use crate::utils::{format_bytes, PrefixType};

pub const PLACEHOLDERS: &[&str] = &[
    "total",
    "used",
    "free",
    "avail",
    "percentage_used",
    "percentage_free",
    "percentage_avail",
    "percentage_used_of_avail",
];

const DEFAULT_FORMAT: &str = "%free";
const DEFAULT_THRESHOLD_TYPE: &str = "percentage_avail";

/// Whether the remaining space is below `low_threshold`, measured the way
/// `threshold_type` says: `percentage_free`, `percentage_avail`,
/// `bytes_free`, `bytes_avail`, or the byte variants with a unit prefix
/// (`Gbytes_avail`).
pub fn below_threshold(
    stats: &DiskStats,
    prefix: PrefixType,
    threshold_type: &str,
    low_threshold: f64,
) -> bool {
    let lower = threshold_type.to_ascii_lowercase();
    match lower.as_str() {
        "percentage_free" => stats.percent_of_blocks(stats.blocks_free) < low_threshold,
        "percentage_avail" => stats.percent_of_blocks(stats.blocks_avail) < low_threshold,
        "bytes_free" => (stats.free() as f64) < low_threshold,
        "bytes_avail" => (stats.avail() as f64) < low_threshold,
        _ => {
            let mut chars = lower.chars();
            let exponent = match chars.next() {
                Some('k') => 1,
                Some('m') => 2,
                Some('g') => 3,
                Some('t') => 4,
                _ => return false,
            };
            let limit = low_threshold * prefix.base().powi(exponent);
            match chars.as_str() {
                "bytes_free" => (stats.free() as f64) < limit,
                "bytes_avail" => (stats.avail() as f64) < limit,
                _ => false,
            }
        }
    }
}

pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let path = ctx.title();
    let stats = match ctx.system.disk(Path::new(path)) {
        Ok(Some(stats)) => stats,
        Ok(None) => {
            return Sample::new(ctx.option("format_not_mounted", ""), Vec::new());
        }
        Err(e) => {
            warn!("Cannot read disk {}: {}", path, e);
            return ctx.failure("cant read disk");
        }
    };

    let prefix = PrefixType::from_option(ctx.option("prefix_type", "binary"));
    let low_threshold = ctx.config.f64_or("low_threshold", 0.0);
    let below = low_threshold > 0.0
        && below_threshold(
            &stats,
            prefix,
            ctx.option("threshold_type", DEFAULT_THRESHOLD_TYPE),
            low_threshold,
        );

    let format = ctx.option("format", DEFAULT_FORMAT);
    let template = if below {
        ctx.option("format_below_threshold", format)
    } else {
        format
    };

    let percent = |blocks: u64| ctx.percentage(stats.percent_of_blocks(blocks), 1);
    Sample::new(
        template,
        vec![
            Placeholder::new("total", format_bytes(stats.total(), prefix)),
            Placeholder::new("used", format_bytes(stats.used(), prefix)),
            Placeholder::new("free", format_bytes(stats.free(), prefix)),
            Placeholder::new("avail", format_bytes(stats.avail(), prefix)),
            Placeholder::new(
                "percentage_used",
                percent(stats.blocks.saturating_sub(stats.blocks_free)),
            ),
            Placeholder::new("percentage_free", percent(stats.blocks_free)),
            Placeholder::new("percentage_avail", percent(stats.blocks_avail)),
            Placeholder::new(
                "percentage_used_of_avail",
                percent(stats.blocks.saturating_sub(stats.blocks_avail)),
            ),
        ],
    )
    .with_color_if(below, ColorTag::Bad)
}
