use log::warn;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;
use crate::system::MemoryInfo;
use crate::utils::{format_bytes_in_unit, parse_size_threshold};

pub const PLACEHOLDERS: &[&str] = &[
    "total",
    "used",
    "free",
    "available",
    "shared",
    "percentage_used",
    "percentage_free",
    "percentage_available",
    "percentage_shared",
];

const DEFAULT_FORMAT: &str = "%used / %total";
const DEFAULT_UNIT: &str = "auto";
const DEFAULT_DECIMALS: i64 = 1;

/// How "used" memory is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsedMethod {
    /// total - available
    MemAvailable,
    /// total - free - buffers - cached
    Classical,
}

impl UsedMethod {
    fn from_option(value: &str) -> Self {
        if value.eq_ignore_ascii_case("classical") {
            UsedMethod::Classical
        } else {
            UsedMethod::MemAvailable
        }
    }

    fn used(&self, mem: &MemoryInfo) -> u64 {
        match self {
            UsedMethod::MemAvailable => mem.total.saturating_sub(mem.available),
            UsedMethod::Classical => mem
                .total
                .saturating_sub(mem.free)
                .saturating_sub(mem.buffers)
                .saturating_sub(mem.cached),
        }
    }
}

pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let mem = match ctx.system.memory() {
        Ok(mem) => mem,
        Err(e) => {
            warn!("Cannot read system memory: {}", e);
            return ctx.failure("cant read memory");
        }
    };

    let used = UsedMethod::from_option(ctx.option("memory_used_method", "memavailable")).used(&mem);

    // Critical wins over degraded; both compare against available memory.
    let below = |key: &str| {
        ctx.config
            .str(key)
            .and_then(|threshold| parse_size_threshold(threshold, mem.total))
            .is_some_and(|threshold| mem.available < threshold)
    };
    let color = if below("threshold_critical") {
        Some(ColorTag::Bad)
    } else if below("threshold_degraded") {
        Some(ColorTag::Degraded)
    } else {
        None
    };

    let format = ctx.option("format", DEFAULT_FORMAT);
    let template = match color {
        Some(_) => ctx.option("format_degraded", format),
        None => format,
    };

    let unit = ctx.option("unit", DEFAULT_UNIT);
    let decimals = usize::try_from(ctx.config.i64_or("decimals", DEFAULT_DECIMALS)).unwrap_or(1);
    let bytes = |value: u64| format_bytes_in_unit(value, unit, decimals);
    let percent = |value: u64| {
        let share = if mem.total == 0 {
            0.0
        } else {
            100.0 * value as f64 / mem.total as f64
        };
        ctx.percentage(share, 1)
    };

    let mut sample = Sample::new(
        template,
        vec![
            Placeholder::new("total", bytes(mem.total)),
            Placeholder::new("used", bytes(used)),
            Placeholder::new("free", bytes(mem.free)),
            Placeholder::new("available", bytes(mem.available)),
            Placeholder::new("shared", bytes(mem.shared)),
            Placeholder::new("percentage_used", percent(used)),
            Placeholder::new("percentage_free", percent(mem.free)),
            Placeholder::new("percentage_available", percent(mem.available)),
            Placeholder::new("percentage_shared", percent(mem.shared)),
        ],
    );
    sample.color = color;
    sample
}
