use log::warn;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["usage"];

const DEFAULT_FORMAT: &str = "%usage";
const DEFAULT_MAX_THRESHOLD: f64 = 95.0;
const DEFAULT_DEGRADED_THRESHOLD: f64 = 90.0;

pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let usage = match ctx.system.cpu_usage() {
        Ok(usage) => usage,
        Err(e) => {
            warn!("Cannot read CPU usage: {}", e);
            return ctx.failure("cant read cpu usage");
        }
    };

    let format = ctx.option("format", DEFAULT_FORMAT);
    let (template, color) = if usage >= ctx.config.f64_or("max_threshold", DEFAULT_MAX_THRESHOLD) {
        (
            ctx.option("format_above_threshold", format),
            Some(ColorTag::Bad),
        )
    } else if usage >= ctx.config.f64_or("degraded_threshold", DEFAULT_DEGRADED_THRESHOLD) {
        (
            ctx.option("format_above_degraded_threshold", format),
            Some(ColorTag::Degraded),
        )
    } else {
        (format, None)
    };

    let mut sample = Sample::new(
        template,
        vec![Placeholder::new(
            "usage",
            format!("{:02}{}", usage.round() as i64, ctx.percent),
        )],
    );
    sample.color = color;
    sample
}
