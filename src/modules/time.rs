use log::warn;
use std::fmt::Write;

use super::{Context, Sample};
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["time"];

const DEFAULT_FORMAT: &str = "%time";
const DEFAULT_FORMAT_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall clock; `format_time` is a strftime pattern.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let pattern = ctx.option("format_time", DEFAULT_FORMAT_TIME);
    let mut time = String::new();
    if write!(time, "{}", ctx.system.now().format(pattern)).is_err() {
        warn!("Invalid format_time \"{}\"", pattern);
        return ctx.failure("invalid format_time");
    }
    Sample::new(
        ctx.option("format", DEFAULT_FORMAT),
        vec![Placeholder::new("time", time)],
    )
}
