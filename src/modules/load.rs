use log::warn;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["1min", "5min", "15min"];

const DEFAULT_FORMAT: &str = "%1min %5min %15min";
const DEFAULT_MAX_THRESHOLD: f64 = 5.0;

pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let load = match ctx.system.load_average() {
        Ok(load) => load,
        Err(e) => {
            warn!("Cannot read system load: {}", e);
            return ctx.failure("cant read load");
        }
    };

    let format = ctx.option("format", DEFAULT_FORMAT);
    let above = load.one >= ctx.config.f64_or("max_threshold", DEFAULT_MAX_THRESHOLD);
    let template = if above {
        ctx.option("format_above_threshold", format)
    } else {
        format
    };

    Sample::new(
        template,
        vec![
            Placeholder::new("1min", format!("{:.2}", load.one)),
            Placeholder::new("5min", format!("{:.2}", load.five)),
            Placeholder::new("15min", format!("{:.2}", load.fifteen)),
        ],
    )
    .with_color_if(above, ColorTag::Bad)
}
