use log::warn;
use std::path::Path;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["degrees"];

const DEFAULT_FORMAT: &str = "%degrees C";
const DEFAULT_PATH: &str = "/sys/class/thermal/thermal_zone%d/temp";
const DEFAULT_MAX_THRESHOLD: f64 = 75.0;

/// Temperature of a thermal zone. The title is the zone number; `path`
/// may name any millidegree sensor file, with `%d` standing for the zone.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let zone = ctx.title.unwrap_or("0");
    let path = ctx.option("path", DEFAULT_PATH).replace("%d", zone);
    let degrees = match ctx.system.temperature(Path::new(&path)) {
        Ok(degrees) => degrees,
        Err(e) => {
            warn!("Cannot read temperature from {}: {}", path, e);
            return ctx.failure("cant read temp");
        }
    };

    let format = ctx.option("format", DEFAULT_FORMAT);
    let above = degrees >= ctx.config.f64_or("max_threshold", DEFAULT_MAX_THRESHOLD);
    let template = if above {
        ctx.option("format_above_threshold", format)
    } else {
        format
    };

    Sample::new(
        template,
        vec![Placeholder::new("degrees", format!("{:.0}", degrees))],
    )
    .with_color_if(above, ColorTag::Bad)
}
