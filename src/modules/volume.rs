use log::debug;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["volume", "devicename"];

const DEFAULT_FORMAT: &str = "♪: %volume";
const DEFAULT_FORMAT_MUTED: &str = "♪: muted (%volume)";
const DEFAULT_FORMAT_DOWN: &str = "♪: ?";
const DEFAULT_DEVICE: &str = "default";
const DEFAULT_MIXER: &str = "Master";

/// Muted controls are degraded and use `format_muted`.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let device = ctx.option("device", DEFAULT_DEVICE);
    let mixer = ctx.option("mixer", DEFAULT_MIXER);
    let index = u32::try_from(ctx.config.i64_or("mixer_idx", 0)).unwrap_or(0);

    let volume = match ctx.system.volume(device, mixer, index) {
        Ok(volume) => volume,
        Err(e) => {
            debug!("Cannot read volume of {} on {}: {}", mixer, device, e);
            return ctx.failure(DEFAULT_FORMAT_DOWN);
        }
    };

    let format = if volume.muted {
        ctx.option("format_muted", DEFAULT_FORMAT_MUTED)
    } else {
        ctx.option("format", DEFAULT_FORMAT)
    };
    Sample::new(
        format,
        vec![
            Placeholder::new("volume", format!("{}{}", volume.percent, ctx.percent)),
            Placeholder::untrusted("devicename", volume.name),
        ],
    )
    .with_color_if(volume.muted, ColorTag::Degraded)
}
