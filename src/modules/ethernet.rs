use log::warn;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["ip", "speed", "interface"];

const DEFAULT_FORMAT_UP: &str = "E: %ip (%speed)";
const DEFAULT_FORMAT_DOWN: &str = "E: down";
const NO_IP: &str = "no IP";

/// Link speed as people say it: `100 Mbit/s`, `2.5 Gbit/s`, `10 Gbit/s`.
pub fn format_speed(mbps: Option<u32>) -> String {
    match mbps {
        None => "?".to_string(),
        Some(2500) => "2.5 Gbit/s".to_string(),
        Some(mbps) if mbps > 1000 => format!("{} Gbit/s", mbps / 1000),
        Some(mbps) => format!("{} Mbit/s", mbps),
    }
}

/// Down links are bad, links without an address degraded.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let interface = ctx.title();
    let info = match ctx.system.interface(interface) {
        Ok(info) => info,
        Err(e) => {
            warn!("Cannot query interface {}: {}", interface, e);
            return ctx.failure(DEFAULT_FORMAT_DOWN);
        }
    };

    let interface_placeholder = Placeholder::untrusted("interface", interface);
    if !info.running {
        return Sample::new(
            ctx.option("format_down", DEFAULT_FORMAT_DOWN),
            vec![interface_placeholder],
        )
        .with_color(ColorTag::Bad);
    }

    let color = if info.ipv4.is_some() {
        ColorTag::Good
    } else {
        ColorTag::Degraded
    };
    Sample::new(
        ctx.option("format_up", DEFAULT_FORMAT_UP),
        vec![
            Placeholder::new("ip", info.ipv4.unwrap_or_else(|| NO_IP.to_string())),
            Placeholder::new("speed", format_speed(info.speed_mbps)),
            interface_placeholder,
        ],
    )
    .with_color(color)
}
