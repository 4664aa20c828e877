use log::{debug, warn};

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &[
    "quality",
    "signal",
    "noise",
    "essid",
    "frequency",
    "ip",
    "bitrate",
];

const DEFAULT_FORMAT_UP: &str = "W: (%quality at %essid, %bitrate) %ip";
const DEFAULT_FORMAT_DOWN: &str = "W: down";
const NO_IP: &str = "no IP";
const UNKNOWN: &str = "?";

/// Links below this quality are degraded.
const QUALITY_AVERAGE: u32 = 50;

/// `866.7 Mb/s`, `54 Mb/s`, `1.2 Gb/s`.
pub fn format_bitrate(bits: Option<u64>) -> String {
    let Some(bits) = bits else {
        return UNKNOWN.to_string();
    };
    let (divisor, scale) = match bits {
        b if b >= 1_000_000_000 => (1e9, 'G'),
        b if b >= 1_000_000 => (1e6, 'M'),
        _ => (1e3, 'k'),
    };
    let value = (bits as f64 / divisor * 10.0).round() / 10.0;
    format!("{} {}b/s", value, scale)
}

fn format_level(dbm: Option<i32>) -> String {
    dbm.map(|dbm| format!("{} dBm", dbm))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Down or unassociated links are bad. Up links are degraded when the
/// quality is poor or, without a quality figure, when there is no address.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let interface = ctx.title();
    let link = match ctx.system.interface(interface) {
        Ok(link) => link,
        Err(e) => {
            warn!("Cannot query interface {}: {}", interface, e);
            return ctx.failure(DEFAULT_FORMAT_DOWN);
        }
    };
    if !link.running {
        return ctx.failure(DEFAULT_FORMAT_DOWN);
    }
    let info = match ctx.system.wireless(interface) {
        Ok(Some(info)) => info,
        Ok(None) => return ctx.failure(DEFAULT_FORMAT_DOWN),
        Err(e) => {
            debug!("No wireless details for {}: {}", interface, e);
            return ctx.failure(DEFAULT_FORMAT_DOWN);
        }
    };

    let quality = info.quality();
    let color = match quality {
        Some(quality) if quality < QUALITY_AVERAGE => ColorTag::Degraded,
        Some(_) => ColorTag::Good,
        None if link.ipv4.is_none() => ColorTag::Degraded,
        None => ColorTag::Good,
    };

    let essid = match info.essid {
        Some(essid) => Placeholder::untrusted("essid", essid),
        None => Placeholder::new("essid", UNKNOWN),
    };
    Sample::new(
        ctx.option("format_up", DEFAULT_FORMAT_UP),
        vec![
            Placeholder::new(
                "quality",
                quality
                    .map(|q| format!("{}{}", q, ctx.percent))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            ),
            Placeholder::new("signal", format_level(info.signal_dbm)),
            Placeholder::new("noise", format_level(info.noise_dbm)),
            essid,
            Placeholder::new(
                "frequency",
                info.frequency_mhz
                    .map(|mhz| format!("{:.1} GHz", mhz / 1000.0))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            ),
            Placeholder::new("ip", link.ipv4.unwrap_or_else(|| NO_IP.to_string())),
            Placeholder::new("bitrate", format_bitrate(info.bitrate)),
        ],
    )
    .with_color(color)
}
