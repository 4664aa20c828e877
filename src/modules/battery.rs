use chrono::{DateTime, Duration, Local};
use log::debug;
use std::path::Path;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;
use crate::system::{BatteryReading, ChargingStatus};
use crate::utils::format_hms;

pub const PLACEHOLDERS: &[&str] = &["status", "percentage", "remaining", "emptytime", "consumption"];

const DEFAULT_FORMAT: &str = "%status %percentage %remaining";
const DEFAULT_FORMAT_DOWN: &str = "No battery";
const DEFAULT_PATH: &str = "/sys/class/power_supply/BAT%d/uevent";
const DEFAULT_LOW_THRESHOLD: f64 = 30.0;
const DEFAULT_THRESHOLD_TYPE: &str = "time";

/// What the bar shows about a battery, derived from a raw reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    pub status: ChargingStatus,
    pub percentage: f64,
    pub seconds_remaining: Option<i64>,
    /// Present rate in µW
    pub consumption: Option<i64>,
}

impl BatteryState {
    /// Derive percentage and time estimates. `None` when the reading has
    /// neither capacity figures nor a reported percentage.
    ///
    /// The design capacity is the reference for "full" unless it is
    /// missing or `last_full_capacity` asks for the last full charge.
    pub fn from_reading(reading: &BatteryReading, last_full_capacity: bool) -> Option<Self> {
        let positive = |value: Option<i64>| value.filter(|v| *v > 0);
        let full = match (positive(reading.full_design), positive(reading.full_last)) {
            (_, Some(last)) if last_full_capacity => Some(last),
            (Some(design), _) => Some(design),
            (None, last) => last,
        };

        let percentage = match (reading.percentage, reading.remaining, full) {
            (Some(percentage), _, _) => percentage,
            (None, Some(remaining), Some(full)) => {
                let percentage = remaining as f64 / full as f64 * 100.0;
                if last_full_capacity {
                    percentage.min(100.0)
                } else {
                    percentage
                }
            }
            _ => return None,
        };

        // Readings come straight from sysfs; an estimate that overflows is no estimate.
        let rate = positive(reading.present_rate);
        let seconds_remaining = reading.seconds_remaining.or_else(|| {
            let rate = rate?;
            let remaining = reading.remaining.unwrap_or(0);
            let energy = match reading.status {
                ChargingStatus::Full => return None,
                ChargingStatus::Charging => full.unwrap_or(0).checked_sub(remaining)?,
                ChargingStatus::Discharging => remaining,
                _ => return Some(0),
            };
            energy.checked_mul(3600).map(|e| e / rate)
        });

        Some(BatteryState {
            status: reading.status,
            percentage,
            seconds_remaining: seconds_remaining.filter(|s| *s >= 0),
            consumption: reading.present_rate.filter(|r| *r >= 0),
        })
    }

    /// Only a discharging battery can be low.
    pub fn is_low(&self, threshold_type: &str, low_threshold: f64) -> bool {
        if self.status != ChargingStatus::Discharging || low_threshold <= 0.0 {
            return false;
        }
        if threshold_type.eq_ignore_ascii_case("percentage") {
            self.percentage < low_threshold
        } else if threshold_type.eq_ignore_ascii_case("time") {
            self.seconds_remaining
                .is_some_and(|seconds| (seconds as f64) < 60.0 * low_threshold)
        } else {
            false
        }
    }
}

fn empty_time(now: DateTime<Local>, seconds: i64, hide_seconds: bool) -> String {
    let Some(empty) = Duration::try_seconds(seconds).and_then(|d| now.checked_add_signed(d)) else {
        return String::new();
    };
    if hide_seconds {
        empty.format("%H:%M").to_string()
    } else {
        empty.format("%H:%M:%S").to_string()
    }
}

pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let number = ctx.title.unwrap_or("0");
    let path = ctx.option("path", DEFAULT_PATH).replace("%d", number);
    let reading = match ctx.system.battery(Path::new(&path)) {
        Ok(reading) => reading,
        Err(e) => {
            debug!("Cannot read battery {}: {}", path, e);
            return ctx.failure(DEFAULT_FORMAT_DOWN);
        }
    };
    let Some(state) = BatteryState::from_reading(&reading, ctx.config.bool_or("last_full_capacity", false))
    else {
        return ctx.failure(DEFAULT_FORMAT_DOWN);
    };

    let low = state.is_low(
        ctx.option("threshold_type", DEFAULT_THRESHOLD_TYPE),
        ctx.config.f64_or("low_threshold", DEFAULT_LOW_THRESHOLD),
    );
    let hide_seconds = ctx.config.bool_or("hide_seconds", false);
    let decimals = if ctx.config.bool_or("integer_battery_capacity", false) {
        0
    } else {
        2
    };

    let status = match state.status {
        ChargingStatus::Charging => ctx.option("status_chr", "CHR"),
        ChargingStatus::Discharging => ctx.option("status_bat", "BAT"),
        ChargingStatus::Full => ctx.option("status_full", "FULL"),
        ChargingStatus::Idle => ctx.option("status_idle", "IDLE"),
        ChargingStatus::Unknown => ctx.option("status_unk", "UNK"),
    };
    let remaining = state
        .seconds_remaining
        .map(|seconds| format_hms(seconds, hide_seconds))
        .unwrap_or_default();
    let emptytime = state
        .seconds_remaining
        .map(|seconds| empty_time(ctx.system.now(), seconds, hide_seconds))
        .unwrap_or_default();
    let consumption = state
        .consumption
        .map(|rate| format!("{:.2}W", rate as f64 / 1e6))
        .unwrap_or_default();

    Sample::new(
        ctx.option("format", DEFAULT_FORMAT),
        vec![
            Placeholder::new("status", status),
            Placeholder::new("percentage", ctx.percentage(state.percentage, decimals)),
            Placeholder::new("remaining", remaining),
            Placeholder::new("emptytime", emptytime),
            Placeholder::new("consumption", consumption),
        ],
    )
    .with_color_if(low, ColorTag::Bad)
    .trimmed()
}
