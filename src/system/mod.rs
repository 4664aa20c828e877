//! Access to the local system.
//!
//! Collectors never touch the OS directly; they go through
//! [`SystemMetricsProvider`], which returns plain snapshots. [`LocalSystem`]
//! is the implementation for Linux. Tests substitute a scripted provider.
//!
//! The parsers for the kernel's text formats (`/proc/meminfo`,
//! `/proc/mounts`, power supply `uevent` files) are pure functions kept here
//! so they can be tested without the files.

mod local;

pub use local::LocalSystem;

use chrono::{DateTime, Local};
use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{BarlineError, Result};

/// System load averages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Memory figures in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shared: u64,
}

/// Result of `statvfs` for a mounted filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskStats {
    pub block_size: u64,
    pub blocks: u64,
    pub blocks_free: u64,
    /// Free blocks available to unprivileged users
    pub blocks_avail: u64,
}

impl DiskStats {
    pub fn total(&self) -> u64 {
        self.block_size.saturating_mul(self.blocks)
    }

    pub fn free(&self) -> u64 {
        self.block_size.saturating_mul(self.blocks_free)
    }

    pub fn avail(&self) -> u64 {
        self.block_size.saturating_mul(self.blocks_avail)
    }

    pub fn used(&self) -> u64 {
        self.block_size
            .saturating_mul(self.blocks.saturating_sub(self.blocks_free))
    }

    /// Percentage of blocks, 0 for an empty filesystem.
    pub fn percent_of_blocks(&self, blocks: u64) -> f64 {
        if self.blocks == 0 {
            0.0
        } else {
            100.0 * blocks as f64 / self.blocks as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargingStatus {
    Charging,
    Discharging,
    Full,
    /// Plugged in but not charging
    Idle,
    #[default]
    Unknown,
}

/// Raw battery reading. Energies are in µWh and rates in µW; charge-based
/// batteries are converted through the reported voltage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatteryReading {
    pub status: ChargingStatus,
    pub remaining: Option<i64>,
    pub full_design: Option<i64>,
    pub full_last: Option<i64>,
    pub present_rate: Option<i64>,
    /// Percentage reported by the driver when it has no energy figures
    pub percentage: Option<f64>,
    pub seconds_remaining: Option<i64>,
}

/// State of a network interface
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceInfo {
    /// The interface exists and its link is running
    pub running: bool,
    pub ipv4: Option<String>,
    pub speed_mbps: Option<u32>,
}

/// Link details of an associated wireless interface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WirelessInfo {
    pub essid: Option<String>,
    /// Signal level in dBm
    pub signal_dbm: Option<i32>,
    /// Noise level in dBm
    pub noise_dbm: Option<i32>,
    /// Receive bitrate in bit/s
    pub bitrate: Option<u64>,
    pub frequency_mhz: Option<f64>,
}

impl WirelessInfo {
    /// Link quality in percent, derived from the signal level.
    pub fn quality(&self) -> Option<u32> {
        self.signal_dbm.map(signal_quality)
    }
}

/// Map a signal level onto 30..=100 percent between the noise floor
/// (-90 dBm) and a strong signal (-20 dBm).
pub fn signal_quality(dbm: i32) -> u32 {
    const NOISE_FLOOR: f64 = -90.0;
    const SIGNAL_MAX: f64 = -20.0;
    let dbm = f64::from(dbm).clamp(NOISE_FLOOR, SIGNAL_MAX);
    (100.0 - 70.0 * ((SIGNAL_MAX - dbm) / (SIGNAL_MAX - NOISE_FLOOR))).round() as u32
}

/// Playback volume of a mixer control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub percent: u32,
    pub muted: bool,
    /// Name of the control as reported by the mixer
    pub name: String,
}

/// Output of a shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Everything collectors need from the operating system.
///
/// Implementations own any state kept between cycles (CPU counters).
pub trait SystemMetricsProvider {
    fn now(&self) -> DateTime<Local>;

    fn load_average(&self) -> Result<LoadAverage>;

    /// Busy percentage of all CPUs since the previous call.
    fn cpu_usage(&self) -> Result<f64>;

    fn memory(&self) -> Result<MemoryInfo>;

    /// Filesystem statistics, `None` when nothing is mounted at `path`.
    fn disk(&self, path: &Path) -> Result<Option<DiskStats>>;

    /// Degrees Celsius read from a thermal sensor file.
    fn temperature(&self, path: &Path) -> Result<f64>;

    fn battery(&self, uevent: &Path) -> Result<BatteryReading>;

    fn interface(&self, name: &str) -> Result<InterfaceInfo>;

    /// Link details of a wireless interface, `None` when it is not
    /// associated with a network.
    fn wireless(&self, name: &str) -> Result<Option<WirelessInfo>>;

    /// Playback volume of control `mixer`,`index` on the ALSA `device`.
    fn volume(&self, device: &str, mixer: &str, index: u32) -> Result<VolumeInfo>;

    fn path_exists(&self, path: &Path) -> bool;

    /// Whether the process named in `pidfile` is alive.
    fn process_running(&self, pidfile: &Path) -> bool;

    /// At most `max_bytes` bytes of a file, lossily decoded.
    fn read_file(&self, path: &Path, max_bytes: usize) -> io::Result<String>;

    fn run_command(&self, command: &str) -> Result<CommandOutput>;
}

/// Parse `/proc/meminfo`. All six fields used by the memory module must be
/// present.
pub fn parse_meminfo(contents: &str) -> Result<MemoryInfo> {
    let mut total = None;
    let mut free = None;
    let mut available = None;
    let mut buffers = None;
    let mut cached = None;
    let mut shared = None;

    for line in contents.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "MemAvailable" => &mut available,
            "Buffers" => &mut buffers,
            "Cached" => &mut cached,
            "Shmem" => &mut shared,
            _ => continue,
        };
        // Values are in KiB
        *slot = rest
            .split_whitespace()
            .next()
            .and_then(|kib| kib.parse::<u64>().ok())
            .map(|kib| kib.saturating_mul(1024));
    }

    let missing = || BarlineError::other("incomplete /proc/meminfo");
    Ok(MemoryInfo {
        total: total.ok_or_else(missing)?,
        free: free.ok_or_else(missing)?,
        available: available.ok_or_else(missing)?,
        buffers: buffers.ok_or_else(missing)?,
        cached: cached.ok_or_else(missing)?,
        shared: shared.ok_or_else(missing)?,
    })
}

/// Whether `/proc/mounts` lists a filesystem mounted exactly at `path`.
pub fn is_mount_point(mounts: &str, path: &str) -> bool {
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|dir| unescape_mount_dir(dir) == path)
}

/// Undo the octal escapes (`\040` for space) the kernel uses in mount paths.
fn unescape_mount_dir(dir: &str) -> String {
    let bytes = dir.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let code = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 8).ok());
            if let Some(code) = code {
                out.push(code);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a power supply `uevent` file.
pub fn parse_uevent(contents: &str) -> BatteryReading {
    let mut reading = BatteryReading::default();
    let mut watt_as_unit = false;
    let mut voltage: Option<i64> = None;
    let mut capacity: Option<f64> = None;

    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let number = || value.trim().parse::<i64>().ok().and_then(i64::checked_abs);
        match key {
            "POWER_SUPPLY_ENERGY_NOW" => {
                watt_as_unit = true;
                reading.remaining = number();
            }
            "POWER_SUPPLY_CHARGE_NOW" => {
                watt_as_unit = false;
                reading.remaining = number();
            }
            "POWER_SUPPLY_CAPACITY" => capacity = number().map(|c| c as f64),
            "POWER_SUPPLY_CURRENT_NOW" | "POWER_SUPPLY_POWER_NOW" => {
                reading.present_rate = number()
            }
            "POWER_SUPPLY_VOLTAGE_NOW" => voltage = number(),
            "POWER_SUPPLY_TIME_TO_EMPTY_NOW" => {
                reading.seconds_remaining = number().and_then(|minutes| minutes.checked_mul(60))
            }
            "POWER_SUPPLY_STATUS" => {
                reading.status = match value.trim() {
                    "Charging" => ChargingStatus::Charging,
                    "Discharging" => ChargingStatus::Discharging,
                    "Full" => ChargingStatus::Full,
                    "Not charging" => ChargingStatus::Idle,
                    _ => ChargingStatus::Unknown,
                }
            }
            "POWER_SUPPLY_CHARGE_FULL_DESIGN" | "POWER_SUPPLY_ENERGY_FULL_DESIGN" => {
                reading.full_design = number()
            }
            "POWER_SUPPLY_CHARGE_FULL" | "POWER_SUPPLY_ENERGY_FULL" => {
                reading.full_last = number()
            }
            _ => {}
        }
    }

    // The driver's own percentage is only used without energy figures.
    if reading.remaining.is_none() {
        reading.percentage = capacity;
    }

    // µAh * V -> µWh
    if let (false, Some(voltage)) = (watt_as_unit, voltage) {
        let to_watts = |value: i64| (voltage as f64 / 1000.0 * value as f64 / 1000.0) as i64;
        reading.present_rate = reading.present_rate.map(to_watts);
        reading.remaining = reading.remaining.map(to_watts);
        reading.full_design = reading.full_design.map(to_watts);
        reading.full_last = reading.full_last.map(to_watts);
    }

    reading
}

/// Parse the output of `iw dev <interface> link`. `None` when the
/// interface is not connected.
pub fn parse_iw_link(output: &str) -> Option<WirelessInfo> {
    let mut lines = output.lines();
    if !lines.next()?.trim_start().starts_with("Connected to") {
        return None;
    }

    let mut info = WirelessInfo::default();
    for line in lines {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        let first = value.split_whitespace().next();
        match key {
            // Keep the SSID's own surrounding spaces
            "SSID" => {
                let raw = line.trim_start().strip_prefix("SSID: ").unwrap_or(value);
                info.essid = Some(raw.to_string());
            }
            "freq" => info.frequency_mhz = first.and_then(|f| f.parse().ok()),
            "signal" => info.signal_dbm = first.and_then(|s| s.parse().ok()),
            "rx bitrate" => info.bitrate = first.and_then(parse_mbit).or(info.bitrate),
            "tx bitrate" if info.bitrate.is_none() => info.bitrate = first.and_then(parse_mbit),
            _ => {}
        }
    }
    Some(info)
}

/// `866.7` (MBit/s) -> bit/s
fn parse_mbit(value: &str) -> Option<u64> {
    let mbit: f64 = value.parse().ok()?;
    (mbit.is_finite() && mbit >= 0.0).then(|| (mbit * 1e6).round() as u64)
}

/// Signal and noise levels of `interface` from `/proc/net/wireless`.
/// Levels the driver does not report (-256 dBm) are `None`.
pub fn parse_proc_net_wireless(
    contents: &str,
    interface: &str,
) -> Option<(Option<i32>, Option<i32>)> {
    let line = contents.lines().skip(2).find(|line| {
        line.trim_start()
            .split_once(':')
            .is_some_and(|(name, _)| name == interface)
    })?;
    let (_, fields) = line.split_once(':')?;
    let level = |field: Option<&str>| {
        field
            .and_then(|f| f.trim_end_matches('.').parse::<i32>().ok())
            .filter(|dbm| *dbm > -256 && *dbm < 0)
    };
    // status, link quality, signal level, noise level
    let mut fields = fields.split_whitespace().skip(2);
    let signal = level(fields.next());
    let noise = level(fields.next());
    Some((signal, noise))
}

/// Parse the output of `amixer sget <control>`. The volume is the mean of
/// all channels; the control is muted when its first channel is switched off.
pub fn parse_amixer(output: &str) -> Option<VolumeInfo> {
    static PERCENT: OnceLock<Regex> = OnceLock::new();
    static SWITCH: OnceLock<Regex> = OnceLock::new();
    let percent = PERCENT.get_or_init(|| Regex::new(r"\[(\d+)%\]").expect("static regex"));
    let switch = SWITCH.get_or_init(|| Regex::new(r"\[(on|off)\]").expect("static regex"));

    let name = output
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Simple mixer control '"))
        .and_then(|rest| rest.rsplit_once('\''))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default();

    let mut levels = Vec::new();
    let mut muted = None;
    for line in output.lines() {
        let Some(level) = percent
            .captures(line)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        else {
            continue;
        };
        levels.push(level);
        if muted.is_none() {
            muted = switch.captures(line).map(|caps| &caps[1] == "off");
        }
    }
    if levels.is_empty() {
        return None;
    }

    let mean = levels.iter().sum::<u64>() as f64 / levels.len() as f64;
    Some(VolumeInfo {
        percent: mean.round() as u32,
        muted: muted.unwrap_or(false),
        name,
    })
}
