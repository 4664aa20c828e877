use chrono::{DateTime, Local};
use log::debug;
use std::ffi::{CStr, CString};
use std::fs::{self, File};
use std::io::{self, Read};
use std::net::Ipv4Addr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use sysinfo::System;

use super::{
    is_mount_point, parse_amixer, parse_iw_link, parse_meminfo, parse_proc_net_wireless,
    parse_uevent, BatteryReading, CommandOutput, DiskStats, InterfaceInfo, LoadAverage,
    MemoryInfo, SystemMetricsProvider, VolumeInfo, WirelessInfo,
};
use crate::error::{BarlineError, Result};

const MEMINFO_PATH: &str = "/proc/meminfo";
const MOUNTS_PATH: &str = "/proc/mounts";
const NET_CLASS_DIR: &str = "/sys/class/net";
const PROC_NET_WIRELESS: &str = "/proc/net/wireless";

/// [`SystemMetricsProvider`] reading the running Linux system.
pub struct LocalSystem {
    /// CPU counters from the previous cycle
    cpu: Mutex<System>,
}

impl Default for LocalSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSystem {
    pub fn new() -> Self {
        let mut system = System::new();
        // Baseline for the first usage sample
        system.refresh_cpu_usage();
        Self {
            cpu: Mutex::new(system),
        }
    }
}

impl SystemMetricsProvider for LocalSystem {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn load_average(&self) -> Result<LoadAverage> {
        let load = System::load_average();
        Ok(LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        })
    }

    fn cpu_usage(&self) -> Result<f64> {
        let mut system = self
            .cpu
            .lock()
            .map_err(|_| BarlineError::other("CPU counters poisoned"))?;
        system.refresh_cpu_usage();
        Ok(f64::from(system.global_cpu_usage()))
    }

    fn memory(&self) -> Result<MemoryInfo> {
        parse_meminfo(&fs::read_to_string(MEMINFO_PATH)?)
    }

    fn disk(&self, path: &Path) -> Result<Option<DiskStats>> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| BarlineError::other(format!("invalid path {}", path.display())))?;

        // SAFETY: c_path is NUL-terminated and stat is a valid out-pointer.
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        if unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) } != 0 {
            debug!("statvfs({}) failed: {}", path.display(), io::Error::last_os_error());
            return Ok(None);
        }

        let mounts = fs::read_to_string(MOUNTS_PATH)?;
        if !is_mount_point(&mounts, &path.to_string_lossy()) {
            return Ok(None);
        }

        Ok(Some(DiskStats {
            block_size: stat.f_bsize as u64,
            blocks: stat.f_blocks as u64,
            blocks_free: stat.f_bfree as u64,
            blocks_avail: stat.f_bavail as u64,
        }))
    }

    fn temperature(&self, path: &Path) -> Result<f64> {
        let raw = fs::read_to_string(path)?;
        let millidegrees: i64 = raw.trim().parse().map_err(|_| {
            BarlineError::other(format!("unexpected temperature in {}", path.display()))
        })?;
        Ok(millidegrees as f64 / 1000.0)
    }

    fn battery(&self, uevent: &Path) -> Result<BatteryReading> {
        Ok(parse_uevent(&fs::read_to_string(uevent)?))
    }

    fn interface(&self, name: &str) -> Result<InterfaceInfo> {
        let mut info = interface_addresses(name)?;
        if info.running {
            info.speed_mbps = fs::read_to_string(Path::new(NET_CLASS_DIR).join(name).join("speed"))
                .ok()
                .and_then(|speed| speed.trim().parse::<i64>().ok())
                .and_then(|speed| u32::try_from(speed).ok());
        }
        Ok(info)
    }

    fn wireless(&self, name: &str) -> Result<Option<WirelessInfo>> {
        let link = tool_output("iw", &["dev", name, "link"])?;
        let Some(mut info) = parse_iw_link(&link) else {
            return Ok(None);
        };
        // Older drivers only report levels through wireless extensions
        if let Some((signal, noise)) = fs::read_to_string(PROC_NET_WIRELESS)
            .ok()
            .and_then(|contents| parse_proc_net_wireless(&contents, name))
        {
            info.signal_dbm = info.signal_dbm.or(signal);
            info.noise_dbm = info.noise_dbm.or(noise);
        }
        Ok(Some(info))
    }

    fn volume(&self, device: &str, mixer: &str, index: u32) -> Result<VolumeInfo> {
        let control = format!("{},{}", mixer, index);
        let output = tool_output("amixer", &["-D", device, "sget", control.as_str()])?;
        parse_amixer(&output).ok_or_else(|| {
            BarlineError::other(format!("{} on {} has no playback volume", control, device))
        })
    }

    fn path_exists(&self, path: &Path) -> bool {
        // Broken symlinks count as existing
        fs::symlink_metadata(path).is_ok()
    }

    fn process_running(&self, pidfile: &Path) -> bool {
        let Ok(contents) = fs::read_to_string(pidfile) else {
            return false;
        };
        let Ok(pid) = contents.trim().parse::<libc::pid_t>() else {
            return false;
        };
        if pid <= 0 {
            return false;
        }
        // SAFETY: signal 0 only checks whether the process exists.
        if unsafe { libc::kill(pid, 0) } == 0 {
            return true;
        }
        io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }

    fn read_file(&self, path: &Path, max_bytes: usize) -> io::Result<String> {
        let mut bytes = Vec::with_capacity(max_bytes.min(64 * 1024));
        File::open(path)?
            .take(max_bytes as u64)
            .read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn run_command(&self, command: &str) -> Result<CommandOutput> {
        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Stdout of a helper tool, which must exit successfully.
fn tool_output(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    if !output.status.success() {
        return Err(BarlineError::other(format!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Running flag and first IPv4 address of `name`, from `getifaddrs`.
fn interface_addresses(name: &str) -> Result<InterfaceInfo> {
    let mut addrs: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: on success the list is released with freeifaddrs below.
    if unsafe { libc::getifaddrs(&mut addrs) } != 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut info = InterfaceInfo::default();
    let mut cursor = addrs;
    while !cursor.is_null() {
        // SAFETY: cursor points into the list returned by getifaddrs.
        let ifa = unsafe { &*cursor };
        cursor = ifa.ifa_next;

        if ifa.ifa_name.is_null() {
            continue;
        }
        // SAFETY: ifa_name is a NUL-terminated string owned by the list.
        let ifa_name = unsafe { CStr::from_ptr(ifa.ifa_name) };
        if ifa_name.to_bytes() != name.as_bytes() {
            continue;
        }

        if ifa.ifa_flags & libc::IFF_RUNNING as libc::c_uint != 0 {
            info.running = true;
        }
        if info.ipv4.is_none() && !ifa.ifa_addr.is_null() {
            // SAFETY: ifa_addr is non-null and at least a sockaddr.
            let family = i32::from(unsafe { (*ifa.ifa_addr).sa_family });
            if family == libc::AF_INET {
                // SAFETY: AF_INET addresses are sockaddr_in.
                let sin = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in) };
                info.ipv4 = Some(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)).to_string());
            }
        }
    }

    // SAFETY: addrs came from a successful getifaddrs call.
    unsafe { libc::freeifaddrs(addrs) };

    if !info.running {
        info.ipv4 = None;
    }
    Ok(info)
}
