//! Collectors end to end: config section in, rendered block out, with a
//! scripted system underneath.


use std::path::PathBuf;

use barline::output::OutputFormat;
use barline::system::{
    BatteryReading, ChargingStatus, CommandOutput, DiskStats, InterfaceInfo, LoadAverage,
    MemoryInfo, VolumeInfo, WirelessInfo,
};
use test_support::{render_one, FakeSystem};

const GIB: u64 = 1 << 30;

fn load(one: f64) -> FakeSystem {
    FakeSystem {
        load: Some(LoadAverage {
            one,
            five: 0.3,
            fifteen: 0.1,
        }),
        ..Default::default()
    }
}

#[test]
fn test_time_uses_format_time() {
    let toml = r#"
        order = ["time"]
        [module.time]
        format_time = "%H:%M"
        format = "T %time"
    "#;
    let out = render_one(toml, OutputFormat::None, FakeSystem::default());
    assert_eq!(out.full_text, "T 12:34");
    assert_eq!(out.name, "time");
}

#[test]
fn test_load_below_and_above_threshold() {
    let toml = r#"
        order = ["load"]
        [module.load]
        format_above_threshold = "HIGH %1min"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, load(0.5));
    assert_eq!(out.full_text, "0.50 0.30 0.10");
    assert_eq!(out.color, None);

    let out = render_one(toml, OutputFormat::I3bar, load(6.0));
    assert_eq!(out.full_text, "HIGH 6.00");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_load_failure_renders_down_text_in_bad_color() {
    let toml = r#"order = ["load"]"#;
    let out = render_one(toml, OutputFormat::Xmobar, FakeSystem::default());
    assert_eq!(out.full_text, "<fc=#FF0000>cant read load</fc>");
}

#[test]
fn test_cpu_usage_percent_sign_follows_format() {
    let toml = r#"order = ["cpu_usage"]"#;
    let system = || FakeSystem {
        cpu: Some(42.4),
        ..Default::default()
    };
    assert_eq!(render_one(toml, OutputFormat::None, system()).full_text, "42%");
    assert_eq!(render_one(toml, OutputFormat::Lemonbar, system()).full_text, "42%%");

    let busy = FakeSystem {
        cpu: Some(91.0),
        ..Default::default()
    };
    let out = render_one(toml, OutputFormat::I3bar, busy);
    assert_eq!(out.color.as_deref(), Some("#FFFF00"));
}

#[test]
fn test_memory_default_and_critical() {
    let toml = r#"
        order = ["memory"]
        [module.memory]
        threshold_critical = "10%"
        format_degraded = "LOW %available"
    "#;
    let system = |available: u64| FakeSystem {
        memory: Some(MemoryInfo {
            total: 8 * GIB,
            free: GIB,
            available,
            buffers: 0,
            cached: 0,
            shared: 0,
        }),
        ..Default::default()
    };

    let out = render_one(toml, OutputFormat::I3bar, system(6 * GIB));
    assert_eq!(out.full_text, "2.0 GiB / 8.0 GiB");
    assert_eq!(out.color, None);

    let out = render_one(toml, OutputFormat::I3bar, system(GIB / 2));
    assert_eq!(out.full_text, "LOW 512.0 MiB");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

fn disk_system() -> FakeSystem {
    let mut system = FakeSystem::default();
    system.disks.insert(
        PathBuf::from("/"),
        DiskStats {
            block_size: 4096,
            blocks: 1000,
            blocks_free: 500,
            blocks_avail: 400,
        },
    );
    system
}

#[test]
fn test_disk_reports_instance_and_block_name() {
    let toml = r#"
        order = ["disk /"]
        [module."disk /"]
        format = "%avail (%percentage_avail)"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, disk_system());
    assert_eq!(out.full_text, "1.6 MiB (40.0%)");
    assert_eq!(out.name, "disk_info");
    assert_eq!(out.instance.as_deref(), Some("/"));
}

#[test]
fn test_disk_below_threshold_is_bad() {
    let toml = r#"
        order = ["disk /"]
        [module."disk /"]
        threshold_type = "percentage_free"
        low_threshold = 60
        format_below_threshold = "FULL %percentage_used"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, disk_system());
    assert_eq!(out.full_text, "FULL 50.0%");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_disk_not_mounted_and_broken() {
    let toml = r#"
        order = ["disk /data"]
        [module."disk /data"]
        format_not_mounted = "/data gone"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, disk_system());
    assert_eq!(out.full_text, "/data gone");
    assert_eq!(out.color, None);

    let mut system = disk_system();
    system.broken_disks.insert(PathBuf::from("/data"));
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_cpu_temperature_zone_path() {
    let toml = r#"order = ["cpu_temperature 1"]"#;
    let mut system = FakeSystem::default();
    system
        .temperatures
        .insert(PathBuf::from("/sys/class/thermal/thermal_zone1/temp"), 81.2);
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "81 C");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

fn battery_system(status: ChargingStatus) -> FakeSystem {
    let mut system = FakeSystem::default();
    system.batteries.insert(
        PathBuf::from("/sys/class/power_supply/BAT0/uevent"),
        BatteryReading {
            status,
            remaining: Some(20_000_000),
            full_design: Some(50_000_000),
            full_last: Some(40_000_000),
            present_rate: Some(10_000_000),
            percentage: None,
            seconds_remaining: None,
        },
    );
    system
}

#[test]
fn test_battery_discharging() {
    let toml = r#"
        order = ["battery 0"]
        [module."battery 0"]
        format = "%status %percentage %remaining %consumption"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, battery_system(ChargingStatus::Discharging));
    assert_eq!(out.full_text, "BAT 40.00% 02:00:00 10.00W");
    assert_eq!(out.color, None);
}

#[test]
fn test_battery_low_by_percentage() {
    let toml = r#"
        order = ["battery 0"]
        [module."battery 0"]
        threshold_type = "percentage"
        low_threshold = 50
        integer_battery_capacity = true
        format = "%status %percentage"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, battery_system(ChargingStatus::Discharging));
    assert_eq!(out.full_text, "BAT 40%");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_battery_full_trims_empty_remaining() {
    let toml = r#"order = ["battery 0"]"#;
    let out = render_one(toml, OutputFormat::None, battery_system(ChargingStatus::Full));
    assert_eq!(out.full_text, "FULL 40.00%");
}

#[test]
fn test_ethernet_states() {
    let toml = r#"order = ["ethernet eth0"]"#;

    let mut system = FakeSystem::default();
    system.interfaces.insert(
        "eth0".into(),
        InterfaceInfo {
            running: true,
            ipv4: Some("192.168.1.5".into()),
            speed_mbps: Some(1000),
        },
    );
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "E: 192.168.1.5 (1000 Mbit/s)");
    assert_eq!(out.color.as_deref(), Some("#00FF00"));

    let mut system = FakeSystem::default();
    system.interfaces.insert(
        "eth0".into(),
        InterfaceInfo {
            running: true,
            ipv4: None,
            speed_mbps: None,
        },
    );
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "E: no IP (?)");
    assert_eq!(out.color.as_deref(), Some("#FFFF00"));

    let out = render_one(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(out.full_text, "E: down");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

fn wireless_system(signal_dbm: Option<i32>, ipv4: Option<&str>) -> FakeSystem {
    let mut system = FakeSystem::default();
    system.interfaces.insert(
        "wlan0".into(),
        InterfaceInfo {
            running: true,
            ipv4: ipv4.map(str::to_string),
            speed_mbps: None,
        },
    );
    system.wireless.insert(
        "wlan0".into(),
        WirelessInfo {
            essid: Some("home".into()),
            signal_dbm,
            noise_dbm: None,
            bitrate: Some(866_700_000),
            frequency_mhz: Some(5180.0),
        },
    );
    system
}

#[test]
fn test_wireless_up() {
    let toml = r#"order = ["wireless wlan0"]"#;
    let out = render_one(toml, OutputFormat::I3bar, wireless_system(Some(-52), Some("192.168.1.5")));
    assert_eq!(out.full_text, "W: (68% at home, 866.7 Mb/s) 192.168.1.5");
    assert_eq!(out.color.as_deref(), Some("#00FF00"));
    assert_eq!(out.name, "wireless");
    assert_eq!(out.instance.as_deref(), Some("wlan0"));
}

#[test]
fn test_wireless_degraded_links() {
    let toml = r#"
        order = ["wireless wlan0"]
        [module."wireless wlan0"]
        format_up = "%quality %signal %noise %frequency %ip"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, wireless_system(Some(-80), Some("10.0.0.2")));
    assert_eq!(out.full_text, "40% -80 dBm ? 5.2 GHz 10.0.0.2");
    assert_eq!(out.color.as_deref(), Some("#FFFF00"));

    let out = render_one(toml, OutputFormat::I3bar, wireless_system(None, None));
    assert_eq!(out.full_text, "? ? ? 5.2 GHz no IP");
    assert_eq!(out.color.as_deref(), Some("#FFFF00"));

    let out = render_one(toml, OutputFormat::I3bar, wireless_system(None, Some("10.0.0.2")));
    assert_eq!(out.color.as_deref(), Some("#00FF00"));
}

#[test]
fn test_wireless_down_or_unassociated() {
    let toml = r#"order = ["wireless wlan0"]"#;
    let out = render_one(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(out.full_text, "W: down");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));

    let mut system = wireless_system(Some(-52), Some("192.168.1.5"));
    system.wireless.clear();
    let out = render_one(toml, OutputFormat::Xmobar, system);
    assert_eq!(out.full_text, "<fc=#FF0000>W: down</fc>");
}

#[test]
fn test_wireless_essid_is_escaped_under_pango() {
    let toml = r#"
        order = ["wireless wlan0"]
        [general]
        markup = "pango"
        [module."wireless wlan0"]
        format_up = "<b>%essid</b>"
    "#;
    let mut system = wireless_system(Some(-52), Some("192.168.1.5"));
    if let Some(info) = system.wireless.get_mut("wlan0") {
        info.essid = Some("<i>cafe & bar</i>".into());
    }
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "<b>&lt;i&gt;cafe &amp; bar&lt;/i&gt;</b>");
}

fn volume_system(percent: u32, muted: bool) -> FakeSystem {
    let mut system = FakeSystem::default();
    system.volumes.insert(
        "default/Master,0".into(),
        VolumeInfo {
            percent,
            muted,
            name: "Master".into(),
        },
    );
    system
}

#[test]
fn test_volume_and_mute() {
    let toml = r#"
        order = ["volume master"]
        [module."volume master"]
        format = "%devicename %volume"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, volume_system(63, false));
    assert_eq!(out.full_text, "Master 63%");
    assert_eq!(out.color, None);
    assert_eq!(out.name, "volume");

    let out = render_one(toml, OutputFormat::I3bar, volume_system(63, true));
    assert_eq!(out.full_text, "♪: muted (63%)");
    assert_eq!(out.color.as_deref(), Some("#FFFF00"));

    let out = render_one(toml, OutputFormat::Lemonbar, volume_system(40, false));
    assert_eq!(out.full_text, "Master 40%%");
}

#[test]
fn test_volume_other_control_and_failure() {
    let toml = r#"
        order = ["volume"]
        [module.volume]
        device = "hw:1"
        mixer = "PCM"
        mixer_idx = 2
    "#;
    let mut system = FakeSystem::default();
    system.volumes.insert(
        "hw:1/PCM,2".into(),
        VolumeInfo {
            percent: 100,
            muted: false,
            name: "PCM".into(),
        },
    );
    let out = render_one(toml, OutputFormat::None, system);
    assert_eq!(out.full_text, "♪: 100%");

    let out = render_one(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(out.full_text, "♪: ?");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_path_exists_and_run_watch() {
    let toml = r#"
        order = ["path_exists VPN", "run_watch DHCP"]
        [module."path_exists VPN"]
        path = "/proc/sys/net/ipv4/conf/tun0"
        [module."run_watch DHCP"]
        pidfile = "/var/run/dhclient.pid"
    "#;
    let mut system = FakeSystem::default();
    system.paths.insert(PathBuf::from("/proc/sys/net/ipv4/conf/tun0"));

    let outputs = test_support::render_cycle(toml, OutputFormat::I3bar, system);
    assert_eq!(outputs[0].full_text, "VPN: yes");
    assert_eq!(outputs[0].color.as_deref(), Some("#00FF00"));
    assert_eq!(outputs[1].full_text, "DHCP: no");
    assert_eq!(outputs[1].color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_read_file_content_and_error() {
    let toml = r#"
        order = ["read_file motd"]
        [module."read_file motd"]
        path = "/etc/motd"
        max_characters = 8
    "#;
    let mut system = FakeSystem::default();
    system
        .files
        .insert(PathBuf::from("/etc/motd"), "hello\nworld, again".into());
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "motd: hellowor");
    assert_eq!(out.color.as_deref(), Some("#00FF00"));

    let out = render_one(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(out.full_text, "motd - 2: No such file or directory");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_exec_first_line_and_failure() {
    let toml = r#"
        order = ["exec greet"]
        [module."exec greet"]
        command = "greet --short"
    "#;
    let mut system = FakeSystem::default();
    system.commands.insert(
        "greet --short".into(),
        CommandOutput {
            status: Some(0),
            stdout: "hi there\nsecond line\n".into(),
        },
    );
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "hi there");
    assert_eq!(out.color, None);

    let mut system = FakeSystem::default();
    system.commands.insert(
        "greet --short".into(),
        CommandOutput {
            status: Some(3),
            stdout: String::new(),
        },
    );
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "greet: error 3");
    assert_eq!(out.color.as_deref(), Some("#FF0000"));
}

#[test]
fn test_exec_output_is_escaped_under_pango() {
    let toml = r#"
        order = ["exec html"]
        [general]
        markup = "pango"
        [module."exec html"]
        command = "cat page"
        format = "<b>%output</b>"
    "#;
    let mut system = FakeSystem::default();
    system.commands.insert(
        "cat page".into(),
        CommandOutput {
            status: Some(0),
            stdout: "<span>&</span>".into(),
        },
    );
    let out = render_one(toml, OutputFormat::I3bar, system);
    assert_eq!(out.full_text, "<b>&lt;span&gt;&amp;&lt;/span&gt;</b>");
}

#[test]
fn test_titles_are_escaped_under_pango() {
    let toml = r#"
        order = ["static R&D <lab>", "path_exists <vpn>"]
        [general]
        markup = "pango"
        [module."path_exists <vpn>"]
        path = "/run/vpn"
    "#;
    let outputs = test_support::render_cycle(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(outputs[0].full_text, "R&amp;D &lt;lab&gt;");
    assert_eq!(outputs[1].full_text, "&lt;vpn&gt;: no");
    for out in &outputs {
        assert!(!out.full_text.contains('<'), "{:?}", out.full_text);
    }
}

#[test]
fn test_ethernet_interface_is_escaped_under_pango() {
    let toml = r#"
        order = ["ethernet e<0>"]
        [general]
        markup = "pango"
        [module."ethernet e<0>"]
        format_down = "%interface down"
    "#;
    let out = render_one(toml, OutputFormat::I3bar, FakeSystem::default());
    assert_eq!(out.full_text, "e&lt;0&gt; down");
}

#[test]
fn test_static_text() {
    let toml = r#"order = ["static hello world"]"#;
    let out = render_one(toml, OutputFormat::None, FakeSystem::default());
    assert_eq!(out.full_text, "hello world");
    assert_eq!(out.instance.as_deref(), Some("hello world"));
}
