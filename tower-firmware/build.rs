//! Build script for tower-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml at compile time
//! - Generates `config.rs` with the configuration as constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tower_core::config::{
    AppConfig, BatteryConfig, BatteryPack, BucketConfig, CountdownConfig, DashboardConfig,
    NodeConfig,
};
use tower_core::traits::AccelAlarm;

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, validate and convert node.toml
fn load_config() -> AppConfig {
    // Re-run if node.toml changes
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");

    // Check if config file exists
    if !config_path.exists() {
        fail(
            "node.toml not found!",
            &[
                "The firmware requires a node.toml configuration file.".to_string(),
                "Please create one in the tower-firmware directory.".to_string(),
            ],
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read node.toml", &[e.to_string()]),
    };

    // Parse and validate TOML syntax
    let value: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in node.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let config = AppConfig {
        node: parse_node(&value, &mut errors),
        battery: parse_battery(&value, &mut errors),
        dashboard: parse_dashboard(&value, &mut errors),
        bucket: parse_bucket(&value, &mut errors),
        countdown: parse_countdown(&value, &mut errors),
    };

    if !errors.is_empty() {
        fail("Invalid configuration in node.toml", &errors);
    }

    // Cross-field rules live with the types
    if let Err(e) = config.validate() {
        fail("Inconsistent configuration in node.toml", &[format!("{:?}", e)]);
    }

    println!("cargo:warning=node.toml validated successfully");
    config
}

/// Look up `[section]`, returning None if it is absent
fn section<'a>(
    value: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::value::Table> {
    match value.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

/// Read an integer key in `min..=max`, falling back to `default` if absent
fn integer(
    table: Option<&toml::value::Table>,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    default: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match table.and_then(|t| t.get(key)) {
        None => default,
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            default
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            default
        }
    }
}

fn string(
    table: Option<&toml::value::Table>,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match table.and_then(|t| t.get(key)) {
        None => None,
        Some(toml::Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            None
        }
    }
}

fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

fn parse_node(value: &toml::Value, errors: &mut Vec<String>) -> NodeConfig {
    let defaults = NodeConfig::default();
    let table = section(value, "node", errors);

    let name = string(table, "node", "name", errors)
        .map(leak)
        .unwrap_or(defaults.name);
    let version = string(table, "node", "version", errors)
        .unwrap_or_else(|| format!("v{}", env::var("CARGO_PKG_VERSION").unwrap()));

    NodeConfig {
        name,
        version: leak(version),
    }
}

fn parse_battery(value: &toml::Value, errors: &mut Vec<String>) -> BatteryConfig {
    let defaults = BatteryConfig::default();
    let table = section(value, "battery", errors);

    let pack = match string(table, "battery", "pack", errors).as_deref() {
        None => defaults.pack,
        Some("mini") => BatteryPack::Mini,
        Some("standard") => BatteryPack::Standard,
        Some(other) => {
            errors.push(format!(
                "[battery] pack must be 'mini' or 'standard', got '{}'",
                other
            ));
            defaults.pack
        }
    };

    let default_min = (defaults.update_interval_ms / 60_000) as i64;
    let minutes = integer(table, "battery", "update_interval_min", 1, 24 * 60, default_min, errors);

    BatteryConfig {
        pack,
        update_interval_ms: minutes as u32 * 60_000,
    }
}

fn parse_dashboard(value: &toml::Value, errors: &mut Vec<String>) -> DashboardConfig {
    let defaults = DashboardConfig::default();
    let table = section(value, "dashboard", errors);

    DashboardConfig {
        boot_pulse_ms: integer(
            table,
            "dashboard",
            "boot_pulse_ms",
            1,
            60_000,
            defaults.boot_pulse_ms as i64,
            errors,
        ) as u32,
    }
}

fn parse_bucket(value: &toml::Value, errors: &mut Vec<String>) -> BucketConfig {
    let defaults = BucketConfig::default();
    let table = section(value, "bucket", errors);

    BucketConfig {
        alarm_on_pct: integer(
            table,
            "bucket",
            "alarm_on_pct",
            1,
            100,
            defaults.alarm_on_pct as i64,
            errors,
        ) as u8,
        alarm_off_pct: integer(
            table,
            "bucket",
            "alarm_off_pct",
            0,
            99,
            defaults.alarm_off_pct as i64,
            errors,
        ) as u8,
        stale_after_ms: integer(
            table,
            "bucket",
            "stale_after_min",
            1,
            24 * 60,
            (defaults.stale_after_ms / 60_000) as i64,
            errors,
        ) as u32
            * 60_000,
    }
}

fn parse_countdown(value: &toml::Value, errors: &mut Vec<String>) -> CountdownConfig {
    let defaults = CountdownConfig::default();
    let table = section(value, "countdown", errors);
    let minutes = |key: &str, default: u8, errors: &mut Vec<String>| {
        integer(table, "countdown", key, 1, 99, default as i64, errors) as u8
    };

    let default_minutes = minutes("default_minutes", defaults.default_minutes, errors);
    let min_minutes = minutes("min_minutes", defaults.min_minutes, errors);
    let max_minutes = minutes("max_minutes", defaults.max_minutes, errors);
    let step_minutes = minutes("step_minutes", defaults.step_minutes, errors);

    let seconds = |key: &str, default_ms: u32, errors: &mut Vec<String>| {
        integer(table, "countdown", key, 1, 3600, (default_ms / 1000) as i64, errors) as u32 * 1000
    };
    let idle_timeout_ms = seconds("idle_timeout_s", defaults.idle_timeout_ms, errors);
    let alarm_timeout_ms = seconds("alarm_timeout_s", defaults.alarm_timeout_ms, errors);

    let blink_period_ms = integer(
        table,
        "countdown",
        "blink_period_ms",
        50,
        10_000,
        defaults.blink_period_ms as i64,
        errors,
    ) as u32;

    // Without a [countdown] section the default wake alarm applies; a
    // [countdown] section without wake_alarm disables it
    let wake_alarm = match table {
        None => defaults.wake_alarm,
        Some(t) => match t.get("wake_alarm") {
            None => None,
            Some(toml::Value::Table(alarm)) => {
                let fallback = AccelAlarm::default();
                Some(AccelAlarm {
                    threshold_mg: integer(
                        Some(alarm),
                        "countdown.wake_alarm",
                        "threshold_mg",
                        16,
                        2000,
                        fallback.threshold_mg as i64,
                        errors,
                    ) as u16,
                    duration_ms: integer(
                        Some(alarm),
                        "countdown.wake_alarm",
                        "duration_ms",
                        0,
                        12_700,
                        fallback.duration_ms as i64,
                        errors,
                    ) as u16,
                })
            }
            Some(_) => {
                errors.push("[countdown.wake_alarm] must be a table".to_string());
                None
            }
        },
    };

    CountdownConfig {
        default_minutes,
        min_minutes,
        max_minutes,
        step_minutes,
        idle_timeout_ms,
        alarm_timeout_ms,
        blink_period_ms,
        wake_alarm,
    }
}

/// Write the configuration as Rust constants into OUT_DIR
fn generate_config(config: &AppConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let pack = match config.battery.pack {
        BatteryPack::Mini => "BatteryPack::Mini",
        BatteryPack::Standard => "BatteryPack::Standard",
    };
    let wake_alarm = match config.countdown.wake_alarm {
        Some(a) => format!(
            "Some(AccelAlarm {{ threshold_mg: {}, duration_ms: {} }})",
            a.threshold_mg, a.duration_ms
        ),
        None => "None".to_string(),
    };

    let source = format!(
        "// Generated by build.rs from node.toml - do not edit\n\
         \n\
         pub const NODE_CONFIG: AppConfig = AppConfig {{\n\
         \x20   node: NodeConfig {{ name: {name:?}, version: {version:?} }},\n\
         \x20   battery: BatteryConfig {{ pack: {pack}, update_interval_ms: {interval} }},\n\
         \x20   dashboard: DashboardConfig {{ boot_pulse_ms: {pulse} }},\n\
         \x20   bucket: BucketConfig {{ alarm_on_pct: {on}, alarm_off_pct: {off}, stale_after_ms: {stale} }},\n\
         \x20   countdown: CountdownConfig {{\n\
         \x20       default_minutes: {default_min},\n\
         \x20       min_minutes: {min},\n\
         \x20       max_minutes: {max},\n\
         \x20       step_minutes: {step},\n\
         \x20       idle_timeout_ms: {idle},\n\
         \x20       alarm_timeout_ms: {alarm},\n\
         \x20       blink_period_ms: {blink},\n\
         \x20       wake_alarm: {wake_alarm},\n\
         \x20   }},\n\
         }};\n",
        name = config.node.name,
        version = config.node.version,
        pack = pack,
        interval = config.battery.update_interval_ms,
        pulse = config.dashboard.boot_pulse_ms,
        on = config.bucket.alarm_on_pct,
        off = config.bucket.alarm_off_pct,
        stale = config.bucket.stale_after_ms,
        default_min = config.countdown.default_minutes,
        min = config.countdown.min_minutes,
        max = config.countdown.max_minutes,
        step = config.countdown.step_minutes,
        idle = config.countdown.idle_timeout_ms,
        alarm = config.countdown.alarm_timeout_ms,
        blink = config.countdown.blink_period_ms,
        wake_alarm = wake_alarm,
    );

    fs::write(out_dir.join("config.rs"), source).unwrap();
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| format_error_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format one error line with box drawing
fn format_error_line(line: &str) -> String {
    let truncated = if line.chars().count() > 62 {
        format!("{}...", line.chars().take(59).collect::<String>())
    } else {
        line.to_string()
    };
    format!("║  • {:<62} ║", truncated)
}
