/*
 *  config.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::color::vanishing_role;
use crate::mode::{default_modes, schedule::parse_hhmm, Mode};
use crate::recovery::FatalAction;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration. Every group falls back to its defaults, so a
/// YAML file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// e.g. "info" | "debug"; `debug: true` wins
    pub log_level: Option<String>,
    /// debug logging, debug label on the panel, long fatal delay
    pub debug: bool,
    /// IANA zone asked of the time service
    pub timezone: String,
    pub time_api_url: String,
    /// resync when the hour is a multiple of this
    pub ntp_update_hours: u32,
    /// loop cadence, must stay under a second
    pub tick_ms: u64,
    /// failures tolerated before a restart
    pub error_threshold: u32,
    pub fatal_action: FatalAction,
    pub modes: Vec<Mode>,
    /// start in this mode instead of the first in `modes`
    pub mode_force: Option<Mode>,
    pub schedule: Option<ScheduleConfig>,
    pub octopus: OctopusConfig,
    pub http: HttpConfig,
    pub display: DisplayConfig,
    pub buttons: Option<ButtonConfig>,
    pub control: ControlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            debug: false,
            timezone: "Europe/London".into(),
            time_api_url: "http://worldtimeapi.org/api/timezone".into(),
            ntp_update_hours: 3,
            tick_ms: 100,
            error_threshold: 10,
            fatal_action: FatalAction::Exit,
            modes: default_modes(),
            mode_force: None,
            schedule: None,
            octopus: OctopusConfig::default(),
            http: HttpConfig::default(),
            display: DisplayConfig::default(),
            buttons: None,
            control: ControlConfig::default(),
        }
    }
}

impl Config {
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OctopusConfig {
    pub api_url: String,
    pub product_code: String,
    /// derived from the product code when absent
    pub tariff_code: Option<String>,
    /// refetch when the minute is a multiple of this
    pub update_mins: u32,
    /// look-ahead window, in periods
    pub fetch_periods: usize,
    pub period_mins: u32,
    /// below this the rate shows as cheap
    pub rate_low: f64,
    /// above this the rate shows as expensive
    pub rate_high: f64,
    /// length of the cheapest run searched for, in periods
    pub cheapest_periods: usize,
    pub max_attempts: u32,
}

impl Default for OctopusConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.octopus.energy".into(),
            product_code: "AGILE-FLEX-22-11-25".into(),
            tariff_code: None,
            update_mins: 30,
            fetch_periods: 3,
            period_mins: 30,
            rate_low: 10.0,
            rate_high: 30.0,
            cheapest_periods: 2,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { connect_timeout_ms: 2000, timeout_ms: 10_000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub on: Option<String>,
    pub dark: Option<String>,
    pub off: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// bits kept per colour channel
    pub bit_depth: u8,
    pub color_order: ColorOrder,
    /// global scaling, 0.0 - 1.0
    pub brightness: f32,
    pub driver: DriverKind,
    pub shm_path: PathBuf,
    pub palette: PaletteConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            bit_depth: 3,
            color_order: ColorOrder::Rgb,
            brightness: 1.0,
            driver: DriverKind::Shm,
            shm_path: PathBuf::from("/dev/shm/agileboard.rgb"),
            palette: PaletteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// raw frames exported to a shared memory file for the panel daemon
    Shm,
    /// render only, nothing leaves the process
    Headless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorOrder {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

/// 0xRRGGBB values for each colour role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub dimmed: u32,
    pub low: u32,
    pub high: u32,
    pub label: u32,
    pub label_extreme: u32,
    pub calendar: u32,
    pub clock: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            dimmed: 0x000033,
            low: 0x003300,
            high: 0x330000,
            label: 0x333300,
            label_extreme: 0x333333,
            calendar: 0x330033,
            clock: 0x333333,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// BCM numbering
    pub down_pin: u8,
    pub up_pin: u8,
    pub debounce_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { down_pin: 23, up_pin: 24, debounce_ms: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// accept `topic payload` lines on stdin
    pub stdin: bool,
    pub topic_prefix: String,
    pub queue_depth: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { stdin: false, topic_prefix: "agileboard".into(), queue_depth: 16 }
    }
}

/// CLI overrides, layered over the YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "agileboard", version, about = "Agile tariff rates and clock on an LED matrix")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub tick_ms: Option<u64>,
    #[arg(long)]
    pub product_code: Option<String>,
    #[arg(long)]
    pub tariff_code: Option<String>,
    /// Start in this mode (on, dark, off)
    #[arg(long)]
    pub mode: Option<Mode>,
    #[arg(long, value_enum)]
    pub display_driver: Option<CliDriver>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub shm_path: Option<PathBuf>,
    /// Read control messages from stdin
    #[arg(long, action = ArgAction::SetTrue)]
    pub stdin_control: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliDriver {
    Shm,
    Headless,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = match cli.config.as_ref() {
        Some(p) if p.exists() => read_yaml(p)?,
        Some(p) => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        None => match find_config_file() {
            Some(p) => read_yaml(&p)?,
            None => Config::default(),
        },
    };

    apply_cli_overrides(&mut cfg, cli);
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/agileboard/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/agileboard.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["agileboard.yaml", "config.yaml", "config/agileboard.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is a valid "all defaults"
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                    { cfg.debug = true; }
    if cli.log_level.is_some()      { cfg.log_level = cli.log_level.clone(); }
    if let Some(tz) = &cli.timezone { cfg.timezone = tz.clone(); }
    if let Some(t) = cli.tick_ms    { cfg.tick_ms = t; }
    if let Some(p) = &cli.product_code { cfg.octopus.product_code = p.clone(); }
    if cli.tariff_code.is_some()    { cfg.octopus.tariff_code = cli.tariff_code.clone(); }
    if cli.mode.is_some()           { cfg.mode_force = cli.mode; }
    if let Some(d) = cli.display_driver {
        cfg.display.driver = match d {
            CliDriver::Shm => DriverKind::Shm,
            CliDriver::Headless => DriverKind::Headless,
        };
    }
    if let Some(p) = &cli.shm_path  { cfg.display.shm_path = p.clone(); }
    if cli.stdin_control            { cfg.control.stdin = true; }
}

fn divides_hour(v: u32) -> bool {
    v > 0 && v <= 60 && 60 % v == 0
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

/// Invariants the loop relies on.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.timezone.trim().is_empty() {
        return Err(invalid("timezone must not be empty"));
    }
    if cfg.tick_ms == 0 || cfg.tick_ms >= 1000 {
        return Err(invalid("tick_ms must be 1..=999"));
    }
    if cfg.ntp_update_hours == 0 || cfg.ntp_update_hours > 24 {
        return Err(invalid("ntp_update_hours must be 1..=24"));
    }
    if cfg.modes.is_empty() {
        return Err(invalid("modes must list at least one mode"));
    }
    if let Some(forced) = cfg.mode_force {
        if !cfg.modes.contains(&forced) {
            return Err(invalid(format!("mode_force '{}' is not in modes", forced)));
        }
    }
    if let Some(schedule) = &cfg.schedule {
        for raw in [&schedule.on, &schedule.dark, &schedule.off].into_iter().flatten() {
            parse_hhmm(raw).map_err(invalid)?;
        }
    }

    let o = &cfg.octopus;
    if !divides_hour(o.update_mins) {
        return Err(invalid("octopus.update_mins must divide 60"));
    }
    if !divides_hour(o.period_mins) {
        return Err(invalid("octopus.period_mins must divide 60"));
    }
    if o.fetch_periods == 0 {
        return Err(invalid("octopus.fetch_periods must be > 0"));
    }
    if o.cheapest_periods == 0 {
        return Err(invalid("octopus.cheapest_periods must be > 0"));
    }
    if o.max_attempts == 0 {
        return Err(invalid("octopus.max_attempts must be > 0"));
    }
    if o.rate_low > o.rate_high {
        return Err(invalid("octopus.rate_low must not exceed rate_high"));
    }
    if o.product_code.trim().is_empty() {
        return Err(invalid("octopus.product_code must not be empty"));
    }

    let d = &cfg.display;
    if d.width == 0 || d.height == 0 {
        return Err(invalid("display width/height must be > 0"));
    }
    if d.bit_depth == 0 || d.bit_depth > 8 {
        return Err(invalid("display bit_depth must be 1..=8"));
    }
    if !(0.0..=1.0).contains(&d.brightness) {
        return Err(invalid("display brightness must be 0.0..=1.0"));
    }
    if let Some(role) = vanishing_role(&d.palette, d.brightness, d.bit_depth) {
        return Err(invalid(format!(
            "palette.{} is black at brightness {} and bit_depth {}",
            role, d.brightness, d.bit_depth
        )));
    }

    if cfg.control.queue_depth == 0 {
        return Err(invalid("control.queue_depth must be > 0"));
    }
    Ok(())
}
