//! Layered runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `PINGWATCH_*` environment variables, command-line overrides.
//! Nested keys use a double underscore in the environment, e.g.
//! `PINGWATCH_PROBE__PROGRAM=/usr/bin/ping`.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::warn;

use crate::data::thresholds::{Thresholds, DEFAULT_CRIT_MS, DEFAULT_WARN_MS};
use crate::source::ProbeCommand;

pub const DEFAULT_TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));
pub const DEFAULT_TICK_MS: u64 = 100;
pub const MIN_TICK_MS: u64 = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

const ENV_PREFIX: &str = "PINGWATCH";

/// Probe program and extra arguments placed before the target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Raw settings as loaded. Use the accessor methods for validated values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub warn: f64,
    pub crit: f64,
    pub target: String,
    pub tick_ms: u64,
    pub timeout_ms: u64,
    pub probe: ProbeSettings,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub warn: Option<f64>,
    pub crit: Option<f64>,
    pub target: Option<String>,
    pub tick_ms: Option<u64>,
    pub probe_program: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from every layer.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("probe.args");
        Self::load_with_env(file, env, overrides)
    }

    fn load_with_env(file: Option<&Path>, env: Environment, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("warn", DEFAULT_WARN_MS)?
            .set_default("crit", DEFAULT_CRIT_MS)?
            .set_default("target", DEFAULT_TARGET.to_string())?
            .set_default("tick_ms", DEFAULT_TICK_MS)?
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS)?
            .set_default("probe.program", "ping")?
            .set_default("probe.args", Vec::<String>::new())?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config = builder
            .add_source(env)
            .set_override_option("warn", overrides.warn)?
            .set_override_option("crit", overrides.crit)?
            .set_override_option("target", overrides.target.clone())?
            .set_override_option("tick_ms", overrides.tick_ms)?
            .set_override_option("probe.program", overrides.probe_program.clone())?
            .set_override_option(
                "log_file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Thresholds with `crit > warn > 0` enforced.
    pub fn thresholds(&self) -> Thresholds {
        let thresholds = Thresholds::new(self.warn, self.crit);
        if thresholds.warn() != self.warn || thresholds.crit() != self.crit {
            warn!(
                warn = self.warn,
                crit = self.crit,
                using_warn = thresholds.warn(),
                using_crit = thresholds.crit(),
                "corrected latency thresholds"
            );
        }
        thresholds
    }

    /// The ping target, or 8.8.8.8 when the configured one is not an address.
    pub fn target(&self) -> IpAddr {
        match self.target.trim().parse() {
            Ok(addr) => addr,
            Err(_) => {
                warn!(target = %self.target, fallback = %DEFAULT_TARGET, "invalid target address");
                DEFAULT_TARGET
            }
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_command(&self) -> ProbeCommand {
        ProbeCommand::new(self.probe.program.clone(), self.probe.args.clone())
    }
}
