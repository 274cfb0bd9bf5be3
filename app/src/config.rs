use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::*;
use serde::{Deserialize, Serialize};

use infra::persistence::JsonFiles;

pub const DEFAULT_CURRENCY: &str = "BDT";
const ENV_PREFIX: &str = "RUSTAURANT_";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub store: StoreConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Settings that can be overridden from the environment, e.g.
/// `RUSTAURANT_DATA_DIR=/var/lib/rr`.
#[derive(Deserialize, Debug, Default)]
struct EnvOverrides {
    data_dir: Option<PathBuf>,
    currency: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EnvLogger {
    level: Option<LogLevel>,
    modules: HashMap<String, LogLevel>,
    timestamp_nanos: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            currency: DEFAULT_CURRENCY.to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Reads the TOML file if one is given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<(Self, EnvLogger)> {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct File {
            #[serde(flatten)]
            rustaurant: Config,
            env_logger: EnvLogger,
        }

        let file: File = match path {
            Some(path) => {
                let buf = fs::read_to_string(path)
                    .with_context(|| format!("read config {:?}", path))?;
                toml::from_str(&buf).with_context(|| format!("parse config {:?}", path))?
            }
            None => File::default(),
        };
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_env::<EnvOverrides>()
            .context("read environment overrides")?;

        let mut config = file.rustaurant;
        config.apply(overrides);
        Ok((config, file.env_logger))
    }

    fn apply(&mut self, overrides: EnvOverrides) {
        if let Some(path) = overrides.data_dir {
            self.store.path = path;
        }
        if let Some(currency) = overrides.currency {
            self.currency = currency;
        }
    }
}

impl StoreConfig {
    pub fn build(&self) -> JsonFiles {
        debug!("Build store from {:?}", self);
        JsonFiles::new(&self.path)
    }
}

impl LogLevel {
    fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}
