use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::session::{StartTrigger, TimerConfig};

/// Timer selections offered to the user
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum TimerChoice {
    #[value(name = "15")]
    #[strum(serialize = "15s")]
    Secs15,
    #[default]
    #[value(name = "30")]
    #[strum(serialize = "30s")]
    Secs30,
    #[value(name = "60")]
    #[strum(serialize = "60s")]
    Secs60,
    #[value(name = "120")]
    #[strum(serialize = "120s")]
    Secs120,
    #[value(name = "count-up")]
    #[strum(serialize = "count-up")]
    CountUp,
}

impl TimerChoice {
    /// Cycles 15 -> 30 -> 60 -> 120 -> count-up -> 15
    pub fn next(self) -> Self {
        match self {
            TimerChoice::Secs15 => TimerChoice::Secs30,
            TimerChoice::Secs30 => TimerChoice::Secs60,
            TimerChoice::Secs60 => TimerChoice::Secs120,
            TimerChoice::Secs120 => TimerChoice::CountUp,
            TimerChoice::CountUp => TimerChoice::Secs15,
        }
    }

    pub fn timer_config(self) -> TimerConfig {
        let duration_secs = match self {
            TimerChoice::Secs15 => 15,
            TimerChoice::Secs30 => 30,
            TimerChoice::Secs60 => 60,
            TimerChoice::Secs120 => 120,
            TimerChoice::CountUp => return TimerConfig::CountUp,
        };
        TimerConfig::Countdown { duration_secs }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub timer: TimerChoice,
    pub explicit_start: bool,
}

impl Config {
    pub fn start_trigger(&self) -> StartTrigger {
        if self.explicit_start {
            StartTrigger::Explicit
        } else {
            StartTrigger::FirstKeystroke
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "quickfox") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quickfox_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(%err, path = %self.path.display(), "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
