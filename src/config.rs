use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Error};

/// Timing and shape of the signal lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LineSettings {
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
    /// time for the marker to travel the whole line
    pub travel_ms: u64,
    pub max_turns: u32,
    pub glow_ms: u64,
    pub fade_steps: u32,
    pub fade_interval_ms: u64,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            interval_min_ms: 1000,
            interval_max_ms: 3000,
            travel_ms: 4000,
            max_turns: 2,
            glow_ms: 500,
            fade_steps: 20,
            fade_interval_ms: 20,
        }
    }
}

impl LineSettings {
    pub fn travel(&self) -> Duration {
        Duration::from_millis(self.travel_ms)
    }

    pub fn glow(&self) -> Duration {
        Duration::from_millis(self.glow_ms)
    }

    pub fn fade_interval(&self) -> Duration {
        Duration::from_millis(self.fade_interval_ms)
    }
}

/// Timing and chunking of the typewriter pane
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TypistSettings {
    pub base_speed_ms: u64,
    pub speed_per_char_ms: u64,
    pub min_delay_ms: u64,
    pub block_pause_ms: u64,
    /// words up to this many characters are revealed whole
    pub max_unsplit_word: usize,
    pub min_piece: usize,
    pub max_piece: usize,
    pub scroll_threshold_px: f64,
}

impl Default for TypistSettings {
    fn default() -> Self {
        Self {
            base_speed_ms: 50,
            speed_per_char_ms: 3,
            min_delay_ms: 20,
            block_pause_ms: 200,
            max_unsplit_word: 6,
            min_piece: 3,
            max_piece: 8,
            scroll_threshold_px: 10.0,
        }
    }
}

impl TypistSettings {
    /// Delay before the chunk following one of `chunk_len` characters
    pub fn chunk_delay(&self, chunk_len: usize) -> Duration {
        let shaved = self
            .base_speed_ms
            .saturating_sub(self.speed_per_char_ms * chunk_len as u64);
        Duration::from_millis(shaved.max(self.min_delay_ms))
    }

    pub fn block_pause(&self) -> Duration {
        Duration::from_millis(self.block_pause_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tick_rate_ms: u64,
    pub lines: LineSettings,
    pub typist: TypistSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            lines: LineSettings::default(),
            typist: TypistSettings::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lines = &self.lines;
        let typist = &self.typist;

        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if lines.interval_min_ms > lines.interval_max_ms {
            return Err(ConfigError::IntervalRange {
                min: lines.interval_min_ms,
                max: lines.interval_max_ms,
            });
        }
        if lines.interval_max_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if lines.travel_ms == 0 {
            return Err(ConfigError::ZeroTravelTime);
        }
        if lines.fade_steps == 0 {
            return Err(ConfigError::ZeroFadeSteps);
        }
        if typist.min_piece == 0 || typist.min_piece > typist.max_piece {
            return Err(ConfigError::PieceRange {
                min: typist.min_piece,
                max: typist.max_piece,
            });
        }

        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "glowline") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("glowline_config.json")
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

    /// Write `cfg` unless a file is already there; true when one was written
    pub fn create_if_missing(&self, cfg: &Config) -> Result<bool, Error> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(cfg)?;
        Ok(true)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(e) => {
                    log::warn!("{}: {e}, using defaults", self.path.display());
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("{}: unreadable config ({e}), using defaults", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
