use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prices, rewards and the end-of-game keep rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Economy {
    pub reward_per_correct: u32,
    pub hint_cost: u32,
    pub freeze_cost: u32,
    pub hint_pack_size: u32,
    /// Minimum end-of-game accuracy (percent) needed to keep credits.
    pub keep_threshold_percent: u32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            reward_per_correct: 100,
            hint_cost: 300,
            freeze_cost: 500,
            hint_pack_size: 3,
            keep_threshold_percent: 70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timing {
    /// Countdown length in ticks.
    pub question_time: u32,
    pub tick_interval_ms: u64,
    pub reveal_delay_ms: u64,
    /// Time multiplier applied while gesture tracking or a hint scan is running.
    pub gesture_slow_factor: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            question_time: 10,
            tick_interval_ms: 1000,
            reveal_delay_ms: 1500,
            gesture_slow_factor: 0.6,
        }
    }
}

impl Timing {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub total_waves: u32,
    pub questions_per_wave: u32,
    pub starting_hints: u32,
    pub economy: Economy,
    pub timing: Timing,
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_waves: 3,
            questions_per_wave: 3,
            starting_hints: 3,
            economy: Economy::default(),
            timing: Timing::default(),
            bell: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "wavequiz") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wavequiz_config.json")
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
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            },
            Err(e) => tracing::debug!(path = %self.path.display(), error = %e, "no config file"),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
