use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::game::controller::{DEFAULT_REVEAL_DELAY_MS, Timing};
use crate::game::difficulty::Difficulty;
use crate::scores::{JsonScoreStore, write_json_atomic};

const CONFIG_FILE_NAME: &str = "config.json";

/// Settings read from `config.json`; command line flags override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Last name entered, offered again on the next start.
    pub player_name: Option<String>,
    pub theme: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub reveal_delay_ms: u64,
    /// Where score files live; the user data directory when unset.
    pub data_dir: Option<PathBuf>,
    pub custom_themes: BTreeMap<String, Vec<String>>,
}

/// Values given on the command line. They apply to the current run only and
/// are never written back to `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub reveal_delay_ms: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: None,
            theme: None,
            difficulty: None,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            data_dir: None,
            custom_themes: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads the user's config, or defaults when it is missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "config unreadable, using defaults"
                );
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reveal_delay_ms > 10_000 {
            return Err(PuzzleError::Config(format!(
                "reveal_delay_ms {} is longer than 10 seconds",
                self.reveal_delay_ms
            )));
        }
        if let Some(name) = &self.player_name
            && name.trim().is_empty()
        {
            return Err(PuzzleError::Config("player_name is blank".to_string()));
        }
        Ok(())
    }

    /// This config with `overrides` applied. An override that fails
    /// validation is dropped with a warning.
    pub fn with_overrides(&self, overrides: &Overrides) -> Self {
        let mut effective = self.clone();
        if let Some(delay) = overrides.reveal_delay_ms {
            effective.reveal_delay_ms = delay;
        }
        if let Some(dir) = &overrides.data_dir {
            effective.data_dir = Some(dir.clone());
        }
        if let Err(err) = effective.validate() {
            tracing::warn!(error = %err, "ignoring invalid override");
            effective.reveal_delay_ms = self.reveal_delay_ms;
        }
        effective
    }

    /// Stores `name` as the remembered player. The rest of the file is kept
    /// as it is on disk.
    pub fn remember_player(name: &str) -> Result<()> {
        Self::remember_player_at(&config_path(), name)
    }

    pub fn remember_player_at(path: &Path, name: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path);
        on_disk.player_name = Some(name.to_string());
        on_disk.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    pub fn timing(&self) -> Timing {
        Timing {
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            ..Timing::default()
        }
    }

    pub fn scores_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(JsonScoreStore::default_dir)
    }
}

/// `<user config dir>/memory-puzzle/config.json`.
pub fn config_path() -> PathBuf {
    glib::user_config_dir()
        .join("memory-puzzle")
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.timing().reveal_delay, Duration::from_millis(500));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let raw = r#"{
            "player_name": "ada",
            "difficulty": "very-easy",
            "custom_themes": {"Shapes": ["■", "●"]}
        }"#;
        std::fs::write(&path, raw).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.player_name.as_deref(), Some("ada"));
        assert_eq!(config.difficulty, Some(Difficulty::VeryEasy));
        assert_eq!(config.reveal_delay_ms, DEFAULT_REVEAL_DELAY_MS);
        assert_eq!(config.custom_themes["Shapes"].len(), 2);
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"reveal_delay_ms": 60000}"#).unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        std::fs::write(&path, "player_name=ada").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            player_name: Some("bob".to_string()),
            theme: Some("Food".to_string()),
            reveal_delay_ms: 250,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        assert_eq!(Config::load_from(&path).timing().reveal_delay, Duration::from_millis(250));
    }

    #[test]
    fn remembered_name_leaves_run_overrides_out_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let stored = Config {
            theme: Some("Food".to_string()),
            ..Config::default()
        };
        stored.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        let overrides = Overrides {
            reveal_delay_ms: Some(250),
            data_dir: Some(dir.path().join("scores")),
        };
        let effective = loaded.with_overrides(&overrides);
        assert_eq!(effective.timing().reveal_delay, Duration::from_millis(250));
        assert_eq!(effective.scores_dir(), dir.path().join("scores"));

        Config::remember_player_at(&path, "ada").unwrap();

        let saved = Config::load_from(&path);
        assert_eq!(saved.player_name.as_deref(), Some("ada"));
        assert_eq!(saved.theme.as_deref(), Some("Food"));
        assert_eq!(saved.reveal_delay_ms, DEFAULT_REVEAL_DELAY_MS);
        assert_eq!(saved.data_dir, None);
    }

    #[test]
    fn invalid_delay_override_is_dropped() {
        let config = Config {
            reveal_delay_ms: 300,
            ..Config::default()
        };
        let overrides = Overrides {
            reveal_delay_ms: Some(60_000),
            data_dir: None,
        };
        assert_eq!(config.with_overrides(&overrides), config);
    }
}
