//! High scores and aggregate statistics.
//!
//! Read at startup and written when a game ends. Nothing here is fatal: a
//! missing or damaged file reads as empty and a failed write only logs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const HIGHSCORE_FILE_NAME: &str = "highscore.json";
pub const STATS_FILE_NAME: &str = "stats.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub games_played: u32,
    pub games_won: u32,
    pub total_score: u64,
}

/// A finished game as reported to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub player_name: String,
    pub score: u32,
    pub won: bool,
}

pub trait ScoreStore {
    fn high_score(&self, player: &str) -> u32;

    fn stats(&self) -> GameStats;

    /// Folds a finished game into the stats and the player's best score.
    fn record_game(&self, result: &GameResult);
}

/// Score files in a data directory, `highscore.json` and `stats.json`.
#[derive(Clone, Debug)]
pub struct JsonScoreStore {
    dir: PathBuf,
}

impl JsonScoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonScoreStore { dir: dir.into() }
    }

    /// `<user data dir>/memory-puzzle`.
    pub fn default_dir() -> PathBuf {
        glib::user_data_dir().join("memory-puzzle")
    }

    fn highscore_path(&self) -> PathBuf {
        self.dir.join(HIGHSCORE_FILE_NAME)
    }

    fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE_NAME)
    }

    pub fn load_high_scores(&self) -> BTreeMap<String, u32> {
        read_or_default(&self.highscore_path())
    }

    fn save(&self, high_scores: &BTreeMap<String, u32>, stats: &GameStats) {
        if let Err(err) = write_json_atomic(&self.highscore_path(), high_scores) {
            tracing::warn!(
                path = %self.highscore_path().display(),
                error = %err,
                "could not save high scores"
            );
        }
        if let Err(err) = write_json_atomic(&self.stats_path(), stats) {
            tracing::warn!(
                path = %self.stats_path().display(),
                error = %err,
                "could not save stats"
            );
        }
    }
}

impl ScoreStore for JsonScoreStore {
    fn high_score(&self, player: &str) -> u32 {
        self.load_high_scores().get(player).copied().unwrap_or(0)
    }

    fn stats(&self) -> GameStats {
        read_or_default(&self.stats_path())
    }

    fn record_game(&self, result: &GameResult) {
        let mut high_scores = self.load_high_scores();
        let mut stats = self.stats();

        stats.games_played = stats.games_played.saturating_add(1);
        if result.won {
            stats.games_won = stats.games_won.saturating_add(1);
        }
        stats.total_score = stats.total_score.saturating_add(u64::from(result.score));

        let best = high_scores.entry(result.player_name.clone()).or_insert(0);
        if result.score > *best {
            tracing::info!(player = %result.player_name, score = result.score, "new high score");
            *best = result.score;
        }

        self.save(&high_scores, &stats);
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "unreadable score file, using defaults"
            );
            T::default()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
