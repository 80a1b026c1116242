use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    VeryEasy,
    #[default]
    Easy,
    Medium,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    /// Grid side length and time limit in seconds.
    pub fn config(self) -> (usize, u32) {
        match self {
            Difficulty::VeryEasy => (2, 60),
            Difficulty::Easy => (4, 90),
            Difficulty::Medium => (6, 120),
            Difficulty::Hard => (8, 150),
            Difficulty::Insane => (10, 180),
        }
    }

    pub fn grid_size(self) -> usize {
        self.config().0
    }

    pub fn time_limit(self) -> u32 {
        self.config().1
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "Very Easy",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = PuzzleError;

    /// Accepts display names as well as `very-easy`/`very_easy` spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "veryeasy" => Ok(Difficulty::VeryEasy),
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "insane" => Ok(Difficulty::Insane),
            _ => Err(PuzzleError::UnknownDifficulty(value.to_string())),
        }
    }
}
