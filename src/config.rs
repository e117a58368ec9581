use std::path::{Path, PathBuf};

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// File name used under the home directory when no path is given.
pub const DEFAULT_SCORES_FILE: &str = ".2048_high_scores.json";

/// Where (if anywhere) finished games are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoresLocation {
    File(PathBuf),
    Disabled,
}

/// Effective settings for one run of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scores: ScoresLocation,
    /// Fixed seed for the tile spawner; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Config {
    /// Resolve settings from command-line values.
    ///
    /// An explicit path wins, then `~/.2048_high_scores.json`. Without a home
    /// directory, or with `no_scores`, results are not persisted.
    pub fn resolve(scores_path: Option<PathBuf>, no_scores: bool, seed: Option<u64>) -> Self {
        Self::resolve_with_home(scores_path, no_scores, seed, dirs::home_dir().as_deref())
    }

    fn resolve_with_home(
        scores_path: Option<PathBuf>,
        no_scores: bool,
        seed: Option<u64>,
        home: Option<&Path>,
    ) -> Self {
        let scores = if no_scores {
            ScoresLocation::Disabled
        } else if let Some(path) = scores_path {
            ScoresLocation::File(path)
        } else if let Some(home) = home {
            ScoresLocation::File(home.join(DEFAULT_SCORES_FILE))
        } else {
            warn!("no home directory found; high scores will not be saved");
            ScoresLocation::Disabled
        };
        Config { scores, seed }
    }

    pub fn scores_path(&self) -> Option<&Path> {
        match &self.scores {
            ScoresLocation::File(path) => Some(path),
            ScoresLocation::Disabled => None,
        }
    }

    /// Random source for tile spawning.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
