//! Scoring constants and environment configuration shared by the binaries.
//!
//! Reads `CLUE_EMBEDDINGS`, `CLUE_MODEL_DIR` and `RAYON_NUM_THREADS`.

use crate::core::types::Category;
use crate::error::{ClueError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Every tunable of the clue scoring heuristic.
///
/// A JSON file may override any subset of fields; missing fields keep the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    // Give a similarity bonus to "bad" words
    pub margin_civilian: f32,
    pub margin_opponent: f32,
    pub margin_assassin: f32,

    // Weights of the sigmoid-based fuzzy score
    pub fuzzy_weight_own: f32,
    pub fuzzy_weight_opponent: f32,
    pub fuzzy_weight_civilian: f32,
    pub fuzzy_weight_assassin: f32,
    pub fuzzy_exponent: f32,
    pub fuzzy_offset: f32,

    /// Words at most this similar are assumed never to be guessed.
    pub min_similarity: f32,

    /// Good words less similar than a civilian or opponent word are worth less.
    pub multiplier_after_bad_word: f32,

    pub weight_opponent: f32,
    pub weight_civilian: f32,

    /// How much it matters that the last good word beats the next bad word.
    pub margin_weight: f32,

    pub common_word_limit: usize,
    pub common_word_weight: f32,
    pub rare_word_limit: usize,
    pub rare_word_weight: f32,

    /// Only the most popular `vocabulary_size` words are considered as clues.
    pub vocabulary_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            margin_civilian: 0.02,
            margin_opponent: 0.04,
            margin_assassin: 0.07,
            fuzzy_weight_own: 0.1,
            fuzzy_weight_opponent: -0.1,
            fuzzy_weight_civilian: -0.05,
            fuzzy_weight_assassin: -0.2,
            fuzzy_exponent: 15.0,
            fuzzy_offset: 0.3,
            min_similarity: 0.2,
            multiplier_after_bad_word: 0.7,
            weight_opponent: -1.5,
            weight_civilian: -0.2,
            margin_weight: 0.1,
            common_word_limit: 1000,
            common_word_weight: 0.9,
            rare_word_limit: 15000,
            rare_word_weight: 0.8,
            vocabulary_size: 50000,
        }
    }
}

impl ScoringConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ScoringConfig = serde_json::from_str(&raw)
            .map_err(|e| ClueError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("margin_civilian", self.margin_civilian),
            ("margin_opponent", self.margin_opponent),
            ("margin_assassin", self.margin_assassin),
            ("fuzzy_weight_own", self.fuzzy_weight_own),
            ("fuzzy_weight_opponent", self.fuzzy_weight_opponent),
            ("fuzzy_weight_civilian", self.fuzzy_weight_civilian),
            ("fuzzy_weight_assassin", self.fuzzy_weight_assassin),
            ("fuzzy_exponent", self.fuzzy_exponent),
            ("fuzzy_offset", self.fuzzy_offset),
            ("min_similarity", self.min_similarity),
            ("multiplier_after_bad_word", self.multiplier_after_bad_word),
            ("weight_opponent", self.weight_opponent),
            ("weight_civilian", self.weight_civilian),
            ("margin_weight", self.margin_weight),
            ("common_word_weight", self.common_word_weight),
            ("rare_word_weight", self.rare_word_weight),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ClueError::Config(format!("{} must be finite, got {}", name, value)));
        }
        if self.vocabulary_size == 0 {
            return Err(ClueError::Config("vocabulary_size must be positive".to_string()));
        }
        if self.common_word_limit > self.rare_word_limit {
            return Err(ClueError::Config(format!(
                "common_word_limit ({}) exceeds rare_word_limit ({})",
                self.common_word_limit, self.rare_word_limit
            )));
        }
        Ok(())
    }

    /// Risk margin added to the raw similarity of a board word.
    pub fn margin(&self, category: Category) -> f32 {
        match category {
            Category::Own => 0.0,
            Category::Opponent => self.margin_opponent,
            Category::Civilian => self.margin_civilian,
            Category::Assassin => self.margin_assassin,
        }
    }

    /// Weight of a board word in the order-independent fuzzy score.
    pub fn fuzzy_weight(&self, category: Category) -> f32 {
        match category {
            Category::Own => self.fuzzy_weight_own,
            Category::Opponent => self.fuzzy_weight_opponent,
            Category::Civilian => self.fuzzy_weight_civilian,
            Category::Assassin => self.fuzzy_weight_assassin,
        }
    }
}

/// Read `CLUE_EMBEDDINGS` (default `data.bin`).
pub fn embeddings_path() -> PathBuf {
    std::env::var("CLUE_EMBEDDINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data.bin"))
}

/// Read `CLUE_MODEL_DIR` (default `models`).
pub fn model_dir() -> PathBuf {
    std::env::var("CLUE_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("models"))
}

/// Read `RAYON_NUM_THREADS` and build the global rayon pool.
/// Tolerates an already-initialized pool. Returns the thread count in use.
pub fn init_worker_threads() -> usize {
    let requested = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok());
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = requested {
        builder = builder.num_threads(n);
    }
    builder.build_global().ok(); // May fail if already initialized
    let threads = rayon::current_num_threads();
    info!(threads, "ranking worker pool ready");
    threads
}
