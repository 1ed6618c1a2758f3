use crate::config::ScoringConfig;
use crate::core::board::BoardState;
use crate::core::ranker::{nearest_words, ClueRanker};
use crate::core::scorer::ClueScorer;
use crate::core::types::{CandidateResult, Category, ClueScore};
use crate::error::Result;
use crate::similarity::SimilarityEngine;

/// Number of clues the interactive tool asks for.
pub const DEFAULT_CLUE_COUNT: usize = 20;

// The clue bot ties one loaded similarity engine to the scoring config
// and the current board.
pub struct ClueBot<E> {
    engine: E,
    config: ScoringConfig,
    board: BoardState,
}

impl<E: SimilarityEngine> ClueBot<E> {
    pub fn new(engine: E, config: ScoringConfig) -> Self {
        Self {
            engine,
            config,
            board: BoardState::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Rebuilds the board. All-or-nothing: an unknown word leaves the
    /// previous board in place.
    pub fn set_words<S: AsRef<str>>(
        &mut self,
        own: &[S],
        opponent: &[S],
        civilian: &[S],
        assassin: &[S],
    ) -> Result<()> {
        self.board
            .set_words(&self.engine, own, opponent, civilian, assassin)
    }

    /// Rebuilds the board from categorized words, keeping their order.
    pub fn set_entries<S: AsRef<str>>(&mut self, entries: &[(Category, S)]) -> Result<()> {
        self.board.set_entries(&self.engine, entries)
    }

    pub fn clear_board(&mut self) {
        self.board.clear();
    }

    /// Scores one word exactly as a ranking pass would.
    pub fn score_word(&self, word: &str) -> Result<ClueScore> {
        let handle = self.engine.handle(word)?;
        Ok(ClueScorer::new(&self.engine, &self.config, &self.board).score(handle))
    }

    pub fn best_clues(&self, limit: usize) -> Vec<CandidateResult> {
        ClueRanker::new(&self.engine, &self.config, &self.board).rank(limit)
    }

    pub fn forbidden_word(&self, word: &str) -> bool {
        self.board.forbidden_word(word)
    }

    /// The `n` vocabulary words closest to `word`.
    pub fn similar_words(&self, word: &str, n: usize) -> Result<Vec<(String, f32)>> {
        let handle = self.engine.handle(word)?;
        Ok(nearest_words(&self.engine, handle, n)
            .into_iter()
            .map(|(h, sim)| (self.engine.word(h).to_string(), sim))
            .collect())
    }
}
