// File: src/core/scorer.rs
//! Expected-value heuristic for a single candidate clue.
//!
//! The score combines an order-independent fuzzy estimate over the whole
//! board with a greedy scan that simulates stopping after each own word,
//! keeping the best stopping point. Popular and rare clues are damped.

use crate::config::ScoringConfig;
use crate::core::board::BoardState;
use crate::core::types::{Category, ClueScore, ValuationItem, WordHandle};
use crate::similarity::SimilarityEngine;

/// Tie-break term used when no opponent or assassin word follows the
/// current stopping point. Lower than any real tie-break value.
const NO_RISK_TIE_BREAK: f32 = -1.0;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Scores candidates against one board snapshot.
///
/// Owns its sort buffer, so each worker thread needs its own scorer.
pub struct ClueScorer<'a, E> {
    engine: &'a E,
    config: &'a ScoringConfig,
    board: &'a BoardState,
    /// `(adjusted similarity, board index)`, reused across calls.
    scratch: Vec<(f32, usize)>,
}

impl<'a, E: SimilarityEngine> ClueScorer<'a, E> {
    pub fn new(engine: &'a E, config: &'a ScoringConfig, board: &'a BoardState) -> Self {
        Self {
            engine,
            config,
            board,
            scratch: Vec::with_capacity(board.words().len()),
        }
    }

    /// Score, achievable own-word count and the per-board-word breakdown.
    pub fn score(&mut self, candidate: WordHandle) -> ClueScore {
        let mut breakdown = Vec::with_capacity(self.board.words().len());
        let (score, count) = self.evaluate(candidate, Some(&mut breakdown));
        ClueScore {
            score,
            count,
            breakdown,
        }
    }

    /// Same as [`ClueScorer::score`] without building the breakdown.
    pub fn score_only(&mut self, candidate: WordHandle) -> (f32, usize) {
        self.evaluate(candidate, None)
    }

    fn evaluate(
        &mut self,
        candidate: WordHandle,
        breakdown: Option<&mut Vec<ValuationItem>>,
    ) -> (f32, usize) {
        let cfg = self.config;
        let engine = self.engine;
        let board = self.board;
        let board = board.words();

        self.scratch.clear();
        self.scratch.extend(board.iter().enumerate().map(|(i, w)| {
            let sim = engine.similarity(w.handle, candidate) + cfg.margin(w.category);
            (sim, i)
        }));
        // Board order breaks ties so the result never depends on sort stability.
        self.scratch
            .sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        let sorted = &self.scratch;

        if let Some(out) = breakdown {
            out.clear();
            out.extend(sorted.iter().map(|&(sim, i)| ValuationItem {
                word: board[i].text.clone(),
                category: board[i].category,
                similarity: sim,
            }));
        }

        let fuzzy = |sim: f32| sigmoid((sim - cfg.fuzzy_offset) * cfg.fuzzy_exponent);

        let base_score: f32 = sorted
            .iter()
            .map(|&(sim, i)| cfg.fuzzy_weight(board[i].category) * fuzzy(sim))
            .sum();

        let mut best_score = 0.0f32;
        let mut best_count = 0;
        let mut cur_score = 0.0f32;
        let mut cur_count = 0;
        let mut last_good = 0.0f32;
        let mut mult = 1.0f32;
        for (pos, &(sim, i)) in sorted.iter().enumerate() {
            if sim < cfg.min_similarity {
                break;
            }
            match board[i].category {
                Category::Assassin => break,
                Category::Opponent => {
                    cur_score += cfg.weight_opponent;
                    mult *= cfg.multiplier_after_bad_word;
                    continue;
                }
                Category::Civilian => {
                    cur_score += mult * cfg.weight_civilian;
                    mult *= cfg.multiplier_after_bad_word;
                    continue;
                }
                Category::Own => {
                    last_good = sim;
                    cur_score += mult * fuzzy(sim);
                    cur_count += 1;
                }
            }

            // How far the last claimed word sits above the next risky one.
            let tie_break = sorted[pos + 1..]
                .iter()
                .find(|&&(_, j)| matches!(board[j].category, Category::Opponent | Category::Assassin))
                .map_or(NO_RISK_TIE_BREAK, |&(next_sim, _)| {
                    mult * cfg.margin_weight * sigmoid((last_good - next_sim) * cfg.fuzzy_exponent)
                });
            let total = tie_break + (base_score + cur_score);
            if total > best_score {
                best_score = total;
                best_count = cur_count;
            }
        }

        let popularity = engine.popularity(candidate);
        if popularity < cfg.common_word_limit {
            best_score *= cfg.common_word_weight;
        } else if popularity > cfg.rare_word_limit {
            best_score *= cfg.rare_word_weight;
        }
        (best_score, best_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::EdgeListFile;
    use crate::similarity::EdgeListEngine;

    /// Vocabulary: board words first, then candidates.
    fn engine(words: &[&str], edges: Vec<(u32, u32, f32)>) -> EdgeListEngine {
        EdgeListEngine::from_file(EdgeListFile {
            format_version: 1,
            words: words.iter().map(|w| w.to_string()).collect(),
            edges,
        })
    }

    fn board(e: &EdgeListEngine, lists: [&[&str]; 4]) -> BoardState {
        let mut b = BoardState::new();
        b.set_words(e, lists[0], lists[1], lists[2], lists[3]).unwrap();
        b
    }

    #[test]
    fn sigmoid_is_centered_at_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn single_own_word_matches_hand_computation() {
        let e = engine(&["cat", "kitten"], vec![(0, 1, 0.9)]);
        let b = board(&e, [&["cat"], &[], &[], &[]]);
        let cfg = ScoringConfig::default();
        let result = ClueScorer::new(&e, &cfg, &b).score(WordHandle(1));

        let s = sigmoid((0.9 - 0.3) * 15.0);
        // base + running - 1, then damped as a common word (popularity 2)
        let expected = (-1.0 + (0.1 * s + s)) * 0.9;
        assert_eq!(result.count, 1);
        assert!((result.score - expected).abs() < 1e-6);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].word, "cat");
        assert_eq!(result.breakdown[0].similarity, 0.9);
    }

    #[test]
    fn margins_shift_risky_words_in_the_breakdown() {
        let e = engine(
            &["a", "b", "c", "d", "clue"],
            vec![(0, 4, 0.5), (1, 4, 0.5), (2, 4, 0.5), (3, 4, 0.5)],
        );
        let b = board(&e, [&["a"], &["b"], &["c"], &["d"]]);
        let cfg = ScoringConfig::default();
        let result = ClueScorer::new(&e, &cfg, &b).score(WordHandle(4));
        let order: Vec<(&str, Category)> = result
            .breakdown
            .iter()
            .map(|v| (v.word.as_str(), v.category))
            .collect();
        assert_eq!(
            order,
            vec![
                ("d", Category::Assassin),
                ("b", Category::Opponent),
                ("c", Category::Civilian),
                ("a", Category::Own),
            ]
        );
        assert!((result.breakdown[0].similarity - 0.57).abs() < 1e-6);
        // The assassin comes first in the scan, so nothing can be claimed.
        assert_eq!(result.count, 0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn assassin_caps_the_claimable_count() {
        // own1 0.8, assassin 0.6 + 0.07, own2 0.5
        let e = engine(
            &["own1", "own2", "bomb", "clue"],
            vec![(0, 3, 0.8), (1, 3, 0.5), (2, 3, 0.6)],
        );
        let b = board(&e, [&["own1", "own2"], &[], &[], &["bomb"]]);
        let cfg = ScoringConfig::default();
        let result = ClueScorer::new(&e, &cfg, &b).score(WordHandle(3));
        assert_eq!(result.count, 1);

        // Without the assassin both own words would be claimed.
        let safe = board(&e, [&["own1", "own2"], &[], &[], &[]]);
        assert_eq!(ClueScorer::new(&e, &cfg, &safe).score(WordHandle(3)).count, 2);
    }

    #[test]
    fn words_below_min_similarity_are_never_claimed() {
        let e = engine(&["own1", "own2", "clue"], vec![(0, 2, 0.7), (1, 2, 0.15)]);
        let b = board(&e, [&["own1", "own2"], &[], &[], &[]]);
        let cfg = ScoringConfig::default();
        assert_eq!(ClueScorer::new(&e, &cfg, &b).score(WordHandle(2)).count, 1);
    }

    #[test]
    fn opponent_above_own_word_sinks_the_score() {
        let cfg = ScoringConfig::default();
        let near = engine(&["own", "opp", "clue"], vec![(0, 2, 0.8), (1, 2, 0.9)]);
        let far = engine(&["own", "opp", "clue"], vec![(0, 2, 0.8), (1, 2, 0.1)]);
        let b_near = board(&near, [&["own"], &["opp"], &[], &[]]);
        let b_far = board(&far, [&["own"], &["opp"], &[], &[]]);
        let with_near = ClueScorer::new(&near, &cfg, &b_near).score_only(WordHandle(2));
        let with_far = ClueScorer::new(&far, &cfg, &b_far).score_only(WordHandle(2));
        assert_eq!(with_near, (0.0, 0));
        assert_eq!(with_far.1, 1);
        assert!(with_far.0 > 0.5);
    }

    #[test]
    fn popularity_bands_damp_exactly_once() {
        let mut words: Vec<String> = (0..20).map(|i| format!("w{}", i)).collect();
        words[0] = "own".to_string();
        let e = EdgeListEngine::from_file(EdgeListFile {
            format_version: 1,
            words,
            edges: vec![(0, 5, 0.9), (0, 10, 0.9), (0, 15, 0.9)],
        });
        let b = board(&e, [&["own"], &[], &[], &[]]);
        let cfg = ScoringConfig {
            common_word_limit: 7,
            rare_word_limit: 12,
            ..ScoringConfig::default()
        };
        let mut scorer = ClueScorer::new(&e, &cfg, &b);
        let common = scorer.score_only(WordHandle(5)).0; // popularity 6
        let middle = scorer.score_only(WordHandle(10)).0; // popularity 11
        let rare = scorer.score_only(WordHandle(15)).0; // popularity 16
        assert!((common - middle * 0.9).abs() < 1e-6);
        assert!((rare - middle * 0.8).abs() < 1e-6);
    }

    #[test]
    fn scoring_is_repeatable() {
        let e = engine(
            &["a", "b", "c", "clue"],
            vec![(0, 3, 0.6), (1, 3, 0.4), (2, 3, 0.55)],
        );
        let b = board(&e, [&["a"], &["b"], &["c"], &[]]);
        let cfg = ScoringConfig::default();
        let mut scorer = ClueScorer::new(&e, &cfg, &b);
        let first = scorer.score(WordHandle(3));
        let second = scorer.score(WordHandle(3));
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first, second);
        assert_eq!(scorer.score_only(WordHandle(3)), (first.score, first.count));
    }
}
