// --- File: src/core/ranker.rs
use crate::config::ScoringConfig;
use crate::core::board::BoardState;
use crate::core::scorer::ClueScorer;
use crate::core::types::{CandidateResult, WordHandle};
use crate::similarity::SimilarityEngine;
use rayon::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::{debug, warn};

/// Heap key for a scored candidate: score, then count, then handle.
#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate {
    pub score: f32,
    pub count: usize,
    pub handle: WordHandle,
}

impl Ord for RankedCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.count.cmp(&other.count))
            .then(self.handle.cmp(&other.handle))
    }
}

impl PartialOrd for RankedCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedCandidate {}

/// Keeps the best `capacity` candidates seen so far.
/// Min-heap on the key, so the weakest kept candidate is on top. The heap
/// grows as candidates arrive; `capacity` is only a bound.
#[derive(Debug)]
struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<RankedCandidate>>,
    skipped: usize,
}

impl TopK {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::new(),
            skipped: 0,
        }
    }

    fn beats_weakest(&self, candidate: &RankedCandidate) -> bool {
        if self.heap.len() < self.capacity {
            return self.capacity > 0;
        }
        matches!(self.heap.peek(), Some(Reverse(weakest)) if candidate > weakest)
    }

    fn push(&mut self, candidate: RankedCandidate) {
        if !self.beats_weakest(&candidate) {
            return;
        }
        if self.heap.len() == self.capacity {
            self.heap.pop();
        }
        self.heap.push(Reverse(candidate));
    }

    /// Like `push`, but the (costlier) rejection test only runs for
    /// candidates that would otherwise make the cut.
    fn offer(&mut self, candidate: RankedCandidate, rejected: impl FnOnce(WordHandle) -> bool) {
        if !self.beats_weakest(&candidate) {
            return;
        }
        if rejected(candidate.handle) {
            self.skipped += 1;
            return;
        }
        self.push(candidate);
    }

    fn merge(mut self, other: TopK) -> TopK {
        self.skipped += other.skipped;
        for Reverse(candidate) in other.heap {
            self.push(candidate);
        }
        self
    }

    /// Best first.
    fn into_sorted_vec(self) -> Vec<RankedCandidate> {
        // Ascending order of `Reverse` is descending order of the key.
        self.heap.into_sorted_vec().into_iter().map(|Reverse(c)| c).collect()
    }
}

/// Searches the popular end of the vocabulary for the best clues.
pub struct ClueRanker<'a, E> {
    engine: &'a E,
    config: &'a ScoringConfig,
    board: &'a BoardState,
}

impl<'a, E: SimilarityEngine> ClueRanker<'a, E> {
    pub fn new(engine: &'a E, config: &'a ScoringConfig, board: &'a BoardState) -> Self {
        Self {
            engine,
            config,
            board,
        }
    }

    /// Up to `limit` clues, best first. Candidates the rules forbid for the
    /// current board are skipped without counting toward `limit`; fewer
    /// results come back when the pool runs out.
    pub fn rank(&self, limit: usize) -> Vec<CandidateResult> {
        let start = Instant::now();
        if self.config.vocabulary_size > self.engine.vocabulary_size() {
            warn!(
                configured = self.config.vocabulary_size,
                loaded = self.engine.vocabulary_size(),
                "vocabulary slice larger than the loaded vocabulary"
            );
        }
        let pool = self.engine.common_words(self.config.vocabulary_size);
        let limit = limit.min(pool.len());

        // Each worker scores a share of the pool with its own scorer and
        // keeps a partial top list; partial lists are merged afterwards.
        let top = pool
            .par_iter()
            .fold(
                || (ClueScorer::new(self.engine, self.config, self.board), TopK::new(limit)),
                |(mut scorer, mut top), &handle| {
                    let (score, count) = scorer.score_only(handle);
                    top.offer(RankedCandidate { score, count, handle }, |h| {
                        self.board.forbidden_word(self.engine.word(h))
                    });
                    (scorer, top)
                },
            )
            .map(|(_, top)| top)
            .reduce(|| TopK::new(limit), TopK::merge);

        let skipped = top.skipped;
        let mut scorer = ClueScorer::new(self.engine, self.config, self.board);
        let results: Vec<CandidateResult> = top
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| CandidateResult {
                word: self.engine.word(ranked.handle).to_string(),
                count: ranked.count,
                score: ranked.score,
                handle: ranked.handle,
                breakdown: scorer.score(ranked.handle).breakdown,
            })
            .collect();

        debug!(
            pool = pool.len(),
            accepted = results.len(),
            skipped_forbidden = skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ranking pass finished"
        );
        results
    }
}

/// The `n` words most similar to `handle`, most similar first.
/// The word itself is left out.
pub fn nearest_words<E: SimilarityEngine>(
    engine: &E,
    handle: WordHandle,
    n: usize,
) -> Vec<(WordHandle, f32)> {
    let mut top = TopK::new(n.min(engine.vocabulary_size()));
    for other in (0..engine.vocabulary_size()).map(WordHandle::from) {
        if other != handle {
            top.push(RankedCandidate {
                score: engine.similarity(handle, other),
                count: 0,
                handle: other,
            });
        }
    }
    top.into_sorted_vec()
        .into_iter()
        .map(|c| (c.handle, c.score))
        .collect()
}
