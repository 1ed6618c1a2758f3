//! Similarity backends.
//!
//! Both backends expose the same capability set through [`SimilarityEngine`].
//! The trait is only ever used through generics, so the per-candidate
//! `similarity` call is monomorphized into the scoring loop.

pub mod dense;
pub mod edge_list;
pub mod vocabulary;

pub use dense::{DenseEngine, EmbeddingModel};
pub use edge_list::EdgeListEngine;
pub use vocabulary::Vocabulary;

use crate::core::types::WordHandle;
use crate::error::Result;
use std::path::Path;

pub trait SimilarityEngine: Send + Sync {
    /// Reads the backend's file. Any framing problem is a load error.
    fn load(path: &Path) -> Result<Self>
    where
        Self: Sized;

    fn vocabulary(&self) -> &Vocabulary;

    /// Similarity of `dynamic` as seen from `fixed`.
    ///
    /// Not symmetric: any model-specific post-processing is keyed on the
    /// dynamic word, which is always the candidate clue being scored.
    fn similarity(&self, fixed: WordHandle, dynamic: WordHandle) -> f32;

    /// Per-word statistic kept for diagnostics.
    fn stat(&self, handle: WordHandle) -> f32;

    fn vocabulary_size(&self) -> usize {
        self.vocabulary().len()
    }

    fn handle(&self, word: &str) -> Result<WordHandle> {
        self.vocabulary().handle(word)
    }

    fn word(&self, handle: WordHandle) -> &str {
        self.vocabulary().word(handle)
    }

    fn word_exists(&self, word: &str) -> bool {
        self.vocabulary().contains(word)
    }

    /// 1 for the most popular word, 2 for the next, and so on.
    fn popularity(&self, handle: WordHandle) -> usize {
        // Files are ordered by descending frequency, so load order is rank.
        handle.index() + 1
    }

    /// The `limit` most popular words.
    fn common_words(&self, limit: usize) -> Vec<WordHandle> {
        (0..limit.min(self.vocabulary_size()))
            .map(WordHandle::from)
            .collect()
    }
}

const LANES: usize = 8;

/// Inner product over fixed-width lanes so the loop auto-vectorizes.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut acc = [0.0f32; LANES];
    for (x, y) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            acc[lane] += x[lane] * y[lane];
        }
    }
    acc.iter().sum::<f32>() + tail
}
