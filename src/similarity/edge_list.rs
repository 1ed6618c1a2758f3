// src/similarity/edge_list.rs
use super::{SimilarityEngine, Vocabulary};
use crate::core::types::WordHandle;
use crate::error::Result;
use crate::persistence::{load_edge_list, EdgeListFile};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Backend driven by an explicit list of directed `(fixed, dynamic)` edges.
///
/// Pairs without an edge have similarity 0, except a word with itself,
/// which is 1 unless the file says otherwise.
pub struct EdgeListEngine {
    vocabulary: Vocabulary,
    edges: HashMap<(WordHandle, WordHandle), f32>,
}

impl EdgeListEngine {
    pub fn from_file(data: EdgeListFile) -> Self {
        let edges = data
            .edges
            .iter()
            .map(|&(fixed, dynamic, sim)| ((WordHandle(fixed), WordHandle(dynamic)), sim))
            .collect();
        Self {
            vocabulary: data.words.into_iter().collect(),
            edges,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl SimilarityEngine for EdgeListEngine {
    fn load(path: &Path) -> Result<Self> {
        let start = Instant::now();
        info!(path = %path.display(), "loading similarity edge list");
        let engine = EdgeListEngine::from_file(load_edge_list(path)?);
        info!(
            words = engine.vocabulary.len(),
            edges = engine.edges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "similarity edge list loaded"
        );
        Ok(engine)
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn similarity(&self, fixed: WordHandle, dynamic: WordHandle) -> f32 {
        match self.edges.get(&(fixed, dynamic)) {
            Some(&sim) => sim,
            None if fixed == dynamic => 1.0,
            None => 0.0,
        }
    }

    fn stat(&self, _handle: WordHandle) -> f32 {
        1.0
    }
}
