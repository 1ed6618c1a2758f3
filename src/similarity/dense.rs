// src/similarity/dense.rs
use super::{dot, SimilarityEngine, Vocabulary};
use crate::core::types::WordHandle;
use crate::error::Result;
use crate::persistence::{load_dense, DenseTable};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Embedding families that need model-specific similarity post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingModel {
    Plain,
    Glove,
    ConceptNet,
}

impl EmbeddingModel {
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => EmbeddingModel::Glove,
            2 => EmbeddingModel::ConceptNet,
            _ => EmbeddingModel::Plain,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            EmbeddingModel::Plain => 0,
            EmbeddingModel::Glove => 1,
            EmbeddingModel::ConceptNet => 2,
        }
    }
}

/// Word2vec-style backend: one pre-normalized vector per word.
pub struct DenseEngine {
    vocabulary: Vocabulary,
    model: EmbeddingModel,
    format_version: i32,
    dimension: usize,
    /// Row-major, `dimension` values per word.
    vectors: Vec<f32>,
    /// In some embeddings, words with more specific meanings have higher norms.
    norms: Vec<f32>,
}

impl DenseEngine {
    pub fn from_table(table: DenseTable) -> Self {
        let model = EmbeddingModel::from_id(table.model_id);
        let norms = match model {
            EmbeddingModel::Glove => table.norms.iter().map(|n| n.powf(0.4)).collect(),
            _ => table.norms,
        };
        Self {
            vocabulary: table.words.into_iter().collect(),
            model,
            format_version: table.format_version,
            dimension: table.dimension,
            vectors: table.vectors,
            norms,
        }
    }

    pub fn model(&self) -> EmbeddingModel {
        self.model
    }

    pub fn format_version(&self) -> i32 {
        self.format_version
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vector(&self, handle: WordHandle) -> &[f32] {
        let start = handle.index() * self.dimension;
        &self.vectors[start..start + self.dimension]
    }
}

impl SimilarityEngine for DenseEngine {
    fn load(path: &Path) -> Result<Self> {
        let start = Instant::now();
        info!(path = %path.display(), "loading word embeddings");
        let table = load_dense(path)?;
        let engine = DenseEngine::from_table(table);
        info!(
            words = engine.vocabulary.len(),
            dimensions = engine.dimension,
            model = engine.model.id(),
            format_version = engine.format_version,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "word embeddings loaded"
        );
        Ok(engine)
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn similarity(&self, fixed: WordHandle, dynamic: WordHandle) -> f32 {
        let sim = dot(self.vector(fixed), self.vector(dynamic));
        match self.model {
            EmbeddingModel::Glove => sim * self.norms[dynamic.index()] / 4.5,
            EmbeddingModel::ConceptNet => {
                if sim <= 0.0 {
                    sim
                } else {
                    sim.powf(0.8) * 1.6
                }
            }
            EmbeddingModel::Plain => sim,
        }
    }

    fn stat(&self, handle: WordHandle) -> f32 {
        self.norms[handle.index()]
    }
}
