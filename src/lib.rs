// src/lib.rs

pub mod batch;
pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod session;
pub mod similarity;

pub use crate::config::ScoringConfig;
pub use crate::core::engine::ClueBot;
pub use crate::error::{ClueError, Result};
pub use crate::similarity::{DenseEngine, EdgeListEngine, SimilarityEngine};
