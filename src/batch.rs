// File: src/batch.rs
//! Machine-readable mode: one whitespace-token request on stdin, one JSON
//! reply on stdout.
//!
//! Request: `<engine> <colour> (<type> <word>)* go <index>`, where `engine`
//! is `glove` or `conceptnet`, `colour` is `r` or `b`, and `type` is a colour
//! letter, `c` or `a`. The reply carries the `index`-th best clue (0-based).

use crate::config::ScoringConfig;
use crate::core::engine::ClueBot;
use crate::core::text::{denormalize, normalize};
use crate::core::types::Category;
use crate::error::{ClueError, Result};
use crate::session::TeamColor;
use crate::similarity::{DenseEngine, SimilarityEngine};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STATUS_FAILURE: u8 = 0;
pub const STATUS_SUCCESS: u8 = 1;
pub const STATUS_UNKNOWN_WORD: u8 = 2;
pub const STATUS_NO_MORE_CLUES: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReply {
    pub status: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<Vec<WhyItem>>,
}

/// One board word in the justification of a clue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhyItem {
    pub score: f32,
    pub word: String,
    #[serde(rename = "type")]
    pub kind: char,
}

impl BatchReply {
    fn status(status: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            word: None,
            count: None,
            why: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::status(STATUS_FAILURE, message)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ClueError::Encode(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Glove,
    ConceptNet,
}

impl ModelChoice {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "glove" => Some(ModelChoice::Glove),
            "conceptnet" => Some(ModelChoice::ConceptNet),
            _ => None,
        }
    }

    pub fn path(self, model_dir: &Path) -> PathBuf {
        match self {
            ModelChoice::Glove => model_dir.join("glove.840B.330d.bin"),
            ModelChoice::ConceptNet => model_dir.join("conceptnet.bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub model: ModelChoice,
    pub color: TeamColor,
    /// Board words in request order.
    pub words: Vec<(Category, String)>,
    pub index: usize,
}

impl BatchRequest {
    pub fn parse(input: &str) -> std::result::Result<Self, BatchReply> {
        let mut tokens = input.split_whitespace();
        let mut next = || tokens.next().ok_or_else(|| BatchReply::failure("Incomplete message."));

        let model = ModelChoice::parse(next()?)
            .ok_or_else(|| BatchReply::failure("Invalid engine parameter."))?;
        let color = match next()? {
            "r" => TeamColor::Red,
            "b" => TeamColor::Blue,
            _ => return Err(BatchReply::failure("Invalid color.")),
        };

        let mut words = Vec::new();
        loop {
            let kind = next()?;
            if kind == "go" {
                break;
            }
            let category = match kind {
                "r" | "b" | "c" | "a" => color.category_of(kind),
                _ => None,
            }
            .ok_or_else(|| BatchReply::failure("Invalid type."))?;
            words.push((category, normalize(next()?)));
        }

        let index: i64 = next()?
            .parse()
            .map_err(|_| BatchReply::failure("Incomplete message."))?;
        let index = usize::try_from(index).map_err(|_| BatchReply::failure("Invalid index"))?;
        Ok(Self {
            model,
            color,
            words,
            index,
        })
    }
}

/// Answers a parsed request against an already-loaded engine.
pub fn answer<E: SimilarityEngine>(engine: E, request: &BatchRequest, config: ScoringConfig) -> BatchReply {
    if let Some((_, word)) = request.words.iter().find(|(_, w)| !engine.word_exists(w)) {
        return BatchReply::status(
            STATUS_UNKNOWN_WORD,
            format!("Unknown word: '{}'.", denormalize(word)),
        );
    }

    let mut bot = ClueBot::new(engine, config);
    if let Err(e) = bot.set_entries(request.words.as_slice()) {
        return BatchReply::failure(e.to_string());
    }

    let results = bot.best_clues(request.index.saturating_add(1));
    let Some(clue) = results.get(request.index) else {
        return BatchReply::status(STATUS_NO_MORE_CLUES, "No more clues.");
    };

    BatchReply {
        status: STATUS_SUCCESS,
        message: "Success.".to_string(),
        word: Some(denormalize(&clue.word)),
        count: Some(clue.count),
        why: Some(
            clue.breakdown
                .iter()
                .map(|item| WhyItem {
                    score: item.similarity,
                    word: denormalize(&item.word),
                    kind: request.color.letter_for(item.category),
                })
                .collect(),
        ),
    }
}

/// Parses the request, loads the requested model from `model_dir` and
/// answers. Every outcome, including failures, is a reply.
pub fn run(input: &str, model_dir: &Path, config: ScoringConfig) -> BatchReply {
    let request = match BatchRequest::parse(input) {
        Ok(request) => request,
        Err(reply) => return reply,
    };
    let path = request.model.path(model_dir);
    match DenseEngine::load(&path) {
        Ok(engine) => answer(engine, &request, config),
        Err(e) => {
            warn!(error = %e, "batch request could not load its engine");
            BatchReply::failure("Unable to load similarity engine.")
        }
    }
}
