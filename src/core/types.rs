// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier for a vocabulary word within one loaded engine.
/// Handles are assigned in file order, so the most popular word is handle 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordHandle(pub u32);

impl WordHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for WordHandle {
    fn from(index: usize) -> Self {
        WordHandle(index as u32)
    }
}

/// The four card categories on a Codenames board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Own,
    Opponent,
    Civilian,
    Assassin,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Own,
        Category::Opponent,
        Category::Civilian,
        Category::Assassin,
    ];

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Category::Own => 0,
            Category::Opponent => 1,
            Category::Civilian => 2,
            Category::Assassin => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Own => "My",
            Category::Opponent => "Opponent",
            Category::Civilian => "Civilian",
            Category::Assassin => "Assassin",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A categorized word currently on the board, resolved against the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardWord {
    pub category: Category,
    pub text: String,
    pub handle: WordHandle,
}

/// One row of a score breakdown: how close a board word is to the clue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationItem {
    pub word: String,
    pub category: Category,
    /// Raw similarity plus the category margin.
    pub similarity: f32,
}

/// Result of scoring one candidate clue.
#[derive(Debug, Clone, PartialEq)]
pub struct ClueScore {
    pub score: f32,
    pub count: usize,
    /// Board words sorted by descending adjusted similarity.
    pub breakdown: Vec<ValuationItem>,
}

/// A clue returned by a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub word: String,
    pub handle: WordHandle,
    pub count: usize,
    pub score: f32,
    pub breakdown: Vec<ValuationItem>,
}
