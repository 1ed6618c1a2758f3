// File: src/core/board.rs
use crate::core::text::normalize;
use crate::core::types::{BoardWord, Category};
use crate::error::Result;
use crate::similarity::SimilarityEngine;

/// The words currently on the board, grouped by category.
///
/// Rebuilt wholesale on every change. The lists are not deduplicated against
/// each other: a text filed under two categories counts once for each.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    lists: [Vec<String>; 4],
    words: Vec<BoardWord>,
    /// Normalized text of each entry in `words`, for the forbidden-word check.
    normalized: Vec<String>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all four lists. Every text must exist in the engine's
    /// vocabulary; on an unknown word the board is left untouched.
    pub fn set_words<E, S>(
        &mut self,
        engine: &E,
        own: &[S],
        opponent: &[S],
        civilian: &[S],
        assassin: &[S],
    ) -> Result<()>
    where
        E: SimilarityEngine,
        S: AsRef<str>,
    {
        let entries: Vec<(Category, &str)> = Category::ALL
            .into_iter()
            .zip([own, opponent, civilian, assassin])
            .flat_map(|(category, list)| list.iter().map(move |text| (category, text.as_ref())))
            .collect();
        self.set_entries(engine, entries.as_slice())
    }

    /// Like [`BoardState::set_words`], but keeps the given order of
    /// categorized words instead of grouping them by category.
    pub fn set_entries<E, S>(&mut self, engine: &E, entries: &[(Category, S)]) -> Result<()>
    where
        E: SimilarityEngine,
        S: AsRef<str>,
    {
        let words = entries
            .iter()
            .map(|(category, text)| {
                let text = text.as_ref();
                Ok(BoardWord {
                    category: *category,
                    text: text.to_string(),
                    handle: engine.handle(text)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut lists: [Vec<String>; 4] = Default::default();
        for word in &words {
            lists[word.category.index()].push(word.text.clone());
        }
        self.lists = lists;
        self.normalized = words.iter().map(|w| normalize(&w.text)).collect();
        self.words = words;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Board words in the order they were set.
    pub fn words(&self) -> &[BoardWord] {
        &self.words
    }

    pub fn texts(&self, category: Category) -> &[String] {
        &self.lists[category.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if the candidate is a super- or substring of any board word,
    /// after normalizing both sides. The rules forbid such clues.
    pub fn forbidden_word(&self, candidate: &str) -> bool {
        let candidate = normalize(candidate);
        self.normalized
            .iter()
            .any(|board| board.contains(&candidate) || candidate.contains(board.as_str()))
    }
}
