// src/similarity/vocabulary.rs
use crate::core::types::WordHandle;
use crate::error::{ClueError, Result};
use std::collections::HashMap;

/// Ordered word table shared by both similarity backends.
/// The position of a word is its handle.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, WordHandle>,
}

impl Vocabulary {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Appends a word and returns its handle. A repeated text keeps both
    /// entries, but lookups by text resolve to the later one.
    pub fn push(&mut self, word: String) -> WordHandle {
        let handle = WordHandle::from(self.words.len());
        self.index.insert(word.clone(), handle);
        self.words.push(word);
        handle
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn handle(&self, word: &str) -> Result<WordHandle> {
        self.index
            .get(word)
            .copied()
            .ok_or_else(|| ClueError::UnknownWord(word.to_string()))
    }

    pub fn word(&self, handle: WordHandle) -> &str {
        &self.words[handle.index()]
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl FromIterator<String> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut vocabulary = Vocabulary::default();
        for word in iter {
            vocabulary.push(word);
        }
        vocabulary
    }
}
