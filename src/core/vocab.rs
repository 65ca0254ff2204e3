//! Vocabulary mapper: bidirectional character/index table.
//!
//! A vocabulary is fixed when the model is built and never mutated afterwards.
//! It is persisted as two JSON tables (`char_to_idx.json`, `idx_to_char.json`)
//! that must be exact inverses of each other.

use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// File name of the character → index table.
pub const CHAR_TO_IDX_FILE: &str = "char_to_idx.json";
/// File name of the index → character table.
pub const IDX_TO_CHAR_FILE: &str = "idx_to_char.json";

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("unknown character {0:?}")]
    UnknownCharacter(char),
    #[error("index {index} out of range for vocabulary of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("vocabulary is empty")]
    Empty,
    #[error("duplicate character {0:?} in vocabulary")]
    DuplicateCharacter(char),
    #[error("invalid table entry: {0}")]
    InvalidEntry(String),
    #[error("indices are not dense: table has {expected} entries but contains index {found}")]
    NonDense { expected: usize, found: usize },
    #[error("vocabulary tables disagree: {0}")]
    Mismatch(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The trained character set, indexed densely from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// Index → character.
    chars: Vec<char>,
    /// Character → index.
    index: FxHashMap<char, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from characters in index order.
    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Result<Self, VocabError> {
        let chars: Vec<char> = chars.into_iter().collect();
        if chars.is_empty() {
            return Err(VocabError::Empty);
        }

        let mut index = FxHashMap::default();
        for (i, &c) in chars.iter().enumerate() {
            if index.insert(c, i).is_some() {
                return Err(VocabError::DuplicateCharacter(c));
            }
        }

        Ok(Self { chars, index })
    }

    /// Build a vocabulary from the sorted set of distinct characters in `text`.
    pub fn from_corpus(text: &str) -> Result<Self, VocabError> {
        let distinct: BTreeSet<char> = text.chars().collect();
        Self::from_chars(distinct)
    }

    /// Build a vocabulary from the two persisted tables, verifying that they
    /// describe the same bijection onto `0..K`.
    pub fn from_tables(
        char_to_idx: &BTreeMap<String, usize>,
        idx_to_char: &BTreeMap<String, String>,
    ) -> Result<Self, VocabError> {
        if char_to_idx.is_empty() || idx_to_char.is_empty() {
            return Err(VocabError::Empty);
        }
        if char_to_idx.len() != idx_to_char.len() {
            return Err(VocabError::Mismatch(format!(
                "char_to_idx has {} entries, idx_to_char has {}",
                char_to_idx.len(),
                idx_to_char.len()
            )));
        }

        let size = idx_to_char.len();
        let mut slots: Vec<Option<char>> = vec![None; size];
        for (key, value) in idx_to_char {
            let idx: usize = key.parse().map_err(|_| {
                VocabError::InvalidEntry(format!("index key {:?} is not an integer", key))
            })?;
            if idx >= size {
                return Err(VocabError::NonDense {
                    expected: size,
                    found: idx,
                });
            }
            if slots[idx].is_some() {
                return Err(VocabError::InvalidEntry(format!(
                    "index {} listed more than once",
                    idx
                )));
            }
            slots[idx] = Some(single_char(value)?);
        }

        // `size` distinct indices all below `size` fill every slot.
        let vocab = Self::from_chars(slots.into_iter().flatten())?;

        for (key, &idx) in char_to_idx {
            let c = single_char(key)?;
            match vocab.index.get(&c) {
                Some(&expected) if expected == idx => {}
                Some(&expected) => {
                    return Err(VocabError::Mismatch(format!(
                        "{:?} encodes to {} but index {} decodes to it",
                        c, idx, expected
                    )));
                }
                None => {
                    return Err(VocabError::Mismatch(format!(
                        "{:?} is missing from idx_to_char",
                        c
                    )));
                }
            }
        }

        Ok(vocab)
    }

    /// Load both tables from `dir` using the standard file names.
    pub fn load(dir: &Path) -> Result<Self, VocabError> {
        Self::load_tables(&dir.join(CHAR_TO_IDX_FILE), &dir.join(IDX_TO_CHAR_FILE))
    }

    /// Load and cross-check the two tables from explicit paths.
    pub fn load_tables(char_to_idx: &Path, idx_to_char: &Path) -> Result<Self, VocabError> {
        let forward: BTreeMap<String, usize> =
            serde_json::from_str(&std::fs::read_to_string(char_to_idx)?)?;
        let backward: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(idx_to_char)?)?;
        Self::from_tables(&forward, &backward)
    }

    /// Write both tables into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<(), VocabError> {
        std::fs::create_dir_all(dir)?;

        let forward: BTreeMap<String, usize> = self
            .chars
            .iter()
            .enumerate()
            .map(|(i, c)| (c.to_string(), i))
            .collect();
        let backward: BTreeMap<String, String> = self
            .chars
            .iter()
            .enumerate()
            .map(|(i, c)| (i.to_string(), c.to_string()))
            .collect();

        std::fs::write(
            dir.join(CHAR_TO_IDX_FILE),
            serde_json::to_string_pretty(&forward)?,
        )?;
        std::fs::write(
            dir.join(IDX_TO_CHAR_FILE),
            serde_json::to_string_pretty(&backward)?,
        )?;
        Ok(())
    }

    pub fn encode(&self, c: char) -> Result<usize, VocabError> {
        self.index
            .get(&c)
            .copied()
            .ok_or(VocabError::UnknownCharacter(c))
    }

    pub fn decode(&self, index: usize) -> Result<char, VocabError> {
        self.chars
            .get(index)
            .copied()
            .ok_or(VocabError::IndexOutOfRange {
                index,
                size: self.chars.len(),
            })
    }

    /// Encode every character of `text`, failing on the first unknown one.
    pub fn encode_str(&self, text: &str) -> Result<Vec<usize>, VocabError> {
        text.chars().map(|c| self.encode(c)).collect()
    }

    /// Decode a sequence of indices back into text.
    pub fn decode_indices(&self, indices: &[usize]) -> Result<String, VocabError> {
        indices.iter().map(|&i| self.decode(i)).collect()
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    /// Number of characters (K).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in index order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

fn single_char(s: &str) -> Result<char, VocabError> {
    let mut it = s.chars();
    match (it.next(), it.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(VocabError::InvalidEntry(format!(
            "expected a single character, got {:?}",
            s
        ))),
    }
}
