//! Corpus preparation: loading, cleaning and windowing training text.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Punctuation kept by [`clean_text`] besides letters, digits and whitespace.
const KEPT_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\''];

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("no .txt files found in {0}")]
    NoTextFiles(PathBuf),
    #[error("step must be positive")]
    InvalidStep,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read every `.txt` file directly inside `dir`, lower-case each one and
/// join them with newlines. Files are read in name order.
pub fn load_dir(dir: &Path) -> Result<String, CorpusError> {
    if !dir.is_dir() {
        return Err(CorpusError::NotADirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension() == Some(std::ffi::OsStr::new("txt")) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(CorpusError::NoTextFiles(dir.to_path_buf()));
    }
    files.sort();

    let mut texts = Vec::with_capacity(files.len());
    for path in &files {
        let content = std::fs::read_to_string(path)?.to_lowercase();
        debug!(file = %path.display(), chars = content.chars().count(), "read corpus file");
        texts.push(content);
    }

    let combined = texts.join("\n");
    info!(
        files = files.len(),
        chars = combined.chars().count(),
        "loaded corpus"
    );
    Ok(combined)
}

/// Keep lower-case ASCII letters, digits, whitespace and basic punctuation.
pub fn clean_text(text: &str) -> String {
    text.chars().filter(|&c| is_kept(c)).collect()
}

fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || c.is_whitespace()
        || KEPT_PUNCTUATION.contains(&c)
}

/// Sliding `(input, next)` training pairs over an encoded corpus.
///
/// Windows start every `step` positions; each pairs `seq_length` indices
/// with the index that follows them.
pub fn training_windows(
    indices: &[usize],
    seq_length: usize,
    step: usize,
) -> Result<impl Iterator<Item = (&[usize], usize)>, CorpusError> {
    if step == 0 {
        return Err(CorpusError::InvalidStep);
    }
    let last_start = indices.len().saturating_sub(seq_length);
    Ok((0..last_start)
        .step_by(step)
        .map(move |i| (&indices[i..i + seq_length], indices[i + seq_length])))
}

/// Shape of a prepared corpus, written next to the vocabulary tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub vocab_size: usize,
    pub num_sequences: usize,
    pub sequence_length: usize,
    pub total_chars: usize,
}

impl CorpusSummary {
    pub fn compute(
        indices: &[usize],
        vocab_size: usize,
        seq_length: usize,
        step: usize,
    ) -> Result<Self, CorpusError> {
        let num_sequences = training_windows(indices, seq_length, step)?.count();
        Ok(Self {
            vocab_size,
            num_sequences,
            sequence_length: if num_sequences > 0 { seq_length } else { 0 },
            total_chars: num_sequences * (seq_length + 1),
        })
    }
}
