//! Character n-gram model: a count-based [`CharModel`] with back-off.
//!
//! Counts are kept for every context suffix of length `0..order`, so a
//! context never seen in training backs off to a shorter one, down to the
//! unigram table. Add-k smoothing keeps every probability strictly positive.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::model::{check_context, CharModel, ModelError};

/// Largest supported n-gram order.
pub const MAX_ORDER: usize = 16;
/// Default add-k smoothing constant.
pub const DEFAULT_SMOOTHING: f64 = 0.01;

#[derive(Debug, Error)]
pub enum NGramError {
    #[error("n-gram order must be between 1 and {MAX_ORDER}, got {0}")]
    InvalidOrder(usize),
    #[error("smoothing must be a positive finite number, got {0}")]
    InvalidSmoothing(f64),
    #[error("vocabulary size must be positive")]
    EmptyVocabulary,
    #[error("training index {index} out of range for vocabulary of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A trained character n-gram model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NGramModel {
    /// N-gram order: predictions condition on up to `order - 1` characters.
    pub order: usize,
    /// Number of vocabulary entries every count row covers.
    pub vocab_size: usize,
    /// Add-k smoothing constant.
    pub smoothing: f64,
    /// Context suffix → occurrence count of each next index.
    pub counts: FxHashMap<Vec<usize>, Vec<u32>>,
}

impl NGramModel {
    /// Count n-grams over an encoded corpus.
    pub fn train(indices: &[usize], vocab_size: usize, order: usize) -> Result<Self, NGramError> {
        if order == 0 || order > MAX_ORDER {
            return Err(NGramError::InvalidOrder(order));
        }
        if vocab_size == 0 {
            return Err(NGramError::EmptyVocabulary);
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= vocab_size) {
            return Err(NGramError::IndexOutOfRange {
                index,
                size: vocab_size,
            });
        }

        let mut counts: FxHashMap<Vec<usize>, Vec<u32>> = FxHashMap::default();
        for (t, &next) in indices.iter().enumerate() {
            for k in 0..order.min(t + 1) {
                let row = counts
                    .entry(indices[t - k..t].to_vec())
                    .or_insert_with(|| vec![0; vocab_size]);
                row[next] += 1;
            }
        }

        debug!(
            order,
            vocab_size,
            contexts = counts.len(),
            "trained n-gram model"
        );

        Ok(Self {
            order,
            vocab_size,
            smoothing: DEFAULT_SMOOTHING,
            counts,
        })
    }

    /// Replace the add-k smoothing constant.
    pub fn with_smoothing(mut self, smoothing: f64) -> Result<Self, NGramError> {
        if !smoothing.is_finite() || smoothing <= 0.0 {
            return Err(NGramError::InvalidSmoothing(smoothing));
        }
        self.smoothing = smoothing;
        Ok(self)
    }

    /// Check structural invariants, used after deserialization.
    pub fn validate(&self) -> Result<(), NGramError> {
        if self.order == 0 || self.order > MAX_ORDER {
            return Err(NGramError::InvalidOrder(self.order));
        }
        if self.vocab_size == 0 {
            return Err(NGramError::EmptyVocabulary);
        }
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 {
            return Err(NGramError::InvalidSmoothing(self.smoothing));
        }
        for (context, row) in &self.counts {
            if context.len() >= self.order {
                return Err(NGramError::InvalidModel(format!(
                    "context of length {} exceeds order {}",
                    context.len(),
                    self.order
                )));
            }
            if row.len() != self.vocab_size {
                return Err(NGramError::InvalidModel(format!(
                    "count row has {} entries, expected {}",
                    row.len(),
                    self.vocab_size
                )));
            }
        }
        Ok(())
    }

    /// Longest stored context suffix of `context` with at least one observation.
    fn best_row(&self, context: &[usize]) -> Option<&[u32]> {
        let longest = (self.order - 1).min(context.len());
        (0..=longest).rev().find_map(|k| {
            let row = self.counts.get(&context[context.len() - k..])?;
            if row.iter().any(|&c| c > 0) {
                Some(row.as_slice())
            } else {
                None
            }
        })
    }
}

impl CharModel for NGramModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, context: &[usize]) -> Result<Vec<f64>, ModelError> {
        check_context(context, self.vocab_size)?;

        let k = self.vocab_size as f64;
        let probs = match self.best_row(context) {
            Some(row) => {
                let total: f64 = row.iter().map(|&c| c as f64).sum();
                let denom = total + self.smoothing * k;
                row.iter()
                    .map(|&c| (c as f64 + self.smoothing) / denom)
                    .collect()
            }
            None => vec![1.0 / k; self.vocab_size],
        };
        Ok(probs)
    }
}

/// Save an NGramModel to a RON file.
pub fn save_model(model: &NGramModel, path: &Path) -> Result<(), NGramError> {
    let serialized = ron::ser::to_string_pretty(model, ron::ser::PrettyConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load an NGramModel from a RON file and check its invariants.
pub fn load_model(path: &Path) -> Result<NGramModel, NGramError> {
    let contents = std::fs::read_to_string(path)?;
    let model: NGramModel = ron::from_str(&contents)?;
    model.validate()?;
    Ok(model)
}
