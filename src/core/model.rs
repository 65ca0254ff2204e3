//! Model query interface: the next-character predictor consumed by the engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("context index {index} out of range for vocabulary of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("model returned {actual} probabilities, expected {expected}")]
    OutputSize { expected: usize, actual: usize },
    #[error("model backend failed: {0}")]
    Backend(String),
}

/// A trained next-character predictor.
///
/// Implementations are shared read-only across concurrent generation
/// requests, so `predict` takes `&self` and must not mutate weights.
pub trait CharModel: Send + Sync {
    /// Number of characters the model predicts over (K).
    fn vocab_size(&self) -> usize;

    /// Probability of each vocabulary index following `context`.
    ///
    /// `context` holds the full window, oldest index first. The result must
    /// hold `vocab_size()` non-negative values summing to 1, and must be
    /// deterministic for identical input.
    fn predict(&self, context: &[usize]) -> Result<Vec<f64>, ModelError>;
}

/// Predicts the same uniform distribution regardless of context.
#[derive(Debug, Clone, Copy)]
pub struct UniformModel {
    vocab_size: usize,
}

impl UniformModel {
    pub fn new(vocab_size: usize) -> Self {
        Self { vocab_size }
    }
}

impl CharModel for UniformModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, context: &[usize]) -> Result<Vec<f64>, ModelError> {
        check_context(context, self.vocab_size)?;
        Ok(vec![1.0 / self.vocab_size as f64; self.vocab_size])
    }
}

/// Reject contexts holding indices outside `0..vocab_size`.
pub fn check_context(context: &[usize], vocab_size: usize) -> Result<(), ModelError> {
    match context.iter().find(|&&i| i >= vocab_size) {
        Some(&index) => Err(ModelError::IndexOutOfRange {
            index,
            size: vocab_size,
        }),
        None => Ok(()),
    }
}
