//! Temperature reshaping of next-character distributions.

use thiserror::Error;

/// Lower bound applied to every probability before taking its log.
///
/// A single zero entry would otherwise become `-inf` and poison the
/// normalizer for the whole vector.
pub const PROB_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("temperature must be a positive finite number, got {0}")]
    InvalidTemperature(f64),
    #[error("corrupt distribution: {0}")]
    CorruptDistribution(String),
}

/// Check that `temperature` can be used to reshape a distribution.
pub fn validate_temperature(temperature: f64) -> Result<(), DistributionError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(DistributionError::InvalidTemperature(temperature))
    }
}

/// Reshape `probs` with `temperature` and renormalize.
///
/// Computes `exp((ln(max(p, PROB_EPSILON)) - m) / T)` for every entry, where
/// `m` is the largest log-probability, then divides by the sum. The argmax
/// entry always weighs exactly 1, so any positive temperature stays finite.
///
/// - `T < 1` sharpens toward the argmax, reaching one-hot as `T → 0`
/// - `T = 1` returns the input distribution (up to the epsilon clamp)
/// - `T > 1` flattens toward uniform
pub fn reshape(probs: &[f64], temperature: f64) -> Result<Vec<f64>, DistributionError> {
    validate_temperature(temperature)?;

    if probs.is_empty() {
        return Err(DistributionError::CorruptDistribution(
            "empty probability vector".to_string(),
        ));
    }
    if let Some((i, p)) = probs
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(DistributionError::CorruptDistribution(format!(
            "entry {} is {}",
            i, p
        )));
    }

    let logs: Vec<f64> = probs.iter().map(|&p| p.max(PROB_EPSILON).ln()).collect();
    let max = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Shift before dividing: `ln(p) / T` alone overflows for tiny T.
    let weights: Vec<f64> = logs
        .iter()
        .map(|&l| ((l - max) / temperature).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(DistributionError::CorruptDistribution(format!(
            "cannot renormalize, sum is {}",
            total
        )));
    }

    Ok(weights.into_iter().map(|w| w / total).collect())
}

/// Index of the most likely entry. Ties resolve to the lowest index.
pub fn argmax(probs: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in probs.iter().enumerate() {
        match best {
            Some((_, b)) if p <= b => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}
