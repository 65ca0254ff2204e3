//! Weighted random choice over a reshaped distribution.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::core::reshape::DistributionError;

/// Allowed drift of a distribution's sum from 1.0 before it is reported.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Draw one index from `dist` with probability proportional to its weight.
///
/// The draw is taken over `[0, total)`, so a distribution whose sum drifts
/// from 1.0 is renormalized implicitly; drift beyond [`SUM_TOLERANCE`] is
/// logged. Zero-weight entries are never chosen, so a source that always
/// yields `0.0` picks the first index with positive mass.
///
/// # Errors
/// Returns `CorruptDistribution` if any weight is non-finite or negative, or
/// if there is no positive mass to draw from.
pub fn sample<R: Rng + ?Sized>(dist: &[f64], rng: &mut R) -> Result<usize, DistributionError> {
    if let Some((i, p)) = dist.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(DistributionError::CorruptDistribution(format!(
            "entry {} is {}",
            i, p
        )));
    }

    let total: f64 = dist.iter().sum();
    if (total - 1.0).abs() > SUM_TOLERANCE {
        debug!(total, "distribution sum drifted, renormalizing");
    }

    let weighted: WeightedIndex<f64> = WeightedIndex::new(dist).map_err(|e| {
        let reason = match e {
            WeightedError::NoItem => "empty distribution",
            WeightedError::InvalidWeight => "negative weight",
            WeightedError::AllWeightsZero => "no index with positive mass",
            _ => "too many entries",
        };
        DistributionError::CorruptDistribution(reason.to_string())
    })?;

    Ok(weighted.sample(rng))
}
