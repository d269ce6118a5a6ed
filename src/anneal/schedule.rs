//! Acceptance rule and cooling step.

use rand::Rng;

use crate::cost::Cost;

/// Temperatures below this snap to exactly zero.
pub const FREEZE_THRESHOLD: f64 = 0.1;

/// Metropolis criterion.
///
/// Improving moves are always accepted. Worsening or neutral moves are
/// accepted with probability `exp(-delta / temperature)` while the
/// temperature is positive, and never at temperature zero.
pub fn metropolis<R: Rng>(delta: Cost, temperature: f64, rng: &mut R) -> bool {
    if delta < 0 {
        true
    } else if temperature != 0.0 {
        let probability = (-(delta as f64) / temperature).exp();
        rng.random_range(0.0..1.0) < probability
    } else {
        false
    }
}

/// One geometric cooling step with the freeze snap applied.
pub fn cool(temperature: f64, rate: f64) -> f64 {
    let next = temperature * rate;
    if next < FREEZE_THRESHOLD {
        0.0
    } else {
        next
    }
}
