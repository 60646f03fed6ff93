//! Aggregation over a criteria's rating observations.
//!
//! All reductions are pure linear scans over the observation slice in
//! insertion order, recomputed on every call. No caching, no indexes.

use crate::models::statistic::Statistic;

/// Arithmetic mean of the observed ratings.
///
/// Returns 0.0 for an empty set. Callers must treat 0.0 as "no data",
/// not as a real floor rating; use `best_observation(..).is_none()` to
/// tell the two apart.
pub fn average_rating(observations: &[Statistic]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let total: f64 = observations.iter().map(|obs| obs.rating).sum();
    total / observations.len() as f64
}

/// The observation with the maximum rating, first-encountered on ties.
pub fn best_observation(observations: &[Statistic]) -> Option<&Statistic> {
    let mut best: Option<&Statistic> = None;
    for obs in observations {
        match best {
            // Strict comparison keeps the earliest-inserted maximum
            Some(current) if obs.rating > current.rating => best = Some(obs),
            None => best = Some(obs),
            _ => {}
        }
    }
    best
}

/// The observation with the minimum rating, first-encountered on ties.
pub fn worst_observation(observations: &[Statistic]) -> Option<&Statistic> {
    let mut worst: Option<&Statistic> = None;
    for obs in observations {
        match worst {
            Some(current) if obs.rating < current.rating => worst = Some(obs),
            None => worst = Some(obs),
            _ => {}
        }
    }
    worst
}
