//! Vote weighting with temporal decay
//!
//! Every observation votes with `source_reliability_weight × temporal_decay(age)`.
//! Decay is linear over a horizon and never drops below a floor, so an old
//! observation still counts for something and never counts negatively.

use crate::Observation;

/// Length of an average Gregorian month in seconds (365.2425 / 12 days)
pub const SECONDS_PER_MONTH: f64 = 2_629_746.0;

/// Months after which an observation has decayed to the floor (default: 12)
pub const DEFAULT_DECAY_HORIZON_MONTHS: f64 = 12.0;

/// Minimum decay factor (default: 0.1)
pub const DEFAULT_DECAY_FLOOR: f64 = 0.1;

/// Parameters of the linear decay curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayParams {
    /// Months until the floor is reached
    pub horizon_months: f64,
    /// Lowest factor an observation can decay to
    pub floor: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_DECAY_HORIZON_MONTHS,
            floor: DEFAULT_DECAY_FLOOR,
        }
    }
}

/// Age of an observation in months at `now`
///
/// Timestamps in the future (clock skew between connectors) count as fresh.
pub fn age_months(observed_at: u64, now: u64) -> f64 {
    now.saturating_sub(observed_at) as f64 / SECONDS_PER_MONTH
}

/// Linear decay factor: `max(floor, 1 − age/horizon)`
pub fn temporal_decay(age_months: f64, params: &DecayParams) -> f64 {
    if params.horizon_months <= 0.0 {
        return params.floor;
    }
    let age = age_months.max(0.0);
    (1.0 - age / params.horizon_months).max(params.floor)
}

/// Effective vote weight of an observation at `now`
pub fn vote_weight(observation: &Observation, now: u64, params: &DecayParams) -> f64 {
    let age = age_months(observation.timestamp(), now);
    observation.source_reliability_weight() * temporal_decay(age, params)
}
