//! Numeric-range attributes: weighted midpoint averaging

use crate::schema::RangeScale;
use crate::tally::Tally;
use crate::ResolverConfig;
use rolodex_domain::weighting::vote_weight;
use rolodex_domain::{
    AttributeKind, Conflict, ConflictKind, Observation, ResolvedAttribute, ResolvedValue, Severity,
};
use tracing::debug;

/// Resolve a numeric-range attribute (revenue, headcount) over `scale`
///
/// Each value maps to its bucket midpoint; the weighted mean of those
/// midpoints maps back to the bucket with the nearest midpoint. Values the
/// scale cannot place are skipped.
///
/// Confidence is the weight share of the resolved bucket times the capped
/// mean reliability of its voters, so an average that lands between the
/// reported buckets carries no confidence at all.
pub fn resolve_numeric_range(
    attribute_name: &str,
    observations: &[Observation],
    now: u64,
    scale: &RangeScale,
    config: &ResolverConfig,
) -> ResolvedAttribute {
    let decay = config.decay.params();
    let mut tally = Tally::default();
    let mut weighted_sum = 0.0;
    let mut min_mid = f64::INFINITY;
    let mut max_mid = f64::NEG_INFINITY;

    for obs in observations {
        let Some(bucket) = scale.classify(obs.value()) else {
            debug!(
                attribute = attribute_name,
                source = obs.source_id(),
                value = obs.value(),
                "value does not map to any range bucket, skipped"
            );
            continue;
        };
        let weight = vote_weight(obs, now, &decay);
        tally.cast(bucket.label.clone(), weight, obs.source_reliability_weight());
        weighted_sum += weight * bucket.midpoint;
        min_mid = min_mid.min(bucket.midpoint);
        max_mid = max_mid.max(bucket.midpoint);
    }

    if tally.is_empty() || tally.total() <= 0.0 {
        let mut unknown = ResolvedAttribute::unknown(attribute_name, AttributeKind::NumericRange);
        unknown.vote_distribution = tally.distribution();
        unknown.observation_count = tally.voters();
        return unknown;
    }

    let mean = weighted_sum / tally.total();
    let Some(resolved) = scale.nearest(mean) else {
        return ResolvedAttribute::unknown(attribute_name, AttributeKind::NumericRange);
    };

    let reliability = tally
        .get(&resolved.label)
        .map(|ballot| ballot.mean_reliability())
        .unwrap_or(0.0);
    let confidence = (tally.share(&resolved.label) * reliability).clamp(0.0, 1.0);

    let mut conflicts = Vec::new();
    if min_mid > 0.0 {
        let ratio = max_mid / min_mid;
        if ratio > config.spread_ratio {
            conflicts.push(Conflict::new(
                format!("{}_estimation", attribute_name),
                vec![attribute_name.to_string()],
                Severity::Warning,
                ConflictKind::RangeSpread {
                    min_midpoint: min_mid,
                    max_midpoint: max_mid,
                    ratio,
                },
                format!(
                    "{} estimates span {} to {} (ratio {:.1})",
                    attribute_name, min_mid, max_mid, ratio
                ),
            ));
        }
    }

    ResolvedAttribute {
        attribute_name: attribute_name.to_string(),
        kind: AttributeKind::NumericRange,
        resolved_value: ResolvedValue::Value(resolved.label.clone()),
        confidence,
        vote_distribution: tally.distribution(),
        observation_count: tally.voters(),
        conflicts,
    }
}
