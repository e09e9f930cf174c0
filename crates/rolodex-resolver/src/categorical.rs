//! Categorical attributes: weighted plurality vote

use crate::tally::Tally;
use crate::ResolverConfig;
use rolodex_domain::weighting::vote_weight;
use rolodex_domain::{
    AttributeKind, Conflict, ConflictKind, Observation, ResolvedAttribute, ResolvedValue, Severity,
};

/// Resolve a categorical attribute by weighted plurality
///
/// Values are compared trimmed and lowercased. The winner is the value with
/// the highest accumulated weight; ties go to the lexicographically smallest
/// value so the outcome never depends on input order.
///
/// `confidence = (winning / total weight) × min(1, mean reliability of the
/// winning sources)`: a unanimous vote from mediocre sources is not certain.
pub fn resolve_categorical(
    attribute_name: &str,
    observations: &[Observation],
    now: u64,
    config: &ResolverConfig,
) -> ResolvedAttribute {
    let decay = config.decay.params();
    let mut tally = Tally::default();
    for obs in observations {
        tally.cast(
            obs.value().trim().to_lowercase(),
            vote_weight(obs, now, &decay),
            obs.source_reliability_weight(),
        );
    }

    let Some((winner, ballot)) = tally.leader() else {
        return ResolvedAttribute::unknown(attribute_name, AttributeKind::Categorical);
    };
    if tally.total() <= 0.0 {
        // Every voter carried zero weight: nothing to choose from
        let mut unknown = ResolvedAttribute::unknown(attribute_name, AttributeKind::Categorical);
        unknown.vote_distribution = tally.distribution();
        unknown.observation_count = tally.voters();
        return unknown;
    }

    let agreement = ballot.weight / tally.total();
    let confidence = (agreement * ballot.mean_reliability()).clamp(0.0, 1.0);

    let mut conflicts = Vec::new();
    if let Some((runner_up, second)) = tally.runner_up() {
        let ratio = if ballot.weight > 0.0 {
            second.weight / ballot.weight
        } else {
            0.0
        };
        if ratio >= config.conflict_ratio {
            conflicts.push(Conflict::new(
                format!("{}_estimation", attribute_name),
                vec![attribute_name.to_string()],
                Severity::Warning,
                ConflictKind::CloseVote {
                    winner: winner.to_string(),
                    runner_up: runner_up.to_string(),
                    ratio,
                },
                format!(
                    "sources disagree on {}: '{}' won over '{}' at ratio {:.2}",
                    attribute_name, winner, runner_up, ratio
                ),
            ));
        }
    }

    ResolvedAttribute {
        attribute_name: attribute_name.to_string(),
        kind: AttributeKind::Categorical,
        resolved_value: ResolvedValue::Value(winner.to_string()),
        confidence,
        vote_distribution: tally.distribution(),
        observation_count: tally.voters(),
        conflicts,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: confidence always stays within [0, 1]
        #[test]
        fn test_confidence_bounds(
            votes in prop::collection::vec(("[a-d]", 0.0f64..5.0, 0u64..100_000_000u64), 1..20)
        ) {
            let now = 1_900_000_000u64;
            let observations: Vec<Observation> = votes
                .iter()
                .enumerate()
                .map(|(i, (value, weight, age))| {
                    Observation::new(format!("src{}", i), "size", value.as_str(), now - age, *weight).unwrap()
                })
                .collect();
            let resolved = resolve_categorical("size", &observations, now, &ResolverConfig::default());
            prop_assert!(resolved.confidence >= 0.0 && resolved.confidence <= 1.0);
        }

        /// Property: the result does not depend on observation order
        #[test]
        fn test_order_independence(
            votes in prop::collection::vec(("[a-d]", 0.1f64..2.0), 1..10)
        ) {
            let now = 1_900_000_000u64;
            let observations: Vec<Observation> = votes
                .iter()
                .enumerate()
                .map(|(i, (value, weight))| {
                    Observation::new(format!("src{}", i), "size", value.as_str(), now, *weight).unwrap()
                })
                .collect();
            let mut reversed = observations.clone();
            reversed.reverse();

            let config = ResolverConfig::default();
            let a = resolve_categorical("size", &observations, now, &config);
            let b = resolve_categorical("size", &reversed, now, &config);
            prop_assert_eq!(a.resolved_value, b.resolved_value);
        }
    }
}
