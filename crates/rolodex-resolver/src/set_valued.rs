//! Set-valued attributes: one item per category

use crate::schema::TechCatalog;
use crate::tally::Tally;
use crate::ResolverConfig;
use rolodex_domain::weighting::vote_weight;
use rolodex_domain::{
    AttributeKind, Conflict, ConflictKind, Observation, ResolvedAttribute, ResolvedValue, Severity,
};
use std::collections::BTreeMap;

/// Separators accepted between items of one reported value
const ITEM_SEPARATORS: [char; 3] = [',', ';', '|'];

/// Resolve a set-valued attribute such as a tech stack
///
/// A reported value may list several items (`"wordpress, google analytics"`);
/// each item receives the full weight of its observation. Within a category
/// only the heaviest item survives, and only if its weight exceeds
/// `item_floor`. Every declared mutually-exclusive pair seen together in one
/// category raises an `<attr>_exclusive` warning.
///
/// `confidence = kept weight / total weight × min(1, mean reliability of the
/// kept items' voters)`.
pub fn resolve_set_valued(
    attribute_name: &str,
    observations: &[Observation],
    now: u64,
    catalog: &TechCatalog,
    config: &ResolverConfig,
) -> ResolvedAttribute {
    let decay = config.decay.params();
    let mut by_category: BTreeMap<String, Tally> = BTreeMap::new();
    let mut overall = Tally::default();
    let mut contributing = 0;

    for obs in observations {
        let weight = vote_weight(obs, now, &decay);
        let mut counted = false;
        for raw in obs.value().split(ITEM_SEPARATORS) {
            let Some((category, item)) = catalog.categorize(raw) else {
                continue;
            };
            if !counted {
                contributing += 1;
                counted = true;
            }
            overall.cast(format!("{}:{}", category, item), weight, obs.source_reliability_weight());
            by_category
                .entry(category)
                .or_default()
                .cast(item, weight, obs.source_reliability_weight());
        }
    }

    if overall.is_empty() {
        return ResolvedAttribute::unknown(attribute_name, AttributeKind::SetValued);
    }

    let mut kept = Vec::new();
    let mut kept_weight = 0.0;
    let mut reliability_sum = 0.0;
    let mut conflicts = Vec::new();

    for (category, tally) in &by_category {
        if let Some((item, ballot)) = tally.leader() {
            if ballot.weight > config.item_floor {
                kept.push(item.to_string());
                kept_weight += ballot.weight;
                reliability_sum += ballot.mean_reliability();
            }
        }

        let items: Vec<&str> = tally.iter().map(|(item, _)| item).collect();
        for (i, first) in items.iter().enumerate() {
            for second in &items[i + 1..] {
                if catalog.is_exclusive(first, second) {
                    conflicts.push(Conflict::new(
                        format!("{}_exclusive", attribute_name),
                        vec![attribute_name.to_string()],
                        Severity::Warning,
                        ConflictKind::ExclusiveItems {
                            category: category.clone(),
                            first: first.to_string(),
                            second: second.to_string(),
                        },
                        format!(
                            "{} reports both '{}' and '{}' for {}",
                            attribute_name, first, second, category
                        ),
                    ));
                }
            }
        }
    }

    if kept.is_empty() {
        let mut unknown = ResolvedAttribute::unknown(attribute_name, AttributeKind::SetValued);
        unknown.vote_distribution = overall.distribution();
        unknown.observation_count = contributing;
        unknown.conflicts = conflicts;
        return unknown;
    }

    let agreement = if overall.total() > 0.0 {
        kept_weight / overall.total()
    } else {
        0.0
    };
    let reliability = (reliability_sum / kept.len() as f64).min(1.0);
    kept.sort();

    ResolvedAttribute {
        attribute_name: attribute_name.to_string(),
        kind: AttributeKind::SetValued,
        resolved_value: ResolvedValue::Items(kept),
        confidence: (agreement * reliability).clamp(0.0, 1.0),
        vote_distribution: overall.distribution(),
        observation_count: contributing,
        conflicts,
    }
}
