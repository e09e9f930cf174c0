//! Attribute resolution dispatch

use crate::categorical::resolve_categorical;
use crate::numeric::resolve_numeric_range;
use crate::sanity::ResolvedMap;
use crate::set_valued::resolve_set_valued;
use crate::{AttributeSchema, ResolverConfig};
use rolodex_domain::{AttributeKind, Observation, ResolvedAttribute};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolves observations into attributes using the rule the schema assigns
#[derive(Debug, Clone, Default)]
pub struct AttributeResolver {
    config: ResolverConfig,
    schema: AttributeSchema,
}

impl AttributeResolver {
    /// Create a resolver
    pub fn new(config: ResolverConfig, schema: AttributeSchema) -> Self {
        Self { config, schema }
    }

    /// Resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Attribute schema
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Resolve one attribute from the observations reported for it
    ///
    /// Observations of other attributes are ignored, so the full set for an
    /// entity can be passed. An empty set resolves to unknown with zero
    /// confidence.
    pub fn resolve(&self, name: &str, observations: &[Observation], now: u64) -> ResolvedAttribute {
        let name = name.trim().to_lowercase();
        let relevant: Vec<Observation> = observations
            .iter()
            .filter(|obs| obs.attribute_name() == name)
            .cloned()
            .collect();
        self.resolve_group(&name, &relevant, now)
    }

    /// Resolve every attribute that has at least one observation
    pub fn resolve_all(&self, observations: &[Observation], now: u64) -> ResolvedMap {
        let mut groups: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            groups.entry(obs.attribute_name()).or_default().push(obs.clone());
        }

        groups
            .into_iter()
            .map(|(name, group)| (name.to_string(), self.resolve_group(name, &group, now)))
            .collect()
    }

    fn resolve_group(&self, name: &str, observations: &[Observation], now: u64) -> ResolvedAttribute {
        let resolved = match self.schema.kind_of(name) {
            AttributeKind::Categorical => {
                resolve_categorical(name, observations, now, &self.config)
            }
            AttributeKind::NumericRange => match self.schema.scale_for(name) {
                Some(scale) => resolve_numeric_range(name, observations, now, scale, &self.config),
                None => {
                    warn!(attribute = name, "numeric-range attribute has no scale, voting categorically");
                    resolve_categorical(name, observations, now, &self.config)
                }
            },
            AttributeKind::SetValued => {
                resolve_set_valued(name, observations, now, self.schema.catalog(), &self.config)
            }
        };

        debug!(
            attribute = name,
            kind = %resolved.kind,
            value = %resolved.resolved_value,
            confidence = resolved.confidence,
            conflicts = resolved.conflicts.len(),
            "attribute resolved"
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_domain::ResolvedValue;

    const NOW: u64 = 1_800_000_000;

    fn obs(source: &str, attribute: &str, value: &str, weight: f64) -> Observation {
        Observation::new(source, attribute, value, NOW, weight).unwrap()
    }

    #[test]
    fn test_dispatch_by_kind() {
        let resolver = AttributeResolver::default();
        let observations = vec![
            obs("linkedin", "size", "small", 0.9),
            obs("clearbit", "revenue", "$1M-5M", 0.9),
            obs("builtwith", "tech_stack", "shopify", 0.9),
            obs("website", "industry", "Plumbing", 0.7),
        ];

        let resolved = resolver.resolve_all(&observations, NOW);
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved["size"].kind, AttributeKind::Categorical);
        assert_eq!(resolved["revenue"].kind, AttributeKind::NumericRange);
        assert_eq!(resolved["tech_stack"].kind, AttributeKind::SetValued);
        assert_eq!(resolved["industry"].kind, AttributeKind::Categorical);
        assert_eq!(resolved["industry"].resolved_value.as_value(), Some("plumbing"));
    }

    #[test]
    fn test_resolve_filters_by_attribute() {
        let resolver = AttributeResolver::default();
        let observations = vec![
            obs("linkedin", "size", "small", 0.9),
            obs("clearbit", "revenue", "$1M-5M", 0.9),
        ];
        let resolved = resolver.resolve("Size", &observations, NOW);
        assert_eq!(resolved.attribute_name, "size");
        assert_eq!(resolved.observation_count, 1);
    }

    #[test]
    fn test_resolve_unreported_attribute_is_unknown() {
        let resolver = AttributeResolver::default();
        let resolved = resolver.resolve("employees", &[], NOW);
        assert_eq!(resolved.resolved_value, ResolvedValue::Unknown);
        assert_eq!(resolved.confidence, 0.0);
        assert_eq!(resolved.kind, AttributeKind::NumericRange);
    }

    #[test]
    fn test_resolve_all_empty() {
        let resolver = AttributeResolver::default();
        assert!(resolver.resolve_all(&[], NOW).is_empty());
    }
}
