//! Pipeline tests for the Reconciler

#[cfg(test)]
mod tests {
    use crate::{EngineConfig, EngineError, EntitySubmission, RawObservation, ReconcileOutcome, Reconciler};
    use rolodex_domain::{
        EntityRecord, Fingerprint, Observation, RawIdentity, RegistryStore, UpsertOutcome,
    };
    use rolodex_resolver::AttributeSchema;
    use rolodex_store::MemoryRegistry;
    use std::sync::{Arc, Mutex};

    const NOW: u64 = 1_800_000_000;
    const DAY: u64 = 86_400;

    fn identity() -> RawIdentity {
        RawIdentity::named("Acme Widgets LLC")
            .with_website("https://www.acme.com/")
            .with_phone("+1 (555) 010-0000")
            .with_address("1 Main St, Springfield")
    }

    fn obs(source: &str, attribute: &str, value: &str, weight: f64) -> Observation {
        Observation::new(source, attribute, value, NOW, weight).unwrap()
    }

    fn good_submission() -> EntitySubmission {
        EntitySubmission::new(identity()).with_observations(vec![
            obs("linkedin", "size", "small", 0.9),
            obs("website_analysis", "size", "small", 0.7),
        ])
    }

    fn weak_submission() -> EntitySubmission {
        EntitySubmission::new(identity()).with_observation(obs("forum_scrape", "size", "small", 0.3))
    }

    fn reconciler() -> Reconciler<MemoryRegistry> {
        Reconciler::new(MemoryRegistry::new(), EngineConfig::default()).unwrap()
    }

    /// Registry whose writes always fail
    #[derive(Default)]
    struct ReadOnlyRegistry {
        inner: MemoryRegistry,
    }

    impl RegistryStore for ReadOnlyRegistry {
        type Error = String;

        fn load(&mut self) -> Result<usize, String> {
            Ok(0)
        }

        fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, String> {
            self.inner.lookup(fingerprint).map_err(|e| e.to_string())
        }

        fn entries(&self) -> Result<Vec<EntityRecord>, String> {
            self.inner.entries().map_err(|e| e.to_string())
        }

        fn upsert(&mut self, _record: EntityRecord) -> Result<UpsertOutcome, String> {
            Err("disk full".to_string())
        }

        fn evict_expired(&mut self, _now: u64) -> Result<Vec<Fingerprint>, String> {
            Ok(Vec::new())
        }

        fn len(&self) -> Result<usize, String> {
            self.inner.len().map_err(|e| e.to_string())
        }
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = EngineConfig::default();
        config.resolver.conflict_ratio = -1.0;
        let result = Reconciler::new(MemoryRegistry::new(), config);
        assert!(matches!(result, Err(EngineError::Config(msg)) if msg.starts_with("[resolver]")));
    }

    #[test]
    fn test_accepted_submission_is_stored() {
        let reconciler = reconciler();
        let outcome = reconciler.reconcile_at(&good_submission(), NOW).unwrap();

        let ReconcileOutcome::Accepted { result, upsert, superseded } = &outcome else {
            panic!("expected acceptance, got {:?}", outcome);
        };
        assert_eq!(*upsert, UpsertOutcome::Inserted);
        assert!(*superseded);
        assert!(result.missing_identity_fields.is_empty());

        let record = reconciler.lookup_at(outcome.fingerprint(), NOW).unwrap().unwrap();
        assert_eq!(record.first_seen, NOW);
        assert_eq!(record.retention_expiry, NOW + 30 * DAY);
        assert_eq!(record.identity.domain, "acme.com");
    }

    #[test]
    fn test_rejection_leaves_registry_untouched() {
        let reconciler = reconciler();
        let outcome = reconciler.reconcile_at(&weak_submission(), NOW).unwrap();

        let ReconcileOutcome::Rejected(result) = &outcome else {
            panic!("expected rejection, got {:?}", outcome);
        };
        assert!(!result.is_valid);
        assert!(!result.reasons.is_empty());
        assert!(result.confidence_score < 0.6);
        assert!(reconciler.registry().lock().unwrap().is_empty().unwrap());
    }

    #[test]
    fn test_identical_rejected_input_is_not_resolved_again() {
        let reconciler = reconciler();
        let first = reconciler.reconcile_at(&weak_submission(), NOW).unwrap();
        let second = reconciler.reconcile_at(&weak_submission(), NOW + 60).unwrap();

        let (ReconcileOutcome::Rejected(a), ReconcileOutcome::RecentlyRejected(b)) = (&first, &second) else {
            panic!("unexpected outcomes {:?} / {:?}", first, second);
        };
        assert_eq!(a.resolution_id, b.resolution_id);
    }

    #[test]
    fn test_new_evidence_bypasses_seen_marker() {
        let reconciler = reconciler();
        reconciler.reconcile_at(&weak_submission(), NOW).unwrap();

        let stronger = weak_submission().with_observation(obs("registry_filing", "size", "small", 1.0));
        let outcome = reconciler.reconcile_at(&stronger, NOW + 60).unwrap();
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_seen_marker_expires() {
        let config = EngineConfig {
            seen_marker_ttl_secs: 600,
            ..Default::default()
        };
        let reconciler = Reconciler::new(MemoryRegistry::new(), config).unwrap();
        reconciler.reconcile_at(&weak_submission(), NOW).unwrap();

        let later = reconciler.reconcile_at(&weak_submission(), NOW + 600).unwrap();
        assert!(matches!(later, ReconcileOutcome::Rejected(_)));
    }

    #[test]
    fn test_assess_does_not_touch_registry() {
        let reconciler = reconciler();
        let result = reconciler.assess_at(&good_submission(), NOW);
        assert!(result.is_valid);
        assert!(reconciler.lookup_at(&result.fingerprint, NOW).unwrap().is_none());

        // Nor does it leave a seen marker behind
        let weak = reconciler.assess_at(&weak_submission(), NOW);
        assert!(!weak.is_valid);
        assert!(matches!(
            reconciler.reconcile_at(&weak_submission(), NOW).unwrap(),
            ReconcileOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_refresh_keeps_more_confident_resolution() {
        let reconciler = reconciler();
        let outcome = reconciler.reconcile_at(&good_submission(), NOW).unwrap();
        let fp = outcome.fingerprint().clone();
        let stored = reconciler.lookup_at(&fp, NOW).unwrap().unwrap();

        // Passes the gate, but with less confidence than what is stored
        let weaker = EntitySubmission::new(identity())
            .with_observation(obs("website_analysis", "size", "medium", 0.7));
        let refreshed = reconciler.refresh_at(&weaker, NOW + DAY).unwrap();
        let ReconcileOutcome::Accepted { upsert, superseded, .. } = &refreshed else {
            panic!("expected acceptance, got {:?}", refreshed);
        };
        assert_eq!(*upsert, UpsertOutcome::Updated);
        assert!(!*superseded);

        let record = reconciler.lookup_at(&fp, NOW + DAY).unwrap().unwrap();
        assert_eq!(record.resolved_attributes, stored.resolved_attributes);
        assert_eq!(record.last_seen, NOW + DAY);
        assert_eq!(record.retention_expiry, NOW + 31 * DAY);
    }

    #[test]
    fn test_refresh_replaces_with_equal_or_better_resolution() {
        let reconciler = reconciler();
        let outcome = reconciler.reconcile_at(&good_submission(), NOW).unwrap();
        let fp = outcome.fingerprint().clone();

        let better = EntitySubmission::new(identity()).with_observations(vec![
            obs("linkedin", "size", "medium", 0.9),
            obs("registry_filing", "size", "medium", 1.0),
        ]);
        let refreshed = reconciler.refresh_at(&better, NOW + DAY).unwrap();
        assert!(matches!(refreshed, ReconcileOutcome::Accepted { superseded: true, .. }));

        let record = reconciler.lookup_at(&fp, NOW + DAY).unwrap().unwrap();
        assert_eq!(record.first_seen, NOW);
        assert_eq!(
            record.resolved_attributes["size"].resolved_value.as_value(),
            Some("medium")
        );
    }

    #[test]
    fn test_rejected_refresh_keeps_stored_entry() {
        let reconciler = reconciler();
        let fp = reconciler
            .reconcile_at(&good_submission(), NOW)
            .unwrap()
            .fingerprint()
            .clone();

        let outcome = reconciler.refresh_at(&weak_submission(), NOW + DAY).unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Rejected(_)));

        let record = reconciler.lookup_at(&fp, NOW + DAY).unwrap().unwrap();
        assert_eq!(record.last_seen, NOW);
    }

    #[test]
    fn test_lookup_evicts_expired_entries() {
        let reconciler = reconciler();
        let fp = reconciler
            .reconcile_at(&good_submission(), NOW)
            .unwrap()
            .fingerprint()
            .clone();

        assert!(reconciler.lookup_at(&fp, NOW + 30 * DAY - 1).unwrap().is_some());
        assert!(reconciler.lookup_at(&fp, NOW + 30 * DAY).unwrap().is_none());
        assert!(reconciler.registry().lock().unwrap().is_empty().unwrap());
    }

    #[test]
    fn test_registry_write_failure_propagates() {
        let reconciler = Reconciler::new(ReadOnlyRegistry::default(), EngineConfig::default()).unwrap();
        let result = reconciler.reconcile_at(&good_submission(), NOW);
        assert!(matches!(result, Err(EngineError::Registry(msg)) if msg.contains("disk full")));
    }

    #[test]
    fn test_shared_registry() {
        let shared = Arc::new(Mutex::new(MemoryRegistry::new()));
        let reconciler = Reconciler::with_shared(Arc::clone(&shared), EngineConfig::default()).unwrap();
        reconciler.reconcile_at(&good_submission(), NOW).unwrap();
        assert_eq!(shared.lock().unwrap().len().unwrap(), 1);
    }

    #[test]
    fn test_custom_schema() {
        let schema = AttributeSchema::empty().with_categorical("industry");
        let reconciler = reconciler().with_schema(schema);
        let submission = EntitySubmission::new(identity()).with_observations(vec![
            obs("linkedin", "industry", "Plumbing", 0.9),
            obs("yelp", "industry", "plumbing", 0.8),
        ]);
        let result = reconciler.assess_at(&submission, NOW);
        assert_eq!(
            result.resolved_data["industry"].resolved_value.as_value(),
            Some("plumbing")
        );
    }

    #[test]
    fn test_ingest_uses_configured_weights() {
        let config = EngineConfig {
            sources: crate::SourceWeights::default().with_source("linkedin", 0.9),
            ..Default::default()
        };
        let reconciler = Reconciler::new(MemoryRegistry::new(), config).unwrap();
        let report = reconciler.ingest(vec![
            RawObservation::new("linkedin", "size", "small", NOW),
            RawObservation::new("blog", "size", "small", NOW),
            RawObservation::new("blog", "", "small", NOW),
        ]);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.accepted[0].source_reliability_weight(), 0.9);
        assert_eq!(report.accepted[1].source_reliability_weight(), 0.5);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_incomplete_identity_is_reported() {
        let reconciler = reconciler();
        let submission = EntitySubmission::new(RawIdentity::named("Acme Widgets").with_website("acme.com"))
            .with_observations(good_submission().observations);
        let outcome = reconciler.reconcile_at(&submission, NOW).unwrap();
        let result = outcome.validation().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.missing_identity_fields.len(), 2);
    }
}
