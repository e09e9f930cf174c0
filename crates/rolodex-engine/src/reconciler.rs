//! Core Reconciler implementation

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ingest::{IngestReport, RawObservation};
use crate::locks::FingerprintLocks;
use crate::seen::{marker_key, SeenMarkers};
use crate::types::{EntitySubmission, ReconcileOutcome};
use rolodex_domain::{BusinessIdentity, EntityRecord, Fingerprint, RegistryStore};
use rolodex_gatekeeper::{Gatekeeper, ValidationResult};
use rolodex_identity::{fingerprint, normalize, DuplicateCheck, DuplicateMatcher, MatchError};
use rolodex_resolver::{AttributeResolver, AttributeSchema, SanityChecker};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The Reconciler turns submissions into registry entries
///
/// One instance is meant to be shared (`Arc<Reconciler<_>>`) by every caller
/// writing to the same registry.
pub struct Reconciler<S>
where
    S: RegistryStore,
{
    registry: Arc<Mutex<S>>,
    config: EngineConfig,
    matcher: DuplicateMatcher,
    resolver: AttributeResolver,
    sanity: SanityChecker,
    gatekeeper: Gatekeeper,
    locks: FingerprintLocks,
    seen: SeenMarkers,
}

impl<S> Reconciler<S>
where
    S: RegistryStore,
    S::Error: std::fmt::Display,
{
    /// Create a Reconciler owning `registry`
    pub fn new(registry: S, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_shared(Arc::new(Mutex::new(registry)), config)
    }

    /// Create a Reconciler over a registry shared with other components
    /// (e.g. a janitor worker)
    pub fn with_shared(registry: Arc<Mutex<S>>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        let schema = AttributeSchema::default();
        Ok(Self {
            registry,
            matcher: DuplicateMatcher::new(config.matcher.clone()),
            resolver: AttributeResolver::new(config.resolver.clone(), schema.clone()),
            sanity: SanityChecker::new(schema),
            gatekeeper: Gatekeeper::new(config.gate.clone()),
            locks: FingerprintLocks::default(),
            seen: SeenMarkers::new(config.seen_marker_ttl_secs),
            config,
        })
    }

    /// Replace the attribute schema used for resolution and sanity checks
    pub fn with_schema(mut self, schema: AttributeSchema) -> Self {
        self.resolver = AttributeResolver::new(self.config.resolver.clone(), schema.clone());
        self.sanity = SanityChecker::new(schema);
        self
    }

    /// Handle to the shared registry
    pub fn registry(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.registry)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate connector records against the configured source weights
    pub fn ingest(&self, raw: impl IntoIterator<Item = RawObservation>) -> IngestReport {
        self.config.sources.ingest(raw)
    }

    /// Reconcile a submission using the wall clock
    pub fn reconcile(&self, submission: &EntitySubmission) -> Result<ReconcileOutcome, EngineError> {
        self.reconcile_at(submission, current_timestamp())
    }

    /// Re-resolve a known entity using the wall clock
    pub fn refresh(&self, submission: &EntitySubmission) -> Result<ReconcileOutcome, EngineError> {
        self.refresh_at(submission, current_timestamp())
    }

    /// Look up a registry entry using the wall clock
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, EngineError> {
        self.lookup_at(fingerprint, current_timestamp())
    }

    /// Resolve and gate a submission without touching the registry
    pub fn assess_at(&self, submission: &EntitySubmission, now: u64) -> ValidationResult {
        let identity = normalize(&submission.identity);
        let fp = fingerprint(&identity);
        self.evaluate(fp, &identity, submission, now)
    }

    /// Reconcile a submission at time `now`
    ///
    /// # Process
    ///
    /// 1. Normalize and fingerprint the identity
    /// 2. Take the fingerprint's lock
    /// 3. Evict expired entries, then check for duplicates
    /// 4. Return an earlier verdict if this exact input was just rejected
    /// 5. Resolve attributes, run sanity checks, gate
    /// 6. Upsert on acceptance, remember the input on rejection
    pub fn reconcile_at(
        &self,
        submission: &EntitySubmission,
        now: u64,
    ) -> Result<ReconcileOutcome, EngineError> {
        let (identity, fp) = self.identify(submission);

        let slot = self.locks.slot(&fp)?;
        let _guard = slot
            .lock()
            .map_err(|_| EngineError::LockPoisoned(format!("fingerprint {}", fp.short())))?;

        let check = self.with_registry(|registry| {
            evict(registry, now)?;
            self.find_duplicate(&identity, registry)
        })?;
        if check.is_duplicate {
            info!(
                fingerprint = %fp.short(),
                kind = ?check.match_kind,
                "duplicate, skipping resolution"
            );
            return Ok(ReconcileOutcome::Duplicate(check));
        }

        let key = marker_key(&fp, &submission.observations);
        if let Some(verdict) = self.seen.recall(&key, now)? {
            debug!(fingerprint = %fp.short(), "input rejected recently, reusing verdict");
            return Ok(ReconcileOutcome::RecentlyRejected(verdict));
        }

        let result = self.evaluate(fp, &identity, submission, now);
        if !result.is_valid {
            info!(
                fingerprint = %result.fingerprint.short(),
                confidence = result.confidence_score,
                conflicts = result.conflicts_detected.len(),
                "resolution rejected"
            );
            self.seen.remember(key, result.clone(), now)?;
            return Ok(ReconcileOutcome::Rejected(result));
        }

        self.commit(result, &identity, None, now)
    }

    /// Re-resolve an entity at time `now`, replacing its stored resolution
    ///
    /// No duplicate short-circuit and no seen markers. The stored entry is
    /// found the same way `reconcile_at` finds duplicates, so a reworded
    /// identity that fuzzily matches an existing entry refreshes that entry
    /// under its original fingerprint instead of adding a second one.
    /// `first_seen` of the stored entry is kept; its attributes are replaced
    /// only when the new confidence is at least the stored one.
    pub fn refresh_at(
        &self,
        submission: &EntitySubmission,
        now: u64,
    ) -> Result<ReconcileOutcome, EngineError> {
        let (identity, fp) = self.identify(submission);

        let slot = self.locks.slot(&fp)?;
        let _guard = slot
            .lock()
            .map_err(|_| EngineError::LockPoisoned(format!("fingerprint {}", fp.short())))?;

        let check = self.with_registry(|registry| {
            evict(registry, now)?;
            self.find_duplicate(&identity, registry)
        })?;
        let existing = check.matched;

        let mut result = self.evaluate(fp, &identity, submission, now);
        if !result.is_valid {
            info!(
                fingerprint = %result.fingerprint.short(),
                confidence = result.confidence_score,
                "refresh rejected, stored entry left as is"
            );
            return Ok(ReconcileOutcome::Rejected(result));
        }

        // A fuzzy match keeps the stored row's key and identity
        let identity = match &existing {
            Some(stored) if stored.fingerprint != result.fingerprint => {
                debug!(
                    fingerprint = %result.fingerprint.short(),
                    matched = %stored.fingerprint.short(),
                    kind = ?check.match_kind,
                    "refreshing matched entry under its stored fingerprint"
                );
                result.fingerprint = stored.fingerprint.clone();
                stored.identity.clone()
            }
            _ => identity,
        };

        self.commit(result, &identity, existing.as_ref(), now)
    }

    /// Registry entry for `fingerprint` at time `now`
    ///
    /// Expired entries are evicted first, so a stale record is never returned.
    pub fn lookup_at(
        &self,
        fingerprint: &Fingerprint,
        now: u64,
    ) -> Result<Option<EntityRecord>, EngineError> {
        self.with_registry(|registry| {
            evict(registry, now)?;
            registry
                .lookup(fingerprint)
                .map_err(|e| EngineError::Registry(format!("Failed to look up entry: {}", e)))
        })
    }

    fn identify(&self, submission: &EntitySubmission) -> (BusinessIdentity, Fingerprint) {
        let identity = normalize(&submission.identity);
        let fp = fingerprint(&identity);

        let missing = identity.missing_fields();
        if !missing.is_empty() {
            let fields: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            warn!(
                fingerprint = %fp.short(),
                missing = %fields.join(","),
                "identity incomplete, fingerprint is less precise"
            );
        }
        (identity, fp)
    }

    fn find_duplicate(
        &self,
        identity: &BusinessIdentity,
        registry: &S,
    ) -> Result<DuplicateCheck, EngineError> {
        self.matcher
            .is_duplicate(identity, registry)
            .map_err(|e| match e {
                MatchError::Store(msg) => EngineError::Registry(msg),
                other => EngineError::Match(other),
            })
    }

    fn evaluate(
        &self,
        fp: Fingerprint,
        identity: &BusinessIdentity,
        submission: &EntitySubmission,
        now: u64,
    ) -> ValidationResult {
        let resolved = self.resolver.resolve_all(&submission.observations, now);
        let cross_field = self.sanity.check(&resolved);
        debug!(
            fingerprint = %fp.short(),
            observations = submission.observations.len(),
            attributes = resolved.len(),
            cross_field = cross_field.len(),
            "attributes resolved"
        );
        self.gatekeeper.evaluate(fp, identity, resolved, cross_field)
    }

    fn commit(
        &self,
        result: ValidationResult,
        identity: &BusinessIdentity,
        existing: Option<&EntityRecord>,
        now: u64,
    ) -> Result<ReconcileOutcome, EngineError> {
        let commit = self.gatekeeper.commit(&result, identity, existing, now)?;
        let upsert = self.with_registry(|registry| {
            registry
                .upsert(commit.record)
                .map_err(|e| EngineError::Registry(format!("Failed to upsert entry: {}", e)))
        })?;

        info!(
            fingerprint = %result.fingerprint.short(),
            confidence = result.confidence_score,
            outcome = ?upsert,
            superseded = commit.superseded,
            "resolution accepted"
        );

        Ok(ReconcileOutcome::Accepted {
            result,
            upsert,
            superseded: commit.superseded,
        })
    }

    fn with_registry<T>(
        &self,
        f: impl FnOnce(&mut S) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| EngineError::LockPoisoned("registry".to_string()))?;
        f(&mut registry)
    }
}

fn evict<S>(registry: &mut S, now: u64) -> Result<(), EngineError>
where
    S: RegistryStore,
    S::Error: std::fmt::Display,
{
    let evicted = registry
        .evict_expired(now)
        .map_err(|e| EngineError::Registry(format!("Failed to evict expired entries: {}", e)))?;
    if !evicted.is_empty() {
        debug!(count = evicted.len(), "evicted expired entries before lookup");
    }
    Ok(())
}
