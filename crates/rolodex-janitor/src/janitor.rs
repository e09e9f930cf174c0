//! Core Janitor implementation for retention eviction

use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use rolodex_domain::{Fingerprint, RegistryStore};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Janitor service that removes registry entries past their retention window
///
/// Reconciliation already evicts inline before every lookup; the janitor
/// keeps idle registries from holding expired rows indefinitely.
///
/// # Examples
///
/// ```no_run
/// use rolodex_janitor::Janitor;
/// use rolodex_store::JsonFileRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = JsonFileRegistry::open("registry.json")?;
/// let mut janitor = Janitor::default_config();
///
/// let metrics = janitor.sweep(&mut registry)?;
/// println!("{}", metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        Self {
            config,
            metrics: JanitorMetrics::new(),
        }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Sweep using the current wall clock
    pub fn sweep<S: RegistryStore>(&mut self, store: &mut S) -> Result<JanitorMetrics, JanitorError>
    where
        S::Error: std::fmt::Display,
    {
        self.sweep_at(store, current_timestamp())
    }

    /// Evict every entry whose retention window has closed at `now`
    ///
    /// In dry-run mode expired entries are only logged. Returns the
    /// updated metrics after the sweep.
    pub fn sweep_at<S: RegistryStore>(
        &mut self,
        store: &mut S,
        now: u64,
    ) -> Result<JanitorMetrics, JanitorError>
    where
        S::Error: std::fmt::Display,
    {
        let start = Instant::now();

        let result = if self.config.dry_run {
            self.report_expired(store, now)
        } else {
            self.evict(store, now)
        };

        if let Err(e) = result {
            self.metrics.record_failure();
            return Err(e);
        }

        self.metrics.record_sweep(start.elapsed());
        Ok(self.metrics.clone())
    }

    fn evict<S: RegistryStore>(&mut self, store: &mut S, now: u64) -> Result<(), JanitorError>
    where
        S::Error: std::fmt::Display,
    {
        let evicted = store
            .evict_expired(now)
            .map_err(|e| JanitorError::Store(e.to_string()))?;

        for fingerprint in &evicted {
            tracing::debug!("Evicted {}", fingerprint.short());
        }
        if !evicted.is_empty() {
            tracing::info!("Evicted {} expired registry entries", evicted.len());
        }

        self.metrics.record_eviction(evicted.len());
        Ok(())
    }

    fn report_expired<S: RegistryStore>(&mut self, store: &S, now: u64) -> Result<(), JanitorError>
    where
        S::Error: std::fmt::Display,
    {
        let expired: Vec<Fingerprint> = store
            .entries()
            .map_err(|e| JanitorError::Store(e.to_string()))?
            .into_iter()
            .filter(|record| record.is_expired(now))
            .map(|record| record.fingerprint)
            .collect();

        if !expired.is_empty() {
            tracing::info!(
                "DRY RUN: Would evict {} expired registry entries",
                expired.len()
            );
        }

        self.metrics.record_dry_run(expired.len());
        Ok(())
    }
}
