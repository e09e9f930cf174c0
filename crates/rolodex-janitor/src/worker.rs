//! Background worker for continuous Janitor operation

use crate::{Janitor, JanitorConfig, JanitorError, JanitorMetrics};
use rolodex_domain::RegistryStore;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration};

/// Background worker that runs the Janitor on a schedule
///
/// The registry is shared with the reconciler through `Arc<Mutex<S>>`;
/// the lock is held only for the duration of one sweep.
///
/// # Examples
///
/// ```no_run
/// use rolodex_janitor::{JanitorConfig, JanitorWorker};
/// use rolodex_store::JsonFileRegistry;
/// use std::sync::{Arc, Mutex};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = Arc::new(Mutex::new(JsonFileRegistry::open("registry.json")?));
///     let mut worker = JanitorWorker::new(JanitorConfig::default());
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(registry).await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker {
    janitor: Janitor,
    interval: Duration,
}

impl JanitorWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        let interval = config.sweep_interval();
        Self {
            janitor: Janitor::new(config),
            interval,
        }
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    fn sweep_shared<S>(&mut self, store: &Mutex<S>) -> Result<JanitorMetrics, JanitorError>
    where
        S: RegistryStore,
        S::Error: std::fmt::Display,
    {
        let mut guard = store
            .lock()
            .map_err(|_| JanitorError::Worker("registry lock poisoned".to_string()))?;
        self.janitor.sweep(&mut *guard)
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// Failed sweeps are logged and retried on the next tick.
    pub async fn run<S>(&mut self, store: Arc<Mutex<S>>) -> Result<(), JanitorError>
    where
        S: RegistryStore,
        S::Error: std::fmt::Display,
    {
        self.run_until(store, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Run the worker until `shutdown` completes
    pub async fn run_until<S, F>(&mut self, store: Arc<Mutex<S>>, shutdown: F) -> Result<(), JanitorError>
    where
        S: RegistryStore,
        S::Error: std::fmt::Display,
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        tokio::pin!(shutdown);

        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting sweep cycle");

                    match self.sweep_shared(&store) {
                        Ok(metrics) => {
                            tracing::info!(
                                "Sweep completed: {} evicted ({} total)",
                                metrics.last_evicted,
                                metrics.evicted
                            );
                        }
                        Err(e) => {
                            tracing::error!("Sweep failed: {}", e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break;
                }
            }
        }

        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());
        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    ///
    /// Stops at the first failed sweep.
    pub async fn run_cycles<S>(&mut self, store: Arc<Mutex<S>>, cycles: usize) -> Result<(), JanitorError>
    where
        S: RegistryStore,
        S::Error: std::fmt::Display,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);

            match self.sweep_shared(&store) {
                Ok(metrics) => {
                    tracing::info!(
                        "Sweep {}/{} completed: {} evicted",
                        cycle + 1,
                        cycles,
                        metrics.last_evicted
                    );
                }
                Err(e) => {
                    tracing::error!("Sweep {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Janitor finished {} cycles. Final metrics:\n{}",
            cycles,
            self.janitor.metrics().summary()
        );
        Ok(())
    }

    /// Get a reference to the janitor's current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        self.janitor.metrics()
    }

    /// Reset the janitor's metrics counters
    pub fn reset_metrics(&mut self) {
        self.janitor.reset_metrics();
    }
}
