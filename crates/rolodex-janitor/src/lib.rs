//! Rolodex Janitor
//!
//! Background maintenance service that evicts registry entries whose
//! retention window has closed.
//!
//! # Overview
//!
//! Every accepted entity carries a `retention_expiry`. Reconciliation
//! evicts expired rows inline before each lookup, so correctness never
//! depends on the janitor; it exists so that a registry nobody queries
//! still sheds stale entries on schedule.
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use rolodex_janitor::Janitor;
//! use rolodex_store::JsonFileRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = JsonFileRegistry::open("registry.json")?;
//! let mut janitor = Janitor::default_config();
//!
//! let metrics = janitor.sweep(&mut registry)?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use rolodex_janitor::{JanitorConfig, JanitorWorker};
//! use rolodex_store::JsonFileRegistry;
//! use std::sync::{Arc, Mutex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(Mutex::new(JsonFileRegistry::open("registry.json")?));
//!     let mut worker = JanitorWorker::new(JanitorConfig::default());
//!     worker.run(registry).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! sweep_interval_minutes = 60
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod worker;

pub use config::JanitorConfig;
pub use error::JanitorError;
pub use janitor::Janitor;
pub use metrics::JanitorMetrics;
pub use worker::JanitorWorker;
