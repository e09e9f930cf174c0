//! Rolodex Resolver
//!
//! Turns many, possibly contradictory observations of an attribute into a
//! single value with a confidence, using weighted plurality voting with
//! temporal decay.
//!
//! Each attribute kind has its own pure resolution function:
//! - **Categorical** (`size`): weighted plurality, close calls flagged
//! - **Numeric range** (`revenue`, `employees`): weighted midpoint, wide spreads flagged
//! - **Set-valued** (`tech_stack`): one item per category, exclusive pairs flagged
//!
//! After resolution the [`SanityChecker`] applies cross-field plausibility
//! rules (size against headcount, size against revenue).
//!
//! # Examples
//!
//! ```
//! use rolodex_domain::Observation;
//! use rolodex_resolver::{AttributeResolver, SanityChecker};
//!
//! let now = 1_700_000_000;
//! let observations = vec![
//!     Observation::new("website_analysis", "size", "small", now, 0.7).unwrap(),
//!     Observation::new("linkedin", "size", "small", now, 0.9).unwrap(),
//! ];
//!
//! let resolver = AttributeResolver::default();
//! let resolved = resolver.resolve_all(&observations, now);
//! assert_eq!(resolved["size"].resolved_value.as_value(), Some("small"));
//! assert!(SanityChecker::default().check(&resolved).is_empty());
//! ```

#![warn(missing_docs)]

mod categorical;
mod config;
mod numeric;
mod resolver;
mod sanity;
mod schema;
mod set_valued;
mod tally;

pub use categorical::resolve_categorical;
pub use config::{DecayConfig, ResolverConfig};
pub use numeric::resolve_numeric_range;
pub use resolver::AttributeResolver;
pub use sanity::{ResolvedMap, SanityChecker, SanityRule, REVENUE_SIZES, SIZE_EMPLOYEE_RANGES};
pub use schema::{AttributeSchema, RangeBucket, RangeScale, TechCatalog};
pub use set_valued::resolve_set_valued;
