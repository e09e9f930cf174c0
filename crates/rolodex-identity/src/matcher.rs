//! Duplicate matching against the registry
//!
//! Exact fingerprint lookup first, then a fuzzy fallback that scans every
//! registry entry. The scan is O(N): fine for batch runs over a few thousand
//! businesses, but large registries need blocking keys (e.g. by domain or
//! phone prefix) before it becomes a per-submission cost worth paying.

use crate::{fingerprint, MatchError, MatcherConfig};
use rolodex_domain::{BusinessIdentity, EntityRecord, Fingerprint, RegistryStore};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// How a duplicate was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// Fingerprint already present in the registry
    Exact,
    /// Weighted field similarity exceeded the threshold
    Fuzzy {
        /// Similarity of the best candidate
        similarity: f64,
    },
    /// No duplicate
    None,
}

/// Outcome of a duplicate check
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    /// Whether the identity is already in the registry
    pub is_duplicate: bool,

    /// Fingerprint of the checked identity
    pub fingerprint: Fingerprint,

    /// The matched registry entry, if any
    pub matched: Option<EntityRecord>,

    /// How the match was made
    pub match_kind: MatchKind,
}

impl DuplicateCheck {
    fn miss(fingerprint: Fingerprint) -> Self {
        Self {
            is_duplicate: false,
            fingerprint,
            matched: None,
            match_kind: MatchKind::None,
        }
    }
}

/// Read-only duplicate lookup against a [`RegistryStore`]
#[derive(Debug, Clone, Default)]
pub struct DuplicateMatcher {
    config: MatcherConfig,
}

impl DuplicateMatcher {
    /// Create a matcher with the given configuration
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Matcher configuration
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Check whether `identity` already exists in `registry`
    ///
    /// The caller is responsible for evicting expired entries beforehand.
    pub fn is_duplicate<S: RegistryStore>(
        &self,
        identity: &BusinessIdentity,
        registry: &S,
    ) -> Result<DuplicateCheck, MatchError>
    where
        S::Error: std::fmt::Display,
    {
        let fp = fingerprint(identity);

        // 1. Exact fingerprint hit
        let exact = registry
            .lookup(&fp)
            .map_err(|e| MatchError::Store(format!("Failed to look up fingerprint: {}", e)))?;
        if let Some(record) = exact {
            debug!(fingerprint = %fp.short(), "exact duplicate");
            return Ok(DuplicateCheck {
                is_duplicate: true,
                fingerprint: fp,
                matched: Some(record),
                match_kind: MatchKind::Exact,
            });
        }

        // 2. Fuzzy fallback over every entry
        let entries = registry
            .entries()
            .map_err(|e| MatchError::Store(format!("Failed to list registry entries: {}", e)))?;

        let mut best: Option<(f64, EntityRecord)> = None;
        for candidate in entries {
            let score = similarity(identity, &candidate.identity, &self.config);
            if score <= self.config.similarity_threshold {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_score, best_record)) => {
                    score > *best_score
                        || (score == *best_score && candidate.fingerprint < best_record.fingerprint)
                }
            };
            if better {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, record)) => {
                info!(
                    fingerprint = %fp.short(),
                    matched = %record.fingerprint.short(),
                    similarity = score,
                    "fuzzy duplicate match"
                );
                Ok(DuplicateCheck {
                    is_duplicate: true,
                    fingerprint: fp,
                    matched: Some(record),
                    match_kind: MatchKind::Fuzzy { similarity: score },
                })
            }
            None => Ok(DuplicateCheck::miss(fp)),
        }
    }
}

/// Weighted similarity of two normalized identities
///
/// Only dimensions present on both sides take part; a dimension missing on
/// either side is excluded rather than scored as a mismatch. Returns 0.0 when
/// no dimension is shared.
pub fn similarity(a: &BusinessIdentity, b: &BusinessIdentity, config: &MatcherConfig) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;

    if !a.domain.is_empty() && !b.domain.is_empty() {
        weighted += config.domain_weight * exact(&a.domain, &b.domain);
        total += config.domain_weight;
    }
    if !a.normalized_name.is_empty() && !b.normalized_name.is_empty() {
        weighted += config.name_weight * name_jaccard(&a.normalized_name, &b.normalized_name);
        total += config.name_weight;
    }
    if !a.phone_normalized.is_empty() && !b.phone_normalized.is_empty() {
        weighted += config.phone_weight * exact(&a.phone_normalized, &b.phone_normalized);
        total += config.phone_weight;
    }

    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Jaccard similarity of the whitespace-separated token sets of two names
pub fn name_jaccard(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

fn exact(a: &str, b: &str) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}
