//! Fingerprint generation
//!
//! SHA-256 over the normalized fields joined with the ASCII unit separator.
//! The version prefix lets a future change to normalization produce a
//! disjoint key space instead of silently colliding with old rows.

use rolodex_domain::{BusinessIdentity, Fingerprint};
use sha2::{Digest, Sha256};

const FINGERPRINT_VERSION: &str = "v1";
const FIELD_SEPARATOR: u8 = 0x1f;

/// Deterministic content hash of a normalized identity
///
/// `registry_id` is deliberately left out: it is absent for most scraped
/// businesses and would split otherwise identical identities.
pub fn fingerprint(identity: &BusinessIdentity) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_VERSION.as_bytes());
    for field in [
        &identity.domain,
        &identity.normalized_name,
        &identity.phone_normalized,
        &identity.address_normalized,
    ] {
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(field.as_bytes());
    }
    Fingerprint::from_digest(&hasher.finalize())
}
