//! Identity module - raw and normalized identifying fields

use std::fmt;

/// Identifying fields exactly as a connector reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIdentity {
    /// Business name (e.g. "Acme Plumbing Pty Ltd")
    pub name: Option<String>,

    /// Website or bare domain (e.g. "https://www.acme.com.au/contact")
    pub website: Option<String>,

    /// Phone number in any format
    pub phone: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// External registry identifier (ABN, company number, ...)
    pub registry_id: Option<String>,
}

impl RawIdentity {
    /// Create an identity with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the website
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Set the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the street address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the external registry identifier
    pub fn with_registry_id(mut self, registry_id: impl Into<String>) -> Self {
        self.registry_id = Some(registry_id.into());
        self
    }
}

/// One of the identifying fields that feed the fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityField {
    /// Website domain
    Domain,
    /// Business name
    Name,
    /// Phone number
    Phone,
    /// Street address
    Address,
}

impl IdentityField {
    /// Field name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityField::Domain => "domain",
            IdentityField::Name => "name",
            IdentityField::Phone => "phone",
            IdentityField::Address => "address",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized identifying fields of a business
///
/// Absent fields are empty strings. Two businesses that differ only in a
/// field one of them lacks produce the same fingerprint; that precision loss
/// is surfaced through [`BusinessIdentity::missing_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BusinessIdentity {
    /// Domain without protocol, `www.` or path
    pub domain: String,

    /// Lowercase name without punctuation or entity suffixes
    pub normalized_name: String,

    /// National-format digits without country code or trunk zero
    pub phone_normalized: String,

    /// Lowercase address without street-type tokens
    pub address_normalized: String,

    /// External registry identifier, carried but not fingerprinted
    pub registry_id: Option<String>,
}

impl BusinessIdentity {
    /// Fields that normalized to an empty string
    pub fn missing_fields(&self) -> Vec<IdentityField> {
        let mut missing = Vec::new();
        if self.domain.is_empty() {
            missing.push(IdentityField::Domain);
        }
        if self.normalized_name.is_empty() {
            missing.push(IdentityField::Name);
        }
        if self.phone_normalized.is_empty() {
            missing.push(IdentityField::Phone);
        }
        if self.address_normalized.is_empty() {
            missing.push(IdentityField::Address);
        }
        missing
    }

    /// True when no identifying field survived normalization
    pub fn is_empty(&self) -> bool {
        self.missing_fields().len() == 4
    }
}

/// Stable content hash of a [`BusinessIdentity`], used as the registry key
///
/// Stored as lowercase hex so it can double as a JSON object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed hex digest
    ///
    /// # Errors
    /// Returns error if the value is empty or not lowercase hex
    pub fn from_hex(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.is_empty() {
            return Err("Fingerprint cannot be empty".to_string());
        }
        if !value.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
            return Err(format!("Fingerprint '{}' is not lowercase hex", value));
        }
        Ok(Self(value))
    }

    /// Hex-encode raw digest bytes
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(hex_digest(bytes))
    }

    /// Hex digest as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

/// Lowercase hex encoding of digest bytes
pub fn hex_digest(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        let identity = BusinessIdentity {
            domain: "acme.com".to_string(),
            normalized_name: "acme".to_string(),
            ..Default::default()
        };
        assert_eq!(
            identity.missing_fields(),
            vec![IdentityField::Phone, IdentityField::Address]
        );
        assert!(!identity.is_empty());
        assert!(BusinessIdentity::default().is_empty());
    }

    #[test]
    fn test_fingerprint_from_hex() {
        let fp = Fingerprint::from_hex("deadbeef0123456789").unwrap();
        assert_eq!(fp.as_str(), "deadbeef0123456789");
        assert_eq!(fp.short(), "deadbeef0123");
        assert!(Fingerprint::from_hex("").is_err());
        assert!(Fingerprint::from_hex("DEADBEEF").is_err());
        assert!(Fingerprint::from_hex("not-hex").is_err());
        assert_eq!(Fingerprint::from_digest(&[0x0a, 0xff]).as_str(), "0aff");
        assert_eq!(hex_digest(&[0x00, 0x7f, 0x10]), "007f10");
        assert_eq!(hex_digest(&[]), "");
    }

    #[test]
    fn test_raw_identity_builder() {
        let raw = RawIdentity::named("Acme")
            .with_website("acme.com")
            .with_phone("+61 2 9999 0000")
            .with_address("1 George St")
            .with_registry_id("ABN123");
        assert_eq!(raw.name.as_deref(), Some("Acme"));
        assert_eq!(raw.registry_id.as_deref(), Some("ABN123"));
    }
}
