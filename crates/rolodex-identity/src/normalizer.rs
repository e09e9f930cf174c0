//! Identity normalization
//!
//! All functions here are pure. A missing raw field becomes an empty
//! string, which the fingerprint treats like any other value.

use rolodex_domain::{BusinessIdentity, RawIdentity};

/// Business-entity suffix tokens stripped from the end of a name
pub const ENTITY_SUFFIXES: [&str; 16] = [
    "ltd", "limited", "inc", "incorporated", "pty", "proprietary", "llc", "llp", "corp",
    "corporation", "co", "plc", "gmbh", "company", "pte", "lp",
];

/// Street-type tokens dropped from addresses
pub const STREET_TYPES: [&str; 30] = [
    "st", "street", "rd", "road", "ave", "av", "avenue", "blvd", "boulevard", "dr", "drive",
    "ln", "lane", "ct", "court", "pl", "place", "hwy", "highway", "pde", "parade", "cres",
    "crescent", "tce", "terrace", "way", "cct", "circuit", "sq", "square",
];

/// Country calling codes stripped after an international prefix, longest first
pub const COUNTRY_CODES: [&str; 6] = ["353", "61", "64", "44", "27", "1"];

/// Normalize every identifying field of a raw identity
pub fn normalize(raw: &RawIdentity) -> BusinessIdentity {
    BusinessIdentity {
        domain: raw.website.as_deref().map(normalize_domain).unwrap_or_default(),
        normalized_name: raw.name.as_deref().map(normalize_name).unwrap_or_default(),
        phone_normalized: raw.phone.as_deref().map(normalize_phone).unwrap_or_default(),
        address_normalized: raw.address.as_deref().map(normalize_address).unwrap_or_default(),
        registry_id: raw
            .registry_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
    }
}

/// `https://www.Acme.com.au:443/contact?x=1` → `acme.com.au`
pub fn normalize_domain(raw: &str) -> String {
    let mut domain = raw.trim().to_lowercase();

    if let Some(idx) = domain.find("://") {
        domain = domain[idx + 3..].to_string();
    }
    if let Some(idx) = domain.find(['/', '?', '#']) {
        domain.truncate(idx);
    }
    // Credentials never identify a business
    if let Some(idx) = domain.rfind('@') {
        domain = domain[idx + 1..].to_string();
    }
    if let Some(idx) = domain.find(':') {
        domain.truncate(idx);
    }
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    domain.trim_end_matches('.').to_string()
}

/// `Acme Plumbing & Gas Pty. Ltd.` → `acme plumbing gas`
pub fn normalize_name(raw: &str) -> String {
    let mut tokens = tokenize(raw);
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|t| ENTITY_SUFFIXES.contains(&t.as_str()))
    {
        tokens.pop();
    }
    // A name made only of a suffix ("Co") is kept rather than emptied
    tokens.join(" ")
}

/// `+61 (02) 9999-0000` → `299990000`
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let international = if trimmed.starts_with('+') {
        true
    } else if digits.starts_with("00") {
        digits.replace_range(..2, "");
        true
    } else {
        false
    };

    if international {
        if let Some(code) = COUNTRY_CODES.iter().find(|code| digits.starts_with(*code)) {
            digits.replace_range(..code.len(), "");
        }
    }

    if let Some(rest) = digits.strip_prefix('0') {
        digits = rest.to_string();
    }
    digits
}

/// `Unit 4, 12 George St.` → `unit 4 12 george`
pub fn normalize_address(raw: &str) -> String {
    tokenize(raw)
        .into_iter()
        .filter(|t| !STREET_TYPES.contains(&t.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, punctuation to whitespace, split
fn tokenize(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
