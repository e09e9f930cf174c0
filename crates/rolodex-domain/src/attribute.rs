//! Attribute module - attribute kinds and resolution outcomes

use crate::Conflict;
use std::collections::BTreeMap;
use std::fmt;

/// How observations of an attribute are combined
///
/// Closed set: every resolution rule is selected by one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// One value out of a discrete set (e.g. size bucket)
    Categorical,

    /// A value on an ordered range scale (e.g. revenue band)
    NumericRange,

    /// A set of items grouped by category (e.g. tech stack)
    SetValued,
}

impl AttributeKind {
    /// Kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Categorical => "categorical",
            AttributeKind::NumericRange => "numeric_range",
            AttributeKind::SetValued => "set_valued",
        }
    }

    /// Parse a kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "categorical" => Some(AttributeKind::Categorical),
            "numeric_range" => Some(AttributeKind::NumericRange),
            "set_valued" => Some(AttributeKind::SetValued),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid attribute kind: {}", s))
    }
}

/// Value chosen by resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// No usable observations
    Unknown,

    /// A single value (categorical or range label)
    Value(String),

    /// Kept items of a set-valued attribute, sorted
    Items(Vec<String>),
}

impl ResolvedValue {
    /// True when resolution had nothing to go on
    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedValue::Unknown)
    }

    /// The single value, if this is one
    pub fn as_value(&self) -> Option<&str> {
        match self {
            ResolvedValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Unknown => f.write_str("unknown"),
            ResolvedValue::Value(v) => f.write_str(v),
            ResolvedValue::Items(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Outcome of resolving all observations of one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    /// Attribute name
    pub attribute_name: String,

    /// Rule that produced this resolution
    pub kind: AttributeKind,

    /// Chosen value
    pub resolved_value: ResolvedValue,

    /// Confidence in the chosen value [0.0, 1.0]
    pub confidence: f64,

    /// Accumulated vote weight per candidate value
    pub vote_distribution: BTreeMap<String, f64>,

    /// Number of observations that voted
    pub observation_count: usize,

    /// Attribute-level conflicts detected while voting
    pub conflicts: Vec<Conflict>,
}

impl ResolvedAttribute {
    /// Resolution of an attribute nobody reported
    pub fn unknown(attribute_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            kind,
            resolved_value: ResolvedValue::Unknown,
            confidence: 0.0,
            vote_distribution: BTreeMap::new(),
            observation_count: 0,
            conflicts: Vec::new(),
        }
    }

    /// True if any attribute-level conflict was raised
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_resolution() {
        let attr = ResolvedAttribute::unknown("size", AttributeKind::Categorical);
        assert!(attr.resolved_value.is_unknown());
        assert_eq!(attr.confidence, 0.0);
        assert_eq!(attr.resolved_value.to_string(), "unknown");
        assert!(!attr.has_conflicts());
    }

    #[test]
    fn test_resolved_value_display() {
        assert_eq!(ResolvedValue::Value("small".into()).to_string(), "small");
        assert_eq!(
            ResolvedValue::Items(vec!["shopify".into(), "stripe".into()]).to_string(),
            "shopify,stripe"
        );
        assert_eq!(ResolvedValue::Value("small".into()).as_value(), Some("small"));
        assert_eq!(ResolvedValue::Unknown.as_value(), None);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("set_valued".parse::<AttributeKind>(), Ok(AttributeKind::SetValued));
        assert!("vector".parse::<AttributeKind>().is_err());
        assert_eq!(AttributeKind::NumericRange.as_str(), "numeric_range");
    }
}
