//! Cross-field sanity checks
//!
//! Runs after every attribute is resolved. Each rule compares two resolved
//! attributes against a fixed table of expected correlations and yields a
//! conflict when they disagree. Rules skip silently when either side is
//! missing, unknown, or outside the table.

use crate::schema::{AttributeSchema, RangeBucket};
use rolodex_domain::{Conflict, ConflictKind, ResolvedAttribute, Severity};
use std::collections::BTreeMap;

/// Resolved attributes keyed by name
pub type ResolvedMap = BTreeMap<String, ResolvedAttribute>;

/// Expected headcount per size bucket: (size, min employees, max employees)
pub const SIZE_EMPLOYEE_RANGES: [(&str, f64, Option<f64>); 5] = [
    ("micro", 1.0, Some(10.0)),
    ("small", 1.0, Some(50.0)),
    ("medium", 51.0, Some(500.0)),
    ("large", 201.0, None),
    ("enterprise", 1001.0, None),
];

/// Plausible size buckets per revenue bucket
pub const REVENUE_SIZES: [(&str, &[&str]); 6] = [
    ("$0-100K", &["micro", "small"]),
    ("$100K-500K", &["micro", "small", "medium"]),
    ("$500K-1M", &["small", "medium"]),
    ("$1M-5M", &["small", "medium", "large"]),
    ("$5M-10M", &["medium", "large"]),
    ("$10M+", &["large", "enterprise"]),
];

/// A single plausibility rule
#[derive(Debug, Clone, Copy)]
pub struct SanityRule {
    /// Stable rule name, also the conflict code
    pub name: &'static str,

    /// Severity of a violation
    pub severity: Severity,

    /// The two attributes compared
    pub attributes: [&'static str; 2],

    /// Returns a message when the rule is violated
    pub check: fn(&ResolvedMap, &AttributeSchema) -> Option<String>,
}

/// Applies the rule table to resolved attributes
#[derive(Debug, Clone)]
pub struct SanityChecker {
    rules: Vec<SanityRule>,
    schema: AttributeSchema,
}

impl Default for SanityChecker {
    fn default() -> Self {
        Self::new(AttributeSchema::default())
    }
}

impl SanityChecker {
    /// Checker with the standard rule table
    pub fn new(schema: AttributeSchema) -> Self {
        Self {
            rules: default_rules(),
            schema,
        }
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[SanityRule] {
        &self.rules
    }

    /// Evaluate every rule, in table order
    pub fn check(&self, resolved: &ResolvedMap) -> Vec<Conflict> {
        self.rules
            .iter()
            .filter_map(|rule| {
                (rule.check)(resolved, &self.schema).map(|message| {
                    Conflict::new(
                        rule.name,
                        rule.attributes.iter().map(|a| a.to_string()).collect(),
                        rule.severity,
                        ConflictKind::CrossField {
                            rule: rule.name.to_string(),
                        },
                        message,
                    )
                })
            })
            .collect()
    }
}

fn default_rules() -> Vec<SanityRule> {
    vec![
        SanityRule {
            name: "size_employee_mismatch",
            severity: Severity::Critical,
            attributes: ["size", "employees"],
            check: size_matches_employees,
        },
        SanityRule {
            name: "size_revenue_mismatch",
            severity: Severity::Warning,
            attributes: ["size", "revenue"],
            check: size_matches_revenue,
        },
    ]
}

fn resolved_value<'a>(resolved: &'a ResolvedMap, name: &str) -> Option<&'a str> {
    resolved.get(name)?.resolved_value.as_value()
}

fn size_matches_employees(resolved: &ResolvedMap, schema: &AttributeSchema) -> Option<String> {
    let size = resolved_value(resolved, "size")?;
    let employees = resolved_value(resolved, "employees")?;
    let (_, min, max) = SIZE_EMPLOYEE_RANGES.iter().find(|(s, _, _)| *s == size)?;
    let bucket = schema.scale_for("employees")?.bucket(employees)?;

    if bucket_within(bucket, *min, *max) {
        None
    } else {
        Some(format!(
            "size '{}' expects {} employees but resolved headcount is {}",
            size,
            describe(*min, *max),
            bucket.label
        ))
    }
}

fn size_matches_revenue(resolved: &ResolvedMap, schema: &AttributeSchema) -> Option<String> {
    let size = resolved_value(resolved, "size")?;
    let revenue = resolved_value(resolved, "revenue")?;
    // Only judge sizes the employee table knows about
    SIZE_EMPLOYEE_RANGES.iter().find(|(s, _, _)| *s == size)?;
    let bucket = schema.scale_for("revenue")?.bucket(revenue)?;
    let (_, sizes) = REVENUE_SIZES.iter().find(|(label, _)| *label == bucket.label)?;

    if sizes.contains(&size) {
        None
    } else {
        Some(format!(
            "size '{}' is implausible for revenue {} (expected one of {})",
            size,
            bucket.label,
            sizes.join(", ")
        ))
    }
}

fn bucket_within(bucket: &RangeBucket, min: f64, max: Option<f64>) -> bool {
    if bucket.low < min {
        return false;
    }
    match (bucket.high, max) {
        (_, None) => true,
        (Some(high), Some(max)) => high <= max,
        (None, Some(_)) => false,
    }
}

fn describe(min: f64, max: Option<f64>) -> String {
    match max {
        Some(max) => format!("{}-{}", min, max),
        None => format!("{}+", min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_domain::{AttributeKind, ResolvedValue};

    fn attr(name: &str, value: &str) -> (String, ResolvedAttribute) {
        let mut resolved = ResolvedAttribute::unknown(name, AttributeKind::Categorical);
        resolved.resolved_value = ResolvedValue::Value(value.to_string());
        resolved.confidence = 0.9;
        (name.to_string(), resolved)
    }

    fn map(entries: Vec<(String, ResolvedAttribute)>) -> ResolvedMap {
        entries.into_iter().collect()
    }

    #[test]
    fn test_consistent_attributes_pass() {
        let checker = SanityChecker::default();
        let resolved = map(vec![
            attr("size", "small"),
            attr("employees", "11-50"),
            attr("revenue", "$1M-5M"),
        ]);
        assert!(checker.check(&resolved).is_empty());
    }

    #[test]
    fn test_size_employee_mismatch_is_critical() {
        let checker = SanityChecker::default();
        let resolved = map(vec![attr("size", "micro"), attr("employees", "201-500")]);

        let conflicts = checker.check(&resolved);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].code, "size_employee_mismatch");
        assert!(conflicts[0].is_critical());
        assert_eq!(conflicts[0].attributes, vec!["size", "employees"]);
        assert_eq!(
            conflicts[0].kind,
            ConflictKind::CrossField {
                rule: "size_employee_mismatch".to_string()
            }
        );
    }

    #[test]
    fn test_open_ended_buckets() {
        let checker = SanityChecker::default();
        let ok = map(vec![attr("size", "large"), attr("employees", "1000+")]);
        assert!(checker.check(&ok).is_empty());

        let bad = map(vec![attr("size", "medium"), attr("employees", "1000+")]);
        assert_eq!(checker.check(&bad).len(), 1);
    }

    #[test]
    fn test_size_revenue_mismatch_is_warning() {
        let checker = SanityChecker::default();
        let resolved = map(vec![attr("size", "enterprise"), attr("revenue", "$0-100K")]);

        let conflicts = checker.check(&resolved);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].code, "size_revenue_mismatch");
        assert_eq!(conflicts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_rule_table_order() {
        let checker = SanityChecker::default();
        let resolved = map(vec![
            attr("size", "enterprise"),
            attr("employees", "1-10"),
            attr("revenue", "$0-100K"),
        ]);
        let codes: Vec<_> = checker.check(&resolved).into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["size_employee_mismatch", "size_revenue_mismatch"]);
    }

    #[test]
    fn test_rules_skip_missing_or_unknown() {
        let checker = SanityChecker::default();
        let only_size = map(vec![attr("size", "micro")]);
        assert!(checker.check(&only_size).is_empty());

        let mut unknown = map(vec![attr("size", "micro")]);
        unknown.insert(
            "employees".to_string(),
            ResolvedAttribute::unknown("employees", AttributeKind::NumericRange),
        );
        assert!(checker.check(&unknown).is_empty());

        let unlisted_size = map(vec![attr("size", "gigantic"), attr("employees", "1-10")]);
        assert!(checker.check(&unlisted_size).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let checker = SanityChecker::default();
        let resolved = map(vec![attr("size", "micro"), attr("employees", "1000+")]);
        assert_eq!(checker.check(&resolved), checker.check(&resolved));
    }
}
