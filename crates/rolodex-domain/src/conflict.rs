//! Conflict module - disagreements between sources or resolved attributes

use std::fmt;

/// How much a conflict matters to the confidence gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Informational; costs confidence but never blocks acceptance
    Warning,
    /// Blocks acceptance regardless of confidence
    Critical,
}

impl Severity {
    /// Severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Parse a severity from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured detail of what disagreed
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    /// Runner-up categorical value came within the close-call ratio of the winner
    CloseVote {
        /// Winning value
        winner: String,
        /// Second-highest value
        runner_up: String,
        /// runner_up weight / winner weight
        ratio: f64,
    },

    /// Numeric midpoints reported for a range attribute were too far apart
    RangeSpread {
        /// Smallest midpoint observed
        min_midpoint: f64,
        /// Largest midpoint observed
        max_midpoint: f64,
        /// max / min
        ratio: f64,
    },

    /// Two mutually-exclusive items were reported in the same category
    ExclusiveItems {
        /// Category both items belong to
        category: String,
        /// First item of the exclusive pair
        first: String,
        /// Second item of the exclusive pair
        second: String,
    },

    /// A cross-field plausibility rule failed
    CrossField {
        /// Name of the violated rule
        rule: String,
    },
}

/// A detected disagreement, carried as data through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    /// Stable machine-readable code (e.g. "size_estimation")
    pub code: String,

    /// Attributes involved
    pub attributes: Vec<String>,

    /// Warning or critical
    pub severity: Severity,

    /// Structured detail
    pub kind: ConflictKind,

    /// Human-readable explanation for operators
    pub message: String,
}

impl Conflict {
    /// Create a conflict
    pub fn new(
        code: impl Into<String>,
        attributes: Vec<String>,
        severity: Severity,
        kind: ConflictKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            attributes,
            severity,
            kind,
            message: message.into(),
        }
    }

    /// True if this conflict blocks acceptance
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}
