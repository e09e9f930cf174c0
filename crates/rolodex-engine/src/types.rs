//! Request and response types for reconciliation

use rolodex_domain::{Fingerprint, Observation, RawIdentity, UpsertOutcome};
use rolodex_gatekeeper::ValidationResult;
use rolodex_identity::DuplicateCheck;

/// One business to reconcile: who it is and what sources say about it
#[derive(Debug, Clone)]
pub struct EntitySubmission {
    /// Identity fields as reported
    pub identity: RawIdentity,

    /// Observations about the business's attributes
    pub observations: Vec<Observation>,
}

impl EntitySubmission {
    /// Submission with no observations yet
    pub fn new(identity: RawIdentity) -> Self {
        Self {
            identity,
            observations: Vec::new(),
        }
    }

    /// Add one observation
    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.observations.push(observation);
        self
    }

    /// Add a batch of observations
    pub fn with_observations(mut self, observations: impl IntoIterator<Item = Observation>) -> Self {
        self.observations.extend(observations);
        self
    }
}

/// What reconciliation did with a submission
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// Passed the gate and was written to the registry
    Accepted {
        /// Full confidence breakdown
        result: ValidationResult,
        /// Whether the registry row was created or replaced
        upsert: UpsertOutcome,
        /// False when a more confident stored resolution was kept
        superseded: bool,
    },

    /// Failed the gate; the registry was not touched
    Rejected(ValidationResult),

    /// Already in the registry; resolution was skipped
    Duplicate(DuplicateCheck),

    /// Identical input was rejected moments ago; the earlier verdict is returned
    RecentlyRejected(ValidationResult),
}

impl ReconcileOutcome {
    /// True for [`ReconcileOutcome::Accepted`]
    pub fn is_accepted(&self) -> bool {
        matches!(self, ReconcileOutcome::Accepted { .. })
    }

    /// True for [`ReconcileOutcome::Duplicate`]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ReconcileOutcome::Duplicate(_))
    }

    /// The gate verdict, unless resolution was skipped as a duplicate
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            ReconcileOutcome::Accepted { result, .. }
            | ReconcileOutcome::Rejected(result)
            | ReconcileOutcome::RecentlyRejected(result) => Some(result),
            ReconcileOutcome::Duplicate(_) => None,
        }
    }

    /// Fingerprint of the submitted identity
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            ReconcileOutcome::Accepted { result, .. }
            | ReconcileOutcome::Rejected(result)
            | ReconcileOutcome::RecentlyRejected(result) => &result.fingerprint,
            ReconcileOutcome::Duplicate(check) => &check.fingerprint,
        }
    }
}
