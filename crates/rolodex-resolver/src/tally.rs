//! Weighted vote accumulation shared by every attribute kind

use std::collections::BTreeMap;

/// Votes cast for one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Ballot {
    /// Sum of decayed vote weights
    pub weight: f64,
    reliability_sum: f64,
    voters: usize,
}

impl Ballot {
    /// Mean raw reliability of the sources that voted, capped at 1
    pub fn mean_reliability(&self) -> f64 {
        if self.voters == 0 {
            return 0.0;
        }
        (self.reliability_sum / self.voters as f64).min(1.0)
    }
}

/// Candidate → accumulated ballot, ordered by candidate
#[derive(Debug, Clone, Default)]
pub(crate) struct Tally {
    ballots: BTreeMap<String, Ballot>,
    total: f64,
    voters: usize,
}

impl Tally {
    pub fn cast(&mut self, candidate: impl Into<String>, weight: f64, reliability: f64) {
        let ballot = self.ballots.entry(candidate.into()).or_default();
        ballot.weight += weight;
        ballot.reliability_sum += reliability;
        ballot.voters += 1;
        self.total += weight;
        self.voters += 1;
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn voters(&self) -> usize {
        self.voters
    }

    pub fn is_empty(&self) -> bool {
        self.voters == 0
    }

    pub fn get(&self, candidate: &str) -> Option<&Ballot> {
        self.ballots.get(candidate)
    }

    /// Highest-weight candidate; ties go to the lexicographically smallest
    pub fn leader(&self) -> Option<(&str, &Ballot)> {
        self.ranked().into_iter().next()
    }

    /// Second-highest candidate under the same ordering as [`Tally::leader`]
    pub fn runner_up(&self) -> Option<(&str, &Ballot)> {
        self.ranked().into_iter().nth(1)
    }

    /// Share of the total weight held by `candidate`
    pub fn share(&self, candidate: &str) -> f64 {
        match self.ballots.get(candidate) {
            Some(ballot) if self.total > 0.0 => ballot.weight / self.total,
            _ => 0.0,
        }
    }

    pub fn distribution(&self) -> BTreeMap<String, f64> {
        self.ballots
            .iter()
            .map(|(candidate, ballot)| (candidate.clone(), ballot.weight))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Ballot)> {
        self.ballots.iter().map(|(c, b)| (c.as_str(), b))
    }

    fn ranked(&self) -> Vec<(&str, &Ballot)> {
        let mut ranked: Vec<_> = self.iter().collect();
        // Stable sort keeps BTreeMap order among equal weights
        ranked.sort_by(|a, b| b.1.weight.total_cmp(&a.1.weight));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_and_runner_up() {
        let mut tally = Tally::default();
        tally.cast("small", 10.0, 1.0);
        tally.cast("large", 9.0, 1.0);
        tally.cast("small", 10.0, 1.0);

        let (leader, ballot) = tally.leader().unwrap();
        assert_eq!(leader, "small");
        assert_eq!(ballot.weight, 20.0);
        assert_eq!(tally.runner_up().unwrap().0, "large");
        assert_eq!(tally.total(), 29.0);
        assert_eq!(tally.voters(), 3);
    }

    #[test]
    fn test_tie_goes_to_smallest_candidate() {
        let mut tally = Tally::default();
        tally.cast("micro", 0.5, 0.5);
        tally.cast("large", 0.5, 0.5);
        assert_eq!(tally.leader().unwrap().0, "large");
        assert_eq!(tally.runner_up().unwrap().0, "micro");
    }

    #[test]
    fn test_mean_reliability_capped() {
        let mut tally = Tally::default();
        tally.cast("small", 0.7, 0.7);
        tally.cast("small", 0.9, 0.9);
        assert!((tally.get("small").unwrap().mean_reliability() - 0.8).abs() < 1e-12);

        tally.cast("large", 10.0, 10.0);
        assert_eq!(tally.get("large").unwrap().mean_reliability(), 1.0);
    }

    #[test]
    fn test_empty_tally() {
        let tally = Tally::default();
        assert!(tally.is_empty());
        assert!(tally.leader().is_none());
        assert_eq!(tally.share("anything"), 0.0);
    }
}
