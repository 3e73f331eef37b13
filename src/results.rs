//! Results access and presentation policy
//!
//! The ledger reports the true tied set of leaders. Whether a tie at zero
//! should read as "no votes" is decided here, on top of the ledger, so the
//! core never conflates the two.

use crate::types::Party;
use std::fmt;
use subtle::ConstantTimeEq;

/// Shared secret guarding the results view
///
/// Not tied to any voter. The ledger's read operations perform no
/// authorization of their own; front ends check the gate first.
#[derive(Clone)]
pub struct ResultsGate {
    password: String,
}

impl ResultsGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Compare an attempt with the configured password in constant time
    pub fn verify(&self, attempt: &str) -> bool {
        let granted: bool = self.password.as_bytes().ct_eq(attempt.as_bytes()).into();
        if !granted {
            tracing::warn!("Results access denied");
        }
        granted
    }
}

impl fmt::Debug for ResultsGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsGate").finish_non_exhaustive()
    }
}

/// Headline derived from [`crate::ledger::PartyLedger::winners`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnerSummary {
    /// The leaders are tied at zero, or there are no parties
    NoVotes,
    /// One or more parties lead with at least one vote
    Winners(Vec<String>),
}

impl WinnerSummary {
    pub fn from_winners(winners: &[Party]) -> Self {
        match winners.first() {
            Some(leader) if leader.votes > 0 => {
                Self::Winners(winners.iter().map(|party| party.name.clone()).collect())
            }
            _ => Self::NoVotes,
        }
    }
}

impl fmt::Display for WinnerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVotes => write!(f, "No votes"),
            Self::Winners(names) if names.len() == 1 => write!(f, "Winning party: {}", names[0]),
            Self::Winners(names) => write!(f, "Winning parties: {}", names.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(name: &str, votes: u64) -> Party {
        Party {
            id: 0,
            name: name.to_string(),
            symbol: None,
            votes,
            selector: 0,
        }
    }

    #[test]
    fn test_gate_verification() {
        let gate = ResultsGate::new("letmein");

        assert!(gate.verify("letmein"));
        assert!(!gate.verify("LETMEIN"));
        assert!(!gate.verify("letmei"));
        assert!(!gate.verify(""));
        assert!(!format!("{gate:?}").contains("letmein"));
    }

    #[test]
    fn test_zero_tie_reads_as_no_votes() {
        let summary = WinnerSummary::from_winners(&[party("Red", 0), party("Blue", 0)]);
        assert_eq!(summary, WinnerSummary::NoVotes);
        assert_eq!(summary.to_string(), "No votes");

        assert_eq!(WinnerSummary::from_winners(&[]), WinnerSummary::NoVotes);
    }

    #[test]
    fn test_winner_lines() {
        let single = WinnerSummary::from_winners(&[party("Red", 3)]);
        assert_eq!(single.to_string(), "Winning party: Red");

        let tie = WinnerSummary::from_winners(&[party("Red", 5), party("Blue", 5)]);
        assert_eq!(tie, WinnerSummary::Winners(vec!["Red".to_string(), "Blue".to_string()]));
        assert_eq!(tie.to_string(), "Winning parties: Red, Blue");
    }
}
