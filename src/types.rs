//! # Core Types for the Voting System
//!
//! This module defines the records exchanged between the store, the voter
//! registry, the party ledger and the ballot box.
//!
//! ## Ownership
//!
//! Every value handed to a caller is a detached snapshot of a stored row.
//! Mutating it never changes the database; only the explicit mutation
//! operations ([`crate::ballot::BallotBox::cast_vote`] and the transactional
//! helpers it calls) do.
//!
//! ## Type Categories
//!
//! ### Stored Entities
//! - [`Voter`]: a registered participant and their voting status
//! - [`Party`]: an electable option and its running tally
//!
//! ### Seed Records
//! - [`VoterRecord`]: `(voter_id, name)` pair supplied at seeding time
//! - [`PartyRecord`]: party name plus optional symbol
//!
//! ### Outcomes
//! - [`VoteReceipt`]: confirmation returned by a committed vote
//!
//! ## Usage Examples
//!
//! ```rust
//! use electionday::types::PartyRecord;
//!
//! let record = PartyRecord::new("Green Alliance");
//! assert_eq!(record.symbol.as_deref(), Some("green.png"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered voter as stored in the `voters` table
///
/// `has_voted` is monotonic: it flips from `false` to `true` exactly once,
/// inside the ballot box's atomic unit, and is never reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voter {
    /// Internal row identifier assigned by the store
    pub id: i64,

    /// Display name, compared case-insensitively during authentication
    pub name: String,

    /// Externally supplied credential, unique across all voters
    pub voter_id: String,

    /// Whether this voter has cast their vote
    pub has_voted: bool,
}

impl Voter {
    /// Check a supplied display name against the stored one, ignoring case
    ///
    /// ```rust
    /// use electionday::types::Voter;
    ///
    /// let voter = Voter {
    ///     id: 1,
    ///     name: "Ada".to_string(),
    ///     voter_id: "1001".to_string(),
    ///     has_voted: false,
    /// };
    /// assert!(voter.name_matches("ADA"));
    /// assert!(!voter.name_matches("Grace"));
    /// ```
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Shortened voter ID, safe to put in logs
    pub fn log_id(&self) -> &str {
        log_prefix(&self.voter_id)
    }
}

/// An electable party as stored in the `parties` table
///
/// `selector` is not persisted. Each listing assigns it as the 1-based
/// position of the party within that listing, so selectors taken from one
/// listing mean nothing in another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Party {
    /// Internal row identifier assigned by the store
    pub id: i64,

    /// Unique display name
    pub name: String,

    /// Decorative symbol reference, e.g. an image filename
    pub symbol: Option<String>,

    /// Number of votes received
    pub votes: u64,

    /// 1-based position within the listing that produced this value
    #[serde(skip)]
    pub selector: u32,
}

impl Party {
    /// Whether a user-typed selector string refers to this party
    pub fn matches_selector(&self, selector: &str) -> bool {
        self.selector != 0 && self.selector.to_string() == selector
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Voter seed data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterRecord {
    pub voter_id: String,
    pub name: String,
}

impl VoterRecord {
    pub fn new(voter_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            name: name.into(),
        }
    }
}

/// Party seed data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyRecord {
    pub name: String,
    pub symbol: Option<String>,
}

impl PartyRecord {
    /// Create a party record with a symbol derived from the name
    ///
    /// The symbol is the lowercased first word of the name with a `.png`
    /// extension.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let symbol = name
            .to_lowercase()
            .split(' ')
            .next()
            .filter(|word| !word.is_empty())
            .map(|word| format!("{word}.png"));

        Self { name, symbol }
    }
}

/// Confirmation of a committed vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteReceipt {
    /// Voter that cast the vote
    pub voter_id: String,

    /// Party that received the vote
    pub party: String,

    /// Party tally after the vote was committed
    pub party_votes: u64,
}

/// First few characters of an identifier, for log lines
pub(crate) fn log_prefix(id: &str) -> &str {
    match id.char_indices().nth(4) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
