//! Voter registry: credential checks and voter-state queries
//!
//! Authentication is read-only. Two sessions may authenticate the same voter
//! at once; the double-vote guard lives in [`crate::ballot::BallotBox`].

use crate::store::Store;
use crate::types::Voter;
use crate::{Error, Result};
use rusqlite::{OptionalExtension, Transaction, params};
use std::sync::Arc;

const SELECT_VOTER: &str = "SELECT id, name, voter_id, has_voted FROM voters WHERE voter_id = ?1";

/// Read access to registered voters
#[derive(Clone)]
pub struct VoterRegistry {
    store: Arc<Store>,
}

impl VoterRegistry {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Check a name and voter ID against the register
    ///
    /// The voter ID must match exactly; the name is compared ignoring case.
    /// An unknown voter ID is `Ok(false)`, not an error.
    pub fn authenticate(&self, name: &str, voter_id: &str) -> Result<bool> {
        let authenticated = self
            .find_by_voter_id(voter_id)?
            .is_some_and(|voter| voter.name_matches(name));

        if !authenticated {
            tracing::warn!(
                "Authentication rejected for voter {}",
                crate::types::log_prefix(voter_id)
            );
        }

        Ok(authenticated)
    }

    /// Look up a voter by their external voter ID
    pub fn find_by_voter_id(&self, voter_id: &str) -> Result<Option<Voter>> {
        self.store.read(|tx| {
            Ok(tx
                .query_row(SELECT_VOTER, params![voter_id], voter_from_row)
                .optional()?)
        })
    }

    /// Authenticate and return the voter handle in one step
    pub fn login(&self, name: &str, voter_id: &str) -> Result<Voter> {
        if !self.authenticate(name, voter_id)? {
            return Err(Error::InvalidCredentials);
        }

        self.find_by_voter_id(voter_id)?
            .ok_or_else(|| Error::not_found("voter", voter_id))
    }

    /// Stored `has_voted` flag for `voter`, read inside the caller's transaction
    pub fn has_voted_in(tx: &Transaction<'_>, voter: &Voter) -> Result<bool> {
        tx.query_row(
            "SELECT has_voted FROM voters WHERE id = ?1",
            params![voter.id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::not_found("voter", &voter.voter_id))
    }

    /// Record that `voter` has voted, inside the caller's transaction
    ///
    /// Production code reaches this only through
    /// [`crate::ballot::BallotBox::cast_vote`]. The handle is left untouched;
    /// the ballot box updates it after commit.
    pub fn mark_voted(tx: &Transaction<'_>, voter: &Voter) -> Result<()> {
        let updated = tx.execute("UPDATE voters SET has_voted = 1 WHERE id = ?1", params![voter.id])?;

        if updated == 0 {
            return Err(Error::not_found("voter", &voter.voter_id));
        }
        Ok(())
    }
}

fn voter_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Voter> {
    Ok(Voter {
        id: row.get(0)?,
        name: row.get(1)?,
        voter_id: row.get(2)?,
        has_voted: row.get(3)?,
    })
}
