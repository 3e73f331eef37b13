//! Ballot box: casting a vote as one atomic unit
//!
//! A vote is two writes: the voter's `has_voted` flag and one party's tally.
//! Both happen in a single store transaction, after re-reading the stored
//! flag under the write lock, so:
//! 1. A voter is recorded as having voted only together with a tally increment
//! 2. Concurrent casts for the same voter serialise; exactly one commits
//! 3. A voter in the `Voted` state can never vote again

use crate::ledger::PartyLedger;
use crate::registry::VoterRegistry;
use crate::store::Store;
use crate::types::{Party, VoteReceipt, Voter};
use crate::{Error, Result};
use std::sync::Arc;

/// The single entry point for recording votes
#[derive(Clone)]
pub struct BallotBox {
    store: Arc<Store>,
}

impl BallotBox {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Record one vote by `voter` for `party`
    ///
    /// Fails with [`Error::AlreadyVoted`] without writing anything if the
    /// handle or the stored record says the voter has already voted. On
    /// success both handles reflect the committed state.
    pub fn cast_vote(&self, voter: &mut Voter, party: &mut Party) -> Result<VoteReceipt> {
        if voter.has_voted {
            tracing::warn!("Rejected repeat vote from voter {}", voter.log_id());
            return Err(Error::already_voted(&voter.voter_id));
        }

        let party_votes = self.store.run_transaction(|tx| {
            if VoterRegistry::has_voted_in(tx, voter)? {
                return Err(Error::already_voted(&voter.voter_id));
            }

            VoterRegistry::mark_voted(tx, voter)?;
            PartyLedger::increment_votes(tx, party)
        });

        let party_votes = match party_votes {
            Ok(votes) => votes,
            Err(Error::AlreadyVoted { voter_id }) => {
                // another session committed first; bring the handle up to date
                voter.has_voted = true;
                tracing::warn!("Rejected repeat vote from voter {}", voter.log_id());
                return Err(Error::AlreadyVoted { voter_id });
            }
            Err(e) => return Err(e),
        };

        voter.has_voted = true;
        party.votes = party_votes;

        tracing::info!("🗳️ Vote recorded: voter={}, party={}", voter.log_id(), party.name);

        Ok(VoteReceipt {
            voter_id: voter.voter_id.clone(),
            party: party.name.clone(),
            party_votes,
        })
    }
}
