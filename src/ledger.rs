//! Party ledger: candidate listings, rankings and vote tallies

use crate::store::Store;
use crate::types::Party;
use crate::{Error, Result};
use rusqlite::{OptionalExtension, Transaction, params};
use std::sync::Arc;

const PARTY_COLUMNS: &str = "SELECT id, name, symbol, votes FROM parties";

/// Read access to parties and their tallies
#[derive(Clone)]
pub struct PartyLedger {
    store: Arc<Store>,
}

impl PartyLedger {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Every party by name, ascending, with selectors in that order
    pub fn list_all(&self) -> Result<Vec<Party>> {
        self.listing("ORDER BY name ASC")
    }

    /// Every party by votes, descending, with selectors in that order
    ///
    /// Parties with equal votes keep their insertion order.
    pub fn list_by_results(&self) -> Result<Vec<Party>> {
        self.listing("ORDER BY votes DESC, id ASC")
    }

    /// Every party tied at the highest vote count, in insertion order
    ///
    /// Before any vote is cast this is every party, tied at zero. Deciding
    /// that such a tie means "no votes" is left to the caller (see
    /// [`crate::results::WinnerSummary`]). Only an empty ledger yields an
    /// empty vector.
    pub fn winners(&self) -> Result<Vec<Party>> {
        self.store.read(|tx| {
            let max_votes: Option<i64> =
                tx.query_row("SELECT MAX(votes) FROM parties", [], |row| row.get(0))?;

            let Some(max_votes) = max_votes else {
                return Ok(Vec::new());
            };

            let mut stmt = tx.prepare(&format!("{PARTY_COLUMNS} WHERE votes = ?1 ORDER BY id ASC"))?;
            let winners = stmt
                .query_map(params![max_votes], party_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(with_selectors(winners))
        })
    }

    /// Resolve a user-typed selector against a listing produced earlier
    pub fn find_by_selector<'a>(parties: &'a [Party], selector: &str) -> Option<&'a Party> {
        parties.iter().find(|party| party.matches_selector(selector))
    }

    /// Look up a party by its exact name
    pub fn find_by_name(&self, name: &str) -> Result<Option<Party>> {
        self.store.read(|tx| {
            Ok(tx
                .query_row(&format!("{PARTY_COLUMNS} WHERE name = ?1"), params![name], party_from_row)
                .optional()?)
        })
    }

    /// Look up a party by its internal identifier
    pub fn get_by_id(&self, id: i64) -> Result<Option<Party>> {
        self.store.read(|tx| {
            Ok(tx
                .query_row(&format!("{PARTY_COLUMNS} WHERE id = ?1"), params![id], party_from_row)
                .optional()?)
        })
    }

    /// Add one vote to `party`, inside the caller's transaction
    ///
    /// Production code reaches this only through
    /// [`crate::ballot::BallotBox::cast_vote`]. Returns the new stored count;
    /// the handle itself is updated by the ballot box after commit.
    pub fn increment_votes(tx: &Transaction<'_>, party: &Party) -> Result<u64> {
        let votes: Option<i64> = tx
            .query_row(
                "UPDATE parties SET votes = votes + 1 WHERE id = ?1 RETURNING votes",
                params![party.id],
                |row| row.get(0),
            )
            .optional()?;

        votes
            .map(|votes| votes.max(0) as u64)
            .ok_or_else(|| Error::not_found("party", &party.name))
    }

    fn listing(&self, order: &str) -> Result<Vec<Party>> {
        let parties = self.store.read(|tx| {
            let mut stmt = tx.prepare(&format!("{PARTY_COLUMNS} {order}"))?;
            let parties = stmt
                .query_map([], party_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(parties)
        })?;

        tracing::debug!("Listed {} parties ({})", parties.len(), order);
        Ok(with_selectors(parties))
    }
}

fn with_selectors(mut parties: Vec<Party>) -> Vec<Party> {
    for (position, party) in parties.iter_mut().enumerate() {
        party.selector = position as u32 + 1;
    }
    parties
}

fn party_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Party> {
    let votes: i64 = row.get(3)?;

    Ok(Party {
        id: row.get(0)?,
        name: row.get(1)?,
        symbol: row.get(2)?,
        votes: u64::try_from(votes).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, votes))?,
        selector: 0,
    })
}
