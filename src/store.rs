//! SQLite-backed persistent store for voters and parties
//!
//! The store owns the single database connection. Every access goes through
//! a scoped unit ([`Store::run_transaction`] for writes, [`Store::read`] for
//! reads) that locks the connection, opens a transaction, runs the caller's
//! closure and then commits or rolls back. The connection guard is released
//! on every exit path.
//!
//! Write units start with `BEGIN IMMEDIATE`, so two units touching the same
//! file (from this handle or another one) never interleave their
//! read-check-write sequences.

use crate::config::DatabaseConfig;
use crate::types::{PartyRecord, VoterRecord};
use crate::{Error, Result};
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS voters (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        name TEXT NOT NULL,
        voter_id TEXT NOT NULL UNIQUE,
        has_voted INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS parties (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        symbol TEXT,
        votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0)
    );
";

/// Outcome of a [`Store::bulk_load`] call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub voters_inserted: usize,
    pub voters_skipped: usize,
    pub parties_inserted: usize,
    pub parties_skipped: usize,
}

/// Durable, transactional storage for voters and parties
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();

        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let conn = Connection::open(path).map_err(|e| log_fault("open", e.into()))?;
        conn.busy_timeout(busy_timeout)
            .map_err(|e| log_fault("busy timeout", e.into()))?;

        tracing::debug!("Store opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Open the store described by the database configuration
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| log_fault("open", e.into()))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Create both tables if they do not exist yet
    ///
    /// Safe to call on every startup.
    pub fn initialize_schema(&self) -> Result<()> {
        self.run_transaction(|tx| {
            tx.execute_batch(SCHEMA)?;
            Ok(())
        })
    }

    /// Insert seed data, skipping rows whose unique key already exists
    ///
    /// Duplicate voter IDs and party names are counted as skipped, which
    /// makes re-seeding idempotent. Any other failure rolls back the whole
    /// load.
    pub fn bulk_load(&self, voters: &[VoterRecord], parties: &[PartyRecord]) -> Result<SeedReport> {
        let report = self.run_transaction(|tx| {
            let mut report = SeedReport::default();

            let mut insert_voter =
                tx.prepare("INSERT INTO voters (name, voter_id) VALUES (?1, ?2)")?;
            for voter in voters {
                if insert_unless_duplicate(insert_voter.execute(params![voter.name, voter.voter_id]))? {
                    report.voters_inserted += 1;
                } else {
                    tracing::debug!("Skipping duplicate voter {}", crate::types::log_prefix(&voter.voter_id));
                    report.voters_skipped += 1;
                }
            }

            let mut insert_party =
                tx.prepare("INSERT INTO parties (name, symbol) VALUES (?1, ?2)")?;
            for party in parties {
                if insert_unless_duplicate(insert_party.execute(params![party.name, party.symbol]))? {
                    report.parties_inserted += 1;
                } else {
                    tracing::debug!("Skipping duplicate party {}", party.name);
                    report.parties_skipped += 1;
                }
            }

            Ok(report)
        })?;

        tracing::info!(
            "Seed data loaded: voters +{} ({} skipped), parties +{} ({} skipped)",
            report.voters_inserted,
            report.voters_skipped,
            report.parties_inserted,
            report.parties_skipped
        );

        Ok(report)
    }

    /// Run a unit of work atomically
    ///
    /// The closure runs inside an immediate transaction. If it returns
    /// `Err`, every write it made is rolled back and the error is returned;
    /// otherwise the transaction is committed before this returns.
    pub fn run_transaction<T, F>(&self, unit: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| log_fault("begin", e.into()))?;

        // dropping `tx` on the error path rolls back
        let value = unit(&tx).map_err(|e| log_fault("transaction", e))?;
        tx.commit().map_err(|e| log_fault("commit", e.into()))?;

        Ok(value)
    }

    /// Run read-only queries against one consistent snapshot
    pub fn read<T, F>(&self, query: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| log_fault("begin read", e.into()))?;

        let value = query(&tx).map_err(|e| log_fault("read", e))?;
        tx.finish().map_err(|e| log_fault("finish read", e.into()))?;

        Ok(value)
    }

    /// Number of registered voters
    pub fn voter_count(&self) -> Result<u64> {
        self.read(|tx| count_rows(tx, "voters"))
    }

    /// Number of registered parties
    pub fn party_count(&self) -> Result<u64> {
        self.read(|tx| count_rows(tx, "parties"))
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        conn.close().map_err(|(_, e)| log_fault("close", e.into()))?;
        tracing::debug!("Store closed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic inside a unit drops its transaction, which rolls back, so
        // the connection behind a poisoned lock is still consistent.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `Ok(true)` when the row was inserted, `Ok(false)` on a unique-key clash
fn insert_unless_duplicate(result: rusqlite::Result<usize>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(cause, _))
            if cause.code == ErrorCode::ConstraintViolation
                && cause.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn count_rows(tx: &Transaction<'_>, table: &str) -> Result<u64> {
    let count: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn log_fault(operation: &str, error: Error) -> Error {
    if let Error::Storage(cause) = &error {
        tracing::error!("Store {} failed: {:?}", operation, cause);
    }
    error
}
