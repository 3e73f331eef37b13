//! ElectionDay voting system
//!
//! Registered voters authenticate with a name and voter ID and cast one vote
//! for a party; an authorized viewer inspects results and winners. The crate
//! is the vote-casting and tallying core; `src/main.rs` is a thin terminal
//! front end over it.

pub mod ballot;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod registry;
pub mod results;
pub mod seed;
pub mod store;
pub mod types;

use std::sync::Arc;

// Re-export commonly used types
pub use ballot::BallotBox;
pub use errors::{Error, Result};
pub use ledger::PartyLedger;
pub use registry::VoterRegistry;
pub use store::Store;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from the logging configuration
///
/// `RUST_LOG` still takes precedence over the configured level.
pub fn init_with(logging: &config::LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("electionday={}", logging.level).into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }

    tracing::info!("🗳️  ElectionDay v{} initialized", VERSION);
    Ok(())
}

/// The core components wired to one store
///
/// The store is opened once here and closed once by [`Election::close`].
pub struct Election {
    store: Arc<Store>,
    pub registry: VoterRegistry,
    pub ledger: PartyLedger,
    pub ballot_box: BallotBox,
}

impl Election {
    /// Open the configured store and make sure its schema exists
    pub fn open(config: &config::DatabaseConfig) -> Result<Self> {
        let store = Store::from_config(config)?;
        store.initialize_schema()?;
        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn with_store(store: Arc<Store>) -> Self {
        Self {
            registry: VoterRegistry::new(store.clone()),
            ledger: PartyLedger::new(store.clone()),
            ballot_box: BallotBox::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Release the components and close the store
    ///
    /// Clones of the components handed out elsewhere keep the store open;
    /// in that case the connection closes when the last clone is dropped.
    pub fn close(self) -> Result<()> {
        let Self {
            store,
            registry,
            ledger,
            ballot_box,
        } = self;
        drop((registry, ledger, ballot_box));

        match Arc::try_unwrap(store) {
            Ok(store) => store.close(),
            Err(_) => {
                tracing::debug!("Store still shared, deferring close");
                Ok(())
            }
        }
    }
}
