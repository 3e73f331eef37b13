//! Simple test to verify compilation and basic functionality

use std::sync::Arc;

use electionday::{
    Election, Result, Store,
    config::Config,
    results::{ResultsGate, WinnerSummary},
    seed::SeedData,
};

#[tokio::test]
async fn test_basic_compilation() -> Result<()> {
    println!("🔧 Testing basic compilation and functionality...");

    // Test configuration
    let config = Config::for_testing()?;
    assert!(config.database.busy_timeout_ms > 0);
    println!("✅ Configuration works");

    // Test store + seeding
    let election = Election::open(&config.database)?;
    let seed = SeedData::from_json(r#"{ "parties": ["Red", "Blue"], "voters": [["1001", "Ada"]] }"#)?;
    let report = seed.apply(election.store())?;
    assert_eq!(report.voters_inserted, 1);
    assert_eq!(report.parties_inserted, 2);
    println!("✅ Store and seeding work");

    // Test authentication
    assert!(election.registry.authenticate("ADA", "1001")?);
    println!("✅ Voter registry works");

    // Test listing
    let parties = election.ledger.list_all()?;
    assert_eq!(parties.len(), 2);
    println!("✅ Party ledger works");

    // Test results gate
    let gate = ResultsGate::new(config.results_password.clone());
    assert!(gate.verify("test-password"));
    assert_eq!(
        WinnerSummary::from_winners(&election.ledger.winners()?),
        WinnerSummary::NoVotes
    );
    println!("✅ Results gate works");

    election.close()?;
    println!("🎉 All basic functionality verified!");

    Ok(())
}

#[test]
fn test_close_with_shared_store() -> Result<()> {
    let store = Arc::new(Store::open_in_memory()?);
    store.initialize_schema()?;

    let election = Election::with_store(store.clone());
    let ledger = election.ledger.clone();
    election.close()?;

    // the clone still holds the store open
    assert!(ledger.list_all()?.is_empty());
    Ok(())
}
