//! Seed data loading
//!
//! The seed file is JSON with party names and `[voter_id, name]` pairs:
//!
//! ```json
//! { "parties": ["Red", "Blue"], "voters": [["1001", "Ada"]] }
//! ```

use crate::Result;
use crate::store::{SeedReport, Store};
use crate::types::{PartyRecord, VoterRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a seed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub parties: Vec<String>,

    /// `(voter_id, name)` pairs
    #[serde(default)]
    pub voters: Vec<(String, String)>,
}

impl SeedData {
    /// Read and parse a seed file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let data = Self::from_json(&raw)?;

        tracing::debug!(
            "Read seed file {}: {} parties, {} voters",
            path.display(),
            data.parties.len(),
            data.voters.len()
        );
        Ok(data)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn voter_records(&self) -> Vec<VoterRecord> {
        self.voters
            .iter()
            .map(|(voter_id, name)| VoterRecord::new(voter_id.as_str(), name.as_str()))
            .collect()
    }

    pub fn party_records(&self) -> Vec<PartyRecord> {
        self.parties.iter().map(|name| PartyRecord::new(name.as_str())).collect()
    }

    /// Ensure the schema exists and load this data into `store`
    pub fn apply(&self, store: &Store) -> Result<SeedReport> {
        store.initialize_schema()?;
        store.bulk_load(&self.voter_records(), &self.party_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const SAMPLE: &str = r#"{
        "parties": ["Red Party", "Blue"],
        "voters": [["1001", "Ada"], ["1002", "Grace"]]
    }"#;

    #[test]
    fn test_parse_seed_json() {
        let data = SeedData::from_json(SAMPLE).unwrap();

        assert_eq!(data.parties, ["Red Party", "Blue"]);
        assert_eq!(data.voter_records()[1], VoterRecord::new("1002", "Grace"));
        assert_eq!(data.party_records()[0].symbol.as_deref(), Some("red.png"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let data = SeedData::from_json(r#"{ "parties": ["Red"] }"#).unwrap();
        assert!(data.voters.is_empty());
    }

    #[test]
    fn test_malformed_seed_json() {
        let result = SeedData::from_json(r#"{ "voters": [["1001"]] }"#);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_missing_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SeedData::from_path(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = Store::open_in_memory().unwrap();
        let data = SeedData::from_path(&path).unwrap();

        let first = data.apply(&store).unwrap();
        assert_eq!(first.voters_inserted, 2);
        assert_eq!(first.parties_inserted, 2);

        let second = data.apply(&store).unwrap();
        assert_eq!(second.voters_inserted, 0);
        assert_eq!(second.voters_skipped, 2);
        assert_eq!(second.parties_skipped, 2);
        assert_eq!(store.voter_count().unwrap(), 2);
        assert_eq!(store.party_count().unwrap(), 2);
    }
}
