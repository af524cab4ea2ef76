//! SQLite storage layer for Casita

mod migrations;
mod parse;
mod profiles;
mod traits;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::PropertyProfile;

pub use profiles::ProfileStore;
pub use traits::ProfileRepository;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get profile store
    pub fn profiles(&self) -> ProfileStore<'_> {
        ProfileStore::new(&self.conn)
    }
}

// Implement the repository trait for Database so application code can
// depend on the trait interface and tests can substitute mocks.

impl ProfileRepository for Database {
    fn upsert_profile(&self, profile: &PropertyProfile, owner_id: Uuid) -> Result<()> {
        self.profiles().upsert(profile, owner_id)
    }

    fn find_profile_by_id(&self, id: Uuid) -> Result<Option<PropertyProfile>> {
        self.profiles().find_by_id(id)
    }

    fn list_profiles_for_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyProfile>> {
        self.profiles().list_for_owner(owner_id)
    }

    fn delete_profile(&self, id: Uuid) -> Result<()> {
        self.profiles().delete(id)
    }

    fn cache_generated_guide(&self, id: Uuid, content: &str) -> Result<()> {
        self.profiles().cache_guide(id, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoGuide;
    use chrono::{Duration, Utc};

    fn sample_profile(name: &str) -> PropertyProfile {
        let mut profile = PropertyProfile::new("Maria");
        profile.property_name = name.to_string();
        profile.location = "Lisbon".to_string();
        profile.house_rules = vec!["No parties".to_string(), "No smoking inside".to_string()];
        profile.video_guides = vec![VideoGuide::new("Coffee", "https://youtu.be/abc12345678")];
        profile.additional_photos = vec!["https://example.com/1.jpg".to_string()];
        profile
    }

    #[test]
    fn test_upsert_and_find_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let profile = sample_profile("Sea Shack");

        db.upsert_profile(&profile, owner).unwrap();

        let found = db.find_profile_by_id(profile.id).unwrap().unwrap();
        assert_eq!(found.property_name, "Sea Shack");
        assert_eq!(found.house_rules, profile.house_rules);
        assert_eq!(found.video_guides, profile.video_guides);
        assert_eq!(found.additional_photos, profile.additional_photos);
        assert_eq!(found.created_at, profile.created_at);
        assert!(found.generated_guide.is_none());
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let mut profile = sample_profile("Sea Shack");
        db.upsert_profile(&profile, owner).unwrap();

        profile.property_name = "Sea Shack Deluxe".to_string();
        profile.house_rules.clear();
        db.upsert_profile(&profile, owner).unwrap();

        let found = db.find_profile_by_id(profile.id).unwrap().unwrap();
        assert_eq!(found.property_name, "Sea Shack Deluxe");
        assert!(found.house_rules.is_empty());
    }

    #[test]
    fn test_list_for_owner_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();

        let mut older = sample_profile("Older");
        older.created_at = Utc::now() - Duration::days(2);
        let newer = sample_profile("Newer");

        db.upsert_profile(&older, owner).unwrap();
        db.upsert_profile(&newer, owner).unwrap();
        // Another owner's profile must not leak into the list
        db.upsert_profile(&sample_profile("Other"), Uuid::new_v4())
            .unwrap();

        let listed = db.list_profiles_for_owner(owner).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].property_name, "Newer");
        assert_eq!(listed[1].property_name, "Older");
    }

    #[test]
    fn test_delete_profile() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let profile = sample_profile("Sea Shack");
        db.upsert_profile(&profile, owner).unwrap();

        db.delete_profile(profile.id).unwrap();
        assert!(db.find_profile_by_id(profile.id).unwrap().is_none());
    }

    #[test]
    fn test_cache_guide_updates_only_the_document() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let profile = sample_profile("Sea Shack");
        db.upsert_profile(&profile, owner).unwrap();

        db.cache_generated_guide(profile.id, r#"{"welcome":"Hello"}"#)
            .unwrap();

        let found = db.find_profile_by_id(profile.id).unwrap().unwrap();
        assert_eq!(found.generated_guide.as_deref(), Some(r#"{"welcome":"Hello"}"#));
        assert_eq!(found.property_name, "Sea Shack");
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casita.db");
        let owner = Uuid::new_v4();
        let profile = sample_profile("Persisted");

        {
            let db = Database::open(&path).unwrap();
            db.upsert_profile(&profile, owner).unwrap();
            assert_eq!(db.schema_version(), 1);
        }

        // Reopening finds the same record
        let db = Database::open(&path).unwrap();
        let found = db.find_profile_by_id(profile.id).unwrap();
        assert!(found.is_some());
    }
}
