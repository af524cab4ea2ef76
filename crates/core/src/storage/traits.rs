//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future hosted backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::PropertyProfile;

/// Profile repository operations
///
/// The persisted record is the whole `PropertyProfile` plus its owning
/// user id; writes are whole-record upserts with last-writer-wins
/// semantics, never partial-field transactions.
pub trait ProfileRepository {
    /// Insert or replace a profile record keyed by its id
    fn upsert_profile(&self, profile: &PropertyProfile, owner_id: Uuid) -> Result<()>;

    /// Fetch one profile by its opaque id (also the guest access path)
    fn find_profile_by_id(&self, id: Uuid) -> Result<Option<PropertyProfile>>;

    /// List all profiles for an owner, newest first
    fn list_profiles_for_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyProfile>>;

    /// Delete a profile by id
    fn delete_profile(&self, id: Uuid) -> Result<()>;

    /// Overwrite only the cached generated document for a profile
    fn cache_generated_guide(&self, id: Uuid, content: &str) -> Result<()>;
}
