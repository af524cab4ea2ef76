//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial profiles schema",
    sql: r#"
        -- One row per listing; list-valued fields are JSON-encoded TEXT
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            property_name TEXT NOT NULL DEFAULT '',
            property_type TEXT NOT NULL DEFAULT 'House',
            location TEXT NOT NULL DEFAULT '',
            host_name TEXT NOT NULL DEFAULT '',
            host_image_url TEXT NOT NULL DEFAULT '',
            hero_image_url TEXT NOT NULL DEFAULT '',
            additional_photos TEXT NOT NULL DEFAULT '[]',
            video_guides TEXT NOT NULL DEFAULT '[]',
            target_guest TEXT NOT NULL DEFAULT 'Families',
            check_in_time TEXT NOT NULL DEFAULT '',
            check_out_time TEXT NOT NULL DEFAULT '',
            check_in_method TEXT NOT NULL DEFAULT '',
            wifi_name TEXT NOT NULL DEFAULT '',
            wifi_password TEXT NOT NULL DEFAULT '',
            emergency_phone TEXT NOT NULL DEFAULT '',
            property_contact TEXT NOT NULL DEFAULT '',
            house_rules TEXT NOT NULL DEFAULT '[]',
            parking_info TEXT NOT NULL DEFAULT '',
            pet_policy TEXT NOT NULL DEFAULT '',
            smoking_policy TEXT NOT NULL DEFAULT '',
            quiet_hours TEXT NOT NULL DEFAULT '',
            checkout_tasks TEXT NOT NULL DEFAULT '',
            area_type TEXT NOT NULL DEFAULT 'Urban',
            restaurants TEXT NOT NULL DEFAULT '',
            activities TEXT NOT NULL DEFAULT '',
            special_notes TEXT NOT NULL DEFAULT '',
            generated_guide TEXT
        );

        -- Dashboard query: profiles per owner, newest first
        CREATE INDEX IF NOT EXISTS idx_profiles_owner_created
            ON profiles(owner_id, created_at DESC);
    "#,
}];

/// Initialize the migrations tracking table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap_or(None);
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    info!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            conn.execute_batch(migration.sql)?;
            record_migration(conn, migration)?;

            info!(version = migration.version, "Migration complete");
        }
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}
