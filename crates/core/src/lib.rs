//! Casita Core Library
//!
//! Core models, the guide document contract, the image placeholder codec,
//! and SQLite storage for the Casita guest-guide platform.

pub mod embed;
pub mod error;
pub mod invariants;
pub mod models;
pub mod placeholder;
pub mod storage;

pub use embed::{embed_url, resolve_embed_id};
pub use error::{Error, Result};
pub use models::*;
pub use placeholder::{
    gallery_token, is_placeholder_token, rehydrate, PlaceholderMap, UnresolvedTokenPolicy,
    GALLERY_TOKEN_PREFIX, HERO_TOKEN, HOST_TOKEN,
};
pub use storage::{Database, ProfileRepository, ProfileStore};
