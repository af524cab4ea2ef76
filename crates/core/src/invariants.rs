//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{GuideDocument, PropertyProfile};
use crate::placeholder::is_placeholder_token;

/// Validate that a profile's state is internally consistent
pub fn assert_profile_invariants(profile: &PropertyProfile) {
    // Ids are assigned at draft creation and never change
    debug_assert!(
        profile.id != Uuid::nil(),
        "Profile '{}' has a nil id",
        profile.property_name
    );

    // A cached document, when present, must never be the trivial "{}"
    debug_assert!(
        profile
            .generated_guide
            .as_deref()
            .map_or(true, |g| !g.trim().is_empty() && g.trim() != "{}"),
        "Profile {} caches a trivial generated document",
        profile.id
    );
}

/// Validate a document that is about to be rendered to guests
pub fn assert_document_invariants(doc: &GuideDocument) {
    // Gallery entries are image references, never blank
    debug_assert!(
        doc.gallery.iter().all(|entry| !entry.trim().is_empty()),
        "Document gallery contains a blank entry"
    );

    // Video guide urls must survive generation verbatim, so none may be
    // a leftover placeholder token
    debug_assert!(
        doc.video_guides
            .iter()
            .all(|v| !is_placeholder_token(&v.url)),
        "Document video guide url holds a placeholder token"
    );
}
