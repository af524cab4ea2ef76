//! Interaction handlers
//!
//! Each host or guest action is an explicit function over the session,
//! the profile store, and the generation backend. Failures come back as
//! user-facing message strings; raw errors stay in the logs. Nothing in
//! here retries: every failed operation returns control to the user.

use tracing::{error, info};
use uuid::Uuid;

use casita_ai::{GenerationBackend, GuideCompiler};
use casita_core::{Error, GuideDocument, ProfileRepository, PropertyProfile};

use crate::state::{AppSession, CurrentUser};

/// Shown when generation produced nothing renderable on the view path
pub const GENERATION_BUSY_MESSAGE: &str =
    "AI Superhost is currently busy. Please try again in a few seconds.";

/// Shown when the generation call itself failed; oversized inline photos
/// are the dominant practical cause even with placeholdering
pub const OVERSIZED_MEDIA_HINT: &str = "AI Superhost timed out. This usually happens if photos \
     are too large. Try using smaller images or fewer gallery photos.";

const NOT_FOUND_MESSAGE: &str = "Guide not found.";

/// Flatten a core error into the message a host should read
fn user_message(err: Error) -> String {
    match err {
        Error::Validation(msg) | Error::Generation(msg) => msg,
        other => other.to_string(),
    }
}

/// Sign the configured host in
pub fn sign_in(session: &mut AppSession, user: CurrentUser) -> Result<(), String> {
    session.sign_in(user).map_err(user_message)
}

/// Start a new guide draft and enter onboarding
pub fn create_draft(session: &mut AppSession) -> Result<(), String> {
    let host_name = session
        .user()
        .map(|u| u.name.clone())
        .ok_or_else(|| "Sign in to create a guide.".to_string())?;

    let draft = PropertyProfile::new(host_name);
    session.begin_onboarding(draft).map_err(user_message)
}

/// The dashboard listing: an owner's guides, newest first
pub fn list_guides<R: ProfileRepository>(
    store: &R,
    owner_id: Uuid,
) -> Result<Vec<PropertyProfile>, String> {
    store
        .list_profiles_for_owner(owner_id)
        .map_err(|e| format!("Failed to fetch guides: {e}"))
}

/// Submit the active draft: validate, generate, persist, preview.
///
/// Validation failures block before any network call; generation
/// failures leave nothing half-written.
pub async fn submit_profile<R, B>(
    session: &mut AppSession,
    store: &R,
    compiler: &GuideCompiler<B>,
) -> Result<(), String>
where
    R: ProfileRepository,
    B: GenerationBackend,
{
    let owner_id = session
        .user()
        .map(|u| u.id)
        .ok_or_else(|| "Sign in to build a guide.".to_string())?;

    let mut profile = session
        .active_profile()
        .cloned()
        .ok_or_else(|| "No guide is being edited.".to_string())?;

    profile.validate_for_submission().map_err(user_message)?;
    profile.video_guides = profile.submittable_video_guides();
    casita_core::invariants::assert_profile_invariants(&profile);

    let content = compiler.compile(&profile).await.map_err(|e| {
        error!(error = %e, "Guide generation failed");
        format!("Error building guide: {OVERSIZED_MEDIA_HINT}")
    })?;

    GuideDocument::parse_generated(&content)
        .map_err(|_| "Error building guide: AI failed to generate content.".to_string())?;

    profile.generated_guide = Some(content.clone());
    store
        .upsert_profile(&profile, owner_id)
        .map_err(|e| format!("Error saving guide: {e}"))?;

    info!(id = %profile.id, "Guide generated and saved");
    session.view(content).map_err(user_message)
}

/// Open a guide in the host preview, generating and caching the document
/// if there is none yet. A failed generation leaves any previously cached
/// document untouched.
pub async fn view_guide<R, B>(
    session: &mut AppSession,
    store: &R,
    compiler: &GuideCompiler<B>,
    profile_id: Uuid,
) -> Result<(), String>
where
    R: ProfileRepository,
    B: GenerationBackend,
{
    let profile = store
        .find_profile_by_id(profile_id)
        .map_err(|e| format!("Failed to fetch guide: {e}"))?
        .ok_or_else(|| NOT_FOUND_MESSAGE.to_string())?;

    if let Some(cached) = profile
        .generated_guide
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        return session.view(cached.to_string()).map_err(user_message);
    }

    let content = match compiler.compile(&profile).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "View-path generation failed");
            return Err(GENERATION_BUSY_MESSAGE.to_string());
        }
    };

    if GuideDocument::parse_generated(&content).is_err() {
        return Err(GENERATION_BUSY_MESSAGE.to_string());
    }

    store
        .cache_generated_guide(profile.id, &content)
        .map_err(|e| format!("Error saving guide: {e}"))?;

    session.view(content).map_err(user_message)
}

/// Delete a guide. The local list is only updated once the store
/// confirms the delete.
pub fn delete_guide<R: ProfileRepository>(
    store: &R,
    guides: &mut Vec<PropertyProfile>,
    profile_id: Uuid,
) -> Result<(), String> {
    store
        .delete_profile(profile_id)
        .map_err(|e| format!("Error deleting guide: {e}"))?;

    guides.retain(|g| g.id != profile_id);
    info!(id = %profile_id, "Guide deleted");
    Ok(())
}

/// Resolve an opaque guest link to its read-only guide rendering.
///
/// This is the unauthenticated access boundary: exactly one profile is
/// fetched by id, and no edit or delete affordance exists past here.
pub fn guest_view<R: ProfileRepository>(
    session: &mut AppSession,
    store: &R,
    profile_id: Uuid,
) -> Result<(), String> {
    let profile = store
        .find_profile_by_id(profile_id)
        .map_err(|e| format!("Failed to fetch guide: {e}"))?
        .ok_or_else(|| NOT_FOUND_MESSAGE.to_string())?;

    session.guest_view(profile);
    Ok(())
}
