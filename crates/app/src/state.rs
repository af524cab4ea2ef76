//! Application state management
//!
//! The session is an explicit value object with enumerated screens and
//! explicit transition functions; there is no ambient global state.
//! Interaction handlers take the session, mutate it through these
//! transitions, and hand it back.

use uuid::Uuid;

use casita_core::{Error, PropertyProfile, Result};

/// Number of steps in the onboarding wizard
pub const ONBOARDING_STEPS: u8 = 7;

/// The screen the session is currently on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No host signed in; only guest links work from here
    Unauthenticated,
    /// Step-by-step first-time guide creation
    Onboarding { step: u8 },
    /// The host's list of guides
    Dashboard,
    /// Editing an existing guide, all sections at once
    Editing,
    /// Host preview of a generated guide
    Viewing,
    /// Unauthenticated, read-only guest rendering
    GuestViewing,
}

/// The signed-in host, supplied by configuration
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
}

/// Per-session interaction state
#[derive(Debug)]
pub struct AppSession {
    screen: Screen,
    user: Option<CurrentUser>,
    active_profile: Option<PropertyProfile>,
    generated_content: Option<String>,
}

impl AppSession {
    pub fn new() -> Self {
        Self {
            screen: Screen::Unauthenticated,
            user: None,
            active_profile: None,
            generated_content: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn active_profile(&self) -> Option<&PropertyProfile> {
        self.active_profile.as_ref()
    }

    pub fn active_profile_mut(&mut self) -> Option<&mut PropertyProfile> {
        self.active_profile.as_mut()
    }

    pub fn generated_content(&self) -> Option<&str> {
        self.generated_content.as_deref()
    }

    /// Sign a host in and land on the dashboard
    pub fn sign_in(&mut self, user: CurrentUser) -> Result<()> {
        match self.screen {
            Screen::Unauthenticated => {
                self.user = Some(user);
                self.screen = Screen::Dashboard;
                Ok(())
            }
            _ => Err(Error::InvalidOperation(
                "already signed in".to_string(),
            )),
        }
    }

    /// Sign out from anywhere except a guest view, which stays put
    pub fn sign_out(&mut self) {
        if self.screen == Screen::GuestViewing {
            return;
        }
        self.user = None;
        self.active_profile = None;
        self.generated_content = None;
        self.screen = Screen::Unauthenticated;
    }

    /// Begin the onboarding wizard with a fresh draft
    pub fn begin_onboarding(&mut self, draft: PropertyProfile) -> Result<()> {
        self.require_signed_in()?;
        self.active_profile = Some(draft);
        self.generated_content = None;
        self.screen = Screen::Onboarding { step: 1 };
        Ok(())
    }

    /// Advance the wizard; step 1 re-validates the required fields
    pub fn advance_step(&mut self) -> Result<u8> {
        let Screen::Onboarding { step } = self.screen else {
            return Err(Error::InvalidOperation("not onboarding".to_string()));
        };
        if step == 1 {
            let profile = self
                .active_profile
                .as_ref()
                .ok_or_else(|| Error::InvalidOperation("no active draft".to_string()))?;
            profile.validate_for_submission()?;
        }
        let next = (step + 1).min(ONBOARDING_STEPS);
        self.screen = Screen::Onboarding { step: next };
        Ok(next)
    }

    pub fn back_step(&mut self) -> Result<u8> {
        let Screen::Onboarding { step } = self.screen else {
            return Err(Error::InvalidOperation("not onboarding".to_string()));
        };
        let previous = step.saturating_sub(1).max(1);
        self.screen = Screen::Onboarding { step: previous };
        Ok(previous)
    }

    /// Open an existing guide for editing
    pub fn edit(&mut self, profile: PropertyProfile) -> Result<()> {
        self.require_signed_in()?;
        self.generated_content = profile.generated_guide.clone();
        self.active_profile = Some(profile);
        self.screen = Screen::Editing;
        Ok(())
    }

    /// Show a generated document in the host preview
    pub fn view(&mut self, content: String) -> Result<()> {
        self.require_signed_in()?;
        self.generated_content = Some(content);
        self.screen = Screen::Viewing;
        Ok(())
    }

    /// Enter the unauthenticated guest rendering of one profile
    pub fn guest_view(&mut self, profile: PropertyProfile) {
        self.generated_content = profile.generated_guide.clone();
        self.active_profile = Some(profile);
        self.screen = Screen::GuestViewing;
    }

    /// Return to the dashboard, dropping transient view state
    pub fn back_to_dashboard(&mut self) -> Result<()> {
        self.require_signed_in()?;
        self.active_profile = None;
        self.generated_content = None;
        self.screen = Screen::Dashboard;
        Ok(())
    }

    fn require_signed_in(&self) -> Result<()> {
        if self.user.is_none() {
            return Err(Error::InvalidOperation("not signed in".to_string()));
        }
        Ok(())
    }
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new()
    }
}
