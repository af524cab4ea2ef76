//! Guide document model - the AI-generated, guest-facing house manual
//!
//! Every field is optional or defaulted: renderers and the concierge treat
//! a missing or empty key as "section absent", never as an error. The
//! document round-trips through text serialization and is persisted back
//! onto the owning profile as a cached string.

use serde::{Deserialize, Serialize};

use super::property::VideoGuide;
use crate::error::{Error, Result};

/// The host block shown in the guide header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckInSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmergencySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_info: Option<String>,
}

/// A nearby place recommended to guests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalGem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub gem_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
}

/// The generated guest guide. Top-level keys match the generation contract
/// exactly; the renderer pattern-matches on these names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuideDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub video_guides: Vec<VideoGuide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<CheckInSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub house_rules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencySection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub local_gems: Vec<LocalGem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutSection>,
}

/// Addressable guide sections, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Welcome,
    Host,
    Hero,
    Wifi,
    CheckIn,
    Gallery,
    VideoGuides,
    HouseRules,
    LocalGems,
    Emergency,
    Checkout,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl GuideDocument {
    /// Parse generated text into a document, rejecting trivial output.
    ///
    /// An empty string, `"{}"`, or a blank/non-object body is a generation
    /// failure, never a valid empty document.
    pub fn parse_generated(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::Generation(
                "the generation service returned no content".to_string(),
            ));
        }

        let value: serde_json::Value = serde_json::from_str(trimmed)?;
        match value.as_object() {
            Some(obj) if !obj.is_empty() => Ok(serde_json::from_value(value)?),
            _ => Err(Error::Generation(
                "the generation service returned an empty document".to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// True iff the section exists and, for list-valued sections, is
    /// non-empty. Renderers skip absent sections instead of erroring.
    pub fn has_section(&self, section: Section) -> bool {
        match section {
            Section::Welcome => present(&self.welcome),
            Section::Host => self
                .host
                .as_ref()
                .is_some_and(|h| present(&h.name) || present(&h.photo)),
            Section::Hero => present(&self.hero_image_url),
            Section::Wifi => self.wifi.as_ref().is_some_and(|w| {
                present(&w.name) || present(&w.password) || present(&w.instructions)
            }),
            Section::CheckIn => self.check_in.as_ref().is_some_and(|c| {
                present(&c.method) || present(&c.instructions) || present(&c.access_code)
            }),
            Section::Gallery => !self.gallery.is_empty(),
            Section::VideoGuides => !self.video_guides.is_empty(),
            Section::HouseRules => !self.house_rules.is_empty(),
            Section::LocalGems => !self.local_gems.is_empty(),
            Section::Emergency => self
                .emergency
                .as_ref()
                .is_some_and(|e| present(&e.phone) || present(&e.safety_info)),
            Section::Checkout => self
                .checkout
                .as_ref()
                .is_some_and(|c| present(&c.time) || !c.tasks.is_empty()),
        }
    }

    /// True when no section at all is present
    pub fn is_empty(&self) -> bool {
        use Section::*;
        ![
            Welcome, Host, Hero, Wifi, CheckIn, Gallery, VideoGuides, HouseRules, LocalGems,
            Emergency, Checkout,
        ]
        .iter()
        .any(|s| self.has_section(*s))
    }
}
