//! Property profile - the host-authored source of truth for one listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hero image shown when the host has not uploaded one yet
pub const DEFAULT_HERO_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1512917774080-9991f1c4c750?auto=format&fit=crop&q=80&w=800";

/// True if the value is an inline-encoded image payload (`data:image/...`)
/// rather than a remote URL. Inline payloads are the ones worth keeping out
/// of prompts; remote URLs are cheap to transmit as-is.
pub fn is_inline_image(value: &str) -> bool {
    value.starts_with("data:image")
}

/// Kind of property being listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Apartment,
    House,
    Cabin,
    Studio,
    #[serde(rename = "Unique Stay")]
    UniqueStay,
    Villa,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::House => "House",
            PropertyType::Cabin => "Cabin",
            PropertyType::Studio => "Studio",
            PropertyType::UniqueStay => "Unique Stay",
            PropertyType::Villa => "Villa",
        }
    }

    /// Parse a stored label, falling back to the default kind
    pub fn from_label(label: &str) -> Self {
        match label {
            "Apartment" => PropertyType::Apartment,
            "Cabin" => PropertyType::Cabin,
            "Studio" => PropertyType::Studio,
            "Unique Stay" => PropertyType::UniqueStay,
            "Villa" => PropertyType::Villa,
            _ => PropertyType::House,
        }
    }
}

/// The audience the host primarily wants to welcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestType {
    Families,
    Couples,
    Solo,
    #[serde(rename = "Digital Nomads")]
    DigitalNomads,
    #[serde(rename = "Business Travelers")]
    BusinessTravelers,
}

impl GuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestType::Families => "Families",
            GuestType::Couples => "Couples",
            GuestType::Solo => "Solo",
            GuestType::DigitalNomads => "Digital Nomads",
            GuestType::BusinessTravelers => "Business Travelers",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Couples" => GuestType::Couples,
            "Solo" => GuestType::Solo,
            "Digital Nomads" => GuestType::DigitalNomads,
            "Business Travelers" => GuestType::BusinessTravelers,
            _ => GuestType::Families,
        }
    }
}

/// Surroundings of the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaType {
    Urban,
    Suburban,
    #[serde(rename = "Remote/Rural")]
    RemoteRural,
    Beachfront,
    Mountain,
}

impl AreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Urban => "Urban",
            AreaType::Suburban => "Suburban",
            AreaType::RemoteRural => "Remote/Rural",
            AreaType::Beachfront => "Beachfront",
            AreaType::Mountain => "Mountain",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Suburban" => AreaType::Suburban,
            "Remote/Rural" => AreaType::RemoteRural,
            "Beachfront" => AreaType::Beachfront,
            "Mountain" => AreaType::Mountain,
            _ => AreaType::Urban,
        }
    }
}

/// A host-provided video tutorial (appliances, locks, electronics)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGuide {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl VideoGuide {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// A video guide is only submitted when both fields survive trimming
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Host-authored property data; one record per listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyProfile {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub property_name: String,
    pub property_type: PropertyType,
    pub location: String,
    pub host_name: String,
    /// Remote URL or inline data-encoded image
    pub host_image_url: String,
    /// Remote URL or inline data-encoded image
    pub hero_image_url: String,
    pub additional_photos: Vec<String>,
    pub video_guides: Vec<VideoGuide>,
    pub target_guest: GuestType,
    pub check_in_time: String,
    pub check_out_time: String,
    pub check_in_method: String,
    pub wifi_name: String,
    pub wifi_password: String,
    pub emergency_phone: String,
    pub property_contact: String,
    pub house_rules: Vec<String>,
    pub parking_info: String,
    pub pet_policy: String,
    pub smoking_policy: String,
    pub quiet_hours: String,
    pub checkout_tasks: String,
    pub area_type: AreaType,
    pub restaurants: String,
    pub activities: String,
    pub special_notes: String,
    /// Cached AI-generated guide document (JSON-encoded)
    pub generated_guide: Option<String>,
}

impl Default for PropertyProfile {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            created_at: Utc::now(),
            property_name: String::new(),
            property_type: PropertyType::House,
            location: String::new(),
            host_name: String::new(),
            host_image_url: String::new(),
            hero_image_url: DEFAULT_HERO_IMAGE_URL.to_string(),
            additional_photos: Vec::new(),
            video_guides: Vec::new(),
            target_guest: GuestType::Families,
            check_in_time: "15:00".to_string(),
            check_out_time: "11:00".to_string(),
            check_in_method: String::new(),
            wifi_name: String::new(),
            wifi_password: String::new(),
            emergency_phone: String::new(),
            property_contact: String::new(),
            house_rules: Vec::new(),
            parking_info: String::new(),
            pet_policy: "No pets allowed".to_string(),
            smoking_policy: "No smoking".to_string(),
            quiet_hours: "10 PM - 8 AM".to_string(),
            checkout_tasks: "Please turn off lights and lock the door.".to_string(),
            area_type: AreaType::Urban,
            restaurants: String::new(),
            activities: String::new(),
            special_notes: String::new(),
            generated_guide: None,
        }
    }
}

impl PropertyProfile {
    /// Create a fresh draft with a new id and creation timestamp
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            host_name: host_name.into(),
            ..Self::default()
        }
    }

    /// Video guides that qualify for submission (non-blank title and url)
    pub fn submittable_video_guides(&self) -> Vec<VideoGuide> {
        self.video_guides
            .iter()
            .filter(|v| v.is_submittable())
            .cloned()
            .collect()
    }

    /// Required host input, checked before any network call
    pub fn validate_for_submission(&self) -> crate::error::Result<()> {
        if self.property_name.trim().is_empty() || self.location.trim().is_empty() {
            return Err(crate::error::Error::Validation(
                "Property Name and Location are required.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_inline_host_image(&self) -> bool {
        is_inline_image(&self.host_image_url)
    }

    pub fn has_inline_hero_image(&self) -> bool {
        is_inline_image(&self.hero_image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_draft_has_identity_and_defaults() {
        let profile = PropertyProfile::new("Maria");
        assert_ne!(profile.id, Uuid::nil());
        assert_eq!(profile.host_name, "Maria");
        assert_eq!(profile.check_in_time, "15:00");
        assert_eq!(profile.check_out_time, "11:00");
        assert!(profile.house_rules.is_empty());
        assert!(profile.additional_photos.is_empty());
        assert!(profile.video_guides.is_empty());
        assert!(profile.generated_guide.is_none());
    }

    #[test]
    fn test_validation_requires_name_and_location() {
        let mut profile = PropertyProfile::new("Maria");
        assert!(profile.validate_for_submission().is_err());

        profile.property_name = "Sea Shack".to_string();
        assert!(profile.validate_for_submission().is_err());

        profile.location = "Lisbon".to_string();
        assert!(profile.validate_for_submission().is_ok());
    }

    #[test]
    fn test_blank_video_guides_are_not_submittable() {
        let mut profile = PropertyProfile::new("Maria");
        profile.video_guides = vec![
            VideoGuide::new("Coffee machine", "https://youtu.be/abc12345678"),
            VideoGuide::new("  ", "https://youtu.be/def12345678"),
            VideoGuide::new("Smart lock", "   "),
        ];

        let submittable = profile.submittable_video_guides();
        assert_eq!(submittable.len(), 1);
        assert_eq!(submittable[0].title, "Coffee machine");
    }

    #[test]
    fn test_inline_image_detection() {
        assert!(is_inline_image("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_inline_image("https://example.com/photo.jpg"));
        assert!(!is_inline_image(""));
    }

    #[test]
    fn test_enum_labels_round_trip() {
        assert_eq!(
            PropertyType::from_label(PropertyType::UniqueStay.as_str()),
            PropertyType::UniqueStay
        );
        assert_eq!(
            GuestType::from_label(GuestType::DigitalNomads.as_str()),
            GuestType::DigitalNomads
        );
        assert_eq!(
            AreaType::from_label(AreaType::RemoteRural.as_str()),
            AreaType::RemoteRural
        );
        // Unknown labels fall back to defaults rather than failing
        assert_eq!(PropertyType::from_label("Castle"), PropertyType::House);
    }
}
