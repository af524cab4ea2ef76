//! Guide compiler - one profile in, one generated guide document out
//!
//! Owns the prompt contract with the generation service: the fixed system
//! instruction, the templated property summary, markdown-fence cleanup of
//! the response, and image rehydration through the placeholder codec.
//! Performs no retries; one failed attempt surfaces immediately.

use casita_core::placeholder::{PlaceholderMap, UnresolvedTokenPolicy};
use casita_core::{rehydrate, PropertyProfile};
use tracing::{debug, instrument, warn};

use crate::backend::GenerationBackend;
use crate::error::Result;

/// System prompt for guide generation
///
/// The video-guide rule is a hard requirement: hosts rely on appliance
/// tutorials surviving generation with their urls untouched. The output
/// contract is strict JSON-only; the service still intermittently wraps
/// responses in fencing, which `strip_markdown_fence` undoes.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a hospitality-focused short-stay Superhost assistant.
Your task is to create a professional digital House Manual JSON.

CRITICAL RULES FOR VIDEO GUIDES:
1. You MUST include EVERY YouTube URL provided in the "Video Guides" input, with each url byte-for-byte unchanged.
2. These videos are often tutorials for appliances (coffee machine), locks, or electronics.
3. Ensure the titles in the JSON match or professionally refine the titles provided by the host.

OUTPUT CONTRACT:
Respond with ONLY a single JSON object. No preamble, no commentary, no markdown fences.

REQUIRED JSON STRUCTURE:
{
  "welcome": "Short warm welcome message.",
  "host": {
    "name": "Host Name",
    "photo": "IMG_PLACEHOLDER_HOST"
  },
  "heroImageUrl": "IMG_PLACEHOLDER_HERO",
  "gallery": ["IMG_PLACEHOLDER_GALLERY_0", "IMG_PLACEHOLDER_GALLERY_1", "..."],
  "videoGuides": [
    {"title": "Video Title", "url": "YouTube URL"}
  ],
  "wifi": {
    "name": "Network name",
    "password": "Password",
    "instructions": "Where the router is or signal tips."
  },
  "checkIn": {
    "method": "How to get in",
    "instructions": "Step by step details.",
    "accessCode": "If applicable"
  },
  "houseRules": ["Rule 1", "Rule 2", "..."],
  "emergency": {
    "phone": "Emergency contact",
    "safetyInfo": "Fire extinguisher location, first aid, etc."
  },
  "localGems": [
    {"name": "Place Name", "type": "Restaurant/Bar/Activity", "description": "Why guests love it."}
  ],
  "checkout": {
    "time": "Time",
    "tasks": ["Task 1", "Task 2"]
  }
}
"#;

/// Warn when inline media is likely to blow the service's request limits
/// even with placeholdering (prompt plus model overhead still counts).
const INLINE_PAYLOAD_WARN_BYTES: usize = 3 * 1024 * 1024;

/// Strip a wrapping markdown code fence from generated text.
///
/// Idempotent on already-clean input; tolerates an info string on the
/// opening fence (```` ```json ````) and a missing closing fence.
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some((_info, body)) = rest.split_once('\n') else {
        return trimmed;
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// What the prompt tells the model to put in an image slot: the reserved
/// token for placeholdered inline payloads, the literal URL for external
/// images, or an omission instruction when the host supplied nothing.
fn image_directive(token: &str, map: &PlaceholderMap, raw: &str) -> String {
    if map.contains(token) {
        format!("\"{token}\"")
    } else if !raw.trim().is_empty() {
        format!("\"{}\"", raw.trim())
    } else {
        "omit this field".to_string()
    }
}

/// Build the templated property summary sent as the user content
fn property_summary(profile: &PropertyProfile, map: &PlaceholderMap) -> Result<String> {
    let rules = serde_json::to_string(&profile.house_rules)?;
    let videos = serde_json::to_string(&profile.submittable_video_guides())?;
    let gallery = serde_json::to_string(&map.gallery_tokens())?;

    Ok(format!(
        "PROPERTY DATA:\n\
         Name: {name}\n\
         Host: {host}\n\
         Location: {location}\n\
         Type: {property_type}\n\
         Ideal for: {target_guest}\n\
         Area: {area_type}\n\
         Check-in: {check_in_method} at {check_in_time}\n\
         Check-out: {check_out_time}\n\
         WiFi: {wifi_name} / {wifi_password}\n\
         Emergency: {emergency_phone}\n\
         Property contact: {property_contact}\n\
         Rules: {rules}\n\
         Parking: {parking}\n\
         Pet policy: {pet_policy}\n\
         Smoking: {smoking_policy}\n\
         Quiet hours: {quiet_hours}\n\
         Restaurants: {restaurants}\n\
         Activities: {activities}\n\
         Tasks: {tasks}\n\
         Special notes: {special_notes}\n\
         Video Guides: {videos}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Generate the guest guide JSON following the system instruction.\n\
         2. Use THESE EXACT placeholders for images:\n\
         - Host Photo: {host_directive}\n\
         - Hero Photo: {hero_directive}\n\
         - Gallery: {gallery}\n",
        name = profile.property_name,
        host = profile.host_name,
        location = profile.location,
        property_type = profile.property_type.as_str(),
        target_guest = profile.target_guest.as_str(),
        area_type = profile.area_type.as_str(),
        check_in_method = profile.check_in_method,
        check_in_time = profile.check_in_time,
        check_out_time = profile.check_out_time,
        wifi_name = profile.wifi_name,
        wifi_password = profile.wifi_password,
        emergency_phone = profile.emergency_phone,
        property_contact = profile.property_contact,
        parking = profile.parking_info,
        pet_policy = profile.pet_policy,
        smoking_policy = profile.smoking_policy,
        quiet_hours = profile.quiet_hours,
        restaurants = profile.restaurants,
        activities = profile.activities,
        tasks = profile.checkout_tasks,
        special_notes = profile.special_notes,
        host_directive = image_directive(casita_core::HOST_TOKEN, map, &profile.host_image_url),
        hero_directive = image_directive(casita_core::HERO_TOKEN, map, &profile.hero_image_url),
    ))
}

/// Compiles one `PropertyProfile` into serialized guide-document text via
/// a single generation call.
pub struct GuideCompiler<B> {
    backend: B,
    policy: UnresolvedTokenPolicy,
}

impl<B: GenerationBackend> GuideCompiler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: UnresolvedTokenPolicy::default(),
        }
    }

    /// Override what happens to placeholder tokens the host never backed
    /// with a real image.
    pub fn with_policy(mut self, policy: UnresolvedTokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one generation call and return the rehydrated document text.
    ///
    /// The caller parses and validates the result (well-formed, not
    /// trivial) before treating the call as successful; see
    /// `GuideDocument::parse_generated`.
    #[instrument(skip(self, profile), fields(id = %profile.id, backend = self.backend.backend_name()))]
    pub async fn compile(&self, profile: &PropertyProfile) -> Result<String> {
        let map = PlaceholderMap::for_profile(profile);

        let payload_bytes = map.total_payload_bytes();
        if payload_bytes > INLINE_PAYLOAD_WARN_BYTES {
            warn!(
                payload_bytes,
                "Inline media is large; the request may exceed service limits"
            );
        }

        let prompt = property_summary(profile, &map)?;
        debug!(
            prompt_chars = prompt.len(),
            placeholders = map.len(),
            "Compiling guide"
        );

        let raw = self.backend.generate(SYSTEM_INSTRUCTION, &prompt).await?;
        let cleaned = strip_markdown_fence(&raw);
        Ok(rehydrate(cleaned, &map, &self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use casita_core::{GuideDocument, VideoGuide};

    use crate::backend::Turn;
    use crate::error::Error;

    /// Echoes the submitted video guides back inside a minimal document
    struct EchoBackend;

    #[async_trait]
    impl GenerationBackend for EchoBackend {
        async fn generate(&self, _system: &str, prompt: &str) -> crate::error::Result<String> {
            let videos = prompt
                .lines()
                .find_map(|line| line.trim().strip_prefix("Video Guides: "))
                .unwrap_or("[]");
            Ok(format!(r#"{{"welcome":"Welcome!","videoGuides":{videos}}}"#))
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
        ) -> crate::error::Result<String> {
            Ok(String::new())
        }

        fn backend_name(&self) -> &'static str {
            "echo"
        }
    }

    /// Wraps a fixed document in a markdown fence, as the service
    /// intermittently does despite instructions
    struct FencedBackend;

    #[async_trait]
    impl GenerationBackend for FencedBackend {
        async fn generate(&self, _system: &str, _prompt: &str) -> crate::error::Result<String> {
            Ok("```json\n{\"welcome\":\"hi\"}\n```".to_string())
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
        ) -> crate::error::Result<String> {
            Ok(String::new())
        }

        fn backend_name(&self) -> &'static str {
            "fenced"
        }
    }

    /// Emits the placeholder tokens the prompt asked for
    struct TokenBackend;

    #[async_trait]
    impl GenerationBackend for TokenBackend {
        async fn generate(&self, _system: &str, _prompt: &str) -> crate::error::Result<String> {
            Ok(format!(
                r#"{{"host":{{"photo":"{}"}},"gallery":["{}"]}}"#,
                casita_core::HOST_TOKEN,
                casita_core::gallery_token(0)
            ))
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
        ) -> crate::error::Result<String> {
            Ok(String::new())
        }

        fn backend_name(&self) -> &'static str {
            "tokens"
        }
    }

    fn profile() -> PropertyProfile {
        let mut profile = PropertyProfile::new("Maria");
        profile.property_name = "Sea Shack".to_string();
        profile.location = "Lisbon".to_string();
        profile
    }

    #[test]
    fn test_strip_markdown_fence() {
        assert_eq!(strip_markdown_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        // Idempotent on already-clean input
        assert_eq!(strip_markdown_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(
            strip_markdown_fence(strip_markdown_fence("```json\n{\"a\":1}\n```")),
            "{\"a\":1}"
        );
        // Missing closing fence still yields the body
        assert_eq!(strip_markdown_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_every_submitted_video_guide_survives_compilation() {
        let mut p = profile();
        p.video_guides = vec![
            VideoGuide::new("Coffee machine", "https://youtu.be/abc12345678"),
            VideoGuide::new("Smart lock", "https://www.youtube.com/watch?v=def12345678"),
            VideoGuide::new("", "https://youtu.be/dropped00000"),
        ];

        let compiler = GuideCompiler::new(EchoBackend);
        let text = compiler.compile(&p).await.unwrap();
        let doc = GuideDocument::parse_generated(&text).unwrap();

        for guide in p.submittable_video_guides() {
            assert!(
                doc.video_guides.iter().any(|v| v.url == guide.url),
                "missing url {}",
                guide.url
            );
        }
        // The blank-titled entry was never submitted
        assert!(!doc
            .video_guides
            .iter()
            .any(|v| v.url == "https://youtu.be/dropped00000"));
    }

    #[tokio::test]
    async fn test_fenced_response_is_cleaned() {
        let compiler = GuideCompiler::new(FencedBackend);
        let text = compiler.compile(&profile()).await.unwrap();
        assert!(GuideDocument::parse_generated(&text).is_ok());
    }

    #[tokio::test]
    async fn test_compile_rehydrates_inline_images() {
        let mut p = profile();
        p.host_image_url = "data:image/png;base64,iVBORw0KGgo=".to_string();
        p.additional_photos = vec!["data:image/jpeg;base64,/9j/4AAQ".to_string()];

        let compiler = GuideCompiler::new(TokenBackend);
        let text = compiler.compile(&p).await.unwrap();

        assert!(text.contains("data:image/png;base64,iVBORw0KGgo="));
        assert!(text.contains("data:image/jpeg;base64,/9j/4AAQ"));
        assert!(!text.contains(casita_core::HOST_TOKEN));
        assert!(!text.contains(&casita_core::gallery_token(0)));
    }

    #[tokio::test]
    async fn test_unbacked_tokens_follow_the_configured_policy() {
        // No inline images: the tokens the backend emits resolve to nothing
        let compiler = GuideCompiler::new(TokenBackend).with_policy(
            UnresolvedTokenPolicy::Fallback("https://example.com/default.jpg".to_string()),
        );

        let text = compiler.compile(&profile()).await.unwrap();
        assert!(text.contains("https://example.com/default.jpg"));
        assert!(!text.contains(casita_core::HOST_TOKEN));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_without_retry() {
        struct FailingBackend;

        #[async_trait]
        impl GenerationBackend for FailingBackend {
            async fn generate(
                &self,
                _system: &str,
                _prompt: &str,
            ) -> crate::error::Result<String> {
                Err(Error::Api {
                    status: 429,
                    message: "quota".to_string(),
                })
            }

            async fn converse(
                &self,
                _system: &str,
                _turns: &[Turn],
            ) -> crate::error::Result<String> {
                Ok(String::new())
            }

            fn backend_name(&self) -> &'static str {
                "failing"
            }
        }

        let compiler = GuideCompiler::new(FailingBackend);
        assert!(compiler.compile(&profile()).await.is_err());
    }

    #[test]
    fn test_prompt_contains_rules_videos_and_placeholders() {
        let mut p = profile();
        p.house_rules = vec!["No parties".to_string()];
        p.video_guides = vec![VideoGuide::new("Coffee", "https://youtu.be/abc12345678")];
        p.host_image_url = "data:image/png;base64,AAAA".to_string();
        p.additional_photos = vec!["data:image/png;base64,BBBB".to_string()];

        let map = PlaceholderMap::for_profile(&p);
        let prompt = property_summary(&p, &map).unwrap();

        assert!(prompt.contains("Rules: [\"No parties\"]"));
        assert!(prompt.contains("https://youtu.be/abc12345678"));
        assert!(prompt.contains(&format!("\"{}\"", casita_core::HOST_TOKEN)));
        assert!(prompt.contains(&casita_core::gallery_token(0)));
        // The inline payloads themselves never enter the prompt
        assert!(!prompt.contains("data:image/png;base64,AAAA"));
        assert!(!prompt.contains("data:image/png;base64,BBBB"));
        // External hero URL is transmitted directly
        assert!(prompt.contains(casita_core::DEFAULT_HERO_IMAGE_URL));
    }
}
