//! Terminal rendering of a guide document
//!
//! Renders the same sections, in the same order, as the product's guest
//! view. Absent sections are skipped, never errors. Inline image payloads
//! are abbreviated so a manual stays readable in a terminal.

use casita_core::models::{GuideDocument, Section};
use casita_core::{embed_url, resolve_embed_id};

/// Longest image reference printed verbatim
const IMAGE_DISPLAY_LEN: usize = 60;

/// Abbreviate inline payloads; remote URLs print as-is
fn display_image(reference: &str) -> String {
    if reference.chars().count() <= IMAGE_DISPLAY_LEN {
        return reference.to_string();
    }
    let prefix: String = reference.chars().take(IMAGE_DISPLAY_LEN).collect();
    format!("{prefix}… ({} chars)", reference.chars().count())
}

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.chars().count()));
    out.push('\n');
}

/// Render a full guide to text
pub fn render_guide(doc: &GuideDocument, property_name: &str) -> String {
    casita_core::invariants::assert_document_invariants(doc);

    let mut out = String::new();

    out.push_str(&format!("== {property_name} ==\n"));
    if let Some(host) = doc.host.as_ref().and_then(|h| h.name.as_deref()) {
        out.push_str(&format!("Hosted by {host}\n"));
    }
    if doc.has_section(Section::Hero) {
        if let Some(hero) = doc.hero_image_url.as_deref() {
            out.push_str(&format!("Cover: {}\n", display_image(hero)));
        }
    }

    if doc.has_section(Section::Welcome) {
        heading(&mut out, "Welcome Home!");
        if let Some(welcome) = doc.welcome.as_deref() {
            out.push_str(welcome);
            out.push('\n');
        }
    }

    if doc.has_section(Section::Wifi) {
        heading(&mut out, "WiFi");
        if let Some(wifi) = &doc.wifi {
            if let Some(name) = wifi.name.as_deref() {
                out.push_str(&format!("Network:  {name}\n"));
            }
            if let Some(password) = wifi.password.as_deref() {
                out.push_str(&format!("Password: {password}\n"));
            }
            if let Some(instructions) = wifi.instructions.as_deref() {
                out.push_str(&format!("{instructions}\n"));
            }
        }
    }

    if doc.has_section(Section::CheckIn) {
        heading(&mut out, "Check-in Info");
        if let Some(check_in) = &doc.check_in {
            if let Some(method) = check_in.method.as_deref() {
                out.push_str(&format!("{method}\n"));
            }
            if let Some(code) = check_in.access_code.as_deref() {
                out.push_str(&format!("Access code: {code}\n"));
            }
            if let Some(instructions) = check_in.instructions.as_deref() {
                out.push_str(&format!("{instructions}\n"));
            }
        }
    }

    if doc.has_section(Section::Gallery) {
        heading(&mut out, "Property Photos");
        for (i, image) in doc.gallery.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, display_image(image)));
        }
    }

    if doc.has_section(Section::VideoGuides) {
        heading(&mut out, "Video Tutorials");
        for video in &doc.video_guides {
            let title = if video.title.trim().is_empty() {
                "Video Tutorial"
            } else {
                video.title.as_str()
            };
            match resolve_embed_id(&video.url) {
                Some(id) => out.push_str(&format!("{title}: {}\n", embed_url(&id))),
                // Not embeddable: keep the raw URL as an external link
                None => out.push_str(&format!("{title}: {}\n", video.url)),
            }
        }
    }

    if doc.has_section(Section::HouseRules) {
        heading(&mut out, "House Rules");
        for (i, rule) in doc.house_rules.iter().enumerate() {
            out.push_str(&format!("{}. {rule}\n", i + 1));
        }
    }

    if doc.has_section(Section::LocalGems) {
        heading(&mut out, "Local Gems");
        for gem in &doc.local_gems {
            let name = gem.name.as_deref().unwrap_or("Somewhere nearby");
            match gem.gem_type.as_deref() {
                Some(kind) => out.push_str(&format!("[{kind}] {name}\n")),
                None => out.push_str(&format!("{name}\n")),
            }
            if let Some(description) = gem.description.as_deref() {
                out.push_str(&format!("    {description}\n"));
            }
        }
    }

    if doc.has_section(Section::Emergency) {
        heading(&mut out, "Emergency");
        if let Some(emergency) = &doc.emergency {
            if let Some(phone) = emergency.phone.as_deref() {
                out.push_str(&format!("Call: {phone}\n"));
            }
            if let Some(info) = emergency.safety_info.as_deref() {
                out.push_str(&format!("{info}\n"));
            }
        }
    }

    if doc.has_section(Section::Checkout) {
        heading(&mut out, "Checkout");
        if let Some(checkout) = &doc.checkout {
            if let Some(time) = checkout.time.as_deref() {
                out.push_str(&format!("By {time}\n"));
            }
            for task in &checkout.tasks {
                out.push_str(&format!("- {task}\n"));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use casita_core::models::{CheckoutSection, WifiSection};
    use casita_core::VideoGuide;

    #[test]
    fn test_absent_sections_are_skipped() {
        let doc = GuideDocument {
            welcome: Some("Make yourself at home.".to_string()),
            ..GuideDocument::default()
        };

        let text = render_guide(&doc, "Sea Shack");
        assert!(text.contains("Sea Shack"));
        assert!(text.contains("Welcome Home!"));
        assert!(!text.contains("WiFi"));
        assert!(!text.contains("House Rules"));
        assert!(!text.contains("Checkout"));
    }

    #[test]
    fn test_wifi_and_checkout_render() {
        let doc = GuideDocument {
            wifi: Some(WifiSection {
                name: Some("SeaShack".to_string()),
                password: Some("s3cret".to_string()),
                instructions: None,
            }),
            checkout: Some(CheckoutSection {
                time: Some("11:00".to_string()),
                tasks: vec!["Lock the door".to_string()],
            }),
            ..GuideDocument::default()
        };

        let text = render_guide(&doc, "Sea Shack");
        assert!(text.contains("Network:  SeaShack"));
        assert!(text.contains("Password: s3cret"));
        assert!(text.contains("By 11:00"));
        assert!(text.contains("- Lock the door"));
    }

    #[test]
    fn test_embeddable_video_renders_player_url_and_raw_url_survives() {
        let doc = GuideDocument {
            video_guides: vec![
                VideoGuide::new("Coffee", "https://youtu.be/abc12345678"),
                VideoGuide::new("Heating", "https://example.com/heating-video"),
            ],
            ..GuideDocument::default()
        };

        let text = render_guide(&doc, "Sea Shack");
        assert!(text.contains("Coffee: https://www.youtube.com/embed/abc12345678"));
        assert!(text.contains("Heating: https://example.com/heating-video"));
    }

    #[test]
    fn test_inline_payloads_are_abbreviated() {
        let long_payload = format!("data:image/png;base64,{}", "A".repeat(500));
        let doc = GuideDocument {
            gallery: vec![long_payload],
            ..GuideDocument::default()
        };

        let text = render_guide(&doc, "Sea Shack");
        assert!(text.contains("Property Photos"));
        assert!(!text.contains(&"A".repeat(200)));
        assert!(text.contains("chars)"));
    }

    #[test]
    fn test_numbered_house_rules() {
        let doc = GuideDocument {
            house_rules: vec!["No parties".to_string(), "Shoes off".to_string()],
            ..GuideDocument::default()
        };

        let text = render_guide(&doc, "Sea Shack");
        assert!(text.contains("1. No parties"));
        assert!(text.contains("2. Shoes off"));
    }
}
