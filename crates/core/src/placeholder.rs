//! Placeholder codec for keeping inline image payloads out of prompts
//!
//! Inline-encoded images are multi-hundred-kilobyte base64 blobs. Sending
//! them to the generation service wastes the token budget and is the
//! dominant cause of oversized-request failures, so they are swapped for
//! short symbolic tokens before the prompt leaves the process and swapped
//! back into the returned document afterwards. External image URLs are
//! cheap to transmit and are never placeholdered.

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{is_inline_image, PropertyProfile};

/// Reserved token for the host portrait
pub const HOST_TOKEN: &str = "IMG_PLACEHOLDER_HOST";
/// Reserved token for the hero image
pub const HERO_TOKEN: &str = "IMG_PLACEHOLDER_HERO";
/// Prefix for per-position gallery tokens
pub const GALLERY_TOKEN_PREFIX: &str = "IMG_PLACEHOLDER_GALLERY_";

/// Token for the gallery photo at the given position
pub fn gallery_token(index: usize) -> String {
    format!("{GALLERY_TOKEN_PREFIX}{index}")
}

/// True for any string that is one of the reserved placeholder tokens
pub fn is_placeholder_token(value: &str) -> bool {
    value == HOST_TOKEN
        || value == HERO_TOKEN
        || value
            .strip_prefix(GALLERY_TOKEN_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

static QUOTED_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""IMG_PLACEHOLDER_(?:HOST|HERO|GALLERY_\d+)""#)
        .expect("quoted token pattern is valid")
});

/// What to do with a token that survives rehydration because the host
/// never supplied the image behind it.
///
/// Leaving the raw token in the document renders as a broken image
/// reference downstream; product has not decided between a default image
/// and omission, so all three behaviors are available and `Keep` ships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UnresolvedTokenPolicy {
    /// Leave the token string in place (current product behavior)
    #[default]
    Keep,
    /// Remove the field or list entry holding the token
    Blank,
    /// Substitute a default image reference
    Fallback(String),
}

/// Request-scoped, order-preserving mapping from symbolic token to the
/// real image payload. Built fresh per compile call, never persisted.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    /// Build the map for one profile.
    ///
    /// Registers the host and hero tokens only when the field holds a
    /// non-empty inline-encoded image, plus one token per inline gallery
    /// photo numbered by its position (external URLs and empty slots are
    /// skipped, preserving positions).
    pub fn for_profile(profile: &PropertyProfile) -> Self {
        let mut entries = Vec::new();

        if profile.has_inline_host_image() {
            entries.push((HOST_TOKEN.to_string(), profile.host_image_url.clone()));
        }
        if profile.has_inline_hero_image() {
            entries.push((HERO_TOKEN.to_string(), profile.hero_image_url.clone()));
        }
        for (idx, photo) in profile.additional_photos.iter().enumerate() {
            if is_inline_image(photo) {
                entries.push((gallery_token(idx), photo.clone()));
            }
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == token)
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, payload)| payload.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(t, p)| (t.as_str(), p.as_str()))
    }

    /// Gallery tokens in position order, for the prompt's placeholder list
    pub fn gallery_tokens(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(t, _)| t.starts_with(GALLERY_TOKEN_PREFIX))
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Approximate decoded size of all mapped payloads, in bytes.
    ///
    /// Used to warn hosts before a request that is likely to blow the
    /// provider's size limits even with placeholdering.
    pub fn total_payload_bytes(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(_, payload)| inline_payload_bytes(payload))
            .sum()
    }
}

/// Decoded byte size of an inline-encoded image payload, if it is one
pub fn inline_payload_bytes(value: &str) -> Option<usize> {
    if !is_inline_image(value) {
        return None;
    }
    let encoded = value.split_once("base64,")?.1;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()
        .map(|bytes| bytes.len())
}

/// Restore real image payloads into generated text.
///
/// Structural first: when the response parses as JSON, token-valued
/// strings are substituted in the value tree and the document is
/// re-serialized, so payload content can never corrupt the splice. When
/// the response does not parse, falls back to literal quoted-substring
/// replacement (`str::replace` is literal; payload characters are never
/// reinterpreted). Tokens with an empty payload are never substituted.
pub fn rehydrate(response: &str, map: &PlaceholderMap, policy: &UnresolvedTokenPolicy) -> String {
    match serde_json::from_str::<Value>(response) {
        Ok(mut value) => {
            substitute(&mut value, map, policy);
            serde_json::to_string(&value).unwrap_or_else(|_| splice(response, map, policy))
        }
        Err(_) => splice(response, map, policy),
    }
}

fn resolves(map: &PlaceholderMap, token: &str) -> bool {
    map.get(token).is_some_and(|payload| !payload.is_empty())
}

fn is_unresolved_token_value(value: &Value, map: &PlaceholderMap) -> bool {
    value
        .as_str()
        .is_some_and(|s| is_placeholder_token(s) && !resolves(map, s))
}

fn substitute(value: &mut Value, map: &PlaceholderMap, policy: &UnresolvedTokenPolicy) {
    match value {
        Value::String(s) => {
            if resolves(map, s) {
                if let Some(payload) = map.get(s) {
                    *s = payload.to_string();
                }
            } else if is_placeholder_token(s) {
                match policy {
                    UnresolvedTokenPolicy::Keep | UnresolvedTokenPolicy::Blank => {}
                    UnresolvedTokenPolicy::Fallback(url) => *s = url.clone(),
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                substitute(item, map, policy);
            }
            if *policy == UnresolvedTokenPolicy::Blank {
                items.retain(|item| !is_unresolved_token_value(item, map));
            }
        }
        Value::Object(fields) => {
            for field in fields.values_mut() {
                substitute(field, map, policy);
            }
            if *policy == UnresolvedTokenPolicy::Blank {
                fields.retain(|_, field| !is_unresolved_token_value(field, map));
            }
        }
        _ => {}
    }
}

/// Textual fallback for responses that do not parse as JSON.
///
/// Only quoted exact token occurrences are touched. `Blank` cannot remove
/// a field from unparsed text, so it degrades to `Keep` here.
fn splice(response: &str, map: &PlaceholderMap, policy: &UnresolvedTokenPolicy) -> String {
    let mut out = response.to_string();
    for (token, payload) in map.iter() {
        if payload.is_empty() {
            continue;
        }
        out = out.replace(&format!("\"{token}\""), &format!("\"{payload}\""));
    }
    if let UnresolvedTokenPolicy::Fallback(url) = policy {
        let replacement = format!("\"{url}\"");
        out = QUOTED_TOKEN
            .replace_all(&out, regex::NoExpand(&replacement))
            .into_owned();
    }
    out
}
