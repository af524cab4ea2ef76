//! Concierge session - grounded question answering for guests
//!
//! A session is scoped to one rendering of one guide document: the
//! grounding context is frozen at start, turns accumulate in order, and
//! nothing is persisted across reloads. Guests never see a raw technical
//! failure; every error path resolves to a fixed friendly message.

use casita_core::GuideDocument;
use serde_json::Value;
use tracing::{instrument, warn};

use crate::backend::{GenerationBackend, Turn};

/// Reply when the service answered with nothing usable
pub const NOT_SURE_MESSAGE: &str = "I'm not sure about that. Try contacting the host!";

/// Reply when the service could not be reached at all
pub const CONNECTION_TROUBLE_MESSAGE: &str =
    "Sorry, I'm having trouble connecting. Please try again.";

/// Greeting seeded into the chat view for a property
pub fn greeting_for(property_name: &str) -> String {
    format!("Hi! I'm your digital concierge for {property_name}. How can I help you today?")
}

/// Deep-copy the document with every image-bearing field replaced by a
/// short textual descriptor. Images are never sent to the conversational
/// model, only described.
pub fn grounding_context(doc: &GuideDocument) -> Value {
    let mut context = serde_json::to_value(doc).unwrap_or_else(|_| Value::Object(Default::default()));

    if let Some(obj) = context.as_object_mut() {
        if obj.contains_key("heroImageUrl") {
            obj.insert("heroImageUrl".to_string(), Value::String("[Image URL]".to_string()));
        }
        if let Some(host) = obj.get_mut("host").and_then(Value::as_object_mut) {
            if host.contains_key("photo") {
                host.insert("photo".to_string(), Value::String("[Host Photo]".to_string()));
            }
        }
        if let Some(count) = obj.get("gallery").and_then(Value::as_array).map(|g| g.len()) {
            obj.insert(
                "gallery".to_string(),
                Value::String(format!("[{count} photos available in gallery]")),
            );
        }
    }

    context
}

/// The fixed persona contract embedding one sanitized document snapshot
fn persona_instruction(context: &Value, host_name: &str) -> String {
    format!(
        "You are the Smart Concierge for this property: {context}.\n\
         Your goal is to help the guest with any questions they have about their stay.\n\
         Answer based ONLY on the provided guide data.\n\
         If a video guide exists (e.g., for the smart lock or TV), tell the guest specifically \
         that a video tutorial is available in the \"Video Tutorials\" section.\n\
         If you don't know the answer, politely suggest they contact the host, {host_name}, directly.\n\
         Be extremely friendly, helpful, and concise."
    )
}

/// Turn-based chat grounded strictly in one guide document
pub struct ConciergeSession<B> {
    backend: B,
    system_instruction: String,
    turns: Vec<Turn>,
}

impl<B: GenerationBackend> ConciergeSession<B> {
    /// Start a session for one document. Holds no turns yet.
    pub fn start(backend: B, doc: &GuideDocument) -> Self {
        let context = grounding_context(doc);
        let host_name = doc
            .host
            .as_ref()
            .and_then(|h| h.name.clone())
            .unwrap_or_else(|| "the host".to_string());

        Self {
            backend,
            system_instruction: persona_instruction(&context, &host_name),
            turns: Vec::new(),
        }
    }

    /// Ask one question and get the assistant's reply.
    ///
    /// Infallible from the caller's point of view: empty answers become a
    /// fixed "not sure" message and transport failures a fixed apology.
    /// `&mut self` keeps questions sequential within a session; answers
    /// arrive in submission order.
    #[instrument(skip(self, question), fields(backend = self.backend.backend_name()))]
    pub async fn ask(&mut self, question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return NOT_SURE_MESSAGE.to_string();
        }

        self.turns.push(Turn::guest(question));

        let answer = match self
            .backend
            .converse(&self.system_instruction, &self.turns)
            .await
        {
            Ok(text) if text.trim().is_empty() => NOT_SURE_MESSAGE.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Concierge exchange failed");
                CONNECTION_TROUBLE_MESSAGE.to_string()
            }
        };

        self.turns.push(Turn::assistant(answer.clone()));
        answer
    }

    /// Ordered turn history for the chat view
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use casita_core::models::{GuideDocument, HostCard};

    use crate::backend::Speaker;
    use crate::error::Error;

    struct ScriptedBackend {
        reply: &'static str,
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(&self, _system: &str, _prompt: &str) -> crate::error::Result<String> {
            Ok(String::new())
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
        ) -> crate::error::Result<String> {
            Ok(self.reply.to_string())
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    struct ThrowingBackend;

    #[async_trait]
    impl GenerationBackend for ThrowingBackend {
        async fn generate(&self, _system: &str, _prompt: &str) -> crate::error::Result<String> {
            Ok(String::new())
        }

        async fn converse(
            &self,
            _system: &str,
            _turns: &[Turn],
        ) -> crate::error::Result<String> {
            Err(Error::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }

        fn backend_name(&self) -> &'static str {
            "throwing"
        }
    }

    fn doc() -> GuideDocument {
        GuideDocument {
            welcome: Some("Welcome!".to_string()),
            host: Some(HostCard {
                name: Some("Maria".to_string()),
                photo: Some("data:image/png;base64,AAAA".to_string()),
            }),
            hero_image_url: Some("data:image/jpeg;base64,BBBB".to_string()),
            gallery: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..GuideDocument::default()
        }
    }

    #[test]
    fn test_grounding_context_elides_images() {
        let context = grounding_context(&doc());
        let text = context.to_string();

        assert!(!text.contains("AAAA"));
        assert!(!text.contains("BBBB"));
        assert_eq!(context["host"]["photo"], "[Host Photo]");
        assert_eq!(context["heroImageUrl"], "[Image URL]");
        assert_eq!(context["gallery"], "[3 photos available in gallery]");
        // Non-image content is preserved for grounding
        assert_eq!(context["welcome"], "Welcome!");
    }

    #[test]
    fn test_persona_names_the_host() {
        let session = ConciergeSession::start(ScriptedBackend { reply: "ok" }, &doc());
        assert!(session.system_instruction.contains("Maria"));
        assert!(session.system_instruction.contains("ONLY"));
    }

    #[tokio::test]
    async fn test_ask_records_ordered_turns() {
        let mut session = ConciergeSession::start(
            ScriptedBackend {
                reply: "The wifi password is in the WiFi section.",
            },
            &doc(),
        );

        let answer = session.ask("What's the wifi password?").await;
        assert_eq!(answer, "The wifi password is in the WiFi section.");

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::Guest);
        assert_eq!(turns[0].text, "What's the wifi password?");
        assert_eq!(turns[1].speaker, Speaker::Assistant);
    }

    #[tokio::test]
    async fn test_empty_answer_becomes_not_sure() {
        let mut session = ConciergeSession::start(ScriptedBackend { reply: "  " }, &doc());
        assert_eq!(session.ask("Anything?").await, NOT_SURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_fixed_apology() {
        let mut session = ConciergeSession::start(ThrowingBackend, &doc());
        let answer = session.ask("any question").await;
        assert_eq!(answer, CONNECTION_TROUBLE_MESSAGE);
        // The apology is still recorded so the transcript stays coherent
        assert_eq!(session.turns().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_question_is_not_sent() {
        let mut session = ConciergeSession::start(ThrowingBackend, &doc());
        let answer = session.ask("   ").await;
        assert_eq!(answer, NOT_SURE_MESSAGE);
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_greeting() {
        assert_eq!(
            greeting_for("Sea Shack"),
            "Hi! I'm your digital concierge for Sea Shack. How can I help you today?"
        );
    }
}
