//! Backend seam for the hosted generation service
//!
//! Application code depends on this trait, never on a concrete client,
//! so tests can substitute echoing or failing stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Guest,
    Assistant,
}

/// One turn in a concierge conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn guest(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Guest,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Common trait for hosted generation backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// One-shot structured generation. The returned text is expected to
    /// be a raw JSON document; callers validate it.
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String>;

    /// One exchange of a grounded conversation. `turns` carries the full
    /// ordered history including the newest guest question; the reply may
    /// be empty when the service declines to answer.
    async fn converse(&self, system_instruction: &str, turns: &[Turn]) -> Result<String>;

    /// Name of the backing service, for logs
    fn backend_name(&self) -> &'static str;
}
