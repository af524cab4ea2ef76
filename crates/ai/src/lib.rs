//! Casita AI Library
//!
//! Talks to the hosted generation service on behalf of the rest of the
//! application.
//!
//! # Architecture
//!
//! - **Backend**: trait seam over the hosted service, mockable in tests
//! - **Client**: Gemini `generateContent` HTTP client
//! - **Compiler**: profile → prompt → generated guide-document text
//! - **Concierge**: turn-based chat grounded in one guide document
//!
//! # Usage
//!
//! ```ignore
//! let client = GeminiClient::new(AiConfig::from_env()?)?;
//!
//! // Compile a guide
//! let compiler = GuideCompiler::new(client);
//! let text = compiler.compile(&profile).await?;
//! let doc = GuideDocument::parse_generated(&text)?;
//!
//! // Chat about it
//! let mut session = ConciergeSession::start(client, &doc);
//! let answer = session.ask("Where do I park?").await;
//! ```

pub mod backend;
pub mod client;
pub mod compiler;
pub mod concierge;
pub mod config;
pub mod error;

pub use backend::{GenerationBackend, Speaker, Turn};
pub use client::GeminiClient;
pub use compiler::{strip_markdown_fence, GuideCompiler, SYSTEM_INSTRUCTION};
pub use concierge::{
    greeting_for, grounding_context, ConciergeSession, CONNECTION_TROUBLE_MESSAGE,
    NOT_SURE_MESSAGE,
};
pub use config::{AiConfig, DEFAULT_MODEL};
pub use error::{Error, Result};
