//! Casita - AI-assisted house manuals for short-stay hosts
//!
//! Hosts author a property profile, one generation call turns it into a
//! guest-readable guide document, and guests read the rendered manual or
//! chat with a concierge grounded in it.

use std::io::{self, BufRead, Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use casita_ai::{greeting_for, AiConfig, ConciergeSession, GeminiClient, GuideCompiler};
use casita_core::{Database, GuideDocument, ProfileRepository, PropertyProfile};

mod config;
mod handlers;
mod render;
mod state;

use config::AppConfig;
use state::{AppSession, CurrentUser};

const USAGE: &str = "Casita - AI-assisted house manuals

Usage: casita <command>

Commands:
  list              List your guides, newest first
  new [file.json]   Create a draft guide, optionally imported from JSON
  generate <id>     Build (or rebuild) the guest guide for a draft
  show <id>         Preview a guide, generating it if needed
  guest <id>        Render a guide the way a guest link does
  chat <id>         Talk to the concierge for a generated guide
  delete <id>       Delete a guide";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(message) = run().await {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let app_config = AppConfig::load_or_init().map_err(|e| e.to_string())?;
    let db_path = app_config.database_path().map_err(|e| e.to_string())?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let db = Database::open(&db_path).map_err(|e| e.to_string())?;

    let mut session = AppSession::new();
    let host = CurrentUser {
        id: app_config.owner_id,
        name: app_config.owner_name.clone(),
    };

    match command.as_str() {
        "list" => {
            handlers::sign_in(&mut session, host)?;
            let guides = handlers::list_guides(&db, app_config.owner_id)?;
            if guides.is_empty() {
                println!("No guides yet. Start one with: casita new");
                return Ok(());
            }
            for (i, guide) in guides.iter().enumerate() {
                let status = if guide.generated_guide.is_some() {
                    "generated"
                } else {
                    "draft"
                };
                println!(
                    "{}. {} ({}) - {status}",
                    i + 1,
                    display_name(guide),
                    guide.created_at.format("%Y-%m-%d")
                );
                println!("   ID: {}", guide.id);
                println!("   Link: {}", app_config.share_url(guide.id));
            }
        }

        "new" => {
            handlers::sign_in(&mut session, host)?;
            let draft = match args.get(1) {
                Some(path) => import_draft(path)?,
                None => {
                    handlers::create_draft(&mut session)?;
                    session
                        .active_profile()
                        .cloned()
                        .ok_or_else(|| "No draft was created.".to_string())?
                }
            };
            db.upsert_profile(&draft, app_config.owner_id)
                .map_err(|e| format!("Error saving guide: {e}"))?;
            println!("Draft saved: {}", draft.id);
            println!("Fill it in, then run: casita generate {}", draft.id);
        }

        "generate" => {
            let id = parse_id(args.get(1))?;
            handlers::sign_in(&mut session, host)?;
            let profile = db
                .find_profile_by_id(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Guide not found.".to_string())?;
            let property_name = display_name(&profile);
            session.edit(profile).map_err(|e| e.to_string())?;

            let compiler = build_compiler()?;
            handlers::submit_profile(&mut session, &db, &compiler).await?;

            if let Some(content) = session.generated_content() {
                if let Ok(doc) = GuideDocument::parse_generated(content) {
                    println!("{}", render::render_guide(&doc, &property_name));
                }
            }
            println!("Guide ready. Share it: {}", app_config.share_url(id));
        }

        "show" => {
            let id = parse_id(args.get(1))?;
            handlers::sign_in(&mut session, host)?;
            let profile = db
                .find_profile_by_id(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Guide not found.".to_string())?;
            let property_name = display_name(&profile);

            let has_cache = profile
                .generated_guide
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty());
            if has_cache {
                handlers::view_guide(&mut session, &db, &cache_only_compiler(), id).await?;
            } else {
                let compiler = build_compiler()?;
                handlers::view_guide(&mut session, &db, &compiler, id).await?;
            }

            let content = session
                .generated_content()
                .ok_or_else(|| "Guide not found.".to_string())?;
            let doc = GuideDocument::parse_generated(content).map_err(|e| e.to_string())?;
            println!("{}", render::render_guide(&doc, &property_name));
        }

        "guest" => {
            let id = parse_id(args.get(1))?;
            // Guest links resolve without signing in
            handlers::guest_view(&mut session, &db, id)?;
            let profile = session
                .active_profile()
                .cloned()
                .ok_or_else(|| "Guide not found.".to_string())?;
            match session
                .generated_content()
                .and_then(|c| GuideDocument::parse_generated(c).ok())
            {
                Some(doc) => println!("{}", render::render_guide(&doc, &display_name(&profile))),
                None => println!("This guide has not been generated yet."),
            }
        }

        "chat" => {
            let id = parse_id(args.get(1))?;
            handlers::guest_view(&mut session, &db, id)?;
            let profile = session
                .active_profile()
                .cloned()
                .ok_or_else(|| "Guide not found.".to_string())?;
            let doc = session
                .generated_content()
                .and_then(|c| GuideDocument::parse_generated(c).ok())
                .ok_or_else(|| "This guide has not been generated yet.".to_string())?;

            let client = build_client()?;
            let mut concierge = ConciergeSession::start(client, &doc);
            println!("{}", greeting_for(&display_name(&profile)));
            println!("(type 'exit' to leave the chat)");

            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush().map_err(|e| e.to_string())?;

                let mut line = String::new();
                // Input stays blocked until the previous answer arrived;
                // one in-flight question per session
                if stdin.lock().read_line(&mut line).map_err(|e| e.to_string())? == 0 {
                    break;
                }
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if question.eq_ignore_ascii_case("exit") {
                    break;
                }

                let answer = concierge.ask(question).await;
                println!("{answer}");
            }
        }

        "delete" => {
            let id = parse_id(args.get(1))?;
            handlers::sign_in(&mut session, host)?;
            let mut guides = handlers::list_guides(&db, app_config.owner_id)?;
            handlers::delete_guide(&db, &mut guides, id)?;
            println!("Deleted. {} guide(s) remaining.", guides.len());
        }

        _ => {
            println!("{USAGE}");
        }
    }

    Ok(())
}

fn display_name(profile: &PropertyProfile) -> String {
    if profile.property_name.trim().is_empty() {
        "Untitled guide".to_string()
    } else {
        profile.property_name.clone()
    }
}

fn parse_id(arg: Option<&String>) -> Result<Uuid, String> {
    let raw = arg.ok_or_else(|| "A guide id is required.".to_string())?;
    Uuid::parse_str(raw).map_err(|_| "Invalid guide id.".to_string())
}

fn import_draft(path: &str) -> Result<PropertyProfile, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("Could not read {path}: {e}"))?;
    let mut profile: PropertyProfile =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid profile JSON: {e}"))?;
    if profile.id.is_nil() {
        profile.id = Uuid::new_v4();
    }
    Ok(profile)
}

fn build_client() -> Result<GeminiClient, String> {
    let ai_config = AiConfig::from_env().map_err(|e| e.to_string())?;
    GeminiClient::new(ai_config).map_err(|e| match e {
        casita_ai::Error::MissingApiKey => {
            "Set GEMINI_API_KEY to talk to the AI Superhost.".to_string()
        }
        other => other.to_string(),
    })
}

fn build_compiler() -> Result<GuideCompiler<GeminiClient>, String> {
    Ok(GuideCompiler::new(build_client()?))
}

/// Compiler for paths that must never reach the network (cached views).
/// The backend refuses, so a cache miss surfaces as a normal generation
/// failure instead of silently spending an API call.
fn cache_only_compiler() -> GuideCompiler<offline::OfflineBackend> {
    GuideCompiler::new(offline::OfflineBackend)
}

mod offline {
    use async_trait::async_trait;
    use casita_ai::{Error, GenerationBackend, Result, Turn};

    pub struct OfflineBackend;

    #[async_trait]
    impl GenerationBackend for OfflineBackend {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
            Err(Error::Config("offline backend cannot generate".to_string()))
        }

        async fn converse(&self, _system: &str, _turns: &[Turn]) -> Result<String> {
            Err(Error::Config("offline backend cannot converse".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "offline"
        }
    }
}
