//! Minimal end-to-end walkthrough: build an engine with the default
//! content catalog, run a short conversation, and print what each turn
//! produced. Run with `cargo run -p frontdesk-engine --example quickstart`.

use std::sync::Arc;

use frontdesk_config::EngineConfig;
use frontdesk_engine::Engine;
use frontdesk_prompt::InstructionSet;
use frontdesk_retrieval::{vector_backend, StaticContentStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,frontdesk=debug".into()),
        )
        .init();

    let config = Arc::new(EngineConfig::from_env().expect("valid configuration"));
    let vector = vector_backend(&config.vector).expect("vector backend");
    let engine = Engine::new(
        Arc::clone(&config),
        Arc::new(StaticContentStore::with_default_catalog()),
        vector,
        InstructionSet::with_default_sections(),
    );

    let session = "demo";
    for message in [
        "Dzień dobry! Ile kosztuje wejście?",
        "chciałbym zrobić rezerwację",
        "15.03",
    ] {
        let out = engine.turn(session, message).await;
        println!("guest:    {message}");
        println!("language: {}", out.language);
        println!("topic:    {}", out.last_topic.as_deref().unwrap_or("-"));
        println!("fragments: {}", out.fragments.len());
        println!("prompt ({} chars)\n", out.prompt.len());
        engine.record_reply(session, "…").await;
    }
}
