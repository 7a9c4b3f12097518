use std::env;

use askrag_core::config::{Config, RagConfig};
use askrag_engine::PersonalRagEngine;
use askrag_llm::GeneratorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut user_id = None;
    let mut delete_doc = None;
    let mut clear = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].parse::<i64>().ok();
                    i += 1;
                }
            }
            "--delete" => {
                if i + 1 < args.len() {
                    delete_doc = args[i + 1].parse::<i64>().ok();
                    i += 1;
                }
            }
            "--clear" => clear = true,
            _ => {}
        }
        i += 1;
    }
    let Some(user_id) = user_id else {
        eprintln!("Usage: askrag-docs --user <id> [--delete <doc-id> | --clear]");
        std::process::exit(2);
    };

    let engine = PersonalRagEngine::new(
        user_id,
        RagConfig::from_config(&config),
        GeneratorConfig::from_config(&config),
    )
    .await?;

    if let Some(doc_id) = delete_doc {
        if engine.delete_document(doc_id).await {
            println!("✅ Deleted document {doc_id}");
        } else {
            println!("⚠️  Delete failed, see logs for the cause");
            std::process::exit(1);
        }
    } else if clear {
        if engine.clear_all().await {
            println!("✅ Cleared all documents for user {user_id}");
        } else {
            println!("⚠️  Clear failed, see logs for the cause");
            std::process::exit(1);
        }
    }

    println!("📊 User {user_id} holds {} chunks", engine.get_document_count().await);
    Ok(())
}
