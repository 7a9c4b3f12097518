use std::{env, path::PathBuf};

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
    let mut doc_id = None;
    let mut file = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].parse::<i64>().ok();
                    i += 1;
                }
            }
            "--doc-id" | "-d" => {
                if i + 1 < args.len() {
                    doc_id = args[i + 1].parse::<i64>().ok();
                    i += 1;
                }
            }
            _ if !args[i].starts_with('-') => file = Some(PathBuf::from(&args[i])),
            _ => {}
        }
        i += 1;
    }
    let (Some(user_id), Some(file)) = (user_id, file) else {
        eprintln!("Usage: askrag-ingest --user <id> [--doc-id <id>] <file>");
        std::process::exit(2);
    };
    let doc_id = doc_id.unwrap_or(1);

    println!("askrag ingest\n=============");
    println!("User: {user_id}");
    println!("File: {}", file.display());

    let engine = PersonalRagEngine::new(
        user_id,
        RagConfig::from_config(&config),
        GeneratorConfig::from_config(&config),
    )
    .await?;
    let count = engine.process_document(&file, doc_id).await;
    if count == 0 {
        println!("⚠️  Nothing stored, see logs for the cause");
        std::process::exit(1);
    }
    println!("✅ Stored {count} chunks as document {doc_id}");
    println!("📊 User {user_id} now holds {} chunks", engine.get_document_count().await);
    Ok(())
}
