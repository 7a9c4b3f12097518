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
    let mut question_parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].parse::<i64>().ok();
                    i += 1;
                }
            }
            _ if !args[i].starts_with('-') => question_parts.push(args[i].clone()),
            _ => {}
        }
        i += 1;
    }
    let question = question_parts.join(" ");
    let Some(user_id) = user_id else {
        eprintln!("Usage: askrag-ask --user <id> '<question>'");
        std::process::exit(2);
    };
    if question.is_empty() {
        eprintln!("Usage: askrag-ask --user <id> '<question>'");
        std::process::exit(2);
    }

    let engine = PersonalRagEngine::new(
        user_id,
        RagConfig::from_config(&config),
        GeneratorConfig::from_config(&config),
    )
    .await?;
    let outcome = engine.query(&question).await;

    println!("{}", outcome.answer);
    if !outcome.sources.is_empty() {
        println!("\nSources:");
        for source in &outcome.sources {
            println!("  • {}", source.title);
        }
    }
    Ok(())
}
