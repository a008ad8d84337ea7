//! Route a single prompt and print the answer.

use anyhow::Context;
use clap::Parser;
use llmroute::{Message, RoutedLlm, ToolChoice};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ask the router which model should answer, then print the answer
#[derive(Parser, Debug)]
#[command(name = "llmroute", version, about)]
struct Cli {
    /// Path to a configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prompt to route
    #[arg(required = true)]
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("llmroute=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let llm = match &cli.config {
        Some(path) => RoutedLlm::with_config_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RoutedLlm::from_default_config().context("loading default config")?,
    };

    let prompt = cli.prompt.join(" ");
    let routed = llm
        .generate_response(&[Message::user(prompt)], None, None, &ToolChoice::default())
        .await
        .context("routed completion failed")?;

    eprintln!("model: {}", routed.config.model);
    println!("{}", routed.response.content().unwrap_or_default());

    Ok(())
}
