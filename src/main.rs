//! Turnabout - unified CLI.

#![warn(missing_docs)]

mod chat;
mod chat_log;
mod cli;
mod clock;
mod commands;
mod config;
mod console;
mod coordinator;
mod games;
mod llm_client;
mod presenter;
mod session;

use anyhow::Result;
use chat::ChatResponder;
use chat_log::ChatLog;
use clap::Parser;
use cli::{Cli, Command};
use config::BotConfig;
use llm_client::LlmClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        BotConfig::from_file(&cli.config)?
    } else {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
        BotConfig::default()
    };

    match cli.command {
        Command::Console {
            player_one,
            player_two,
        } => console::run_console(player_one, player_two, config.timers()).await,
        Command::Chat { message, user } => run_chat(&config, &user, &message).await,
        Command::Weather { city } => run_weather(&config, &city).await,
        Command::Meme { category } => run_meme(category.as_deref()).await,
        Command::Cat => run_cat().await,
        Command::Dog => run_dog().await,
        Command::Imgen { prompt, output } => run_imgen(&config, &prompt, &output).await,
        Command::Avatar { url } => {
            for (size, variant) in commands::avatar::size_variants(&url) {
                println!("{size}px: {variant}");
            }
            Ok(())
        }
        Command::Roll { sides } => {
            println!("🎲 You rolled a {} (d{})", commands::dice::roll(sides), sides);
            Ok(())
        }
        Command::Flip => {
            println!("🪙 {}", commands::dice::flip());
            Ok(())
        }
    }
}

/// One-shot chat turn with conversation-log continuity.
async fn run_chat(config: &BotConfig, user: &str, message: &str) -> Result<()> {
    let llm = LlmClient::new(config.create_llm_config()?);
    let log = ChatLog::new(config.log_dir().clone());
    let responder = ChatResponder::new(llm, log);

    let reply = responder.respond(user, "Console", message).await?;
    println!("{reply}");
    Ok(())
}

async fn run_weather(config: &BotConfig, city: &str) -> Result<()> {
    let api_key = config.openweather_api_key()?;
    let http = reqwest::Client::new();
    let report = commands::weather::current(&http, &api_key, city).await?;
    println!("{}", commands::weather::summarize(&report));
    Ok(())
}

async fn run_meme(category: Option<&str>) -> Result<()> {
    let http = reqwest::Client::new();
    let meme = commands::meme::random_meme(&http, category).await?;
    if meme.nsfw {
        println!("(skipped an NSFW post from r/{})", meme.subreddit);
        return Ok(());
    }
    println!("{} (r/{})\n{}\n{}", meme.title, meme.subreddit, meme.url, meme.post_link);
    Ok(())
}

async fn run_cat() -> Result<()> {
    let http = reqwest::Client::new();
    println!("{}", commands::meme::random_cat(&http).await?);
    Ok(())
}

async fn run_dog() -> Result<()> {
    let http = reqwest::Client::new();
    println!("{}", commands::meme::random_dog(&http).await?);
    Ok(())
}

async fn run_imgen(config: &BotConfig, prompt: &str, output: &std::path::Path) -> Result<()> {
    let api_key = config.huggingface_api_key()?;
    let http = reqwest::Client::new();
    let image = commands::imgen::generate(&http, &api_key, prompt).await?;
    std::fs::write(output, &image.bytes)?;
    println!("Wrote {} ({} bytes)", output.display(), image.bytes.len());
    Ok(())
}
