//! Command-line interface for turnabout.

use clap::{Parser, Subcommand};

/// Turnabout - chat-platform game bot core
#[derive(Parser, Debug)]
#[command(name = "turnabout")]
#[command(about = "Turn-based game sessions, LLM chat, and command helpers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the bot configuration file (defaults are used if missing)
    #[arg(short, long, default_value = "turnabout.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a tic-tac-toe session through a local console presenter
    Console {
        /// Display name for the first player
        #[arg(long, default_value = "Player 1")]
        player_one: String,

        /// Display name for the second player
        #[arg(long, default_value = "Player 2")]
        player_two: String,
    },

    /// Send one chat message through the LLM and print the reply
    Chat {
        /// The message to send
        message: String,

        /// User id for conversation-log continuity
        #[arg(long, default_value = "console")]
        user: String,
    },

    /// Look up current weather for a city
    Weather {
        /// City name
        city: String,
    },

    /// Fetch a random meme, optionally from a category
    Meme {
        /// Meme category (subreddit-style)
        #[arg(long)]
        category: Option<String>,
    },

    /// Fetch a random cat picture URL
    Cat,

    /// Fetch a random dog picture URL
    Dog,

    /// Generate an image from a text prompt
    Imgen {
        /// Prompt describing the image
        prompt: String,

        /// Where to write the generated image
        #[arg(long, default_value = "generated.png")]
        output: std::path::PathBuf,
    },

    /// Print size variants for an avatar image URL
    Avatar {
        /// Base avatar URL
        url: String,
    },

    /// Roll a die
    Roll {
        /// Number of sides
        #[arg(long, default_value = "6")]
        sides: u32,
    },

    /// Flip a coin
    Flip,
}
