//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "menu")]
#[command(about = "Structured menu demo: console or Telegram", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the demo menu in the terminal. Press buttons with "#N", anything else is typed input.
    Console,
    /// Run the demo menu as a Telegram bot (config from env; token can override BOT_TOKEN).
    Telegram {
        #[arg(short, long)]
        token: Option<String>,
    },
}
