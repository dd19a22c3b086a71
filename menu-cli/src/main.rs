//! menu CLI: run the demo menu in the console or as a Telegram bot. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use menu_cli::{demo_structure, run_console, Cli, Commands, ConsoleTransport, Language, MenuConfig};
use menu_core::{init_tracing, MemoryStore};
use menu_telegram::{run_dispatcher, TelegramConfig, TelegramTransport};
use menu_tree::Menu;
use tracing::info;

/// User id of the single console user.
const CONSOLE_USER: i64 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = MenuConfig::from_env();
    let language = Language::default();
    let structure = demo_structure(config.layout, &language);

    match cli.command {
        Commands::Console => {
            // stdout carries the menu; logs default to warnings
            init_tracing(config.log_file.as_deref(), "warn")?;
            let menu = Menu::new(structure, ConsoleTransport::stdout(), MemoryStore::new())
                .with_translator(language);
            run_console(menu, CONSOLE_USER).await
        }
        Commands::Telegram { token } => {
            let telegram = match token {
                Some(token) => TelegramConfig::with_token(token),
                None => TelegramConfig::from_env()?,
            };
            let log_file = telegram.log_file.clone().or(config.log_file);
            init_tracing(log_file.as_deref(), "info")?;
            info!("Starting Telegram menu bot");

            let bot = telegram.build_bot();
            let menu = Menu::new(structure, TelegramTransport::new(bot.clone()), MemoryStore::new())
                .with_translator(language);
            run_dispatcher(bot, menu).await
        }
    }
}
