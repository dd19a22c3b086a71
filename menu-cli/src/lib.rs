//! # menu-cli
//!
//! Demo host for the menu engine: argument parsing, env config, the example menu, and the console
//! transport. Telegram mode is provided by menu-telegram.

pub mod cli;
pub mod config;
pub mod console;
pub mod demo;

pub use cli::{Cli, Commands};
pub use config::MenuConfig;
pub use console::{run_console, ConsoleInput, ConsoleTransport, CONSOLE_PEER};
pub use demo::{demo_structure, item_primary_id, Language};
