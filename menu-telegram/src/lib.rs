//! # menu-telegram
//!
//! Telegram binding for the menu engine: [`TelegramTransport`] renders menus as inline keyboards,
//! [`run_dispatcher`] feeds messages and button presses into a [`menu_tree::Menu`].
//! Handles only Telegram connectivity; the menu itself lives in menu-tree.

mod adapters;
mod config;
mod runner;
mod transport;

pub use adapters::{user_id, Inbound};
pub use config::TelegramConfig;
pub use runner::{run_dispatcher, SharedMenu};
pub use transport::{TelegramPeer, TelegramTransport, CALLBACK_DATA_MAX};
