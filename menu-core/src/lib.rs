//! # menu-core
//!
//! Core types and traits for the structured menu engine: [`Transport`], [`ValueStore`], [`Translator`],
//! button and id types, errors, and tracing initialization. Transport-agnostic; used by menu-tree,
//! menu-telegram and menu-cli.

pub mod error;
pub mod logger;
pub mod store;
pub mod translate;
pub mod transport;
pub mod types;

pub use error::{MenuError, Result, ValidationError};
pub use logger::init_tracing;
pub use store::{MemoryStore, ValueStore};
pub use translate::{NoTranslation, Translator};
pub use transport::Transport;
pub use types::{ActionContext, Button, Keyboard, MenuAction, MessageId, UserId};
