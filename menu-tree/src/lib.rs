//! # Menu tree
//!
//! Turns a declarative [`MenuStructure`] into a command-driven menu: routing, button layout and
//! pagination, and object/array field editing with validation hooks. Message I/O goes through a
//! [`menu_core::Transport`]; session state and section data through a [`menu_core::ValueStore`].

pub mod command;
mod draw;
pub mod field;
pub mod layout;
mod menu;
mod router;
mod session;
mod structure;
mod structured;
mod text;
mod tree;

pub use command::{ParsedCommand, CMD_CANCEL, CMD_EXIT, CMD_PREFIX};
pub use field::{FieldDescriptor, FieldHooks, FieldKind, FieldPath, Presence, UNSET};
pub use layout::{LayoutSettings, LAYOUT_LIMITS};
pub use menu::Menu;
pub use session::Session;
pub use structure::MenuStructure;
pub use structured::{SectionMode, SectionSpec};
pub use text::Text;
pub use tree::{MenuNode, MenuTree, NodeId};
