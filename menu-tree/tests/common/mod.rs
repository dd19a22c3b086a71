//! Shared fixtures: a recording transport and the configuration/items example menu.

#![allow(dead_code)]

use async_trait::async_trait;
use menu_core::{Button, MemoryStore, MenuError, MessageId, Result, Transport};
use menu_tree::{FieldDescriptor, LayoutSettings, Menu, MenuStructure, SectionSpec, LAYOUT_LIMITS};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const USER: i64 = 7;
pub const PEER: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send { text: String, buttons: Vec<Vec<Button>> },
    Edit { id: MessageId, text: String, buttons: Vec<Vec<Button>> },
    Delete(MessageId),
    Confirm,
}

/// Records every transport call. `stale` makes the next edit fail as if the message were gone;
/// `failing` makes sends and edits fail with a transport error until it is reset.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub stale: Arc<AtomicBool>,
    pub failing: Arc<AtomicBool>,
    next_id: Arc<AtomicI64>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Text and buttons of the last send or edit.
    pub fn last_screen(&self) -> Option<(String, Vec<Vec<Button>>)> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Send { text, buttons } | Call::Edit { text, buttons, .. } => Some((text, buttons)),
            _ => None,
        })
    }

    pub fn last_labels(&self) -> Vec<Vec<String>> {
        self.last_screen()
            .map(|(_, buttons)| {
                buttons
                    .iter()
                    .map(|row| row.iter().map(|b| b.label.clone()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    type Peer = i64;
    type Button = Button;

    fn make_button(&self, label: &str, command: &str) -> Button {
        Button::new(label, command)
    }

    async fn send_message(&self, _peer: &i64, text: &str, buttons: Vec<Vec<Button>>) -> Result<MessageId> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MenuError::Transport("send failed".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Send {
            text: text.to_string(),
            buttons,
        });
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_message(
        &self,
        _peer: &i64,
        message_id: MessageId,
        text: &str,
        buttons: Vec<Vec<Button>>,
    ) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MenuError::Transport("edit failed".to_string()));
        }
        if self.stale.swap(false, Ordering::SeqCst) {
            return Err(MenuError::StaleMessage(message_id));
        }
        self.calls.lock().unwrap().push(Call::Edit {
            id: message_id,
            text: text.to_string(),
            buttons,
        });
        Ok(())
    }

    async fn delete_message(&self, _peer: &i64, message_id: MessageId) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Delete(message_id));
        Ok(())
    }

    async fn confirm_callback(&self, _peer: &i64) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Confirm);
        Ok(())
    }
}

/// Collections passed to the save callbacks, in call order.
#[derive(Clone, Default)]
pub struct Saves(pub Arc<Mutex<Vec<Value>>>);

impl Saves {
    pub fn all(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Value> {
        self.all().last().cloned()
    }

    fn hook(&self) -> impl Fn(&Value) + Send + Sync + 'static {
        let saves = self.0.clone();
        move |value: &Value| saves.lock().unwrap().push(value.clone())
    }
}

pub struct Fixture {
    pub menu: Menu<RecordingTransport>,
    pub transport: RecordingTransport,
    pub store: MemoryStore,
    pub config_saves: Saves,
    pub item_saves: Saves,
    /// Runs of the `enabled` field's after hook.
    pub enabled_after: Arc<AtomicUsize>,
}

/// Root `/start` with a `configuration` object and an `items` array.
pub fn example_structure(
    config_saves: &Saves,
    item_saves: &Saves,
    enabled_after: &Arc<AtomicUsize>,
) -> MenuStructure {
    let enabled_runs = enabled_after.clone();
    let limit = LAYOUT_LIMITS.buttons_max_count;
    let configuration = SectionSpec::object("Configuration")
        .field(
            "language",
            FieldDescriptor::list("Language", [("en", "English"), ("uk", "Ukrainian")])
                .default_value("en"),
        )
        .field(
            "buttonsMaxCount",
            FieldDescriptor::integer("Max buttons", limit.min as i64, limit.max as i64, limit.step as i64)
                .default_value(limit.default as i64)
                .on_set_after(|record, key, _path, layout: &mut LayoutSettings| {
                    if let Some(count) = record.get(key).and_then(Value::as_u64) {
                        layout.buttons_max_count = count as usize;
                    }
                }),
        )
        .save(config_saves.hook());

    let items = SectionSpec::array("Items")
        .item_label("Item")
        .field("label", FieldDescriptor::string("Label"))
        .field(
            "enabled",
            FieldDescriptor::boolean("Enabled")
                .default_value(false)
                .on_set_before(|current, key, candidate, _path| {
                    let ready = |record: &Value| {
                        !record["label"].is_null() && !record["type"].is_null()
                    };
                    !candidate[key].as_bool().unwrap_or(false) || ready(current)
                })
                .on_set_after(move |_record, _key, _path, _layout| {
                    enabled_runs.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .field(
            "type",
            FieldDescriptor::list("Type", [("user", "User"), ("bot", "Bot"), ("group", "Group")])
                .on_set_reset(["enabled"]),
        )
        .save(item_saves.hook());

    MenuStructure::new("start", "Main Menu")
        .text("This is the main menu")
        .section("configuration", configuration)
        .section("items", items)
}

pub fn fixture() -> Fixture {
    let transport = RecordingTransport::new();
    let store = MemoryStore::new();
    let config_saves = Saves::default();
    let item_saves = Saves::default();
    let enabled_after = Arc::new(AtomicUsize::new(0));
    let menu = Menu::new(
        example_structure(&config_saves, &item_saves, &enabled_after),
        transport.clone(),
        store.clone(),
    );
    Fixture {
        menu,
        transport,
        store,
        config_saves,
        item_saves,
        enabled_after,
    }
}

impl Fixture {
    pub async fn press(&mut self, command: &str) {
        self.menu.on_command(&PEER, USER, Some(1), command, true).await;
    }

    pub async fn reply(&mut self, text: &str) {
        self.menu.on_command(&PEER, USER, Some(99), text, false).await;
    }
}
