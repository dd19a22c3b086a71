//! The demo menu: a `configuration` object and an `items` array.

use menu_core::Translator;
use menu_tree::{FieldDescriptor, LayoutSettings, MenuStructure, SectionSpec, LAYOUT_LIMITS};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::info;

const LANGUAGES: [(&str, &str); 5] = [
    ("en", "English"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("uk", "Ukrainian"),
];

const SOURCE_TYPES: [(&str, &str); 5] = [
    ("user", "User"),
    ("bot", "Bot"),
    ("group", "Group"),
    ("channel", "Channel"),
    ("topic", "Topic"),
];

const UKRAINIAN: [(&str, &str); 9] = [
    ("Back", "Назад"),
    ("Home", "Головна"),
    ("Exit", "Вихід"),
    ("Cancel", "Скасувати"),
    ("Refresh", "Оновити"),
    ("Add new item", "Додати"),
    ("Delete", "Видалити"),
    ("ON", "Увімк."),
    ("OFF", "Вимк."),
];

/// Current menu language, shared between the language field and the translator.
#[derive(Debug, Clone)]
pub struct Language(Arc<RwLock<String>>);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(code.into())))
    }

    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, code: &str) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = code.to_string();
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Translator for Language {
    fn translate(&self, text: &str) -> String {
        if self.get() == "uk" {
            if let Some((_, translated)) = UKRAINIAN.iter().find(|(source, _)| *source == text) {
                return translated.to_string();
            }
        }
        text.to_string()
    }
}

/// Item label plus an enabled marker, e.g. "Alerts ✅".
pub fn item_primary_id(item: &Value) -> String {
    let label = item["label"].as_str().unwrap_or_default();
    let marker = if item["enabled"].as_bool().unwrap_or(false) {
        "✅"
    } else {
        "❌"
    };
    format!("{} {}", label, marker)
}

fn save_logger(section: &'static str) -> impl Fn(&Value) + Send + Sync + 'static {
    move |data: &Value| info!(section, data = %data, "Saving section")
}

/// Enabling an item needs both a label and a type; disabling is always allowed.
fn ready_to_enable(current: &Value, key: &str, candidate: &Value) -> bool {
    let enabling = candidate[key].as_bool().unwrap_or(false);
    let ready = !candidate["label"].is_null() && !candidate["type"].is_null();
    if enabling && !ready && current[key] != Value::Bool(true) {
        info!(item = %candidate, "Item is not ready for enabling");
        return false;
    }
    true
}

/// Builds the demo structure. The language field switches `language`; the max-buttons field
/// updates the live layout.
pub fn demo_structure(layout: LayoutSettings, language: &Language) -> MenuStructure {
    let buttons = LAYOUT_LIMITS.buttons_max_count;
    let language_handle = language.clone();

    let configuration = SectionSpec::object("Configuration")
        .text("Menu configuration")
        .field(
            "language",
            FieldDescriptor::list("Menu language", LANGUAGES)
                .text("Language of the Menu")
                .default_value(language.get())
                .on_set_after(move |record, key, _path, _layout| {
                    if let Some(code) = record.get(key).and_then(Value::as_str) {
                        info!(language = code, "Language changed");
                        language_handle.set(code);
                    }
                }),
        )
        .field(
            "buttonsMaxCount",
            FieldDescriptor::integer(
                "Max buttons on \"page\"",
                buttons.min as i64,
                buttons.max as i64,
                buttons.step as i64,
            )
            .text("Max count of buttons on the one \"page\" of the menu")
            .default_value(layout.buttons_max_count as i64)
            .on_set_after(|record, key, _path, layout: &mut LayoutSettings| {
                if let Some(count) = record.get(key).and_then(Value::as_u64) {
                    layout.buttons_max_count = count as usize;
                }
            }),
        )
        .save(save_logger("configuration"));

    let items = SectionSpec::array("Items")
        .text("Items for example")
        .item_label("Item")
        .item_text("Item for example")
        .primary_id(item_primary_id)
        .field(
            "label",
            FieldDescriptor::string("Label").text("Item identification label"),
        )
        .field(
            "enabled",
            FieldDescriptor::boolean("Enabled")
                .text("Enable/disable item")
                .default_value(false)
                .on_set_before(|current, key, candidate, _path| ready_to_enable(current, key, candidate)),
        )
        .field(
            "type",
            FieldDescriptor::list("Type of source", SOURCE_TYPES)
                .text("Type of source, i.e. chat/group/channel")
                .on_set_reset(["enabled"]),
        )
        .save(save_logger("items"));

    MenuStructure::new("start", "Main Menu")
        .text("This is the main menu")
        .layout(layout)
        .section("configuration", configuration)
        .section("items", items)
}
