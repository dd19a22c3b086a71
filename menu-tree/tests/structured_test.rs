//! Tests for structured sections: the commit protocol (veto, reset, validation, after hooks),
//! array add/delete and list fields.

mod common;

use common::{fixture, Fixture, RecordingTransport, PEER, USER};
use menu_core::{MemoryStore, ValueStore};
use menu_tree::{FieldDescriptor, Menu, MenuStructure, SectionSpec};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn field_label(f: &Fixture, command: &str) -> String {
    let id = f.menu.find(command).expect("node exists");
    f.menu.label(id)
}

async fn item_with_label(f: &mut Fixture, label: &str) {
    f.press("/items$add").await;
    let index = f.store.get("items").and_then(|v| v.as_array().map(Vec::len)).unwrap() - 1;
    f.press(&format!("/items#{}?label", index)).await;
    f.reply(label).await;
}

/// **Test: on_set_before vetoes a change.**
///
/// **Setup:** Item with a label but no type; `enabled` may only turn on once label and type are set.
/// **Action:** Press the Enabled toggle.
/// **Expected:** No save, no after hook, stored value and rendered label unchanged.
#[tokio::test]
async fn test_before_hook_veto_leaves_state_unchanged() {
    let mut f = fixture();
    f.reply("/start").await;
    item_with_label(&mut f, "first").await;
    let saves = f.item_saves.all().len();

    f.press("/items#0?enabled").await;

    assert_eq!(f.item_saves.all().len(), saves);
    assert_eq!(f.enabled_after.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.get("items").unwrap()[0]["enabled"], json!(false));
    assert_eq!(field_label(&f, "/items#0?enabled"), "Enabled: OFF");
}

/// **Test: on_set_reset clears a dependent field.**
///
/// **Setup:** Item with label and type, then enabled.
/// **Action:** Pick another type.
/// **Expected:** `enabled` is reset to unset and renders "?".
#[tokio::test]
async fn test_reset_clears_sibling() {
    let mut f = fixture();
    f.reply("/start").await;
    item_with_label(&mut f, "first").await;

    f.press("/items#0?type").await;
    assert_eq!(
        f.transport.last_labels()[0],
        vec!["User".to_string(), "Bot".to_string(), "Group".to_string()]
    );

    f.press("/items#0?type$v=bot").await;
    f.press("/items#0?enabled").await;
    assert_eq!(field_label(&f, "/items#0?enabled"), "Enabled: ON");
    assert_eq!(f.enabled_after.load(Ordering::SeqCst), 1);
    assert_eq!(field_label(&f, "/items#0?type$v=bot"), "✓ Bot");

    f.press("/items#0?type$v=user").await;
    assert_eq!(
        f.item_saves.last(),
        Some(json!([{ "label": "first", "enabled": null, "type": "user" }]))
    );
    assert_eq!(field_label(&f, "/items#0?enabled"), "Enabled: ?");
    assert_eq!(field_label(&f, "/items#0?type"), "Type: User");
}

/// **Test: Number input is validated and on_set_after updates the live layout.**
///
/// **Action:** Type an out-of-range value, then a valid one, for `buttonsMaxCount`.
/// **Expected:** The first reply re-prompts without saving; the second saves and sets the page size.
#[tokio::test]
async fn test_number_validation_and_after_hook() {
    let mut f = fixture();
    f.reply("/start").await;
    f.press("/configuration?buttonsMaxCount").await;

    f.reply("0").await;
    assert!(f.config_saves.all().is_empty());
    assert_eq!(
        f.menu.session(USER).pending_input().as_deref(),
        Some("/configuration?buttonsMaxCount")
    );
    assert_eq!(f.menu.layout().buttons_max_count, 24);

    f.reply("abc").await;
    assert!(f.config_saves.all().is_empty());

    f.reply("2").await;
    assert_eq!(
        f.config_saves.last(),
        Some(json!({ "language": "en", "buttonsMaxCount": 2 }))
    );
    assert_eq!(f.menu.layout().buttons_max_count, 2);
    assert_eq!(f.menu.session(USER).pending_input(), None);
    assert_eq!(
        field_label(&f, "/configuration?buttonsMaxCount"),
        "Max buttons: 2"
    );
}

#[tokio::test]
async fn test_mandatory_string_rejects_empty_reply() {
    let mut f = fixture();
    f.reply("/start").await;
    f.press("/items$add").await;
    f.press("/items#0?label").await;

    f.reply("   ").await;
    assert_eq!(f.item_saves.all().len(), 1);
    assert!(f.menu.session(USER).pending_input().is_some());
}

#[tokio::test]
async fn test_list_choice_in_object_section() {
    let mut f = fixture();
    f.reply("/start").await;
    f.press("/configuration?language").await;
    f.press("/configuration?language$v=uk").await;

    assert_eq!(
        f.config_saves.last(),
        Some(json!({ "language": "uk", "buttonsMaxCount": 24 }))
    );
    let (text, _) = f.transport.last_screen().unwrap();
    assert_eq!(text, "Configuration");
    assert_eq!(field_label(&f, "/configuration?language"), "Language: Ukrainian");
}

/// **Test: Deleting an item renumbers the rest.**
///
/// **Setup:** Two items labelled "first" and "second".
/// **Action:** Delete item #0.
/// **Expected:** Save gets the one remaining record; `/items#1` no longer exists and `/items#0`
/// now addresses "second".
#[tokio::test]
async fn test_delete_renumbers_items() {
    let mut f = fixture();
    f.reply("/start").await;
    item_with_label(&mut f, "first").await;
    item_with_label(&mut f, "second").await;
    assert!(f.menu.find("/items#1").is_some());

    f.press("/items#0$delete").await;

    assert_eq!(
        f.item_saves.last(),
        Some(json!([{ "label": "second", "enabled": false, "type": null }]))
    );
    assert!(f.menu.find("/items#1").is_none());
    assert!(f.menu.find("/items#1?label").is_none());
    assert_eq!(field_label(&f, "/items#0?label"), "Label: second");
    let (text, _) = f.transport.last_screen().unwrap();
    assert_eq!(text, "Items");
}

#[tokio::test]
async fn test_items_follow_host_data() {
    let mut f = fixture();
    f.store.set(
        "items",
        json!([
            { "label": "a", "enabled": false, "type": "bot" },
            { "label": "b", "enabled": true, "type": "user" }
        ]),
    );
    f.reply("/start").await;
    f.press("/items#1?type").await;
    let (text, _) = f.transport.last_screen().unwrap();
    assert_eq!(text, "Type");

    // the host shrinks the list: the stale item screen falls back to the section
    let stale = f.menu.find("/items#1").unwrap();
    f.store.set("items", json!([{ "label": "a" }]));
    f.menu.draw(&PEER, USER, stale).await;

    let (text, _) = f.transport.last_screen().unwrap();
    assert_eq!(text, "Items");
    assert!(f.menu.find("/items#1").is_none());
    assert!(f.menu.find("/items#0").is_some());
}

#[tokio::test]
async fn test_primary_id_and_read_only_field() {
    let transport = RecordingTransport::new();
    let store = MemoryStore::new();
    store.set("users", json!([{ "name": "ann", "id": 1 }]));
    let structure = MenuStructure::new("start", "Main Menu").section(
        "users",
        SectionSpec::array("Users")
            .field("name", FieldDescriptor::string("Name"))
            .field("id", FieldDescriptor::integer("Id", 0, 1000, 1).read_only())
            .primary_id(|record| format!("@{}", record["name"].as_str().unwrap_or("?"))),
    );
    let mut menu = Menu::new(structure, transport.clone(), store.clone());

    menu.on_command(&PEER, USER, None, "/users", true).await;
    assert_eq!(transport.last_labels()[0], vec!["@ann".to_string()]);

    menu.on_command(&PEER, USER, None, "/users#0?id", true).await;
    let (text, _) = transport.last_screen().unwrap();
    assert_eq!(text, "@ann");
    assert_eq!(menu.session(USER).pending_input(), None);
    assert_eq!(store.get("users").unwrap()[0]["id"], json!(1));
}

#[tokio::test]
async fn test_dynamic_list_refresh() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let structure = MenuStructure::new("start", "Main Menu").section(
        "settings",
        SectionSpec::object("Settings").field(
            "lang",
            FieldDescriptor::dynamic_list("Language", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                (0..=n).map(|i| (format!("l{}", i), format!("L{}", i))).collect()
            }),
        ),
    );
    let transport = RecordingTransport::new();
    let mut menu = Menu::new(structure, transport.clone(), MemoryStore::new());

    menu.on_command(&PEER, USER, None, "/settings?lang", true).await;
    let rows = transport.last_labels();
    assert_eq!(rows[0], vec!["L0".to_string()]);
    assert_eq!(rows[1], vec!["Refresh".to_string()]);

    menu.on_command(&PEER, USER, None, "/settings?lang", true).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    menu.on_command(&PEER, USER, None, "/settings?lang$extra=refresh", true)
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        transport.last_labels()[0],
        vec!["L0".to_string(), "L1".to_string()]
    );

    menu.on_command(&PEER, USER, None, "/settings?lang$v=l1", true).await;
    let id = menu.find("/settings?lang").unwrap();
    assert_eq!(menu.label(id), "Language: L1");
}

/// **Test: on_set_before sees whole records.**
///
/// **Setup:** Object section where `mode` resets `level`; the before hook records its arguments.
/// **Action:** Pick `mode = fast` while `level` is set.
/// **Expected:** The hook gets the stored record, the key, and the candidate record with the new
/// value and the reset sibling already unset, plus the field path.
#[tokio::test]
async fn test_before_hook_receives_current_and_candidate_records() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let store = MemoryStore::new();
    store.set("tuning", json!({ "mode": "slow", "level": 3 }));
    let structure = MenuStructure::new("start", "Main Menu").section(
        "tuning",
        SectionSpec::object("Tuning")
            .field(
                "mode",
                FieldDescriptor::list("Mode", [("slow", "Slow"), ("fast", "Fast")])
                    .on_set_reset(["level"])
                    .on_set_before(move |current, key, candidate, path| {
                        log.lock().unwrap().push((
                            current.clone(),
                            key.to_string(),
                            candidate.clone(),
                            path.to_string(),
                        ));
                        true
                    }),
            )
            .field("level", FieldDescriptor::integer("Level", 0, 10, 1)),
    );
    let transport = RecordingTransport::new();
    let mut menu = Menu::new(structure, transport, store.clone());

    menu.on_command(&PEER, USER, None, "/tuning?mode$v=fast", true).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (current, key, candidate, path) = &seen[0];
    assert_eq!(current, &json!({ "mode": "slow", "level": 3 }));
    assert_eq!(key, "mode");
    assert_eq!(candidate, &json!({ "mode": "fast", "level": null }));
    assert_eq!(path, "tuning.mode");
    assert_eq!(store.get("tuning"), Some(json!({ "mode": "fast", "level": null })));
}
