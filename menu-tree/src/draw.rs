//! Draw/dispatch cycle: the `on_command` entry point, built-in node behaviour and rendering.

use menu_core::{ActionContext, Button, Keyboard, MenuError, MessageId, Transport, UserId};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::command::{
    cancel_command, extra_command, item_command, ParsedCommand, CMD_CANCEL, CMD_EXIT,
    EXTRA_REFRESH,
};
use crate::field::FieldKind;
use crate::layout::{navigation_row, page_rows, LayoutEntry};
use crate::menu::Menu;
use crate::tree::{NodeId, NodeKind, SectionId};

const LABEL_BACK: &str = "Back";
const LABEL_HOME: &str = "Home";
const LABEL_EXIT: &str = "Exit";
const LABEL_CANCEL: &str = "Cancel";
const LABEL_REFRESH: &str = "Refresh";

impl<T: Transport> Menu<T> {
    /// Button grid of a node: the current page of children, navigation, the bottom row, then
    /// Back/Home/Exit. An input field waiting for a reply only offers Cancel.
    pub fn get_buttons(&self, id: NodeId, user: UserId) -> Keyboard {
        let Some(node) = self.tree.node(id) else {
            return Vec::new();
        };
        let holder_command = node
            .holder
            .and_then(|holder| self.tree.command(holder))
            .unwrap_or(node.command.as_str());

        if let NodeKind::Field { section, key, .. } = &node.kind {
            let takes_input = self
                .section(*section)
                .and_then(|s| s.field(key))
                .is_some_and(|f| f.takes_input());
            if takes_input {
                return vec![vec![Button::new(
                    self.translate(LABEL_CANCEL),
                    cancel_command(holder_command),
                )]];
            }
        }

        let entries: Vec<LayoutEntry> = node
            .nested
            .iter()
            .filter_map(|child| {
                Some(LayoutEntry {
                    button: Button::new(self.label(*child), self.tree.command(*child)?),
                    group: self.tree.group(*child)?.to_string(),
                })
            })
            .collect();
        let offset = self.session(user).buttons_offset();

        let mut rows = page_rows(&entries, offset, &self.layout);
        let navigation = navigation_row(&node.command, entries.len(), offset, &self.layout);
        if !navigation.is_empty() {
            rows.push(navigation);
        }

        let mut bottom: Vec<Button> = node
            .bottom
            .iter()
            .map(|b| Button::new(self.translate(&b.label), b.command.clone()))
            .collect();
        if self.is_dynamic_list(id) {
            bottom.push(Button::new(
                self.translate(LABEL_REFRESH),
                extra_command(&node.command, EXTRA_REFRESH),
            ));
        }
        if !bottom.is_empty() {
            rows.push(bottom);
        }

        let root = self.tree.root();
        let mut last = Vec::new();
        if let Some(holder) = node.holder {
            last.push(Button::new(self.translate(LABEL_BACK), holder_command));
            if holder != root {
                if let Some(root_command) = self.tree.command(root) {
                    last.push(Button::new(self.translate(LABEL_HOME), root_command));
                }
            }
        }
        last.push(Button::new(self.translate(LABEL_EXIT), CMD_EXIT));
        rows.push(last);
        rows
    }

    fn is_dynamic_list(&self, id: NodeId) -> bool {
        match self.tree.kind(id) {
            Some(NodeKind::Field { section, key, .. }) => self
                .section(section)
                .and_then(|s| s.field(&key))
                .is_some_and(|f| matches!(f.kind(), FieldKind::List(list) if list.is_dynamic())),
            _ => false,
        }
    }

    /// Renders a node into the tracked menu message, or a new one.
    ///
    /// A node whose data is gone hands drawing to its holder. A stale tracked message is
    /// forgotten and the menu is sent again; other transport failures are logged.
    pub async fn draw(&mut self, peer: &T::Peer, user: UserId, id: NodeId) {
        let mut target = id;
        while !self.refresh(target, false) {
            match self.tree.holder(target) {
                Some(holder) => target = holder,
                None => break,
            }
        }

        let text = self.text(target);
        let buttons: Vec<Vec<T::Button>> = self
            .get_buttons(target, user)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| self.transport.make_button(&b.label, &b.command))
                    .collect()
            })
            .collect();

        let session = self.session(user);
        if let Some(message_id) = session.message_id() {
            match self
                .transport
                .edit_message(peer, message_id, &text, buttons.clone())
                .await
            {
                Ok(()) => {
                    debug!(user_id = user, message_id, "Menu message edited");
                    return;
                }
                Err(MenuError::StaleMessage(_)) => {
                    info!(user_id = user, message_id, "Menu message is gone, sending a new one");
                    session.clear_message_id();
                }
                Err(e) => {
                    warn!(user_id = user, message_id, error = %e, "Failed to edit menu message");
                    return;
                }
            }
        }

        match self.transport.send_message(peer, &text, buttons).await {
            Ok(message_id) => {
                session.set_message_id(message_id);
                debug!(user_id = user, message_id, "Menu message sent");
            }
            Err(e) => warn!(user_id = user, error = %e, "Failed to send menu message"),
        }
    }

    /// Single entry point for everything the user sends: button presses (`is_event`) and typed
    /// replies. Never fails; problems are logged.
    ///
    /// A button press is acknowledged before routing. The acknowledgement is awaited but its
    /// failure is only logged, so it never blocks the rest of the command.
    #[instrument(skip(self, peer), fields(menu = %self.id))]
    pub async fn on_command(
        &mut self,
        peer: &T::Peer,
        user: UserId,
        message_id: Option<MessageId>,
        command: &str,
        is_event: bool,
    ) {
        if is_event {
            if let Err(e) = self.transport.confirm_callback(peer).await {
                warn!(user_id = user, error = %e, "Failed to confirm callback");
            }
        }

        let session = self.session(user);
        let mut command = command.to_string();
        let mut input = None;
        let cancelled = command.strip_prefix(CMD_CANCEL).map(str::to_string);
        if let Some(rest) = cancelled {
            session.clear_pending_input();
            command = if rest.is_empty() {
                self.tree.command(self.tree.root()).unwrap_or_default().to_string()
            } else {
                rest
            };
            debug!(user_id = user, command = %command, "Input cancelled");
        } else if let Some(pending) = session.pending_input() {
            if is_event {
                session.clear_pending_input();
            } else {
                input = Some(command);
                command = pending;
            }
        }

        let Some(target) = self.get_by_command(&command, user) else {
            warn!(user_id = user, command = %command, "Command discarded");
            return;
        };

        if !is_event {
            if let Some(message_id) = message_id {
                if let Err(e) = self.transport.delete_message(peer, message_id).await {
                    debug!(user_id = user, message_id, error = %e, "Failed to delete user message");
                }
            }
        }

        let ctx = ActionContext {
            user_id: user,
            message_id,
            command,
            is_event,
        };
        self.execute(peer, target, ctx, input).await;
    }

    async fn execute(&mut self, peer: &T::Peer, target: NodeId, ctx: ActionContext, input: Option<String>) {
        let user = ctx.user_id;
        let parsed = ParsedCommand::parse(&ctx.command);
        let Some(kind) = self.tree.kind(target) else {
            return;
        };
        match kind {
            NodeKind::Root if parsed.path == CMD_EXIT => self.exit(peer, user).await,
            NodeKind::Action(Some(action)) => {
                if action.run(&ctx).await {
                    self.hard_reset(peer, user).await;
                }
                self.draw(peer, user, target).await;
            }
            NodeKind::Field {
                section,
                index,
                key,
            } => {
                self.execute_field(peer, user, target, (section, index, key), &parsed, input)
                    .await
            }
            NodeKind::Choice {
                section,
                index,
                key,
                value,
            } => {
                match self.parse_candidate(section, &key, &value) {
                    Ok(candidate) => {
                        self.commit(section, index, &key, candidate);
                    }
                    Err(e) => warn!(user_id = user, key = %key, error = %e, "Choice rejected"),
                }
                let holder = self
                    .tree
                    .holder(target)
                    .and_then(|field| self.tree.holder(field))
                    .unwrap_or(target);
                self.draw(peer, user, holder).await;
            }
            NodeKind::AddItem(section) => {
                let Some(structured) = self.section(section) else {
                    return;
                };
                let index = structured.add_item(self.store.as_ref());
                let section_node = structured.node;
                self.sync_items(section);
                let item = self
                    .tree
                    .command(section_node)
                    .and_then(|command| self.tree.find(&item_command(command, index)))
                    .unwrap_or(section_node);
                self.draw(peer, user, item).await;
            }
            NodeKind::DeleteItem { section, index } => {
                let Some(structured) = self.section(section) else {
                    return;
                };
                structured.delete_item(self.store.as_ref(), index);
                let section_node = structured.node;
                self.sync_items(section);
                self.draw(peer, user, section_node).await;
            }
            NodeKind::Root | NodeKind::Action(None) | NodeKind::Section(_) | NodeKind::Item { .. } => {
                self.draw(peer, user, target).await
            }
        }
    }

    async fn execute_field(
        &mut self,
        peer: &T::Peer,
        user: UserId,
        target: NodeId,
        (section, index, key): (SectionId, Option<usize>, String),
        parsed: &ParsedCommand,
        input: Option<String>,
    ) {
        let holder = self.tree.holder(target).unwrap_or(target);
        let Some(field) = self.section(section).and_then(|s| s.field(&key)).cloned() else {
            return;
        };
        if !field.is_editable() {
            warn!(user_id = user, key = %key, "Field is read-only");
            self.draw(peer, user, holder).await;
            return;
        }

        match field.kind() {
            FieldKind::Boolean(_) => {
                let current = self
                    .record(section, index)
                    .and_then(|r| r.get(&key).and_then(Value::as_bool))
                    .unwrap_or(false);
                self.commit(section, index, &key, Value::Bool(!current));
                self.draw(peer, user, holder).await;
            }
            FieldKind::List(_) => {
                if parsed.is_refresh() {
                    self.refresh(target, true);
                }
                self.draw(peer, user, target).await;
            }
            FieldKind::String(_) | FieldKind::Number(_) => {
                let session = self.session(user);
                let Some(raw) = input else {
                    session.set_pending_input(&parsed.path);
                    self.draw(peer, user, target).await;
                    return;
                };
                let committed = match field.parse(&raw) {
                    Ok(candidate) => self.commit(section, index, &key, candidate),
                    Err(e) => {
                        warn!(user_id = user, key = %key, error = %e, "Input rejected");
                        false
                    }
                };
                if committed {
                    session.clear_pending_input();
                    self.draw(peer, user, holder).await;
                } else {
                    self.draw(peer, user, target).await;
                }
            }
        }
    }

    fn parse_candidate(&self, section: SectionId, key: &str, raw: &str) -> menu_core::Result<Value> {
        let field = self
            .section(section)
            .and_then(|s| s.field(key))
            .ok_or_else(|| MenuError::RouteNotFound(key.to_string()))?;
        Ok(field.parse(raw)?)
    }

    /// Runs the commit protocol; a rejection is logged and leaves the data unchanged.
    fn commit(&mut self, section: SectionId, index: Option<usize>, key: &str, candidate: Value) -> bool {
        let Some(structured) = self.sections.get(section.0) else {
            return false;
        };
        match structured.commit(self.store.as_ref(), &mut self.layout, index, key, candidate) {
            Ok(()) => true,
            Err(e) => {
                warn!(data_id = %structured.data_id, key = %key, error = %e, "Change rejected");
                false
            }
        }
    }

    async fn hard_reset(&mut self, peer: &T::Peer, user: UserId) {
        let session = self.session(user);
        if let Some(message_id) = session.message_id() {
            if let Err(e) = self.transport.delete_message(peer, message_id).await {
                warn!(user_id = user, message_id, error = %e, "Failed to delete menu message");
            }
            session.clear_message_id();
        }
    }

    async fn exit(&mut self, peer: &T::Peer, user: UserId) {
        self.hard_reset(peer, user).await;
        let session = self.session(user);
        session.clear_last_command();
        session.clear_pending_input();
        info!(user_id = user, "Menu closed");
    }
}
