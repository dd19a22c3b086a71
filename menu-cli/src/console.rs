//! Console transport: menus are printed to a writer (stdout by default), buttons are numbered
//! "#0", "#1", ... and pressed by typing that id. Any other line is sent as typed input.

use anyhow::Result;
use async_trait::async_trait;
use menu_core::{Button, MessageId, Transport, UserId};
use menu_tree::{Menu, CMD_EXIT};
use std::io::{self, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Peer name used for the single console user.
pub const CONSOLE_PEER: &str = "console";

const FIRST_MESSAGE_ID: MessageId = 200;
const FIRST_INPUT_ID: MessageId = 100;

/// What a console line means for the menu.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// A button press, carrying the button's command.
    Press(String),
    /// Free text: the answer to an input field, or a typed command.
    Text(String),
    /// "#N" with no button N on the last screen.
    UnknownButton(usize),
}

/// Prints menu messages to a writer and remembers the buttons of the last screen.
#[derive(Clone)]
pub struct ConsoleTransport {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    buttons: Arc<Mutex<Vec<Button>>>,
    next_id: Arc<AtomicI64>,
    last_message: Arc<AtomicI64>,
}

impl ConsoleTransport {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            buttons: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(FIRST_MESSAGE_ID)),
            last_message: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Id of the last sent menu message, if any.
    pub fn last_message(&self) -> Option<MessageId> {
        match self.last_message.load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn resolve(&self, line: &str) -> ConsoleInput {
        let line = line.trim();
        if let Some(number) = line.strip_prefix('#') {
            if let Ok(index) = number.trim().parse::<usize>() {
                let buttons = self.buttons.lock().unwrap_or_else(|e| e.into_inner());
                return match buttons.get(index) {
                    Some(button) => ConsoleInput::Press(button.command.clone()),
                    None => ConsoleInput::UnknownButton(index),
                };
            }
        }
        ConsoleInput::Text(line.to_string())
    }

    pub fn print(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            warn!(error = %e, "Console write failed");
        }
    }

    fn show(&self, header: String, text: &str, rows: Vec<Vec<Button>>) {
        let mut buttons = self.buttons.lock().unwrap_or_else(|e| e.into_inner());
        buttons.clear();
        let mut screen = vec![header, format!(" text: {}", text), " buttons:".to_string()];
        for row in rows {
            let line = row
                .into_iter()
                .map(|button| {
                    let rendered = format!("[#{} {}]", buttons.len(), button.label);
                    buttons.push(button);
                    rendered
                })
                .collect::<Vec<_>>()
                .join(" ");
            screen.push(line);
        }
        drop(buttons);
        self.print(&screen.join("\n"));
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    type Peer = String;
    type Button = Button;

    fn make_button(&self, label: &str, command: &str) -> Button {
        Button::new(label, command)
    }

    async fn send_message(&self, peer: &String, text: &str, buttons: Vec<Vec<Button>>) -> menu_core::Result<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.last_message.store(id, Ordering::SeqCst);
        self.show(format!("Sending message {} to {}:", id, peer), text, buttons);
        Ok(id)
    }

    async fn edit_message(
        &self,
        peer: &String,
        message_id: MessageId,
        text: &str,
        buttons: Vec<Vec<Button>>,
    ) -> menu_core::Result<()> {
        self.show(format!("Message {} to {} is edited:", message_id, peer), text, buttons);
        Ok(())
    }

    async fn delete_message(&self, peer: &String, message_id: MessageId) -> menu_core::Result<()> {
        if self.last_message() == Some(message_id) {
            self.last_message.store(0, Ordering::SeqCst);
        }
        self.print(&format!("Deleting message {} from {}", message_id, peer));
        Ok(())
    }

    async fn confirm_callback(&self, _peer: &String) -> menu_core::Result<()> {
        Ok(())
    }
}

/// Reads stdin until EOF or until the Exit button is pressed.
pub async fn run_console(mut menu: Menu<ConsoleTransport>, user: UserId) -> Result<()> {
    let peer = CONSOLE_PEER.to_string();
    let mut input_id = FIRST_INPUT_ID;
    let start = format!("/{}", menu.id());
    info!(menu = %menu.id(), user_id = user, "Console menu started");
    menu.on_command(&peer, user, Some(input_id), &start, false).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        menu.transport()
            .print("Enter button Id in format \"#Number\" or input data (if requested):");
        let Some(line) = lines.next_line().await? else {
            debug!("Console input closed");
            break;
        };
        let input = menu.transport().resolve(&line);
        match input {
            ConsoleInput::Press(command) => {
                let message_id = menu.transport().last_message();
                menu.on_command(&peer, user, message_id, &command, true).await;
                if command == CMD_EXIT {
                    break;
                }
            }
            ConsoleInput::Text(text) => {
                input_id += 1;
                menu.on_command(&peer, user, Some(input_id), &text, false).await;
            }
            ConsoleInput::UnknownButton(index) => {
                menu.transport().print(&format!("Invalid button Id: #{}", index));
            }
        }
    }
    info!("Console menu stopped");
    Ok(())
}
