//! Dispatcher: feeds text messages and callback queries into [`Menu::on_command`].

use anyhow::Result;
use menu_tree::Menu;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::adapters::Inbound;
use crate::transport::TelegramTransport;

/// The menu shared by all update handlers. The mutex serializes events.
pub type SharedMenu = Arc<Mutex<Menu<TelegramTransport>>>;

async fn dispatch(menu: SharedMenu, inbound: Inbound) {
    info!(
        user_id = inbound.user,
        chat_id = inbound.peer.chat_id.0,
        command = %inbound.command,
        is_event = inbound.is_event,
        "Received menu command"
    );
    let mut menu = menu.lock().await;
    menu.on_command(
        &inbound.peer,
        inbound.user,
        inbound.message_id,
        &inbound.command,
        inbound.is_event,
    )
    .await;
}

async fn on_message(msg: Message, menu: SharedMenu) -> Result<()> {
    match Inbound::from_message(&msg) {
        Some(inbound) => dispatch(menu, inbound).await,
        None => debug!(chat_id = msg.chat.id.0, "Received non-text message"),
    }
    Ok(())
}

async fn on_callback(bot: Bot, query: CallbackQuery, menu: SharedMenu) -> Result<()> {
    match Inbound::from_callback(&query) {
        Some(inbound) => dispatch(menu, inbound).await,
        None => {
            // no data or no accessible message: still stop the client spinner
            bot.answer_callback_query(query.id.clone()).await?;
            debug!(user_id = query.from.id.0, "Callback query without menu data");
        }
    }
    Ok(())
}

/// Runs the long-polling dispatcher until Ctrl-C.
#[instrument(skip(bot, menu))]
pub async fn run_dispatcher(bot: teloxide::Bot, menu: Menu<TelegramTransport>) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Bot identity resolved");
        }
    }

    let menu: SharedMenu = Arc::new(Mutex::new(menu));
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("Menu dispatcher started");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![menu])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Menu dispatcher stopped");
    Ok(())
}
