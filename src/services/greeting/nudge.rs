use std::sync::Arc;

use serenity::all::{EditMessage, Http, Message};
use tracing::debug;

use crate::constants::timeouts::NUDGE_WINDOW;

/// Withdraw the Nudge button once its availability window elapses.
///
/// Fire-and-forget: the greeting message may already be gone by the time the
/// window closes, in which case the edit simply fails and is dropped.
pub fn spawn_nudge_window(http: Arc<Http>, mut message: Message) {
    tokio::spawn(async move {
        tokio::time::sleep(NUDGE_WINDOW).await;

        if let Err(e) = message
            .edit(&http, EditMessage::new().components(Vec::new()))
            .await
        {
            debug!("Could not withdraw nudge button: {:?}", e);
        }
    });
}
