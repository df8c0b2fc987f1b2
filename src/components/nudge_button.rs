use std::sync::Arc;

use serenity::all::{
    ButtonStyle, ChannelId, ComponentInteraction, Context, CreateButton,
    CreateInteractionResponse, CreateMessage, UserId,
};
use tracing::debug;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::interaction::send_component_error;

pub const NUDGE_PREFIX: &str = "nudge_";

/// Nudge button shown next to the short welcome message. The custom id
/// carries the id of the member being welcomed.
pub fn nudge_button(target: UserId) -> CreateButton {
    CreateButton::new(format!("{NUDGE_PREFIX}{target}"))
        .label("Nudge")
        .style(ButtonStyle::Success)
        .emoji('👆')
}

/// Handle a click on a Nudge button
pub async fn handle_click(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let custom_id = &component.data.custom_id;

    let target_id: u64 = match custom_id
        .strip_prefix(NUDGE_PREFIX)
        .and_then(|raw| raw.parse().ok())
    {
        Some(id) => id,
        None => {
            send_component_error(ctx, component, "Invalid button state").await?;
            return Ok(());
        }
    };

    // The record may already be gone if the member left within the window
    if !data.store.set_nudged(target_id).await? {
        debug!("Nudge for {} ignored, no record", target_id);
    }

    let chat_channel = ChannelId::new(data.settings.chat_channel_id);
    chat_channel
        .send_message(
            &ctx.http,
            CreateMessage::new().content(format!(
                "<@{}> was nudged by <@{}>",
                target_id, component.user.id
            )),
        )
        .await?;

    component
        .create_response(ctx, CreateInteractionResponse::Acknowledge)
        .await?;

    Ok(())
}
