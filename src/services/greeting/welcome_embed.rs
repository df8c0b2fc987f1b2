use std::sync::Arc;

use serenity::all::{
    ChannelId, Context, CreateActionRow, CreateEmbed, CreateMessage, Member, Mentionable,
};
use tracing::error;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::components::nudge_button;
use crate::constants::embeds::{self, BULLET};
use crate::services::greeting::nudge;

/// The long welcome embed posted in the welcome channel
fn big_welcome(data: &Arc<Data>, member: &Member) -> CreateEmbed {
    let steps = [
        format!(
            "Head to <#{}> and click Verify to unlock the server",
            data.settings.verify_channel_id
        ),
        format!(
            "Say hi to everyone in <#{}>",
            data.settings.chat_channel_id
        ),
    ];

    let description = format!(
        "Welcome {}, glad to have you here!\n\n**Getting started**\n{}",
        member.mention(),
        steps
            .iter()
            .map(|s| format!("{} {}", BULLET, s))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    embeds::success_embed()
        .title("Welcome")
        .description(description)
        .thumbnail(member.user.face())
}

/// The short welcome embed posted in the chat channel, next to the Nudge button
fn small_welcome(member: &Member) -> CreateEmbed {
    embeds::success_embed()
        .title("Welcome")
        .description(format!("Everybody make sure to welcome {}", member.mention()))
        .thumbnail(member.user.face())
}

/// Send both greeting messages for a freshly joined member.
///
/// The chat-channel message carries a Nudge button that is withdrawn again
/// once its availability window elapses.
pub async fn send(ctx: &Context, data: &Arc<Data>, member: &Member) -> Result<(), Error> {
    let welcome_channel = ChannelId::new(data.settings.welcome_channel_id);
    let chat_channel = ChannelId::new(data.settings.chat_channel_id);

    if let Err(e) = welcome_channel
        .send_message(&ctx.http, CreateMessage::new().embed(big_welcome(data, member)))
        .await
    {
        error!("Failed to send welcome embed for {}: {:?}", member.user.id, e);
    }

    let buttons = CreateActionRow::Buttons(vec![nudge_button::nudge_button(member.user.id)]);
    let message = CreateMessage::new()
        .embed(small_welcome(member))
        .components(vec![buttons]);

    let greeting = chat_channel.send_message(&ctx.http, message).await?;
    nudge::spawn_nudge_window(ctx.http.clone(), greeting);

    Ok(())
}
