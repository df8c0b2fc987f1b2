use serenity::all::CreateActionRow;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::components::verify_button;
use crate::constants::embeds;

/// Post the verification prompt with its Verify button
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn sendverify(ctx: Context<'_>) -> Result<(), Error> {
    let icon_url = ctx.guild().and_then(|guild| guild.icon_url());

    let mut embed = embeds::standard_embed()
        .title("Verify")
        .description("Click the button below to verify yourself");
    if let Some(url) = icon_url {
        embed = embed.thumbnail(url);
    }

    let buttons = CreateActionRow::Buttons(vec![verify_button::verify_button()]);

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .components(vec![buttons]),
    )
    .await?;

    Ok(())
}
