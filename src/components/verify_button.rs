use std::sync::Arc;

use chrono::Utc;
use serenity::all::{
    ButtonStyle, ComponentInteraction, Context, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, RoleId,
};
use tracing::warn;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::handlers::interaction::send_component_error;
use crate::services::verification::verify_service::{self, VerifyOutcome};

pub const VERIFY_BUTTON_ID: &str = "verify_button";

pub fn verify_button() -> CreateButton {
    CreateButton::new(VERIFY_BUTTON_ID)
        .label("Verify")
        .style(ButtonStyle::Success)
        .emoji('✅')
}

/// Handle a click on the Verify button
pub async fn handle_click(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let user_id = component.user.id;

    match verify_service::verify_member(data.store.as_ref(), user_id.get(), Utc::now()).await {
        Ok(VerifyOutcome::Verified(_)) => {
            let role = RoleId::new(data.settings.verified_role_id);
            match &component.member {
                Some(member) => member.add_role(&ctx.http, role).await?,
                None => warn!("Verify click from {} without member data", user_id),
            }

            let embed = embeds::success_embed()
                .title("Verified")
                .description("You have been successfully verified. Welcome aboard!");
            respond_ephemeral(ctx, component, embed).await
        }
        Ok(VerifyOutcome::AlreadyVerified) => {
            let embed = embeds::info_embed()
                .title("Already Verified")
                .description("You are already verified.");
            respond_ephemeral(ctx, component, embed).await
        }
        Err(Error::RecordNotFound(_)) => {
            send_component_error(
                ctx,
                component,
                "No membership record was found for you. Please contact a moderator.",
            )
            .await
        }
        Err(e) => Err(e),
    }
}

async fn respond_ephemeral(
    ctx: &Context,
    component: &ComponentInteraction,
    embed: CreateEmbed,
) -> Result<(), Error> {
    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}
