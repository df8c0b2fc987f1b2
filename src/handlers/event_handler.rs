use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, ActivityData, FullEvent, GuildId};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::{interaction, member};
use crate::services::membership::reconciler::{self, MemberProfile};
use crate::services::moderation::restore_service;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::CacheReady { .. } => {
            // Fires once the member cache is usable; the latch keeps the
            // scan from running again on gateway resumes
            if data.begin_startup() {
                if let Err(e) = run_startup(ctx, data).await {
                    error!("Startup reconcile/restore failed: {:?}", e);
                }
            }
        }

        FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = member::handle_member_join(ctx, data, new_member).await {
                error!("Member join handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            if let Err(e) = member::handle_member_leave(data, *guild_id, user).await {
                error!("Member leave handler error: {:?}", e);
            }
        }

        FullEvent::InteractionCreate { interaction } => {
            // Poise handles slash commands; only component interactions are
            // routed here
            if let serenity::Interaction::Component(_) = interaction {
                if let Err(e) = interaction::handle_interaction(ctx, data, interaction).await {
                    error!("Component interaction handler error: {:?}", e);
                }
            }
        }

        _ => {}
    }

    Ok(())
}

/// Bring the record store back in sync with live membership, re-apply
/// pending punishments, and publish the member count.
async fn run_startup(ctx: &serenity::Context, data: &Arc<Data>) -> Result<(), Error> {
    let guild_id = GuildId::new(data.settings.guild_id);

    let members = guild_id.members(&ctx.http, None, None).await?;
    info!("Startup scan over {} members", members.len());

    // Every live member needs a record before restoration reads them
    let profiles: Vec<MemberProfile> = members.iter().map(MemberProfile::from).collect();
    let summary = reconciler::reconcile_guild(data.store.as_ref(), &profiles).await?;
    if summary.created > 0 {
        info!("Reconciliation created {} missing records", summary.created);
    }

    restore_service::restore_guild(ctx, data, guild_id, &members).await?;

    ctx.set_activity(Some(ActivityData::watching(format!(
        "{} members",
        members.len()
    ))));
    info!("Startup complete, presence updated");

    Ok(())
}
