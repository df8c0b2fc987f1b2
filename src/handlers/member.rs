use std::sync::Arc;

use serenity::all::{Context, GuildId, Member, RoleId, User};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::greeting::welcome_embed;
use crate::services::membership::reconciler::{self, MemberProfile};

/// Handle a member joining the guild.
///
/// Reconciliation runs guild-wide first so the joiner (and anyone missed
/// while the bot was down) has a record before any greeting state is touched.
pub async fn handle_member_join(
    ctx: &Context,
    data: &Arc<Data>,
    member: &Member,
) -> Result<(), Error> {
    if member.guild_id.get() != data.settings.guild_id {
        debug!("Ignoring join in unmanaged guild {}", member.guild_id);
        return Ok(());
    }

    let members = member.guild_id.members(&ctx.http, None, None).await?;
    let profiles: Vec<MemberProfile> = members.iter().map(MemberProfile::from).collect();
    reconciler::reconcile_guild(data.store.as_ref(), &profiles).await?;

    // A new join cycle invalidates nudge availability from the previous one
    data.store
        .reset_nudges_except(member.user.id.get())
        .await?;

    member
        .add_role(
            &ctx.http,
            RoleId::new(data.settings.unverified_role_id),
        )
        .await?;

    welcome_embed::send(ctx, data, member).await?;

    info!("Member {} ({}) joined", member.user.name, member.user.id);
    Ok(())
}

/// Handle a member leaving the guild.
///
/// Clean departures are purged; a record with a pending mute/ban survives so
/// the punishment can still be restored if the member returns. A member that
/// was never reconciled is a tolerated no-op.
pub async fn handle_member_leave(
    data: &Arc<Data>,
    guild_id: GuildId,
    user: &User,
) -> Result<(), Error> {
    if guild_id.get() != data.settings.guild_id {
        return Ok(());
    }

    if data.store.purge_unpunished(user.id.get()).await? {
        info!("Purged record for departed member {} ({})", user.name, user.id);
    } else {
        debug!(
            "Record for {} retained (pending punishment) or absent",
            user.id
        );
    }

    Ok(())
}
