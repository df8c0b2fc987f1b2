use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{Context, EditMember, GuildId, Http, Member, Timestamp, UserId};
use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::models::MemberRecord;

/// Audit log reason attached to punishments re-applied at startup
pub const RESTORE_REASON: &str = "restored after restart";

/// One restoration action for a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStep {
    /// Re-apply a timeout lasting until the stored instant
    Remute { until: DateTime<Utc> },
    /// Re-apply a temporary ban and schedule its lifting
    Reban { until: DateTime<Utc> },
    /// The stored mute expired while the bot was down
    ClearExpiredMute,
    /// The stored ban expired while the bot was down
    ClearExpiredBan,
}

/// Decide what has to happen for one record at startup.
///
/// A punishment timestamp already in the past is treated as served and is
/// cleared instead of re-applied.
pub fn plan_restore(record: &MemberRecord, now: DateTime<Utc>) -> Vec<RestoreStep> {
    let mut steps = Vec::new();

    if let Some(until) = record.mute_until {
        if until > now {
            steps.push(RestoreStep::Remute { until });
        } else {
            steps.push(RestoreStep::ClearExpiredMute);
        }
    }

    if let Some(until) = record.ban_until {
        if until > now {
            steps.push(RestoreStep::Reban { until });
        } else {
            steps.push(RestoreStep::ClearExpiredBan);
        }
    }

    steps
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub remutes: u64,
    pub rebans: u64,
    pub cleared: u64,
    pub failed: u64,
}

/// Re-apply still-pending punishments to the live members of a guild.
///
/// Run after reconciliation so every live member has a record. One member's
/// failure never aborts the scan, and each pending ban gets its own
/// delayed-unban task so N bans do not serialize startup.
pub async fn restore_guild(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    members: &[Member],
) -> Result<RestoreSummary, Error> {
    let now = Utc::now();
    let mut summary = RestoreSummary::default();

    for member in members {
        let user_id = member.user.id;

        let record = match data.store.find(user_id.get()).await {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping restore for {}: {}", user_id, e);
                summary.failed += 1;
                continue;
            }
        };

        for step in plan_restore(&record, now) {
            match apply_step(ctx, data, guild_id, user_id, step).await {
                Ok(()) => match step {
                    RestoreStep::Remute { .. } => summary.remutes += 1,
                    RestoreStep::Reban { .. } => summary.rebans += 1,
                    RestoreStep::ClearExpiredMute | RestoreStep::ClearExpiredBan => {
                        summary.cleared += 1
                    }
                },
                Err(e) => {
                    warn!("Failed to apply {:?} for {}: {:?}", step, user_id, e);
                    summary.failed += 1;
                }
            }
        }
    }

    if summary != RestoreSummary::default() {
        info!(
            "Punishment restore: {} re-muted, {} re-banned, {} expired cleared, {} failed",
            summary.remutes, summary.rebans, summary.cleared, summary.failed
        );
    }

    Ok(summary)
}

async fn apply_step(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    user_id: UserId,
    step: RestoreStep,
) -> Result<(), Error> {
    match step {
        RestoreStep::Remute { until } => {
            let timestamp = Timestamp::from_unix_timestamp(until.timestamp())
                .map_err(|_| Error::custom(format!("invalid mute deadline {until}")))?;
            let edit = EditMember::new()
                .disable_communication_until_datetime(timestamp)
                .audit_log_reason(RESTORE_REASON);
            guild_id.edit_member(&ctx.http, user_id, edit).await?;
            info!("Re-applied timeout for {} until {}", user_id, until);
        }
        RestoreStep::Reban { until } => {
            guild_id
                .ban_with_reason(&ctx.http, user_id, 0, RESTORE_REASON)
                .await?;
            info!("Re-applied ban for {} until {}", user_id, until);
            spawn_delayed_unban(ctx.http.clone(), data.clone(), guild_id, user_id, until);
        }
        RestoreStep::ClearExpiredMute => {
            data.store.clear_mute(user_id.get()).await?;
            debug!("Cleared expired mute for {}", user_id);
        }
        RestoreStep::ClearExpiredBan => {
            data.store.clear_ban(user_id.get()).await?;
            debug!("Cleared expired ban for {}", user_id);
        }
    }

    Ok(())
}

/// Lift a restored ban once its remaining duration elapses.
///
/// Runs as an independent task per banned member. On success the stored
/// `ban_until` is cleared so a later restart does not ban again; if the
/// process dies first, the stored value lets the next startup scan pick the
/// ban back up.
pub fn spawn_delayed_unban(
    http: Arc<Http>,
    data: Arc<Data>,
    guild_id: GuildId,
    user_id: UserId,
    until: DateTime<Utc>,
) {
    let task_data = data.clone();
    let handle = tokio::spawn(async move {
        let data = task_data;
        let remaining = (until - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(remaining).await;

        match guild_id.unban(&http, user_id).await {
            Ok(()) => {
                info!("Lifted temporary ban for {}", user_id);
                if let Err(e) = data.store.clear_ban(user_id.get()).await {
                    warn!("Failed to clear served ban for {}: {}", user_id, e);
                }
            }
            Err(e) => {
                // The ban may have been lifted manually in the meantime
                warn!("Failed to unban {}: {:?}", user_id, e);
            }
        }

        data.untrack_unban(user_id.get());
    });

    data.track_unban(user_id.get(), handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    fn record() -> MemberRecord {
        MemberRecord::new(42, "member", false, at(1_700_000_000))
    }

    #[test]
    fn test_clean_record_needs_nothing() {
        assert!(plan_restore(&record(), at(1_700_000_000)).is_empty());
    }

    #[test]
    fn test_pending_mute_is_reapplied() {
        let mut r = record();
        r.mute_until = Some(at(1_700_001_000));

        let steps = plan_restore(&r, at(1_700_000_000));

        assert_eq!(
            steps,
            vec![RestoreStep::Remute {
                until: at(1_700_001_000)
            }]
        );
    }

    #[test]
    fn test_expired_mute_is_cleared_not_reapplied() {
        let mut r = record();
        r.mute_until = Some(at(1_600_000_000));

        let steps = plan_restore(&r, at(1_700_000_000));

        assert_eq!(steps, vec![RestoreStep::ClearExpiredMute]);
    }

    #[test]
    fn test_pending_ban_is_reapplied() {
        let mut r = record();
        r.ban_until = Some(at(1_700_002_000));

        let steps = plan_restore(&r, at(1_700_000_000));

        assert_eq!(
            steps,
            vec![RestoreStep::Reban {
                until: at(1_700_002_000)
            }]
        );
    }

    #[test]
    fn test_expired_ban_is_cleared() {
        let mut r = record();
        r.ban_until = Some(at(1_600_000_000));

        assert_eq!(
            plan_restore(&r, at(1_700_000_000)),
            vec![RestoreStep::ClearExpiredBan]
        );
    }

    #[test]
    fn test_mute_and_ban_both_planned() {
        let mut r = record();
        r.mute_until = Some(at(1_700_001_000));
        r.ban_until = Some(at(1_600_000_000));

        let steps = plan_restore(&r, at(1_700_000_000));

        assert_eq!(
            steps,
            vec![
                RestoreStep::Remute {
                    until: at(1_700_001_000)
                },
                RestoreStep::ClearExpiredBan,
            ]
        );
    }

    #[test]
    fn test_deadline_exactly_now_counts_as_expired() {
        let mut r = record();
        r.mute_until = Some(at(1_700_000_000));

        assert_eq!(
            plan_restore(&r, at(1_700_000_000)),
            vec![RestoreStep::ClearExpiredMute]
        );
    }
}
