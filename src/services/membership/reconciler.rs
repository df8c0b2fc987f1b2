use chrono::{DateTime, Utc};
use serenity::all::Member;
use tracing::{info, warn};

use crate::bot::error::Error;
use crate::db::models::MemberRecord;
use crate::db::store::MemberStore;

/// The slice of a live guild member the reconciler needs.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub user_id: u64,
    pub username: String,
    pub is_bot: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<&Member> for MemberProfile {
    fn from(member: &Member) -> Self {
        let joined_at = member
            .joined_at
            .and_then(|ts| DateTime::from_timestamp(ts.unix_timestamp(), 0))
            .unwrap_or_else(Utc::now);

        Self {
            user_id: member.user.id.get(),
            username: member.user.name.clone(),
            is_bot: member.user.bot,
            joined_at,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: u64,
    pub renamed: u64,
    pub failed: u64,
}

/// Ensure every live member has exactly one record.
///
/// Safe to call repeatedly: creation goes through the store's atomic
/// insert-if-absent, so an existing record is never overwritten and two
/// concurrent scans cannot duplicate it. For members already on record only
/// the display name is synced. A store failure on one member is logged and
/// does not abort the scan.
pub async fn reconcile_guild(
    store: &dyn MemberStore,
    members: &[MemberProfile],
) -> Result<ReconcileSummary, Error> {
    let mut summary = ReconcileSummary::default();

    for profile in members {
        let record = MemberRecord::new(
            profile.user_id,
            &profile.username,
            profile.is_bot,
            profile.joined_at,
        );

        match store.insert_if_absent(&record).await {
            Ok(true) => {
                info!(
                    "Added {} ({}) to the member records",
                    profile.username, profile.user_id
                );
                summary.created += 1;
            }
            Ok(false) => match store.update_username(profile.user_id, &profile.username).await {
                Ok(true) => summary.renamed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to sync username for {}: {}", profile.user_id, e);
                    summary.failed += 1;
                }
            },
            Err(e) => {
                warn!("Failed to reconcile member {}: {}", profile.user_id, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryMemberStore;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    fn profile(user_id: u64, username: &str) -> MemberProfile {
        MemberProfile {
            user_id,
            username: username.to_string(),
            is_bot: false,
            joined_at: at(1_700_000_000),
        }
    }

    #[tokio::test]
    async fn test_reconcile_creates_missing_records() {
        let store = MemoryMemberStore::new();
        let members = vec![profile(1, "alice"), profile(2, "bola")];

        let summary = reconcile_guild(&store, &members).await.unwrap();

        assert_eq!(summary.created, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_twice_is_idempotent() {
        let store = MemoryMemberStore::new();
        let members = vec![profile(1, "alice"), profile(2, "bola")];

        reconcile_guild(&store, &members).await.unwrap();
        let second = reconcile_guild(&store, &members).await.unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.renamed, 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_does_not_clobber_verification() {
        let store = MemoryMemberStore::new();
        let members = vec![profile(1, "alice")];
        reconcile_guild(&store, &members).await.unwrap();

        store.mark_verified(1, at(1_700_000_500)).await.unwrap();

        reconcile_guild(&store, &members).await.unwrap();

        let record = store.find(1).await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.verified_at, Some(at(1_700_000_500)));
    }

    #[tokio::test]
    async fn test_reconcile_syncs_renamed_members() {
        let store = MemoryMemberStore::new();
        reconcile_guild(&store, &[profile(1, "alice")]).await.unwrap();

        let summary = reconcile_guild(&store, &[profile(1, "alys")]).await.unwrap();

        assert_eq!(summary.renamed, 1);
        let record = store.find(1).await.unwrap().unwrap();
        assert_eq!(record.username, "alys");
    }

    #[tokio::test]
    async fn test_reconcile_creates_bots_verified() {
        let store = MemoryMemberStore::new();
        let mut bot = profile(9, "helper-bot");
        bot.is_bot = true;

        reconcile_guild(&store, &[bot]).await.unwrap();

        let record = store.find(9).await.unwrap().unwrap();
        assert!(record.verified);
        assert!(record.verified_at.is_some());
    }
}
