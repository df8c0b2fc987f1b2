use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::db::store::MemberStore;

/// Shared data available to all commands and handlers
pub struct Data {
    pub store: Arc<dyn MemberStore>,
    pub settings: Settings,
    /// Delayed-unban tasks for restored temporary bans, keyed by user id.
    /// The persisted `ban_until` field is the recovery path if the process
    /// dies before a task fires.
    pub pending_unbans: DashMap<u64, JoinHandle<()>>,
    /// Latch so the startup reconcile/restore scan runs once per process
    startup_complete: AtomicBool,
}

impl Data {
    pub fn new(store: Arc<dyn MemberStore>, settings: Settings) -> Self {
        Self {
            store,
            settings,
            pending_unbans: DashMap::new(),
            startup_complete: AtomicBool::new(false),
        }
    }

    /// Claim the startup scan. Returns true exactly once.
    pub fn begin_startup(&self) -> bool {
        !self.startup_complete.swap(true, Ordering::SeqCst)
    }

    pub fn track_unban(&self, user_id: u64, handle: JoinHandle<()>) {
        self.pending_unbans.insert(user_id, handle);
    }

    pub fn untrack_unban(&self, user_id: u64) {
        self.pending_unbans.remove(&user_id);
    }

    /// Cancel all delayed-unban tasks. Remaining durations stay persisted in
    /// the store and are re-applied by the next startup scan.
    pub fn abort_pending_unbans(&self) {
        self.pending_unbans.retain(|_, handle| {
            handle.abort();
            false
        });
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("pending_unbans_count", &self.pending_unbans.len())
            .field(
                "startup_complete",
                &self.startup_complete.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::memory::MemoryMemberStore;

    fn test_settings() -> Settings {
        Settings {
            discord_token: "token".into(),
            database_url: "postgres://localhost/warden".into(),
            guild_id: 1,
            welcome_channel_id: 2,
            chat_channel_id: 3,
            verify_channel_id: 4,
            verified_role_id: 5,
            unverified_role_id: 6,
        }
    }

    #[test]
    fn test_startup_latch_claims_once() {
        let data = Data::new(Arc::new(MemoryMemberStore::new()), test_settings());

        assert!(data.begin_startup());
        assert!(!data.begin_startup());
    }

    #[tokio::test]
    async fn test_abort_pending_unbans_cancels_tracked_tasks() {
        let data = Data::new(Arc::new(MemoryMemberStore::new()), test_settings());

        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        data.track_unban(42, handle);
        assert_eq!(data.pending_unbans.len(), 1);

        data.abort_pending_unbans();
        assert!(data.pending_unbans.is_empty());
    }
}
