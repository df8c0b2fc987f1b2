use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::models::MemberRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Key-addressed access to member records.
///
/// The race-prone paths (concurrent joins, double verification, departure
/// purge) are covered by single atomic operations rather than separate
/// read-then-write pairs, so callers never need cross-call coordination.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Insert a record unless one already exists for the same member.
    /// Returns `true` when the record was inserted. Two concurrent calls for
    /// the same id produce exactly one record.
    async fn insert_if_absent(&self, record: &MemberRecord) -> Result<bool, StoreError>;

    async fn find(&self, user_id: u64) -> Result<Option<MemberRecord>, StoreError>;

    /// Atomically flip `verified` from false to true, stamping
    /// `verified_at`. Returns the updated record, or `None` when the member
    /// was already verified (or no longer exists).
    async fn mark_verified(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<Option<MemberRecord>, StoreError>;

    /// Sync the stored display name. Returns `true` when it changed.
    async fn update_username(&self, user_id: u64, username: &str) -> Result<bool, StoreError>;

    /// Returns `true` when a record was flagged.
    async fn set_nudged(&self, user_id: u64) -> Result<bool, StoreError>;

    /// Clear the nudge flag of every member except the given one. Returns
    /// the number of cleared records.
    async fn reset_nudges_except(&self, user_id: u64) -> Result<u64, StoreError>;

    /// Delete the member's record only if no timed punishment is pending.
    /// Returns `true` when a record was deleted; a missing record or one
    /// with a pending mute/ban leaves the store untouched.
    async fn purge_unpunished(&self, user_id: u64) -> Result<bool, StoreError>;

    async fn clear_mute(&self, user_id: u64) -> Result<(), StoreError>;

    async fn clear_ban(&self, user_id: u64) -> Result<(), StoreError>;
}
