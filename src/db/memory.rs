//! In-memory member store used by the test suites in place of Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::models::MemberRecord;
use crate::db::store::{MemberStore, StoreError};

/// `DashMap`-backed store with the same per-key atomicity guarantees as the
/// Postgres implementation: entry-level operations, no read-then-write pairs.
#[derive(Debug, Default)]
pub struct MemoryMemberStore {
    records: DashMap<u64, MemberRecord>,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn insert_if_absent(&self, record: &MemberRecord) -> Result<bool, StoreError> {
        match self.records.entry(record.id()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn find(&self, user_id: u64) -> Result<Option<MemberRecord>, StoreError> {
        Ok(self.records.get(&user_id).map(|r| r.value().clone()))
    }

    async fn mark_verified(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<Option<MemberRecord>, StoreError> {
        match self.records.get_mut(&user_id) {
            Some(mut record) if !record.verified => {
                record.verified = true;
                record.verified_at = Some(at);
                Ok(Some(record.value().clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_username(&self, user_id: u64, username: &str) -> Result<bool, StoreError> {
        match self.records.get_mut(&user_id) {
            Some(mut record) if record.username != username => {
                record.username = username.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_nudged(&self, user_id: u64) -> Result<bool, StoreError> {
        match self.records.get_mut(&user_id) {
            Some(mut record) => {
                record.nudged = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset_nudges_except(&self, user_id: u64) -> Result<u64, StoreError> {
        let mut cleared = 0;
        for mut record in self.records.iter_mut() {
            if record.id() != user_id && record.nudged {
                record.nudged = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn purge_unpunished(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(self
            .records
            .remove_if(&user_id, |_, record| !record.has_pending_punishment())
            .is_some())
    }

    async fn clear_mute(&self, user_id: u64) -> Result<(), StoreError> {
        if let Some(mut record) = self.records.get_mut(&user_id) {
            record.mute_until = None;
        }
        Ok(())
    }

    async fn clear_ban(&self, user_id: u64) -> Result<(), StoreError> {
        if let Some(mut record) = self.records.get_mut(&user_id) {
            record.ban_until = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    fn record(user_id: u64) -> MemberRecord {
        MemberRecord::new(user_id, format!("member-{user_id}"), false, at(1_700_000_000))
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let store = MemoryMemberStore::new();

        assert!(store.insert_if_absent(&record(42)).await.unwrap());
        assert!(!store.insert_if_absent(&record(42)).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_produce_one_record() {
        let store = Arc::new(MemoryMemberStore::new());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.insert_if_absent(&record(42)).await.unwrap() })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.insert_if_absent(&record(42)).await.unwrap() })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a ^ b, "exactly one insert must win");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_verified_applies_once() {
        let store = MemoryMemberStore::new();
        store.insert_if_absent(&record(42)).await.unwrap();

        let first = store.mark_verified(42, at(1_700_000_100)).await.unwrap();
        let updated = first.expect("first verification applies");
        assert!(updated.verified);
        assert_eq!(updated.verified_at, Some(at(1_700_000_100)));

        // Second attempt is a no-op and must not move verified_at
        let second = store.mark_verified(42, at(1_700_000_200)).await.unwrap();
        assert!(second.is_none());
        let stored = store.find(42).await.unwrap().unwrap();
        assert_eq!(stored.verified_at, Some(at(1_700_000_100)));
    }

    #[tokio::test]
    async fn test_mark_verified_missing_record() {
        let store = MemoryMemberStore::new();
        assert!(store.mark_verified(99, at(0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_only_deletes_unpunished() {
        let store = MemoryMemberStore::new();
        store.insert_if_absent(&record(1)).await.unwrap();

        let mut banned = record(2);
        banned.ban_until = Some(at(1_800_000_000));
        store.insert_if_absent(&banned).await.unwrap();

        assert!(store.purge_unpunished(1).await.unwrap());
        assert!(!store.purge_unpunished(2).await.unwrap());
        assert!(!store.purge_unpunished(3).await.unwrap());

        assert!(store.find(1).await.unwrap().is_none());
        assert!(store.find(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_nudge_flags() {
        let store = MemoryMemberStore::new();
        for id in 1..=3 {
            store.insert_if_absent(&record(id)).await.unwrap();
        }

        assert!(store.set_nudged(1).await.unwrap());
        assert!(store.set_nudged(2).await.unwrap());
        assert!(!store.set_nudged(99).await.unwrap());

        // A new join cycle clears everyone else's flag
        assert_eq!(store.reset_nudges_except(2).await.unwrap(), 1);
        assert!(!store.find(1).await.unwrap().unwrap().nudged);
        assert!(store.find(2).await.unwrap().unwrap().nudged);
    }

    #[tokio::test]
    async fn test_clear_punishments() {
        let store = MemoryMemberStore::new();
        let mut punished = record(5);
        punished.mute_until = Some(at(1_800_000_000));
        punished.ban_until = Some(at(1_900_000_000));
        store.insert_if_absent(&punished).await.unwrap();

        store.clear_mute(5).await.unwrap();
        store.clear_ban(5).await.unwrap();

        let stored = store.find(5).await.unwrap().unwrap();
        assert!(!stored.has_pending_punishment());
    }
}
