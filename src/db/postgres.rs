use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::MemberRecord;
use crate::db::queries::member;
use crate::db::store::{MemberStore, StoreError};

/// Postgres-backed member store.
#[derive(Debug, Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn insert_if_absent(&self, record: &MemberRecord) -> Result<bool, StoreError> {
        Ok(member::insert_if_absent(&self.pool, record).await?)
    }

    async fn find(&self, user_id: u64) -> Result<Option<MemberRecord>, StoreError> {
        Ok(member::find(&self.pool, user_id as i64).await?)
    }

    async fn mark_verified(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<Option<MemberRecord>, StoreError> {
        Ok(member::mark_verified(&self.pool, user_id as i64, at).await?)
    }

    async fn update_username(&self, user_id: u64, username: &str) -> Result<bool, StoreError> {
        Ok(member::update_username(&self.pool, user_id as i64, username).await?)
    }

    async fn set_nudged(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(member::set_nudged(&self.pool, user_id as i64).await?)
    }

    async fn reset_nudges_except(&self, user_id: u64) -> Result<u64, StoreError> {
        Ok(member::reset_nudges_except(&self.pool, user_id as i64).await?)
    }

    async fn purge_unpunished(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(member::purge_unpunished(&self.pool, user_id as i64).await?)
    }

    async fn clear_mute(&self, user_id: u64) -> Result<(), StoreError> {
        Ok(member::clear_mute(&self.pool, user_id as i64).await?)
    }

    async fn clear_ban(&self, user_id: u64) -> Result<(), StoreError> {
        Ok(member::clear_ban(&self.pool, user_id as i64).await?)
    }
}
