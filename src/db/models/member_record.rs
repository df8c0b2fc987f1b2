use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// A warning issued to a member by a moderator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub reason: String,
    pub issued_by: i64,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentKind {
    Mute,
    Ban,
    Kick,
}

/// A punishment applied to a member, kept for the member's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Punishment {
    pub kind: PunishmentKind,
    pub reason: String,
    pub issued_by: i64,
    pub issued_at: DateTime<Utc>,
}

/// Persisted per-member state: verification status, greeting flags, and any
/// timed punishment that must survive a process restart.
///
/// `mute_until`/`ban_until` being `Some` means a timeout/temporary ban is
/// still pending and must be re-applied if the bot restarts before it is
/// served.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRecord {
    pub user_id: i64,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub is_bot: bool,
    pub nudged: bool,
    pub mute_until: Option<DateTime<Utc>>,
    pub ban_until: Option<DateTime<Utc>>,
    pub blacklisted: bool,
    pub warnings: Json<HashMap<Uuid, Warning>>,
    pub punishments: Json<HashMap<Uuid, Punishment>>,
}

impl MemberRecord {
    /// Build the default record for a newly observed member.
    ///
    /// Bot accounts cannot click a verify button, so they are created
    /// already verified.
    pub fn new(
        user_id: u64,
        username: impl Into<String>,
        is_bot: bool,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id as i64,
            username: username.into(),
            joined_at,
            verified: is_bot,
            verified_at: is_bot.then_some(joined_at),
            is_bot,
            nudged: false,
            mute_until: None,
            ban_until: None,
            blacklisted: false,
            warnings: Json(HashMap::new()),
            punishments: Json(HashMap::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.user_id as u64
    }

    /// A record with a pending punishment survives member departure so the
    /// punishment can still be restored.
    pub fn has_pending_punishment(&self) -> bool {
        self.mute_until.is_some() || self.ban_until.is_some()
    }
}
