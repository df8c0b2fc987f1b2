use chrono::{DateTime, Utc};
use tracing::info;

use crate::bot::error::Error;
use crate::db::models::MemberRecord;
use crate::db::store::MemberStore;

#[derive(Debug)]
pub enum VerifyOutcome {
    /// The member transitioned unverified -> verified just now.
    Verified(MemberRecord),
    /// Repeated trigger; nothing was changed.
    AlreadyVerified,
}

/// Verify a member exactly once.
///
/// The transition itself is a single conditional update at the store, so two
/// near-simultaneous clicks from the same user cannot both apply it; the
/// loser of that race observes the already-verified outcome. A member with
/// no record is surfaced as `RecordNotFound` rather than fabricated.
pub async fn verify_member(
    store: &dyn MemberStore,
    user_id: u64,
    now: DateTime<Utc>,
) -> Result<VerifyOutcome, Error> {
    let record = store
        .find(user_id)
        .await?
        .ok_or(Error::RecordNotFound(user_id))?;

    if record.verified {
        return Ok(VerifyOutcome::AlreadyVerified);
    }

    match store.mark_verified(user_id, now).await? {
        Some(updated) => {
            info!("Member {} ({}) verified", updated.username, user_id);
            Ok(VerifyOutcome::Verified(updated))
        }
        None => Ok(VerifyOutcome::AlreadyVerified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryMemberStore;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    async fn store_with_member(user_id: u64) -> MemoryMemberStore {
        let store = MemoryMemberStore::new();
        let record = MemberRecord::new(user_id, "member", false, at(1_700_000_000));
        store.insert_if_absent(&record).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_verify_transitions_once() {
        let store = store_with_member(42).await;

        let outcome = verify_member(&store, 42, at(1_700_000_100)).await.unwrap();
        let record = match outcome {
            VerifyOutcome::Verified(record) => record,
            other => panic!("expected Verified, got {other:?}"),
        };
        assert!(record.verified);
        assert_eq!(record.verified_at, Some(at(1_700_000_100)));
    }

    #[tokio::test]
    async fn test_second_verify_is_a_noop() {
        let store = store_with_member(42).await;
        verify_member(&store, 42, at(1_700_000_100)).await.unwrap();

        let outcome = verify_member(&store, 42, at(1_700_000_900)).await.unwrap();

        assert!(matches!(outcome, VerifyOutcome::AlreadyVerified));
        let record = store.find(42).await.unwrap().unwrap();
        assert_eq!(record.verified_at, Some(at(1_700_000_100)));
    }

    #[tokio::test]
    async fn test_verify_unknown_member_is_not_found() {
        let store = MemoryMemberStore::new();

        let err = verify_member(&store, 404, at(0)).await.unwrap_err();

        assert!(matches!(err, Error::RecordNotFound(404)));
    }
}
