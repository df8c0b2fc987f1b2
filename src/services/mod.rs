pub mod greeting;
pub mod membership;
pub mod moderation;
pub mod verification;

#[cfg(test)]
mod tests {
    //! Member lifecycle exercised end to end against the in-memory store.

    use chrono::{DateTime, Utc};

    use crate::bot::error::Error;
    use crate::db::memory::MemoryMemberStore;
    use crate::db::store::MemberStore;
    use crate::services::membership::reconciler::{self, MemberProfile};
    use crate::services::verification::verify_service::{self, VerifyOutcome};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    #[tokio::test]
    async fn test_join_verify_reverify_leave() {
        let store = MemoryMemberStore::new();
        let profile = MemberProfile {
            user_id: 42,
            username: "newcomer".to_string(),
            is_bot: false,
            joined_at: at(1_700_000_000),
        };

        // Join: record created unverified
        reconciler::reconcile_guild(&store, &[profile]).await.unwrap();
        let record = store.find(42).await.unwrap().expect("record created");
        assert!(!record.verified);

        // First verify: transition applies
        let outcome = verify_service::verify_member(&store, 42, at(1_700_000_100))
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Verified(_)));

        // Second verify: no-op, timestamp untouched
        let outcome = verify_service::verify_member(&store, 42, at(1_700_000_200))
            .await
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::AlreadyVerified));
        let record = store.find(42).await.unwrap().unwrap();
        assert_eq!(record.verified_at, Some(at(1_700_000_100)));

        // Clean departure: record purged
        assert!(store.purge_unpunished(42).await.unwrap());
        assert!(store.find(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_punished_member_survives_departure() {
        let store = MemoryMemberStore::new();

        let mut banned = crate::db::models::MemberRecord::new(7, "troublemaker", false, at(1_700_000_000));
        banned.ban_until = Some(at(1_800_000_000));
        store.insert_if_absent(&banned).await.unwrap();

        // Departure must not drop a record with a pending punishment
        assert!(!store.purge_unpunished(7).await.unwrap());
        assert!(store.find(7).await.unwrap().is_some());

        // Verifying a member that was never reconciled errors cleanly
        let err = verify_service::verify_member(&store, 404, at(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(404)));
    }
}
