use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::MemberRecord;

pub async fn insert_if_absent(pool: &PgPool, record: &MemberRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO members (
            user_id, username, joined_at, verified, verified_at, is_bot,
            nudged, mute_until, ban_until, blacklisted, warnings, punishments
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(record.user_id)
    .bind(&record.username)
    .bind(record.joined_at)
    .bind(record.verified)
    .bind(record.verified_at)
    .bind(record.is_bot)
    .bind(record.nudged)
    .bind(record.mute_until)
    .bind(record.ban_until)
    .bind(record.blacklisted)
    .bind(&record.warnings)
    .bind(&record.punishments)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find(pool: &PgPool, user_id: i64) -> Result<Option<MemberRecord>, sqlx::Error> {
    sqlx::query_as::<_, MemberRecord>("SELECT * FROM members WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn mark_verified(
    pool: &PgPool,
    user_id: i64,
    at: DateTime<Utc>,
) -> Result<Option<MemberRecord>, sqlx::Error> {
    sqlx::query_as::<_, MemberRecord>(
        r#"
        UPDATE members
        SET verified = TRUE, verified_at = $2
        WHERE user_id = $1 AND verified = FALSE
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(at)
    .fetch_optional(pool)
    .await
}

pub async fn update_username(
    pool: &PgPool,
    user_id: i64,
    username: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE members
        SET username = $2
        WHERE user_id = $1 AND username <> $2
        "#,
    )
    .bind(user_id)
    .bind(username)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_nudged(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE members SET nudged = TRUE WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn reset_nudges_except(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE members SET nudged = FALSE WHERE user_id <> $1 AND nudged")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete a departing member's record unless a timed punishment is pending.
pub async fn purge_unpunished(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM members
        WHERE user_id = $1 AND mute_until IS NULL AND ban_until IS NULL
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn clear_mute(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE members SET mute_until = NULL WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn clear_ban(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE members SET ban_until = NULL WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
