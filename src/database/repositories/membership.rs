//! Membership repository implementation
//!
//! One row per (chat, user) with a role column; promotion and demotion
//! rewrite the role instead of inserting a second row.

use sqlx::{FromRow, PgConnection};
use crate::models::membership::{Membership, Role};
use crate::utils::errors::ShamebotError;

#[derive(Debug, FromRow)]
struct MembershipRow {
    chat_id: i64,
    user_id: i64,
    user_name: String,
    role: String,
    last_active_time: i64,
    last_notified_time: i64,
    is_muted: bool,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = ShamebotError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            chat_id: row.chat_id,
            user_id: row.user_id,
            user_name: row.user_name,
            role: row.role.parse()?,
            last_active_time: row.last_active_time,
            last_notified_time: row.last_notified_time,
            is_muted: row.is_muted,
        })
    }
}

/// Current role of the user in the chat, locking the row for the transaction
pub async fn role_for_update(
    conn: &mut PgConnection,
    chat_id: i64,
    user_id: i64,
) -> Result<Option<Role>, ShamebotError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT role FROM memberships WHERE chat_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    row.map(|(role,)| role.parse()).transpose()
}

/// Insert a member row; no-op when the pair already exists in any role
pub async fn insert_member(conn: &mut PgConnection, chat_id: i64, user_id: i64) -> Result<bool, ShamebotError> {
    let result = sqlx::query(
        r#"
        INSERT INTO memberships (chat_id, user_id, role)
        VALUES ($1, $2, 'member')
        ON CONFLICT (chat_id, user_id) DO NOTHING
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Create the pair in the given role, or move an existing row into it.
/// Moving to another role resets mute and both timestamps; same-role calls leave the row as is.
pub async fn set_role(conn: &mut PgConnection, chat_id: i64, user_id: i64, role: Role) -> Result<(), ShamebotError> {
    sqlx::query(
        r#"
        INSERT INTO memberships (chat_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (chat_id, user_id) DO UPDATE
        SET role = EXCLUDED.role,
            is_muted = FALSE,
            last_active_time = 0,
            last_notified_time = 0
        WHERE memberships.role <> EXCLUDED.role
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn touch_active(conn: &mut PgConnection, chat_id: i64, user_id: i64, at: i64) -> Result<bool, ShamebotError> {
    let result = sqlx::query(
        "UPDATE memberships SET last_active_time = $3 WHERE chat_id = $1 AND user_id = $2 AND role = 'member'",
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_notified(conn: &mut PgConnection, chat_id: i64, user_id: i64, at: i64) -> Result<bool, ShamebotError> {
    let result = sqlx::query(
        "UPDATE memberships SET last_notified_time = $3 WHERE chat_id = $1 AND user_id = $2 AND role = 'member'",
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_muted(conn: &mut PgConnection, chat_id: i64, user_id: i64, muted: bool) -> Result<bool, ShamebotError> {
    let result = sqlx::query("UPDATE memberships SET is_muted = $3 WHERE chat_id = $1 AND user_id = $2")
        .bind(chat_id)
        .bind(user_id)
        .bind(muted)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove(conn: &mut PgConnection, chat_id: i64, user_id: i64) -> Result<bool, ShamebotError> {
    let result = sqlx::query("DELETE FROM memberships WHERE chat_id = $1 AND user_id = $2")
        .bind(chat_id)
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Memberships of a chat joined with usernames, optionally restricted to one role
pub async fn list(conn: &mut PgConnection, chat_id: i64, role: Option<Role>) -> Result<Vec<Membership>, ShamebotError> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT m.chat_id, m.user_id, u.user_name, m.role, m.last_active_time, m.last_notified_time, m.is_muted
        FROM memberships m
        INNER JOIN users u ON u.id = m.user_id
        WHERE m.chat_id = $1 AND ($2::TEXT IS NULL OR m.role = $2)
        ORDER BY m.user_id ASC
        "#,
    )
    .bind(chat_id)
    .bind(role.map(|role| role.as_str()))
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(Membership::try_from).collect()
}
