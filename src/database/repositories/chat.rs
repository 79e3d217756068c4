//! Chat repository implementation

use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};
use crate::models::chat::{Chat, ChatSettings, Triggers};
use crate::utils::errors::ShamebotError;

const CHAT_COLUMNS: &str =
    "id, chat_name, triggers, notify_time, notify_max_time, notify_interval, bot_is_admin, setup_complete";

#[derive(Debug, FromRow)]
struct ChatRow {
    id: i64,
    chat_name: String,
    triggers: Json<Triggers>,
    notify_time: i64,
    notify_max_time: i64,
    notify_interval: i64,
    bot_is_admin: bool,
    setup_complete: bool,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Self {
            id: row.id,
            chat_name: row.chat_name,
            triggers: row.triggers.0,
            notify_time: row.notify_time,
            notify_max_time: row.notify_max_time,
            notify_interval: row.notify_interval,
            bot_is_admin: row.bot_is_admin,
            setup_complete: row.setup_complete,
        }
    }
}

/// Find chat by ID
pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Chat>, ShamebotError> {
    let row = sqlx::query_as::<_, ChatRow>(&format!("SELECT {} FROM chats WHERE id = $1", CHAT_COLUMNS))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(Chat::from))
}

/// Load the chat and lock its row for the rest of the transaction
pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Option<Chat>, ShamebotError> {
    let row = sqlx::query_as::<_, ChatRow>(&format!("SELECT {} FROM chats WHERE id = $1 FOR UPDATE", CHAT_COLUMNS))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(Chat::from))
}

/// Insert a chat or refresh the name of an existing one
pub async fn upsert(conn: &mut PgConnection, id: i64, chat_name: &str) -> Result<Chat, ShamebotError> {
    let row = sqlx::query_as::<_, ChatRow>(&format!(
        r#"
        INSERT INTO chats (id, chat_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET chat_name = EXCLUDED.chat_name, updated_at = NOW()
        RETURNING {}
        "#,
        CHAT_COLUMNS
    ))
    .bind(id)
    .bind(chat_name)
    .fetch_one(conn)
    .await?;

    Ok(row.into())
}

/// Delete chat; memberships go with it through the foreign key cascade
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, ShamebotError> {
    let result = sqlx::query("DELETE FROM chats WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_bot_is_admin(conn: &mut PgConnection, id: i64, is_admin: bool) -> Result<bool, ShamebotError> {
    let result = sqlx::query("UPDATE chats SET bot_is_admin = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(is_admin)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Write the admin-editable settings and mark setup as complete
pub async fn update_settings(
    conn: &mut PgConnection,
    id: i64,
    settings: &ChatSettings,
) -> Result<Option<Chat>, ShamebotError> {
    let row = sqlx::query_as::<_, ChatRow>(&format!(
        r#"
        UPDATE chats
        SET triggers = $2,
            notify_time = $3,
            notify_max_time = $4,
            notify_interval = $5,
            setup_complete = TRUE,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        CHAT_COLUMNS
    ))
    .bind(id)
    .bind(Json(settings.triggers.clone()))
    .bind(settings.notify_time)
    .bind(settings.notify_max_time)
    .bind(settings.notify_interval)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Chat::from))
}

/// Chats with reporting switched on
pub async fn with_notifications_enabled(conn: &mut PgConnection) -> Result<Vec<Chat>, ShamebotError> {
    let rows = sqlx::query_as::<_, ChatRow>(&format!(
        "SELECT {} FROM chats WHERE notify_time > 0 ORDER BY id ASC",
        CHAT_COLUMNS
    ))
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Chat::from).collect())
}

/// Chats in which the user holds the admin role
pub async fn administered_by(conn: &mut PgConnection, user_id: i64) -> Result<Vec<Chat>, ShamebotError> {
    let rows = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT c.id, c.chat_name, c.triggers, c.notify_time, c.notify_max_time, c.notify_interval,
               c.bot_is_admin, c.setup_complete
        FROM chats c
        INNER JOIN memberships m ON m.chat_id = c.id
        WHERE m.user_id = $1 AND m.role = 'admin'
        ORDER BY c.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Chat::from).collect())
}
