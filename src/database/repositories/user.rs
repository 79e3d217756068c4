//! User repository implementation

use sqlx::PgConnection;
use crate::models::user::{User, UserProfile};
use crate::utils::errors::ShamebotError;

/// Insert a user or refresh the stored username.
///
/// An empty incoming username never overwrites a known one.
pub async fn upsert(conn: &mut PgConnection, profile: &UserProfile) -> Result<User, ShamebotError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, user_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE
            SET user_name = CASE WHEN EXCLUDED.user_name = '' THEN users.user_name ELSE EXCLUDED.user_name END,
                updated_at = NOW()
        RETURNING id, user_name
        "#,
    )
    .bind(profile.id)
    .bind(&profile.user_name)
    .fetch_one(conn)
    .await?;

    Ok(user)
}

