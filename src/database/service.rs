//! PostgreSQL-backed membership store
//!
//! Each trait operation opens one transaction, composes repository calls on it
//! and commits. An early return or `?` drops the transaction, which rolls it back.

use async_trait::async_trait;
use tracing::debug;
use crate::database::repositories::{chat, membership, user};
use crate::database::store::{ActivityMark, MembershipStore, RegisterOutcome};
use crate::database::DatabasePool;
use crate::models::{Chat, ChatSettings, Membership, Role, User, UserProfile};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct PgMembershipStore {
    pool: DatabasePool,
}

impl PgMembershipStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    async fn set_role(&self, chat_id: i64, profile: &UserProfile, role: Role) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        if chat::lock(&mut tx, chat_id).await?.is_none() {
            return Ok(false);
        }
        let user = user::upsert(&mut tx, profile).await?;
        membership::set_role(&mut tx, chat_id, user.id, role).await?;
        tx.commit().await?;

        debug!(chat_id = chat_id, user_id = user.id, role = %role, "Membership role set");
        Ok(true)
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>> {
        let mut conn = self.pool.acquire().await?;
        chat::find_by_id(&mut conn, chat_id).await
    }

    async fn upsert_chat(&self, chat_id: i64, chat_name: &str) -> Result<Chat> {
        let mut tx = self.pool.begin().await?;
        let chat = chat::upsert(&mut tx, chat_id, chat_name).await?;
        tx.commit().await?;
        Ok(chat)
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let deleted = chat::delete(&mut tx, chat_id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn set_bot_is_admin(&self, chat_id: i64, is_admin: bool) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let updated = chat::set_bot_is_admin(&mut tx, chat_id, is_admin).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn update_chat_settings(&self, chat_id: i64, settings: &ChatSettings) -> Result<Option<Chat>> {
        settings.validate()?;
        let mut tx = self.pool.begin().await?;
        let chat = chat::update_settings(&mut tx, chat_id, settings).await?;
        tx.commit().await?;
        Ok(chat)
    }

    async fn chats_with_notifications_enabled(&self) -> Result<Vec<Chat>> {
        let mut conn = self.pool.acquire().await?;
        chat::with_notifications_enabled(&mut conn).await
    }

    async fn chats_administered_by(&self, user_id: i64) -> Result<Vec<Chat>> {
        let mut conn = self.pool.acquire().await?;
        chat::administered_by(&mut conn, user_id).await
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user = user::upsert(&mut tx, profile).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn register_activity(
        &self,
        chat_id: i64,
        profile: &UserProfile,
        mark: Option<ActivityMark>,
    ) -> Result<Option<RegisterOutcome>> {
        let mut tx = self.pool.begin().await?;
        let Some(chat) = chat::lock(&mut tx, chat_id).await? else {
            return Ok(None);
        };
        let active_at = mark
            .filter(|mark| chat.triggers.is_enabled(mark.trigger))
            .map(|mark| mark.at);

        let user = user::upsert(&mut tx, profile).await?;
        let created = match membership::role_for_update(&mut tx, chat_id, user.id).await? {
            Some(Role::Admin) => {
                tx.commit().await?;
                return Ok(Some(RegisterOutcome::Admin));
            }
            Some(Role::Member) => false,
            None => membership::insert_member(&mut tx, chat_id, user.id).await?,
        };

        let refreshed = match active_at {
            Some(at) => membership::touch_active(&mut tx, chat_id, user.id, at).await?,
            None => false,
        };
        tx.commit().await?;

        Ok(Some(RegisterOutcome::Member { created, refreshed }))
    }

    async fn promote_to_admin(&self, chat_id: i64, profile: &UserProfile) -> Result<bool> {
        self.set_role(chat_id, profile, Role::Admin).await
    }

    async fn demote_to_member(&self, chat_id: i64, profile: &UserProfile) -> Result<bool> {
        self.set_role(chat_id, profile, Role::Member).await
    }

    async fn refresh_admins(&self, chat_id: i64, admins: &[UserProfile]) -> Result<Option<usize>> {
        let mut tx = self.pool.begin().await?;
        if chat::lock(&mut tx, chat_id).await?.is_none() {
            return Ok(None);
        }

        let mut written = 0;
        for profile in admins.iter().filter(|profile| !profile.is_bot) {
            let user = user::upsert(&mut tx, profile).await?;
            membership::set_role(&mut tx, chat_id, user.id, Role::Admin).await?;
            written += 1;
        }
        tx.commit().await?;

        Ok(Some(written))
    }

    async fn remove_membership(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = membership::remove(&mut tx, chat_id, user_id).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn set_muted(&self, chat_id: i64, user_id: i64, muted: bool) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let updated = membership::set_muted(&mut tx, chat_id, user_id, muted).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn chat_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        let mut conn = self.pool.acquire().await?;
        membership::list(&mut conn, chat_id, None).await
    }

    async fn member_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        let mut conn = self.pool.acquire().await?;
        membership::list(&mut conn, chat_id, Some(Role::Member)).await
    }

    async fn admin_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        let mut conn = self.pool.acquire().await?;
        membership::list(&mut conn, chat_id, Some(Role::Admin)).await
    }

    async fn mark_notified(&self, chat_id: i64, user_id: i64, at: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let updated = membership::mark_notified(&mut tx, chat_id, user_id, at).await?;
        tx.commit().await?;
        Ok(updated)
    }
}
