//! In-process membership store
//!
//! Backs the `memory` database backend for local runs and the test suite.
//! Each operation holds the state lock for its whole duration, which gives the
//! same all-or-nothing behaviour as a transaction in the Postgres store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use crate::database::store::{ActivityMark, MembershipStore, RegisterOutcome};
use crate::models::{Chat, ChatSettings, Membership, Role, User, UserProfile};
use crate::utils::errors::{ShamebotError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    chats: BTreeMap<i64, Chat>,
    users: BTreeMap<i64, User>,
    /// keyed by (chat_id, user_id)
    memberships: BTreeMap<(i64, i64), Membership>,
}

impl MemoryState {
    fn upsert_user(&mut self, profile: &UserProfile) -> User {
        let user = self
            .users
            .entry(profile.id)
            .or_insert_with(|| User::from(profile));
        if !profile.user_name.is_empty() {
            user.user_name = profile.user_name.clone();
        }
        user.clone()
    }

    fn set_role(&mut self, chat_id: i64, user: &User, role: Role) {
        self.memberships
            .entry((chat_id, user.id))
            .and_modify(|membership| {
                if membership.role != role {
                    *membership = Membership::new(chat_id, user.id, membership.user_name.clone(), role);
                }
            })
            .or_insert_with(|| Membership::new(chat_id, user.id, user.user_name.clone(), role));
    }

    fn memberships_of(&self, chat_id: i64, role: Option<Role>) -> Vec<Membership> {
        self.memberships
            .range((chat_id, i64::MIN)..=(chat_id, i64::MAX))
            .map(|(_, membership)| membership)
            .filter(|membership| role.map_or(true, |role| membership.role == role))
            .map(|membership| {
                let mut membership = membership.clone();
                if let Some(user) = self.users.get(&membership.user_id) {
                    membership.user_name = user.user_name.clone();
                }
                membership
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: while unavailable every operation fails with `StoreUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Insert or overwrite a chat wholesale
    pub fn put_chat(&self, chat: Chat) -> Result<()> {
        self.lock()?.chats.insert(chat.id, chat);
        Ok(())
    }

    /// Look up one membership regardless of role
    pub fn membership(&self, chat_id: i64, user_id: i64) -> Result<Option<Membership>> {
        Ok(self.lock()?.memberships.get(&(chat_id, user_id)).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ShamebotError::StoreUnavailable("memory store switched off".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| ShamebotError::StoreUnavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>> {
        Ok(self.lock()?.chats.get(&chat_id).cloned())
    }

    async fn upsert_chat(&self, chat_id: i64, chat_name: &str) -> Result<Chat> {
        let mut state = self.lock()?;
        let chat = state
            .chats
            .entry(chat_id)
            .or_insert_with(|| Chat::new(chat_id, chat_name));
        chat.chat_name = chat_name.to_string();
        Ok(chat.clone())
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<bool> {
        let mut state = self.lock()?;
        if state.chats.remove(&chat_id).is_none() {
            return Ok(false);
        }
        state.memberships.retain(|(chat, _), _| *chat != chat_id);
        Ok(true)
    }

    async fn set_bot_is_admin(&self, chat_id: i64, is_admin: bool) -> Result<bool> {
        let mut state = self.lock()?;
        match state.chats.get_mut(&chat_id) {
            Some(chat) => {
                chat.bot_is_admin = is_admin;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_chat_settings(&self, chat_id: i64, settings: &ChatSettings) -> Result<Option<Chat>> {
        settings.validate()?;
        let mut state = self.lock()?;
        Ok(state.chats.get_mut(&chat_id).map(|chat| {
            chat.apply_settings(settings.clone());
            chat.clone()
        }))
    }

    async fn chats_with_notifications_enabled(&self) -> Result<Vec<Chat>> {
        let state = self.lock()?;
        Ok(state
            .chats
            .values()
            .filter(|chat| chat.notifications_enabled())
            .cloned()
            .collect())
    }

    async fn chats_administered_by(&self, user_id: i64) -> Result<Vec<Chat>> {
        let state = self.lock()?;
        Ok(state
            .memberships
            .values()
            .filter(|membership| membership.user_id == user_id && membership.is_admin())
            .filter_map(|membership| state.chats.get(&membership.chat_id).cloned())
            .collect())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<User> {
        Ok(self.lock()?.upsert_user(profile))
    }

    async fn register_activity(
        &self,
        chat_id: i64,
        profile: &UserProfile,
        mark: Option<ActivityMark>,
    ) -> Result<Option<RegisterOutcome>> {
        let mut state = self.lock()?;
        let Some(chat) = state.chats.get(&chat_id) else {
            return Ok(None);
        };
        let active_at = mark
            .filter(|mark| chat.triggers.is_enabled(mark.trigger))
            .map(|mark| mark.at);

        let user = state.upsert_user(profile);
        let mut created = false;
        let membership = state.memberships.entry((chat_id, user.id)).or_insert_with(|| {
            created = true;
            Membership::new(chat_id, user.id, user.user_name.clone(), Role::Member)
        });

        if membership.is_admin() {
            return Ok(Some(RegisterOutcome::Admin));
        }

        let refreshed = match active_at {
            Some(at) => {
                membership.last_active_time = at;
                true
            }
            None => false,
        };

        Ok(Some(RegisterOutcome::Member { created, refreshed }))
    }

    async fn promote_to_admin(&self, chat_id: i64, profile: &UserProfile) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.chats.contains_key(&chat_id) {
            return Ok(false);
        }
        let user = state.upsert_user(profile);
        state.set_role(chat_id, &user, Role::Admin);
        Ok(true)
    }

    async fn demote_to_member(&self, chat_id: i64, profile: &UserProfile) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.chats.contains_key(&chat_id) {
            return Ok(false);
        }
        let user = state.upsert_user(profile);
        state.set_role(chat_id, &user, Role::Member);
        Ok(true)
    }

    async fn refresh_admins(&self, chat_id: i64, admins: &[UserProfile]) -> Result<Option<usize>> {
        let mut state = self.lock()?;
        if !state.chats.contains_key(&chat_id) {
            return Ok(None);
        }

        let mut written = 0;
        for profile in admins.iter().filter(|profile| !profile.is_bot) {
            let user = state.upsert_user(profile);
            state.set_role(chat_id, &user, Role::Admin);
            written += 1;
        }
        Ok(Some(written))
    }

    async fn remove_membership(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.lock()?.memberships.remove(&(chat_id, user_id)).is_some())
    }

    async fn set_muted(&self, chat_id: i64, user_id: i64, muted: bool) -> Result<bool> {
        let mut state = self.lock()?;
        match state.memberships.get_mut(&(chat_id, user_id)) {
            Some(membership) => {
                membership.is_muted = muted;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn chat_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        Ok(self.lock()?.memberships_of(chat_id, None))
    }

    async fn member_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        Ok(self.lock()?.memberships_of(chat_id, Some(Role::Member)))
    }

    async fn admin_memberships(&self, chat_id: i64) -> Result<Vec<Membership>> {
        Ok(self.lock()?.memberships_of(chat_id, Some(Role::Admin)))
    }

    async fn mark_notified(&self, chat_id: i64, user_id: i64, at: i64) -> Result<bool> {
        let mut state = self.lock()?;
        match state.memberships.get_mut(&(chat_id, user_id)) {
            Some(membership) if membership.role == Role::Member => {
                membership.last_notified_time = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
