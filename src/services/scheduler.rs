//! Notification scheduler
//!
//! A periodic scan over every chat with reporting enabled. Each cycle uses a
//! single `now`, re-reads all state from the store, notifies every unmuted
//! admin about each due member and then stamps the member's
//! `last_notified_time` once, whatever happened to the individual deliveries.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use crate::config::SchedulerConfig;
use crate::database::MembershipStore;
use crate::models::{Chat, Membership};
use crate::services::notification::NotificationService;
use crate::services::staleness;
use crate::utils::errors::{ShamebotError, Result};
use crate::utils::helpers::Clock;
use crate::utils::logging::{log_cycle_summary, log_dispatch};

/// Counters for one scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub now: i64,
    pub chats_scanned: usize,
    pub members_evaluated: usize,
    pub members_due: usize,
    pub deliveries_ok: usize,
    pub deliveries_failed: usize,
    /// Due members whose row vanished before `last_notified_time` could be set
    pub notify_marks_missed: usize,
}

#[derive(Clone)]
pub struct NotificationScheduler {
    store: Arc<dyn MembershipStore>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl NotificationScheduler {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            notifications,
            clock,
            config,
        }
    }

    /// Run one cycle at the clock's current time
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.scan(self.clock.now()).await
    }

    /// Run one cycle with an explicit `now` snapshot.
    ///
    /// Only store failures abort the cycle.
    pub async fn scan(&self, now: i64) -> Result<CycleReport> {
        let mut report = CycleReport { now, ..CycleReport::default() };

        let chats = self.store.chats_with_notifications_enabled().await?;
        for chat in &chats {
            self.scan_chat(chat, now, &mut report).await?;
            report.chats_scanned += 1;
        }

        Ok(report)
    }

    async fn scan_chat(&self, chat: &Chat, now: i64, report: &mut CycleReport) -> Result<()> {
        let members = self.store.member_memberships(chat.id).await?;
        report.members_evaluated += members.len();

        let due: Vec<Membership> = members
            .into_iter()
            .filter(|member| match staleness::evaluate(member, chat, now) {
                Ok(()) => true,
                Err(skip) => {
                    debug!(chat_id = chat.id, user_id = member.user_id, reason = skip.as_str(), "Member not due");
                    false
                }
            })
            .collect();
        if due.is_empty() {
            return Ok(());
        }
        report.members_due += due.len();

        let recipients: Vec<Membership> = self
            .store
            .admin_memberships(chat.id)
            .await?
            .into_iter()
            .filter(|admin| !admin.is_muted)
            .collect();
        if recipients.is_empty() {
            warn!(chat_id = chat.id, due = due.len(), "No unmuted admins to notify");
        }

        for member in &due {
            let text = self.notifications.member_inactive_text(chat, member, now)?;

            for admin in &recipients {
                match self.dispatch(admin.user_id, &text).await {
                    Ok(()) => {
                        report.deliveries_ok += 1;
                        log_dispatch(chat.id, member.user_id, admin.user_id, true, None);
                    }
                    Err(e) => {
                        report.deliveries_failed += 1;
                        log_dispatch(chat.id, member.user_id, admin.user_id, false, Some(&e.to_string()));
                    }
                }
                if !self.config.send_delay().is_zero() {
                    tokio::time::sleep(self.config.send_delay()).await;
                }
            }

            if !self.store.mark_notified(chat.id, member.user_id, now).await? {
                report.notify_marks_missed += 1;
                info!(chat_id = chat.id, user_id = member.user_id, "Membership gone before it could be marked notified");
            }
        }

        Ok(())
    }

    /// Send one notification, turning a timeout into a delivery failure
    async fn dispatch(&self, recipient_id: i64, text: &str) -> Result<()> {
        let send = self.notifications.messenger().send_text(recipient_id, text);
        match tokio::time::timeout(self.config.dispatch_timeout(), send).await {
            Ok(result) => result,
            Err(_) => Err(ShamebotError::Timeout(format!("notification to {}", recipient_id))),
        }
    }

    /// Scan forever on a fixed interval until `shutdown` flips or its sender goes away.
    ///
    /// A failing or overrunning cycle is logged and the next tick runs as usual.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_seconds = self.config.interval_seconds, "Notification scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }

            match tokio::time::timeout(self.config.cycle_timeout(), self.run_cycle()).await {
                Ok(Ok(report)) => log_cycle_summary(
                    report.now,
                    report.chats_scanned,
                    report.members_evaluated,
                    report.members_due,
                    report.deliveries_ok,
                    report.deliveries_failed,
                ),
                Ok(Err(e)) => error!(error = %e, severity = %e.severity(), "Scan cycle aborted"),
                Err(_) => error!(timeout_seconds = self.config.cycle_timeout_seconds, "Scan cycle timed out"),
            }
        }

        info!("Notification scheduler stopped");
    }

    /// Run the loop on its own task
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
