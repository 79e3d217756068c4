//! Services module
//!
//! This module contains the tracking and notification logic

pub mod activity;
pub mod lifecycle;
pub mod messenger;
pub mod notification;
pub mod scheduler;
pub mod staleness;

// Re-export commonly used services
pub use activity::{ActivityOutcome, ActivityRecorder, ActivitySignal, ContentKind};
pub use lifecycle::{BotStatus, BotStatusOutcome, LifecycleService, MemberChange};
pub use messenger::{Messenger, TelegramMessenger};
pub use notification::{MessageTemplate, NotificationService};
pub use scheduler::{CycleReport, NotificationScheduler};
pub use staleness::Skip;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::MembershipStore;
use crate::utils::helpers::Clock;

/// Service factory for creating and wiring all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub store: Arc<dyn MembershipStore>,
    pub activity_recorder: ActivityRecorder,
    pub lifecycle_service: LifecycleService,
    pub notification_service: NotificationService,
    pub scheduler: NotificationScheduler,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services sharing one store and clock
    pub fn new(
        settings: &Settings,
        store: Arc<dyn MembershipStore>,
        messenger: Arc<dyn Messenger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let notification_service = NotificationService::new(messenger, &settings.i18n);
        let activity_recorder = ActivityRecorder::new(store.clone(), clock.clone());
        let lifecycle_service = LifecycleService::new(
            store.clone(),
            notification_service.clone(),
            activity_recorder.clone(),
        );
        let scheduler = NotificationScheduler::new(
            store.clone(),
            notification_service.clone(),
            clock,
            settings.scheduler.clone(),
        );

        Self {
            store,
            activity_recorder,
            lifecycle_service,
            notification_service,
            scheduler,
        }
    }
}
