pub mod contact;
pub mod notifications;
mod replies;
pub mod scheduler;
mod service;

pub use contact::extract_contact;
pub use replies::handle_reply;
pub use scheduler::{is_due, NotificationPolicy};
pub use service::{CycleReport, ReminderService};

use super::calendar_feed::{CalendarSource, IcsFeed};
use super::ComponentContext;
use crate::error::BotResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration as TokioDuration;
use tracing::info;

/// Reminder component: sends event reminders and routes replies
#[derive(Default)]
pub struct Reminder {
    source: Option<Arc<dyn CalendarSource>>,
    service: RwLock<Option<ReminderService>>,
    scheduler: RwLock<Option<JoinHandle<()>>>,
}

impl Reminder {
    /// Create a reminder component reading the configured calendar URL
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reminder component with a custom calendar source
    pub fn with_source(source: Arc<dyn CalendarSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Get the service once the component is initialized
    pub async fn get_service(&self) -> Option<ReminderService> {
        let service_lock = self.service.read().await;
        service_lock.clone()
    }
}

#[async_trait]
impl super::Component for Reminder {
    fn name(&self) -> &'static str {
        "reminder"
    }

    async fn init(&self, ctx: ComponentContext) -> BotResult<()> {
        let mut scheduler_lock = self.scheduler.write().await;
        if scheduler_lock.is_some() {
            info!("Reminder scheduler already running");
            return Ok(());
        }

        let (calendar_url, interval) = {
            let config_read = ctx.config.read().await;
            info!("Mode: {}", config_read.mode_description());
            (
                config_read.calendar_url.clone(),
                TokioDuration::from_secs(config_read.check_interval_secs),
            )
        };

        let source = match &self.source {
            Some(source) => Arc::clone(source),
            None => Arc::new(IcsFeed::new(&calendar_url)) as Arc<dyn CalendarSource>,
        };

        let service = ReminderService::new(ctx.config, source, ctx.transport, ctx.store);
        *self.service.write().await = Some(service.clone());

        // Start the reminder scheduler
        *scheduler_lock = Some(scheduler::start_scheduler(service, interval));

        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        if let Some(task) = self.scheduler.write().await.take() {
            task.abort();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
