//! Notifies owners about opportunities that end soon.

use std::sync::Arc;

use domain::services::{ExpirationNotifier, OpportunityService};
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_sweep;

pub struct ExpirationNotificationJob {
    service: Arc<OpportunityService>,
    notifier: Arc<dyn ExpirationNotifier>,
    interval_days: u32,
    batch_size: u32,
    frequency: JobFrequency,
}

impl ExpirationNotificationJob {
    pub fn new(
        service: Arc<OpportunityService>,
        notifier: Arc<dyn ExpirationNotifier>,
        interval_days: u32,
        batch_size: u32,
        frequency_minutes: u64,
    ) -> Self {
        Self {
            service,
            notifier,
            interval_days,
            batch_size,
            frequency: JobFrequency::Minutes(frequency_minutes),
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpirationNotificationJob {
    fn name(&self) -> &'static str {
        "opportunity_expiration_notification"
    }

    fn frequency(&self) -> JobFrequency {
        self.frequency
    }

    async fn execute(&self) -> Result<(), String> {
        let notified = self
            .service
            .expiration_notifications(self.notifier.as_ref(), self.interval_days, self.batch_size)
            .await
            .map_err(|e| format!("Expiration notification failed: {}", e))?;

        record_sweep(self.name(), notified);
        info!(
            notified,
            interval_days = self.interval_days,
            "Expiration notifications sent"
        );
        Ok(())
    }
}
