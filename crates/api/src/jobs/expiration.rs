//! Opportunity expiration sweep.

use std::sync::Arc;

use domain::services::OpportunityService;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_sweep;

/// Moves Active/Inactive opportunities past their end date to Expired.
pub struct ExpirationJob {
    service: Arc<OpportunityService>,
    batch_size: u32,
    frequency: JobFrequency,
}

impl ExpirationJob {
    pub fn new(service: Arc<OpportunityService>, batch_size: u32, frequency_minutes: u64) -> Self {
        Self {
            service,
            batch_size,
            frequency: JobFrequency::Minutes(frequency_minutes),
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpirationJob {
    fn name(&self) -> &'static str {
        "opportunity_expiration"
    }

    fn frequency(&self) -> JobFrequency {
        self.frequency
    }

    async fn execute(&self) -> Result<(), String> {
        let expired = self
            .service
            .process_expiration(self.batch_size)
            .await
            .map_err(|e| format!("Expiration sweep failed: {}", e))?;

        record_sweep(self.name(), expired);
        if expired > 0 {
            info!(expired, "Expired opportunities");
        }
        Ok(())
    }
}
