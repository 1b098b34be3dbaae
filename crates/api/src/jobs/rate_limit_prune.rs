//! Evicts idle clients from the anonymous rate limiter.

use std::sync::Arc;

use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::RateLimiterState;

pub struct RateLimitPruneJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitPruneJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        let removed = self.limiter.prune();
        metrics::gauge!("rate_limit_tracked_clients").set(self.limiter.tracked_clients() as f64);
        debug!(removed, remaining = self.limiter.tracked_clients(), "Rate limiter pruned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prune_job_keeps_active_clients() {
        let limiter = Arc::new(RateLimiterState::new(1, false).unwrap());
        assert!(limiter.check("198.51.100.4").is_ok());

        let job = RateLimitPruneJob::new(limiter.clone());
        assert_eq!(job.name(), "rate_limit_prune");
        job.execute().await.unwrap();

        assert_eq!(limiter.tracked_clients(), 1);
    }
}
