//! Background job scheduler and job implementations.

mod expiration;
mod expiration_notification;
mod pool_metrics;
mod rate_limit_prune;
mod scheduler;

pub use expiration::ExpirationJob;
pub use expiration_notification::ExpirationNotificationJob;
pub use pool_metrics::PoolMetricsJob;
pub use rate_limit_prune::RateLimitPruneJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};
    use domain::models::{Opportunity, OpportunityStatus};
    use uuid::Uuid;

    /// Opportunity that started 60 days ago; negative `ended_days_ago`
    /// puts the end date in the future.
    pub(crate) fn opportunity(title: &str, status: OpportunityStatus, ended_days_ago: i64) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Sweep fixture".to_string(),
            type_id: Uuid::new_v4(),
            type_name: "Task".to_string(),
            organization_id: Uuid::new_v4(),
            organization_name: "Org".to_string(),
            instructions: None,
            url: None,
            zlto_reward: None,
            yoma_reward: None,
            zlto_reward_pool: None,
            yoma_reward_pool: None,
            verification_supported: false,
            difficulty_id: Uuid::new_v4(),
            difficulty_name: "Beginner".to_string(),
            commitment_interval_id: Uuid::new_v4(),
            commitment_interval_name: "Day".to_string(),
            commitment_interval_count: 1,
            participant_limit: None,
            participant_count: None,
            keywords: None,
            date_start: now - Duration::days(60),
            date_end: Some(now - Duration::days(ended_days_ago)),
            status,
            created_by: "system".to_string(),
            date_created: now - Duration::days(60),
            modified_by: "system".to_string(),
            date_modified: now - Duration::days(60),
            categories: None,
            countries: None,
            languages: None,
            skills: None,
        }
    }
}
