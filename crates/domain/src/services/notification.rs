//! Notifications about opportunities that are about to expire.
//!
//! Delivery is out of process; the default implementation only logs.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Opportunity;

/// Summary of an expiring opportunity handed to a notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringOpportunity {
    pub id: Uuid,
    pub title: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub date_end: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl From<&Opportunity> for ExpiringOpportunity {
    fn from(o: &Opportunity) -> Self {
        Self {
            id: o.id,
            title: o.title.clone(),
            organization_id: o.organization_id,
            organization_name: o.organization_name.clone(),
            date_end: o.date_end,
            created_by: o.created_by.clone(),
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    Sent,
    /// Sending failed; callers log and carry on.
    Failed(String),
    /// Nothing to send.
    Skipped,
}

#[async_trait::async_trait]
pub trait ExpirationNotifier: Send + Sync {
    async fn notify_expiring(&self, batch: &[ExpiringOpportunity]) -> NotificationResult;
}

/// Writes one structured log line per expiring opportunity.
#[derive(Debug, Clone, Default)]
pub struct LoggingExpirationNotifier;

#[async_trait::async_trait]
impl ExpirationNotifier for LoggingExpirationNotifier {
    async fn notify_expiring(&self, batch: &[ExpiringOpportunity]) -> NotificationResult {
        if batch.is_empty() {
            return NotificationResult::Skipped;
        }
        for item in batch {
            tracing::info!(
                opportunity_id = %item.id,
                title = %item.title,
                organization = %item.organization_name,
                date_end = ?item.date_end,
                created_by = %item.created_by,
                "Opportunity expiring soon"
            );
        }
        NotificationResult::Sent
    }
}

/// Records every batch; can be told to fail.
#[derive(Debug, Default)]
pub struct MockExpirationNotifier {
    pub simulate_failure: bool,
    received: Mutex<Vec<ExpiringOpportunity>>,
}

impl MockExpirationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Ids of every opportunity received so far.
    pub fn received_ids(&self) -> Vec<Uuid> {
        self.received
            .lock()
            .map(|r| r.iter().map(|o| o.id).collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ExpirationNotifier for MockExpirationNotifier {
    async fn notify_expiring(&self, batch: &[ExpiringOpportunity]) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(count = batch.len(), "Mock notifier simulating failure");
            return NotificationResult::Failed("Simulated failure".to_string());
        }
        if let Ok(mut received) = self.received.lock() {
            received.extend(batch.iter().cloned());
        }
        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::sample_opportunity;

    #[test]
    fn test_expiring_opportunity_serialization() {
        let o = sample_opportunity("Serialize me");
        let json = serde_json::to_string(&ExpiringOpportunity::from(&o)).unwrap();
        assert!(json.contains("organizationName"));
        assert!(json.contains("Serialize me"));
    }

    #[tokio::test]
    async fn test_logging_notifier_skips_empty_batch() {
        let notifier = LoggingExpirationNotifier;
        assert_eq!(notifier.notify_expiring(&[]).await, NotificationResult::Skipped);
    }

    #[tokio::test]
    async fn test_mock_notifier_records() {
        let notifier = MockExpirationNotifier::new();
        let o = sample_opportunity("Recorded");
        let result = notifier
            .notify_expiring(&[ExpiringOpportunity::from(&o)])
            .await;
        assert_eq!(result, NotificationResult::Sent);
        assert_eq!(notifier.received_ids(), vec![o.id]);
    }

    #[tokio::test]
    async fn test_mock_notifier_failure() {
        let notifier = MockExpirationNotifier::failing();
        let result = notifier.notify_expiring(&[]).await;
        assert!(matches!(result, NotificationResult::Failed(_)));
        assert!(notifier.received_ids().is_empty());
    }
}
