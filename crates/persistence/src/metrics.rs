//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Queries slower than this are logged at warn level.
const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(500);

/// Record database query duration.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Called from the readiness probe so the gauges track pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one database operation.
///
/// ```ignore
/// let timer = QueryTimer::new("find_opportunity_by_id");
/// let result = sqlx::query_as::<_, OpportunityEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed duration and returns it.
    pub fn record(self) -> Duration {
        let elapsed = self.start.elapsed();
        record_query_duration(self.query_name, elapsed.as_secs_f64());
        if elapsed >= SLOW_QUERY_THRESHOLD {
            tracing::warn!(
                query = self.query_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow database query"
            );
        }
        elapsed
    }
}
