use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::memory::InMemoryStore;
use domain::services::{LookupService, OpportunityService};
use domain::store::{LookupStore, OpportunityStore, OrganizationStore};
use persistence::{LookupRepository, OpportunityRepository, OrganizationRepository};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_administrator,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{health, lookups, opportunities};

/// Storage backends behind the services.
#[derive(Clone)]
pub struct Stores {
    pub opportunities: Arc<dyn OpportunityStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub lookups: Arc<dyn LookupStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            opportunities: Arc::new(OpportunityRepository::new(pool.clone())),
            organizations: Arc::new(OrganizationRepository::new(pool.clone())),
            lookups: Arc::new(LookupRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            opportunities: store.clone(),
            organizations: store.clone(),
            lookups: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub opportunities: Arc<OpportunityService>,
    pub lookups: Arc<LookupService>,
    /// Used by the readiness probe.
    pub store: Arc<dyn OpportunityStore>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, jwt: JwtConfig) -> Self {
        let lookups = Arc::new(LookupService::new(stores.lookups, config.cache.policy()));
        let opportunities = Arc::new(OpportunityService::new(
            stores.opportunities.clone(),
            stores.organizations,
            lookups.clone(),
        ));
        let rate_limiter = RateLimiterState::new(
            config.security.rate_limit_per_minute,
            config.security.trust_forwarded_for,
        )
        .map(Arc::new);

        Self {
            config: Arc::new(config),
            opportunities,
            lookups,
            store: stores.opportunities,
            jwt: Arc::new(jwt),
            rate_limiter,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Development default
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Anonymous routes, limited per client
    let public_routes = Router::new()
        .route(
            "/api/v3/opportunity/:id/info",
            get(opportunities::get_info_by_id),
        )
        .route(
            "/api/v3/opportunity/info/search",
            post(opportunities::search_info),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Administrative routes (Admin or OrganizationAdmin bearer token)
    let admin_routes = Router::new()
        .route("/api/v3/opportunity/category", get(lookups::list_categories))
        .route(
            "/api/v3/opportunity/difficulty",
            get(lookups::list_difficulties),
        )
        .route("/api/v3/opportunity/status", get(lookups::list_statuses))
        .route("/api/v3/opportunity/type", get(lookups::list_types))
        .route("/api/v3/opportunity/search", post(opportunities::search))
        .route("/api/v3/opportunity", post(opportunities::upsert))
        .route("/api/v3/opportunity/:id", get(opportunities::get_by_id))
        .route(
            "/api/v3/opportunity/:id/status/:status",
            put(opportunities::update_status),
        )
        .route(
            "/api/v3/opportunity/:id/assign/:kind",
            put(opportunities::assign),
        )
        .route(
            "/api/v3/opportunity/:id/remove/:kind",
            delete(opportunities::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_administrator,
        ));

    let health_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(health_routes)
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
