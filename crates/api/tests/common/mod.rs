//! Common test utilities for integration tests.
//!
//! The router is driven with `tower::ServiceExt::oneshot` against the
//! in-memory store, so no database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use domain::memory::InMemoryStore;
use domain::models::{LookupItem, LookupKind, OpportunityStatus, Organization};
use opportunity_api::{
    app::{create_app, AppState, Stores},
    config::{
        CacheConfig, Config, DatabaseConfig, JobsConfig, JwtAuthConfig, LoggingConfig,
        SecurityConfig, ServerConfig,
    },
};
use serde_json::{json, Value};
use shared::jwt::JwtConfig;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_USER: &str = "admin@example.org";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0,
            hsts_enabled: false,
            trust_forwarded_for: false,
        },
        jwt: JwtAuthConfig {
            public_key: String::new(),
            leeway_secs: 0,
        },
        cache: CacheConfig::default(),
        jobs: JobsConfig {
            enabled: false,
            ..JobsConfig::default()
        },
    }
}

pub fn test_jwt() -> JwtConfig {
    JwtConfig::new_for_testing(TEST_JWT_SECRET)
}

pub fn token_for(username: &str, roles: &[&str]) -> String {
    test_jwt()
        .issue_token(username, roles)
        .expect("Failed to issue test token")
        .0
}

pub fn admin_token() -> String {
    token_for(ADMIN_USER, &["Admin"])
}

/// Reference rows and an organization seeded into the store.
#[derive(Debug, Clone)]
pub struct Seed {
    pub organization: Organization,
    pub task: LookupItem,
    pub beginner: LookupItem,
    pub day: LookupItem,
    pub environment: LookupItem,
    pub technology: LookupItem,
    pub south_africa: LookupItem,
    pub english: LookupItem,
    pub coding: LookupItem,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub seed: Seed,
}

pub async fn seed(store: &InMemoryStore) -> Seed {
    let statuses = OpportunityStatus::ALL
        .iter()
        .map(|s| LookupItem::new(s.id(), s.as_str()))
        .collect();
    store.set_lookups(LookupKind::Status, statuses).await;
    store.add_lookup(LookupKind::Type, "Learning").await;
    store.add_lookup(LookupKind::Difficulty, "Advanced").await;

    Seed {
        organization: store.add_organization("Green Earth Trust").await,
        task: store.add_lookup(LookupKind::Type, "Task").await,
        beginner: store.add_lookup(LookupKind::Difficulty, "Beginner").await,
        day: store.add_lookup(LookupKind::TimeInterval, "Day").await,
        environment: store.add_lookup(LookupKind::Category, "Environment").await,
        technology: store.add_lookup(LookupKind::Category, "Technology").await,
        south_africa: store.add_lookup(LookupKind::Country, "South Africa").await,
        english: store.add_lookup(LookupKind::Language, "English").await,
        coding: store.add_lookup(LookupKind::Skill, "Coding").await,
    }
}

pub async fn create_test_app_with(config: Config) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let seed = seed(&store).await;
    let state = AppState::new(config, Stores::in_memory(store.clone()), test_jwt());

    TestApp {
        router: create_app(state),
        store,
        seed,
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(test_config()).await
}

/// A valid upsert body for a new opportunity.
pub fn opportunity_body(seed: &Seed, title: &str) -> Value {
    let start = chrono::Utc::now() - chrono::Duration::days(1);
    let end = start + chrono::Duration::days(30);
    json!({
        "title": title,
        "description": "Help clean up the local beach",
        "typeId": seed.task.id,
        "organizationId": seed.organization.id,
        "difficultyId": seed.beginner.id,
        "commitmentIntervalId": seed.day.id,
        "commitmentIntervalCount": 2,
        "participantLimit": 10,
        "keywords": ["ocean", "cleanup"],
        "dateStart": start,
        "dateEnd": end,
        "postAsActive": true
    })
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"].as_str().unwrap().parse().unwrap()
}
