use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use stockroom_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Harness that wires the full application router against a throwaway
/// SQLite database, with one admin and one employee account registered
/// through the real auth endpoints.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    employee_token: String,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir for test database");
        let db_path = db_dir.path().join("stockroom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps SQLite writes serialized.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg, db_arc.clone()));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = stockroom_api::build_router(state.clone(), auth_service);

        let mut app = Self {
            router,
            state,
            admin_token: String::new(),
            employee_token: String::new(),
            _db_dir: db_dir,
            _event_task: event_task,
        };

        app.admin_token = app
            .register_and_login("test-admin", "admin-password-1", Some("admin"))
            .await;
        app.employee_token = app
            .register_and_login("test-employee", "employee-password-1", None)
            .await;

        app
    }

    async fn register_and_login(
        &self,
        username: &str,
        password: &str,
        role: Option<&str>,
    ) -> String {
        let mut body = json!({ "username": username, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let response = self
            .request(Method::POST, "/api/v1/auth/register", Some(body), None)
            .await;
        assert_eq!(
            response.status(),
            StatusCode::CREATED,
            "registering {} should succeed",
            username
        );

        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        body["access_token"]
            .as_str()
            .expect("login response carries an access token")
            .to_string()
    }

    /// Bearer token for the admin account.
    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    /// Bearer token for the unprivileged employee account.
    #[allow(dead_code)]
    pub fn employee_token(&self) -> &str {
        &self.employee_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for admin-authenticated JSON requests.
    pub async fn request_as_admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.admin_token()))
            .await
    }

    /// Create a supply through the API and return its JSON record.
    #[allow(dead_code)]
    pub async fn seed_supply(&self, payload: Value) -> Value {
        let response = self
            .request_as_admin(Method::POST, "/api/v1/supplies", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed supply");
        read_json(response).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Collect a response body into parsed JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid json")
}
