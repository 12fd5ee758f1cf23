use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use helpmap::auth::JwtService;
use helpmap::{create_app, AppState};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};
use tower::ServiceExt;

// For initializing tracing once
static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// Build the application against a fresh in-memory SQLite database.
///
/// The pool is capped at one connection: each pooled SQLite `:memory:`
/// connection would otherwise get its own empty database.
pub async fn test_app() -> (Router, DatabaseConnection) {
    setup();

    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let state = AppState {
        db: db.clone(),
        jwt: Arc::new(JwtService::new("test_secret", "helpmap-test".to_string())),
    };

    (create_app(state), db)
}

// Every request carries a unique client IP so the per-IP rate limiter
// never throttles a test run.
static IP_COUNTER: AtomicU32 = AtomicU32::new(1);

fn next_ip() -> String {
    let n = IP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("10.{}.{}.{}", (n >> 16) & 0xff, (n >> 8) & 0xff, n & 0xff)
}

/// Send a request and parse the JSON response body (if any).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", next_ip());

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Register an account through the API and log in, returning the access
/// token. `account_type` is "user" or "fund".
pub async fn register_and_login(app: &Router, username: &str, account_type: &str) -> String {
    let mut payload = serde_json::json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "password123",
        "password2": "password123",
        "account_type": account_type,
    });
    if account_type == "fund" {
        payload["fund_name"] = Value::String(format!("{} fund", username));
        payload["fund_description"] = Value::String("Helping those in need".to_string());
    }

    let (status, body) = send(app, "POST", "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    login(app, username).await
}

pub async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access"].as_str().unwrap().to_string()
}

/// Insert an admin account directly; there is no registration path to the
/// admin role, mirroring how deployments seed their first admin.
pub async fn create_admin(app: &Router, db: &DatabaseConnection, username: &str) -> String {
    use helpmap::entities::{user, UserRole};
    use sea_orm::{ActiveModelTrait, Set};

    let admin = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(helpmap::auth::hash_password("password123").unwrap()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        phone: Set(String::new()),
        avatar_url: Set(None),
        role: Set(UserRole::Admin),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    };
    admin.insert(db).await.expect("Failed to insert admin");

    login(app, username).await
}
