//! Shared helpers for Web API integration tests.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use cirrus::auth::JwtState;
use cirrus::storage::MemoryStore;
use cirrus::web::handlers::AppState;
use cirrus::web::router::{create_health_router, create_router};
use cirrus::Database;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Default per-account quota for tests: 1 MB.
pub const TEST_STORAGE_LIMIT: i64 = 1024 * 1024;

/// Create a test server backed by an in-memory database and blob store.
pub async fn create_test_server() -> (TestServer, Arc<Database>, Arc<MemoryStore>) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let store = Arc::new(MemoryStore::new());

    let app_state = Arc::new(AppState::new(
        db.clone(),
        store.clone(),
        TEST_JWT_SECRET,
        900,
        TEST_STORAGE_LIMIT,
        10 * 1024 * 1024,
    ));

    let jwt_state = Arc::new(JwtState::new(TEST_JWT_SECRET));

    let router = create_router(app_state, jwt_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db, store)
}

/// Register a user and return the response body.
pub async fn register_user(server: &TestServer, name: &str, email: &str, password: &str) -> Value {
    server
        .post("/api/auth/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Register a user and return their bearer token.
pub async fn register_and_login(server: &TestServer, name: &str, email: &str) -> String {
    let response = register_user(server, name, email, "password123").await;
    token_of(&response)
}

/// Extract the bearer token from an auth response.
pub fn token_of(response: &Value) -> String {
    response["data"]["token"]
        .as_str()
        .expect("auth response has no token")
        .to_string()
}

/// Build an Authorization header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
