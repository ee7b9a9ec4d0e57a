#![allow(dead_code)]

use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use event_service::domain::event::service::EventService;
use event_service::domain::user::service::AuthService;
use event_service::inbound::http::router::create_router;
use event_service::inbound::http::router::AppState;
use event_service::inbound::http::router::HttpSettings;
use event_service::outbound::repositories::memory::InMemoryEventRepository;
use event_service::outbound::repositories::memory::InMemoryUserRepository;
use event_service::outbound::storage::local::LocalImageStore;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;
use tempfile::TempDir;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const MAX_FILE_SIZE: usize = 64 * 1024;

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub uploads: TempDir,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let uploads = TempDir::new().expect("Failed to create upload directory");

        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, Duration::hours(24))
                .expect("Failed to create authenticator"),
        );

        let image_store = Arc::new(
            LocalImageStore::new(
                uploads.path().to_path_buf(),
                vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/gif".to_string(),
                ],
                MAX_FILE_SIZE,
            )
            .await
            .expect("Failed to create image store"),
        );

        let state = AppState {
            auth_service: Arc::new(AuthService::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::clone(&authenticator),
            )),
            event_service: Arc::new(EventService::new(
                Arc::new(InMemoryEventRepository::new()),
                image_store,
            )),
            authenticator: Arc::clone(&authenticator),
        };

        let router = create_router(
            state,
            HttpSettings {
                uploads_dir: uploads.path().to_path_buf(),
                body_limit: MAX_FILE_SIZE + 1024 * 1024,
                cors_origin: None,
            },
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            uploads,
            api_client: reqwest::Client::new(),
            authenticator,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path)).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user and return `(token, user id)`
    pub async fn register(&self, name: &str, email: &str) -> (String, String) {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": "pass_word!"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["_id"].as_str().unwrap().to_string(),
        )
    }

    /// Create an event from JSON fields and return the response body
    pub async fn create_event(&self, token: &str, event: Value) -> Value {
        let response = self
            .post_authenticated("/api/events", token)
            .json(&event)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::CREATED);

        response.json().await.expect("Failed to parse response")
    }
}

pub fn event_json(title: &str, event_type: &str, date: &str) -> Value {
    json!({
        "title": title,
        "description": "An event on campus",
        "date": date,
        "location": "Main Hall",
        "type": event_type
    })
}
