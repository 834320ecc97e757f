#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use folio_api::auth::session::SessionConfig;
use folio_api::config::ServerConfig;
use folio_api::media::{ImageUpload, MediaError, MediaHost};
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_db::models::user::AdminSeed;
use folio_db::{Repositories, Stores};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin123";
pub const BOUNDARY: &str = "folio-test-boundary";

/// Build a test `ServerConfig` with safe defaults and no media host.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        data_dir: "./unused".into(),
        session: SessionConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 1,
            cookie_secure: false,
        },
        admin: AdminSeed::default(),
        cloudinary: None,
    }
}

/// Media host that records uploads and hands back predictable URLs.
#[derive(Default)]
pub struct RecordingMediaHost {
    uploads: Mutex<Vec<String>>,
}

impl RecordingMediaHost {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for RecordingMediaHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        self.uploads.lock().unwrap().push(image.file_name.clone());
        Ok(format!("https://media.test/{}", image.file_name))
    }
}

/// A running app plus handles tests may want to inspect.
pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub media: Arc<RecordingMediaHost>,
}

impl TestApp {
    /// The router is cheap to clone; each request consumes one copy.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over in-memory stores.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config()).await
}

/// Same as [`build_test_app`] with a caller-supplied config.
pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let repos = Repositories::open(Stores::in_memory(), &config.admin)
        .await
        .expect("repositories should open");
    let media = Arc::new(RecordingMediaHost::default());

    let state = AppState {
        repos: repos.clone(),
        config: Arc::new(config),
        media: media.clone(),
    };

    TestApp {
        router: build_app_router(state),
        repos,
        media,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    get_auth(app, uri, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let request = with_token(Request::builder().method(Method::GET).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_json_auth(app, uri, body, None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let request = with_token(Request::builder().method(Method::POST).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let request = with_token(Request::builder().method(Method::DELETE).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a `multipart/form-data` body built with [`Multipart`].
pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    form: Multipart,
    token: Option<&str>,
) -> Response<Body> {
    let request = with_token(Request::builder().method(method).uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart builder
// ---------------------------------------------------------------------------

/// Minimal multipart body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// Register a user through the API.
pub async fn register(app: Router, username: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": password,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), 201, "registration of {username} should succeed");
    body_json(response).await
}

/// Log in and return the session token.
pub async fn login(app: Router, username: &str, password: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200, "login of {username} should succeed");
    let json = body_json(response).await;
    json["data"]["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: Router) -> String {
    login(app, "admin", ADMIN_PASSWORD).await
}

/// Create a review as the holder of `token` and return its JSON.
pub async fn create_review(app: Router, token: &str, title: &str) -> serde_json::Value {
    let form = Multipart::new()
        .text("title", title)
        .text("author", "Frank Herbert")
        .text("review", "Worth the sand.");
    let response = send_multipart(app, Method::POST, "/api/v1/reviews", form, Some(token)).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}
