//! In-process stand-in for the classification backend.
//!
//! Serves the three endpoints the client talks to. `/api/image` answers with
//! the uploaded picture scaled to fit the model's input size instead of a
//! detection overlay.

mod models;
mod routes;
mod users;
mod utils;

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::DefaultBodyLimit,
    routing::{post, Router},
};
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

pub use models::api_models::TokenClaims;
pub use users::{AddUserError, User, UserStore};

use routes::{image::classify_image, login::login, register::register};
use users::hash_password;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Accounts available on a fresh server.
pub const DEMO_USERS: [(&str, &str); 2] = [("user1", "123"), ("user2", "456")];

#[derive(Clone)]
pub struct ServerConfig {
    pub users: UserStore,
    pub secret: EncodingKey,
    pub uploads: UploadLog,
}

impl ServerConfig {
    /// Server state seeded with [`DEMO_USERS`].
    pub fn new(jwt_secret: &str) -> Result<Self, bcrypt::BcryptError> {
        let users = UserStore::new();
        for (username, password) in DEMO_USERS {
            // fresh store, names are unique
            let _ = users.add_user(
                uuid::Uuid::new_v4().to_string(),
                username.to_string(),
                hash_password(password)?,
            );
        }
        Ok(Self {
            users,
            secret: EncodingKey::from_secret(jwt_secret.as_ref()),
            uploads: UploadLog::default(),
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct EnvVars {
    #[serde(alias = "LISTEN_ON")]
    #[serde(default = "listen_on_default")]
    pub listen_on: String,
    #[serde(alias = "JWT_SECRET")]
    #[serde(default = "jwt_secret_default")]
    pub jwt_secret: String,
}

fn listen_on_default() -> String {
    "0.0.0.0:5000".to_string()
}

fn jwt_secret_default() -> String {
    "classify-stub-secret".to_string()
}

/// Record of the images received by `/api/image`.
#[derive(Clone, Default)]
pub struct UploadLog {
    inner: Arc<Mutex<UploadLogInner>>,
}

#[derive(Default)]
struct UploadLogInner {
    count: usize,
    last: Option<Vec<u8>>,
}

impl UploadLog {
    pub(crate) fn record(&self, bytes: &[u8]) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.count += 1;
        inner.last = Some(bytes.to_vec());
    }

    pub fn count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last
            .clone()
    }
}

pub fn router(server_config: ServerConfig) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/register", post(register))
        .route(
            "/api/image",
            post(classify_image).route_layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(server_config)
}

/// Serve [`router`] on an already bound listener until the task is dropped.
pub async fn serve(
    listener: tokio::net::TcpListener,
    server_config: ServerConfig,
) -> std::io::Result<()> {
    axum::serve(listener, router(server_config)).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let app = router(ServerConfig::new("secret").unwrap());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/image")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[test]
    fn env_defaults() {
        let vars: EnvVars = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(vars.listen_on, "0.0.0.0:5000");
        assert!(!vars.jwt_secret.is_empty());
    }
}
