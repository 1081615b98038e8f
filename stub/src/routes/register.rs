use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use log::{error, info};

use super::message;
use crate::{
    models::api_models::CredentialsRequest, users::hash_password, utils::jwt::generate_jwt_token,
    AddUserError, ServerConfig,
};

/// Create an account and answer with a bare JSON string token.
pub async fn register(
    State(server_config): State<ServerConfig>,
    Json(register_request): Json<CredentialsRequest>,
) -> Response {
    if !register_request.is_complete() {
        return message(StatusCode::BAD_REQUEST, "Username and password are required!");
    }

    let uuid = uuid::Uuid::new_v4();

    let password_hashed = match hash_password(&register_request.password) {
        Ok(pw) => pw,
        Err(err) => {
            error!("hashing failed: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    if let Err(AddUserError::AlreadyExists) = server_config.users.add_user(
        uuid.to_string(),
        register_request.username.clone(),
        password_hashed,
    ) {
        return message(
            StatusCode::CONFLICT,
            "A user with that username already exists",
        );
    }

    match generate_jwt_token(&server_config.secret, &register_request.username) {
        Ok(token) => {
            info!("registered {}", register_request.username);
            (StatusCode::OK, Json(token)).into_response()
        }
        Err(err) => {
            error!("token generation failed: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error generating JWT token")
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::router;

    fn request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn new_user_gets_bare_token_and_can_log_in() {
        let config = ServerConfig::new("secret").unwrap();
        let app = router(config.clone());

        let response = app
            .oneshot(request(json!({ "username": "carol", "password": "pw" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.is_string());
        let stored = config.users.get_user("carol").unwrap();
        assert!(bcrypt::verify("pw", &stored.password).unwrap());
    }

    #[tokio::test]
    async fn existing_user_conflicts() {
        let app = router(ServerConfig::new("secret").unwrap());

        let response = app
            .oneshot(request(json!({ "username": "user1", "password": "x" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
