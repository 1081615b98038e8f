use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use log::{error, info};

use super::message;
use crate::{
    models::api_models::{CredentialsRequest, LoginResponse},
    utils::jwt::generate_jwt_token,
    ServerConfig,
};

pub async fn login(
    State(server_config): State<ServerConfig>,
    Json(login_request): Json<CredentialsRequest>,
) -> Response {
    if !login_request.is_complete() {
        return message(StatusCode::BAD_REQUEST, "Username and password are required!");
    }

    let Some(user) = server_config.users.get_user(&login_request.username) else {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials!");
    };

    let matched = match bcrypt::verify(&login_request.password, &user.password) {
        Ok(matched) => matched,
        Err(err) => {
            error!("password check failed for {}: {err}", user.username);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Password check failed");
        }
    };
    if !matched {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials!");
    }

    match generate_jwt_token(&server_config.secret, &user.username) {
        Ok(token) => {
            info!("{} logged in", user.username);
            (StatusCode::OK, Json(LoginResponse { token })).into_response()
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

    async fn post_login(body: Value) -> (StatusCode, Value) {
        let app = router(ServerConfig::new("secret").unwrap());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn demo_user_receives_token() {
        let (status, body) = post_login(json!({ "username": "user1", "password": "123" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (status, body) = post_login(json!({ "username": "user1", "password": "456" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials!");
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, body) = post_login(json!({ "username": "user1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username and password are required!");
    }
}
