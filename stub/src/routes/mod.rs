pub mod image;
pub mod login;
pub mod register;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use crate::models::api_models::MessageResponse;

pub(crate) fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(MessageResponse::new(message))).into_response()
}
