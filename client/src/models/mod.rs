pub mod api_models;

pub use api_models::{AuthResult, Credentials, ErrorBody, LoginResponse};
