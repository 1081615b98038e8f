//! Client for the garbage-classification backend.
//!
//! Pages ([`pages`]) drive two widgets ([`widgets`]): an uploader that posts
//! a picked image to `/api/image`, and a display that renders the returned
//! classified image. Local images are exposed through [`object_url::ObjectUrl`]
//! handles that are released exactly once, when the last holder drops them.

pub mod blob;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod notify;
pub mod object_url;
pub mod pages;
pub mod router;
pub mod session;
pub mod widgets;

#[cfg(test)]
mod test_support;

pub use crate::config::ClientConfig;
pub use crate::error::{Error, Result, ValidationError};
pub use crate::http::ApiClient;
pub use crate::object_url::{ImageSource, ObjectUrl, ObjectUrlRegistry};
pub use crate::session::Session;
