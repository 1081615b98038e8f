//! Scripted transport and fixtures for unit tests.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use tokio::sync::Notify;

use crate::blob::{Blob, SelectedFile};
use crate::error::{Error, Result};
use crate::http::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::notify::MemoryNotifier;
use crate::object_url::ObjectUrlRegistry;
use crate::pages::AppContext;
use crate::router::History;
use crate::session::Session;

#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<ApiResponse>>,
    gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests wait for a `notify_one` on the returned handle before answering.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: Some(gate.clone()),
                ..Self::default()
            },
            gate,
        )
    }

    pub fn respond(&self, response: ApiResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn respond_json(&self, status: StatusCode, body: serde_json::Value) -> &Self {
        let mut response = ApiResponse::new(status, serde_json::to_vec(&body).unwrap());
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.respond(response)
    }

    pub fn respond_image(&self, bytes: Vec<u8>) -> &Self {
        let mut response = ApiResponse::new(StatusCode::OK, bytes);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        self.respond(response)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::invalid_response("no scripted response"))
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub session: Session,
    pub registry: ObjectUrlRegistry,
    pub notifier: MemoryNotifier,
    pub history: History,
    pub ctx: AppContext,
}

impl Harness {
    pub fn new(transport: FakeTransport) -> Self {
        let transport = Arc::new(transport);
        let session = Session::in_memory();
        let registry = ObjectUrlRegistry::new("test");
        let notifier = MemoryNotifier::new();
        let history = History::default();
        let api = ApiClient::with_transport("http://backend.test", transport.clone(), session.clone());
        let ctx = AppContext::new(
            api,
            registry.clone(),
            Arc::new(notifier.clone()),
            Arc::new(history.clone()),
        );
        Self {
            transport,
            session,
            registry,
            notifier,
            history,
            ctx,
        }
    }
}

/// A small but real PNG.
pub fn png_bytes(seed: u8) -> Vec<u8> {
    let image = image::RgbImage::from_fn(8, 8, |x, y| {
        image::Rgb([seed, x as u8 * 16, y as u8 * 16])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn picked(name: &str, seed: u8) -> SelectedFile {
    SelectedFile::new(
        name,
        Blob::new(png_bytes(seed), Some("image/png".to_string())),
    )
}
