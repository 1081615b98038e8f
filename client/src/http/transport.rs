//! The network layer behind [`ApiClient`](super::ApiClient).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::blob::FormData;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Serialized JSON. The caller sets the content type header.
    Json(Vec<u8>),
    /// Multipart form. The boundary header is added by the transport.
    Multipart(FormData),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn content_type(&self) -> Option<String> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Sends one request and returns the raw response. No retries, no caching.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `timeout` of `None` lets a request wait indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        let builder = match request.body {
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(&form)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn multipart_form(form: &FormData) -> Result<Form> {
    let mut multipart = Form::new();
    for part in form.parts() {
        let mut field = Part::bytes(part.blob.bytes().to_vec()).file_name(part.file_name.clone());
        if let Some(content_type) = part.blob.content_type() {
            field = field.mime_str(content_type)?;
        }
        multipart = multipart.part(part.name.clone(), field);
    }
    Ok(multipart)
}
