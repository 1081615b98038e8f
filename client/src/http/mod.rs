//! Outbound request helpers: JSON calls and binary image uploads.

pub mod transport;

use std::sync::Arc;

use headers::{authorization::Bearer, Authorization, ContentType, HeaderMapExt};
use http::{HeaderMap, Method, StatusCode};
use log::debug;
use serde::Serialize;
use serde_json::Value;

pub use transport::{ApiRequest, ApiResponse, RequestBody, ReqwestTransport, Transport};

use crate::blob::{Blob, FormData};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::ErrorBody;
use crate::session::Session;

/// Error statuses whose JSON body carries a `message` for the user.
pub const RECOGNIZED_ERROR_STATUSES: [StatusCode; 5] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::CONFLICT,
    StatusCode::INTERNAL_SERVER_ERROR,
];

/// Whether a JSON call carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Required,
    Anonymous,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    session: Session,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl ApiClient {
    /// Client over reqwest, configured from `config`.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(
            config.base_url.as_str(),
            Arc::new(transport),
            session,
        ))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: Session,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` as JSON and parse the JSON answer.
    ///
    /// With [`Auth::Required`] and no stored token this fails with
    /// [`Error::AuthRequired`] before anything is sent.
    pub async fn post_json<B>(&self, path: &str, body: &B, auth: Auth) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.typed_insert(ContentType::json());
        if auth == Auth::Required {
            let token = self.session.token()?.ok_or(Error::AuthRequired)?;
            let bearer: Authorization<Bearer> =
                Authorization::bearer(&token).map_err(|_| Error::InvalidToken)?;
            headers.typed_insert(bearer);
        }

        let request = ApiRequest {
            method: Method::POST,
            url: self.url(path),
            headers,
            body: RequestBody::Json(serde_json::to_vec(body)?),
        };
        debug!("POST {} (json, auth: {:?})", request.url, auth);

        let response = self.transport.send(request).await?;
        check_status(&response)?;
        response.json()
    }

    /// POST a multipart form and return the binary answer.
    ///
    /// No credential is attached and the transport picks the multipart
    /// boundary. Whether the answer is an image is left to the caller.
    pub async fn post_form(&self, path: &str, form: FormData) -> Result<Blob> {
        let request = ApiRequest {
            method: Method::POST,
            url: self.url(path),
            headers: HeaderMap::new(),
            body: RequestBody::Multipart(form),
        };
        debug!("POST {} (multipart)", request.url);

        let response = self.transport.send(request).await?;
        check_status(&response)?;
        let content_type = response.content_type();
        Ok(Blob::new(response.body, content_type))
    }
}

/// Map every non-2xx status to an error.
pub(crate) fn check_status(response: &ApiResponse) -> Result<()> {
    let status = response.status;
    if status.is_success() {
        return Ok(());
    }
    if RECOGNIZED_ERROR_STATUSES.contains(&status) {
        let message = match serde_json::from_slice::<ErrorBody>(&response.body) {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        return Err(Error::ServerRejected { status, message });
    }
    Err(Error::UnexpectedStatus { status })
}
