//! API client for the listing backend.
//!
//! `ApiClient` is the request executor: it resolves URLs, attaches the
//! bearer token from the `SessionStore`, sends through a `Transport`, and maps
//! responses to `ApiError`. Auth and resource operations live in sibling
//! modules as further `impl` blocks.

use std::sync::{Arc, RwLock};

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use super::request::{ApiRequest, PreparedRequest, RequestBody};
use super::transport::{HttpTransport, Transport};
use crate::auth::{SessionEvent, SessionListener, SessionStore};
use crate::config::Config;

/// Session-aware client. Shared by reference; every method takes `&self`.
pub struct ApiClient<T: Transport = HttpTransport> {
    base_url: String,
    transport: T,
    session: Arc<SessionStore>,
    listeners: RwLock<Vec<SessionListener>>,
}

impl ApiClient<HttpTransport> {
    /// Create a client for `base_url` (origin plus `/api`) with no request timeout
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> ApiResult<Self> {
        let transport = HttpTransport::new(None)?;
        Ok(Self::with_transport(base_url, transport, session))
    }

    pub fn from_config(config: &Config, session: Arc<SessionStore>) -> ApiResult<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config.api_url(), transport, session))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(
        base_url: impl Into<String>,
        transport: T,
        session: Arc<SessionStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            session,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_handle(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register a listener for session lifecycle events.
    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(listener));
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        debug!(?event, "Session event");
        // Clone out so a listener may subscribe without deadlocking
        let listeners: Vec<SessionListener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Resolve the final URL and headers for a request.
    pub fn prepare(&self, request: ApiRequest) -> ApiResult<PreparedRequest> {
        let raw_url = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid URL {}: {}", raw_url, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.pairs());
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if matches!(request.body, RequestBody::Json(_)) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if request.auth {
            if let Some(token) = self.session.token() {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| ApiError::InvalidRequest("Stored token is not a valid header value".to_string()))?;
                headers.insert(header::AUTHORIZATION, value);
            }
        }

        if let RequestBody::Multipart(form) = &request.body {
            form.validate()?;
        }

        let is_multipart = matches!(request.body, RequestBody::Multipart(_));
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidRequest(format!("Invalid header name: {}", name)))?;
            if is_multipart && name == header::CONTENT_TYPE {
                debug!("Ignoring caller content type on multipart request");
                continue;
            }
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::InvalidRequest(format!("Invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body: request.body,
        })
    }

    /// Send a request once and return the body of a 2xx response.
    async fn execute(&self, request: ApiRequest) -> ApiResult<String> {
        let endpoint = request.path.clone();
        let method = request.method.clone();
        let auth = request.auth;
        let prepared = self.prepare(request)?;

        debug!(%method, endpoint = %endpoint, auth, "Sending API request");

        let response = match self.transport.send(prepared).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, endpoint = %endpoint, error = %e, "API request failed to reach backend");
                return Err(e.into());
            }
        };

        if response.is_success() {
            debug!(%method, endpoint = %endpoint, status = response.status, "API request succeeded");
            return Ok(response.body);
        }

        if response.status == 401 && auth {
            warn!(%method, endpoint = %endpoint, "Backend rejected session token, clearing session");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear session");
            }
            self.emit(SessionEvent::Expired { endpoint });
            return Err(ApiError::SessionExpired);
        }

        debug!(
            %method,
            endpoint = %endpoint,
            status = response.status,
            body = %ApiError::truncate_body(&response.body),
            "API request rejected"
        );
        Err(ApiError::from_status(response.status, &response.body))
    }

    /// Send a request and decode the JSON body.
    ///
    /// An empty 2xx body decodes as `{}`.
    pub async fn request<R: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<R> {
        let body = self.execute(request).await?;
        let text = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| {
            debug!(error = %e, body = %ApiError::truncate_body(&body), "Failed to decode response");
            ApiError::MalformedResponse(e.to_string())
        })
    }
}
