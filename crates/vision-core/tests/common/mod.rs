//! Shared test helpers: a transport that records what the client sends and
//! answers from a queue of canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vision_core::api::{ApiClient, PreparedRequest, RawResponse, Transport, TransportError};
use vision_core::auth::{SessionEvent, SessionStore};

pub const BASE_URL: &str = "http://api.test/api";

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<PreparedRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body)));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Other(message.to_string())));
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> PreparedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
    }
}

pub fn client() -> ApiClient<RecordingTransport> {
    ApiClient::with_transport(BASE_URL, RecordingTransport::new(), Arc::new(SessionStore::in_memory()))
}

pub fn logged_in_client(token: &str) -> ApiClient<RecordingTransport> {
    let client = client();
    client.session().set_token(token).unwrap();
    client
}

/// Collect every session event the client emits.
pub fn record_events<T: Transport>(client: &ApiClient<T>) -> Arc<Mutex<Vec<SessionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    client.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

pub fn header<'a>(request: &'a PreparedRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
