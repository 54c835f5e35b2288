//! Recording transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::client::CachetClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

pub(crate) const BASE_URL: &str = "http://status.local/api/v1";

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(message.to_owned())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    /// Body of the last request parsed as JSON.
    pub(crate) fn last_body(&self) -> Value {
        let body = self.last_request().body.expect("last request had no body");
        serde_json::from_str(&body).unwrap()
    }

    /// `METHOD path` of the last request, with the base URL stripped.
    pub(crate) fn last_call(&self) -> String {
        let request = self.last_request();
        let path = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url).to_owned();
        format!("{} {path}", request.method)
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no response queued".to_owned())))
    }
}

pub(crate) fn mock_client() -> (CachetClient, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let client = CachetClient::with_transport(ClientConfig::new(BASE_URL, "secret"), transport.clone())
        .unwrap();
    (client, transport)
}
