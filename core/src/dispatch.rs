//! Request building and execution.
//!
//! # Design
//! `Dispatcher` owns the base URL, the authentication headers and the
//! transport. Building a request is pure (`build`), executing it goes through
//! the `Transport`, and the response is handed to `response::classify`. The
//! four verb methods never return `Err`: every outcome, including transport
//! failures, comes back as an `ApiResult`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::payload::Payload;
use crate::response::{classify, ApiResult};

/// Header carrying the API token on every request.
pub const TOKEN_HEADER: &str = "X-Cachet-Token";

pub struct Dispatcher {
    base_url: String,
    auth_headers: Vec<(String, String)>,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// `config` is expected to have passed `ClientConfig::validate`.
    pub fn new(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        let mut auth_headers = vec![(TOKEN_HEADER.to_owned(), config.api_token.clone())];
        if let Some(auth) = &config.basic_auth {
            let credentials = STANDARD.encode(format!("{}:{}", auth.user, auth.password));
            auth_headers.push(("Authorization".to_owned(), format!("Basic {credentials}")));
        }
        Self {
            base_url: config.base_url().to_owned(),
            auth_headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> ApiResult {
        self.dispatch(HttpMethod::Get, path, query, None)
    }

    pub fn post(&self, path: &str, payload: &Payload) -> ApiResult {
        self.dispatch(HttpMethod::Post, path, &[], Some(payload))
    }

    pub fn put(&self, path: &str, payload: &Payload) -> ApiResult {
        self.dispatch(HttpMethod::Put, path, &[], Some(payload))
    }

    pub fn delete(&self, path: &str) -> ApiResult {
        self.dispatch(HttpMethod::Delete, path, &[], None)
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<&Payload>,
    ) -> ApiResult {
        let request = match self.build(method, path, query, payload) {
            Ok(request) => request,
            Err(e) => return ApiResult::failure(e),
        };
        debug!(method = %request.method, url = %request.url, "dispatching request");

        let result = match self.transport.execute(&request) {
            Ok(response) => classify(&response),
            Err(e) => ApiResult::failure(e),
        };
        if let Some(error) = result.error() {
            warn!(
                method = %request.method,
                url = %request.url,
                status = ?error.status(),
                message = %error,
                "request failed"
            );
        }
        result
    }

    /// Assemble the request without executing it.
    pub fn build(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<&Payload>,
    ) -> Result<HttpRequest, ApiError> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }

        let mut headers = self.auth_headers.clone();
        let body = match payload {
            Some(payload) => {
                headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
                let body = serde_json::to_string(payload.as_map())
                    .map_err(|e| ApiError::Encode(e.to_string()))?;
                Some(body)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::testing::MockTransport;

    fn dispatcher(config: ClientConfig) -> (Dispatcher, std::sync::Arc<MockTransport>) {
        let transport = MockTransport::new();
        (Dispatcher::new(&config, Box::new(transport.clone())), transport)
    }

    fn config() -> ClientConfig {
        ClientConfig::new("http://status.local/api/v1/", "secret")
    }

    #[test]
    fn get_builds_url_and_token_header() {
        let (dispatcher, transport) = dispatcher(config());
        transport.respond(200, r#"{"data":[]}"#);

        let result = dispatcher.get("/components", &[]);
        assert!(result.is_ok());

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://status.local/api/v1/components");
        assert_eq!(request.header(TOKEN_HEADER), Some("secret"));
        assert_eq!(request.header("authorization"), None);
        assert!(request.body.is_none());
    }

    #[test]
    fn get_encodes_query_pairs() {
        let (dispatcher, transport) = dispatcher(config());
        transport.respond(200, r#"{"data":[]}"#);

        dispatcher.get("/incidents", &[("status", "2"), ("name", "db down & out")]);
        assert_eq!(
            transport.last_request().url,
            "http://status.local/api/v1/incidents?status=2&name=db+down+%26+out"
        );
    }

    #[test]
    fn basic_auth_is_added_alongside_token() {
        let (dispatcher, transport) = dispatcher(config().with_basic_auth("ops", "hunter2"));
        transport.respond(200, "");

        dispatcher.delete("/components/1");
        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.header(TOKEN_HEADER), Some("secret"));
        // base64("ops:hunter2")
        assert_eq!(request.header("Authorization"), Some("Basic b3BzOmh1bnRlcjI="));
    }

    #[test]
    fn writes_send_json_bodies() {
        let (dispatcher, transport) = dispatcher(config());
        transport.respond(200, r#"{"data":{"id":1,"name":"API"}}"#);
        transport.respond(200, r#"{"data":{"id":1,"name":"Web"}}"#);

        let payload = Payload::new().insert("name", "API");
        let result = dispatcher.post("/components", &payload);
        assert_eq!(result.data(), Some(&json!({"id": 1, "name": "API"})));

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "API"}));

        dispatcher.put("/components/1", &Payload::new().insert("name", "Web"));
        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, "http://status.local/api/v1/components/1");
    }

    #[test]
    fn transport_failure_becomes_failed_result() {
        let (dispatcher, transport) = dispatcher(config());
        transport.fail("connection refused");

        let result = dispatcher.get("/ping", &[]);
        assert!(!result.is_ok());
        assert_eq!(result.message().as_deref(), Some("connection refused"));
    }

    #[test]
    fn http_failures_never_escape_as_panics() {
        let (dispatcher, transport) = dispatcher(config());
        transport.respond(401, "");
        transport.respond(404, "");
        transport.respond(400, r#"{"errors":[{"title":"Bad","detail":"x required"}]}"#);

        assert_eq!(dispatcher.get("/components", &[]).error(), Some(&ApiError::Authentication));
        assert_eq!(dispatcher.get("/components/9", &[]).error(), Some(&ApiError::NotFound));
        assert_eq!(
            dispatcher.post("/components", &Payload::new()).message().as_deref(),
            Some("Bad: x required")
        );
    }
}
