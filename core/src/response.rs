//! The uniform outcome of one API call and the rules that produce it.
//!
//! # Design
//! `classify` is the only place that interprets status codes and bodies.
//! It never fails: every HTTP outcome, good or bad, becomes an `ApiResult`.

use http::StatusCode;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Success with an optional payload, or failure with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult {
    outcome: Result<Option<Value>, ApiError>,
}

impl ApiResult {
    pub fn success(data: Option<Value>) -> Self {
        Self { outcome: Ok(data) }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The envelope's `data` member, on success.
    pub fn data(&self) -> Option<&Value> {
        self.outcome.as_ref().ok().and_then(Option::as_ref)
    }

    /// Human-readable failure message, on failure.
    pub fn message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<Option<Value>, ApiError> {
        self.outcome
    }
}

impl From<ApiResult> for Result<Option<Value>, ApiError> {
    fn from(result: ApiResult) -> Self {
        result.into_result()
    }
}

/// Turn a raw response into an `ApiResult`.
pub fn classify(response: &HttpResponse) -> ApiResult {
    let status = response.status;
    let body = response.body.trim();

    if (200..300).contains(&status) {
        if body.is_empty() {
            return ApiResult::success(None);
        }
        return match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(mut envelope)) => ApiResult::success(envelope.remove("data")),
            Ok(_) => ApiResult::success(None),
            Err(e) => ApiResult::failure(ApiError::Decode(e.to_string())),
        };
    }

    let error = match status {
        401 => ApiError::Authentication,
        404 => ApiError::NotFound,
        _ => match error_details(body) {
            Some(message) => ApiError::Application { status, message },
            None => ApiError::Status {
                status,
                reason: reason_phrase(status).to_owned(),
            },
        },
    };
    ApiResult::failure(error)
}

/// `"<title>: <detail>"` for each entry of the body's `errors` array, joined
/// with `"; "`. An entry with only one of the two is rendered alone, one with
/// neither is skipped. `None` when nothing is left.
fn error_details(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let parsed: Value = serde_json::from_str(body).ok()?;
    let errors = parsed.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let entries: Vec<String> = errors
        .iter()
        .filter_map(|entry| {
            let part = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };
            match (part("title"), part("detail")) {
                (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
                (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
                (None, None) => None,
            }
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(entries.join("; "))
}

fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
}
