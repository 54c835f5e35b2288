//! The high-level client: one method per API operation.
//!
//! # Design
//! Every operation follows the same path: normalize the arguments (resolving
//! `IdOrEntity` targets and applying payload shaping), issue one request
//! through the `Dispatcher`, then map the envelope payload into entities.
//! Remote failures come back as `Err(ApiError)` and are also remembered in the
//! `last_error` slot. Argument errors are returned before anything is sent
//! and leave the slot alone.

use std::cell::RefCell;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ApiError, ConfigError, ValidationError};
use crate::http::{Transport, UreqTransport};
use crate::models::schema;
use crate::models::{Entity, IdOrEntity};
use crate::payload::Payload;

mod components;
mod groups;
mod incidents;
mod metrics;
mod subscribers;

/// Synchronous client for the Cachet API.
///
/// Each call performs one blocking round trip. The client is `Send` but not
/// `Sync`: the `last_error` slot is plain interior mutability, overwritten by
/// every failing call, and must not be shared between threads. Use one client
/// per thread instead.
#[derive(Debug)]
pub struct CachetClient {
    dispatcher: Dispatcher,
    last_error: RefCell<Option<String>>,
}

impl CachetClient {
    /// Build a client that talks HTTP through a default `UreqTransport`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            dispatcher: Dispatcher::new(&config, Box::new(transport)),
            last_error: RefCell::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    /// Message of the most recent failed remote call. Successful calls do not
    /// clear it.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// `true` when `GET /ping` succeeds.
    pub fn ping(&self) -> bool {
        self.track(self.dispatcher.get("/ping", &[]).into_result()).is_ok()
    }

    /// Raw payload of `GET /version`.
    pub fn version(&self) -> Result<Value, ApiError> {
        let data = self.dispatcher.get("/version", &[]).into_result().and_then(|data| {
            data.ok_or_else(|| ApiError::Decode("response carried no version".to_owned()))
        });
        self.track(data)
    }

    fn track<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(error) = &result {
            debug!(message = %error, "recording last error");
            *self.last_error.borrow_mut() = Some(error.to_string());
        }
        result
    }

    fn fetch_list<T: Entity>(
        &self,
        path: &str,
        filter: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let result = self.dispatcher.get(path, filter);
        self.track(result.into_result().and_then(decode_list))
    }

    fn fetch_one<T: Entity>(&self, path: &str) -> Result<T, ApiError> {
        let result = self.dispatcher.get(path, &[]);
        self.track(result.into_result().and_then(decode_one))
    }

    fn create<T: Entity>(&self, path: &str, body: Payload) -> Result<T, ApiError> {
        schema::validate(T::FIELDS, body.as_map(), true)?;
        let result = self.dispatcher.post(path, &body);
        self.track(result.into_result().and_then(decode_one))
    }

    fn replace<T: Entity>(&self, path: &str, body: Payload) -> Result<T, ApiError> {
        let result = self.dispatcher.put(path, &body);
        self.track(result.into_result().and_then(decode_one))
    }

    fn remove(&self, path: &str) -> Result<(), ApiError> {
        let result = self.dispatcher.delete(path);
        self.track(result.into_result().map(drop))
    }
}

fn decode_one<T: Entity>(data: Option<Value>) -> Result<T, ApiError> {
    let value = data.ok_or_else(|| ApiError::Decode(format!("response carried no {}", T::NAME)))?;
    T::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_list<T: Entity>(data: Option<Value>) -> Result<Vec<T>, ApiError> {
    match data {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| T::from_value(item).map_err(|e| ApiError::Decode(e.to_string())))
            .collect(),
        Some(other) => Err(ApiError::Decode(format!(
            "expected a list of {}, got {}",
            T::NAME,
            crate::models::json_kind(&other)
        ))),
    }
}

/// Resolve the `update_*` calling conventions into `(id, body)`.
///
/// An explicit payload wins and may be partial; without one the entity itself
/// is the body and must be complete.
fn resolve_update<T: Entity>(
    target: IdOrEntity<'_, T>,
    payload: Option<Payload>,
) -> Result<(u64, Payload), ValidationError> {
    let id = target.id()?;
    let (body, complete) = match (payload, target.entity()) {
        (Some(payload), _) => (payload, false),
        (None, Some(entity)) => (Payload::from(entity), true),
        (None, None) => return Err(ValidationError::Missing { field: "payload" }),
    };
    schema::validate(T::FIELDS, body.as_map(), complete)?;
    Ok((id, body))
}
