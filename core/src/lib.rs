//! Synchronous client for the Cachet status-page REST API.
//!
//! # Overview
//! `CachetClient` exposes one method per API operation over components,
//! component groups, incidents, metrics, metric points and subscribers, plus
//! `ping` and `version`. Results are typed entities from [`models`].
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`).
//!   The `Dispatcher` builds requests and `classify` turns responses into an
//!   `ApiResult`; only a `Transport` touches the network.
//! - `UreqTransport` is the default transport. Anything implementing
//!   `Transport` can replace it.
//! - Entities validate their fields against a per-entity schema when built
//!   from JSON, so a value that does not fit the API is rejected locally.
//! - Payload shaping strips fields the server refuses on write (component
//!   `tags`, orphan incident `component_id`, incident `created_at`).
//! - Entity types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod models;
pub mod payload;
pub mod response;

#[cfg(test)]
mod testing;

pub use client::CachetClient;
pub use config::{BasicAuth, ClientConfig};
pub use error::{ApiError, ConfigError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use models::{Entity, IdOrEntity};
pub use payload::Payload;
pub use response::{classify, ApiResult};
