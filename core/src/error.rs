//! Error types for the Cachet API client.
//!
//! # Design
//! Authentication and not-found failures get dedicated variants with fixed
//! messages because callers routinely branch on them. Other non-2xx responses
//! land in `Application` when the server explained itself through an `errors`
//! array, and in `Status` (carrying the reason phrase) when it did not.
//! Local pre-flight failures never reach the network and are reported as
//! `ValidationError` or `ConfigError`.

use thiserror::Error;

/// Errors returned by every `CachetClient` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 401.
    #[error("API Authentication is required and has failed")]
    Authentication,

    /// The server returned 404.
    #[error("Requested resource not found")]
    NotFound,

    /// A non-2xx response whose body carried a structured `errors` array.
    /// `message` holds the joined `"<title>: <detail>"` pairs.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// A non-2xx response without a usable error body.
    #[error("{reason}")]
    Status { status: u16, reason: String },

    /// The transport could not complete the round trip.
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body or payload did not have the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// Local validation failed before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// HTTP status behind this error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication => Some(401),
            Self::NotFound => Some(404),
            Self::Application { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A field value violated its entity's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid value {value} for field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("missing required field `{field}`")]
    Missing { field: &'static str },

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("expected a JSON object for {entity}, got {found}")]
    NotAnObject { entity: &'static str, found: &'static str },

    #[error("cannot build {entity}: {reason}")]
    Shape { entity: &'static str, reason: String },
}

/// Client configuration could not be used to build a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("api_url is required")]
    MissingApiUrl,

    #[error("api_token is required")]
    MissingApiToken,

    #[error("invalid api_url `{url}`: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}
