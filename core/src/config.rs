//! Client construction settings.

use std::fmt;

use serde::Deserialize;

use crate::error::ConfigError;

const ENV_API_URL: &str = "CACHET_API_URL";
const ENV_API_TOKEN: &str = "CACHET_API_TOKEN";
const ENV_BASIC_AUTH_USER: &str = "CACHET_BASIC_AUTH_USER";
const ENV_BASIC_AUTH_PASSWORD: &str = "CACHET_BASIC_AUTH_PASSWORD";

/// Credentials sent as an `Authorization: Basic` header on every request.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the API lives and how to authenticate against it.
///
/// `api_url` includes the version prefix, e.g. `https://status.example.com/api/v1`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_token: String,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("basic_auth", &self.basic_auth)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            basic_auth: None,
        }
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Read `CACHET_API_URL`, `CACHET_API_TOKEN` and, when both are set,
    /// `CACHET_BASIC_AUTH_USER` / `CACHET_BASIC_AUTH_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL).ok_or(ConfigError::MissingEnv(ENV_API_URL))?;
        let api_token = lookup(ENV_API_TOKEN).ok_or(ConfigError::MissingEnv(ENV_API_TOKEN))?;
        let mut config = Self::new(api_url, api_token);
        if let (Some(user), Some(password)) =
            (lookup(ENV_BASIC_AUTH_USER), lookup(ENV_BASIC_AUTH_PASSWORD))
        {
            config = config.with_basic_auth(user, password);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingApiToken);
        }
        url::Url::parse(self.api_url.trim()).map_err(|e| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// `api_url` without surrounding whitespace or trailing slashes.
    pub(crate) fn base_url(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }
}
