//! Client configuration.

/// Default PostHog host (US Cloud).
pub const DEFAULT_HOST: &str = "https://us.i.posthog.com";

/// Environment variable holding the project API key.
pub const API_KEY_ENV: &str = "POSTHOG_API_KEY";

/// Environment variable holding the PostHog host URL.
pub const HOST_ENV: &str = "POSTHOG_HOST";

/// PostHog tracking configuration.
///
/// Resolved once when the client is built and never changed afterwards.
/// An empty API key is valid and disables tracking.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) api_key: String,
    pub(crate) host: String,
}

impl Config {
    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the host URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether an API key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Builder for the PostHog client.
///
/// Each field resolves as: explicit value, then environment variable,
/// then default.
#[derive(Debug, Default)]
pub struct PostHogBuilder {
    api_key: Option<String>,
    host: Option<String>,
}

impl PostHogBuilder {
    /// Create a new builder with nothing set explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the host URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Build the configuration from the process environment.
    pub(crate) fn build_config(self) -> Config {
        self.build_config_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn build_config_with<F>(self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            api_key: self
                .api_key
                .or_else(|| lookup(API_KEY_ENV))
                .unwrap_or_default(),
            host: self
                .host
                .or_else(|| lookup(HOST_ENV))
                .unwrap_or_else(|| DEFAULT_HOST.into()),
        }
    }
}
