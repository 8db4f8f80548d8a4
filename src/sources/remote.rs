//! Remote HTTP/HTTPS configuration source.

use super::ConfigSource;
use crate::error::{ConfigError, Result};
use crate::value::{Map, Value};
use reqwest::{Client, header::HeaderValue};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Authentication method for HTTP requests.
#[derive(Clone)]
pub enum HttpAuth {
    /// No authentication
    None,
    /// Bearer token authentication
    Bearer(String),
    /// Basic authentication (username, password)
    Basic(String, String),
}

/// HTTP-based configuration source.
///
/// Fetches a JSON document whose root is an object. The last tree fetched
/// successfully is kept and served again when a later request fails.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::sources::HttpSource;
/// use std::time::Duration;
///
/// # fn example() -> tierconf::error::Result<()> {
/// let source = HttpSource::builder()
///     .with_url("https://config.example.com/api/config")
///     .with_auth_token("secret-token")
///     .with_timeout(Duration::from_secs(10))
///     .with_priority(250)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HttpSource {
    url: String,
    client: Client,
    auth: HttpAuth,
    priority: i32,
    last_known_good: Arc<RwLock<Option<Map>>>,
}

impl HttpSource {
    /// Create a new builder for constructing an HTTP source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::new()
    }

    async fn fetch(&self) -> Result<Map> {
        let mut request = self.client.get(&self.url);

        request = match &self.auth {
            HttpAuth::None => request,
            HttpAuth::Bearer(token) => {
                let header_value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ConfigError::LoadError(format!("Invalid bearer token: {}", e)))?;
                request.header("Authorization", header_value)
            }
            HttpAuth::Basic(username, password) => request.basic_auth(username, Some(password)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ConfigError::LoadError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::LoadError(format!(
                "HTTP request failed with status {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let document: Value = response.json().await.map_err(|e| {
            ConfigError::DeserializationError(format!("Failed to parse JSON: {}", e))
        })?;

        root_mapping(document)
    }

    /// Drive [`HttpSource::fetch`] to completion from synchronous code.
    ///
    /// Inside a runtime the request runs on a scoped thread with its own
    /// current-thread runtime, so any runtime flavour can call `load`.
    fn fetch_blocking(&self) -> Result<Map> {
        let run = || -> Result<Map> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| ConfigError::LoadError(format!("Failed to create runtime: {}", e)))?;
            runtime.block_on(self.fetch())
        };

        if tokio::runtime::Handle::try_current().is_err() {
            return run();
        }

        std::thread::scope(|scope| scope.spawn(run).join())
            .map_err(|_| ConfigError::LoadError("HTTP fetch thread panicked".to_string()))?
    }

    fn cached(&self) -> Option<Map> {
        self.last_known_good
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn remember(&self, tree: &Map) {
        let mut guard = self
            .last_known_good
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(tree.clone());
    }
}

impl ConfigSource for HttpSource {
    fn load(&self) -> Result<Map> {
        match self.fetch_blocking() {
            Ok(tree) => {
                debug!(url = %self.url, keys = tree.len(), "fetched remote configuration");
                self.remember(&tree);
                Ok(tree)
            }
            Err(err) => match self.cached() {
                Some(tree) => {
                    warn!(url = %self.url, error = %err, "remote fetch failed, serving last known good configuration");
                    Ok(tree)
                }
                None => Err(err),
            },
        }
    }

    fn name(&self) -> String {
        format!("http:{}", self.url)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Builder for constructing an `HttpSource`.
pub struct HttpSourceBuilder {
    url: Option<String>,
    auth: HttpAuth,
    timeout: Duration,
    priority: i32,
}

impl HttpSourceBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: None,
            auth: HttpAuth::None,
            timeout: Duration::from_secs(10),
            priority: 250,
        }
    }

    /// Set the URL to fetch configuration from.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set Bearer token authentication.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth = HttpAuth::Bearer(token.into());
        self
    }

    /// Set Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = HttpAuth::Basic(username.into(), password.into());
        self
    }

    /// Set the request timeout. Default is 10 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the priority for this source.
    ///
    /// Default is 250 (higher than files, lower than environment variables).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Build the HTTP source.
    ///
    /// # Errors
    ///
    /// Returns an error if no URL is provided or the HTTP client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpSource> {
        let url = self
            .url
            .ok_or_else(|| ConfigError::LoadError("URL is required for HttpSource".to_string()))?;

        // Each load may run on a fresh runtime; pooled connections would not
        // outlive it.
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ConfigError::LoadError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpSource {
            url,
            client,
            auth: self.auth,
            priority: self.priority,
            last_known_good: Arc::new(RwLock::new(None)),
        })
    }
}

impl Default for HttpSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn root_mapping(document: Value) -> Result<Map> {
    match document {
        Value::Mapping(tree) => Ok(tree),
        other => Err(ConfigError::DeserializationError(format!(
            "Expected JSON object at root level, found {}",
            other.type_name()
        ))),
    }
}
