//! API endpoint configuration.
//!
//! Values come from the environment first, then fall back to defaults picked
//! by the host the client runs against.

/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "SOUTHMAIN_API_BASE";
/// Environment variable holding the storage (Supabase) project URL
pub const STORAGE_URL_ENV: &str = "SOUTHMAIN_SUPABASE_URL";
/// Environment variable holding the storage (Supabase) anon key
pub const STORAGE_KEY_ENV: &str = "SOUTHMAIN_SUPABASE_ANON_KEY";

/// API base used when running against a local backend
pub const LOCAL_API_BASE: &str = "http://localhost:3000";
/// API base used everywhere else
pub const PRODUCTION_API_BASE: &str = "https://api.southmain.app";

/// Object storage credentials used for voice drop uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Resolved endpoint configuration shared by every HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the chat backend, without a trailing slash
    pub api_base: String,
    /// Storage credentials, if configured
    pub storage: Option<StorageConfig>,
}

impl ApiConfig {
    /// Create a configuration pointing at the given API base, without storage.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: normalize_base(api_base.into()),
            storage: None,
        }
    }

    /// Attach storage credentials.
    pub fn with_storage(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.storage = Some(StorageConfig {
            url: normalize_base(url.into()),
            anon_key: anon_key.into(),
        });
        self
    }

    /// Resolve the configuration from the process environment.
    ///
    /// # Arguments
    ///
    /// * `host` - Host name the client is served from, if known
    pub fn from_env(host: Option<&str>) -> Self {
        Self::from_lookup(host, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration using an arbitrary variable lookup.
    pub fn from_lookup<F>(host: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base = non_empty(API_BASE_ENV).unwrap_or_else(|| default_api_base(host).to_string());

        let mut config = Self::new(api_base);
        if let (Some(url), Some(key)) = (non_empty(STORAGE_URL_ENV), non_empty(STORAGE_KEY_ENV)) {
            config = config.with_storage(url, key);
        }
        config
    }

    /// Join a path onto the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

/// Pick the default API base for a host.
///
/// A missing host is treated as a local run.
pub fn default_api_base(host: Option<&str>) -> &'static str {
    match host {
        None | Some("localhost") => LOCAL_API_BASE,
        Some(_) => PRODUCTION_API_BASE,
    }
}

fn normalize_base(value: String) -> String {
    value.trim().trim_end_matches('/').to_string()
}
