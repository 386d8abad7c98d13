//! Configuration system (layered: code > env).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<PodforgeConfig> = OnceLock::new();

/// Layered configuration for Podforge.
///
/// API keys and base URLs are keyed by provider name ("openai"). Explicit
/// setters win over values loaded from the environment.
#[derive(Clone)]
pub struct PodforgeConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl fmt::Debug for PodforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodforgeConfig")
            .field("api_keys", &"..")
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

impl Default for PodforgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PodforgeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self {
            api_keys: Arc::new(RwLock::new(HashMap::new())),
            base_urls: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self::new();

        let env_mappings = [("OPENAI_API_KEY", "openai")];
        for (env_var, provider) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        let base_url_mappings = [("PODFORGE_OPENAI_BASE_URL", "openai")];
        for (env_var, provider) in &base_url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        config
    }

    /// The process-wide default config, initialized from env on first use.
    pub fn global() -> &'static PodforgeConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_api_key(&self, provider: &str, key: impl Into<String>) {
        self.api_keys
            .write()
            .expect("config lock poisoned")
            .insert(provider.to_string(), key.into());
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .read()
            .expect("config lock poisoned")
            .get(provider)
            .cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: impl Into<String>) {
        self.base_urls
            .write()
            .expect("config lock poisoned")
            .insert(provider.to_string(), url.into());
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls
            .read()
            .expect("config lock poisoned")
            .get(provider)
            .cloned()
    }
}
