/// Default application id keying the shared state row.
const DEFAULT_APP_ID: &str = "limited-use-spinner";

/// Runtime configuration describing how to reach the remote state table.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the REST gateway, without a trailing slash.
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Application id identifying this wheel's state row.
    pub app_id: String,
}

impl RestConfig {
    /// Construct a configuration from explicit URL and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            app_id: DEFAULT_APP_ID.to_string(),
        }
    }

    /// Override the application id.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        if !app_id.trim().is_empty() {
            self.app_id = app_id.trim().to_string();
        }
        self
    }

    /// Build a configuration from the environment.
    ///
    /// Returns `None` when remote sync is not configured; the application
    /// then runs against the local store only.
    pub fn from_env() -> Option<Self> {
        let base_url = non_empty_env("SYNC_REST_URL")?;
        let api_key = non_empty_env("SYNC_REST_KEY")?;

        let mut config = Self::new(base_url, api_key);
        if let Some(app_id) = non_empty_env("SYNC_APP_ID") {
            config = config.with_app_id(app_id);
        }
        Some(config)
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
