use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Versioned API prefix appended to the origin.
    pub prefix: String,
    /// Blanket per-request timeout.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub page_size: u32,
    pub max_page_size: u32,
    /// Hard cap on rendered column width before truncation.
    pub column_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub permission_policy: PermissionPolicy,
}

/// What to do when a CRUD verb has no permission key configured for a
/// non-superuser. The backend this client grew up against silently allowed
/// such verbs; that default is deliberately not preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    Deny,
    Allow,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SAAS_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("SAAS_API_PREFIX") {
            self.api.prefix = normalize_prefix(&v);
        }
        if let Ok(v) = env::var("SAAS_REQUEST_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        if let Ok(v) = env::var("SAAS_PAGE_SIZE") {
            self.ui.page_size = v.parse().unwrap_or(self.ui.page_size);
        }
        if let Ok(v) = env::var("SAAS_MAX_PAGE_SIZE") {
            self.ui.max_page_size = v.parse().unwrap_or(self.ui.max_page_size);
        }
        if let Ok(v) = env::var("SAAS_COLUMN_WIDTH") {
            self.ui.column_width = v.parse().unwrap_or(self.ui.column_width);
        }

        if let Ok(v) = env::var("SAAS_PERMISSION_POLICY") {
            self.security.permission_policy = match v.trim().to_ascii_lowercase().as_str() {
                "allow" => PermissionPolicy::Allow,
                _ => PermissionPolicy::Deny,
            };
        }

        self
    }

    fn defaults() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                prefix: "/api/v1".to_string(),
                timeout_secs: 30,
            },
            ui: UiConfig {
                page_size: 25,
                max_page_size: 100,
                column_width: 40,
            },
            security: SecurityConfig {
                permission_policy: PermissionPolicy::Deny,
            },
        }
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
