//! Session and tenant context.
//!
//! Exactly one company (tenant) is active at a time. All reads and writes go
//! through [`SessionStore`], injected where needed, so the active tenant is
//! never ambient global state.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_superuser: bool,
    /// Backend permission codenames, e.g. `leads.delete_lead`.
    #[serde(default)]
    pub permissions: Vec<String>,
    pub company: Option<Company>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.iter().any(|p| p == key)
    }
}

/// The locally persisted authentication + tenant state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    /// Slug of the active company.
    pub company: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_superuser(&self) -> bool {
        self.user.as_ref().map(|u| u.is_superuser).unwrap_or(false)
    }

    pub fn active_company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Whether this session may activate the given company slug. Superusers
    /// may switch to any company; everyone else is pinned to their own.
    pub fn may_activate(&self, slug: &str) -> bool {
        if self.is_superuser() {
            return true;
        }
        self.user
            .as_ref()
            .and_then(|u| u.company.as_ref())
            .map(|c| c.slug == slug)
            .unwrap_or(false)
    }
}

/// Company slugs travel in a request header; only lowercase letters, digits
/// and hyphens are accepted, matching the backend's middleware.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Normalize a header-bound slug: trim whitespace, reject invalid formats.
pub fn normalize_slug(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if is_valid_slug(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Persistence seam for the session. The console uses [`FileSessionStore`];
/// tests use [`MemorySessionStore`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Session>;
    fn save(&self, session: &Session) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// JSON-file-backed store under the user's config directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { dir: get_config_dir()? })
    }

    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn session_file(&self) -> PathBuf {
        self.dir.join("session.json")
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> anyhow::Result<Session> {
        let session_file = self.session_file();
        if !session_file.exists() {
            return Ok(Session::default());
        }

        let content = fs::read_to_string(session_file)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(session)
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(self.session_file(), content)?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        let session_file = self.session_file();
        if session_file.exists() {
            fs::remove_file(session_file)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new(session: Session) -> Self {
        Self { session: Mutex::new(session) }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> anyhow::Result<Session> {
        Ok(self.session.lock().expect("session lock").clone())
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        *self.session.lock().expect("session lock") = session.clone();
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.session.lock().expect("session lock") = Session::default();
        Ok(())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TENANTCTL_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("tenantctl")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn default_true() -> bool {
    true
}
