//! Session and navigation collaborators
//!
//! The browser-era implementation reached for a global token store and
//! `window.location`; both are injected here so the orchestrator and API
//! client can run without a browser environment.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::CoreError;

/// Storage for the signed-in user's bearer token.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn store_token(&self, token: &str) -> Result<(), CoreError>;
    fn clear(&self);
}

/// Redirect seam. The UI shell decides what navigating actually means.
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Get the path to the auth token storage file
fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scorelift")
        .join("auth.token")
}

/// Token store persisted under the user's config directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new() -> Self {
        Self { path: default_token_path() }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn store_token(&self, token: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::Session(e.to_string()))?;
        }
        fs::write(&self.path, token).map_err(|e| CoreError::Session(e.to_string()))
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// In-memory store for tests and embedded shells.
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())) }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn store_token(&self, token: &str) -> Result<(), CoreError> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }
}
