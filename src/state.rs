use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::config::Config;
use crate::error::ClientError;
use crate::models::Role;
use crate::utils::api::ApiClient;
use crate::utils::calendar::LayoutOptions;

/// Who is logged in, as established by the last successful `login`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn load(path: &Path) -> Option<Session> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write session file {}", path.display()))
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove session file {}", path.display()))?;
        }
        Ok(())
    }
}

// Everything a handler needs, passed explicitly instead of living in globals.
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.api_url.clone()).context("Failed to build the client")?;
        let session = Session::load(&config.session_file);
        match &session {
            Some(s) => info!("Resuming session for {} ({})", s.username, s.role),
            None => info!("No active session"),
        }
        Ok(Self { config, api, session })
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions { split_overlaps: self.config.split_overlaps, ..LayoutOptions::default() }
    }

    pub fn require_role(&self, required: Role) -> Result<&Session, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotLoggedIn)?;
        if session.role != required {
            return Err(ClientError::WrongRole { required, actual: session.role });
        }
        Ok(session)
    }
}

#[cfg(test)]
pub(crate) fn test_config(dir: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.session_file = dir.join("session.json");
    config.preferences_file = dir.join("preferences.json");
    config.calendar_out = dir.join("calendar.html");
    config
}
