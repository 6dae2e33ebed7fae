//! Per-server credentials stored outside the project.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::context::ServerCredentials;
use crate::error::{DeployError, DeployResult};

use super::parser::parse_toml;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for ServerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerEntry")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Contents of `settings.toml`: `[servers.<id>]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub servers: HashMap<String, ServerEntry>,
}

impl Settings {
    /// Load settings, treating a missing file as empty.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        parse_toml(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn with_server(mut self, id: impl Into<String>, entry: ServerEntry) -> Self {
        self.servers.insert(id.into(), entry);
        self
    }

    /// Credentials for `server_id`.
    ///
    /// An explicit username replaces the stored entry (creating one when
    /// missing); an explicit password replaces the stored password. Without
    /// an entry or a username override this is a configuration error.
    /// Blank values are rejected later, when the client connects.
    pub fn resolve_credentials(
        &self,
        server_id: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> DeployResult<ServerCredentials> {
        let mut entry = self.servers.get(server_id).cloned();

        if let Some(username) = username {
            info!(username, "Using username and password from parameters");
            let current = entry.get_or_insert_with(ServerEntry::default);
            current.username = Some(username.to_string());
            if let Some(password) = password {
                current.password = Some(password.to_string());
            }
        }

        let Some(entry) = entry else {
            let message = missing_server_message(server_id);
            error!("{message}");
            return Err(DeployError::configuration(message));
        };

        Ok(ServerCredentials::new(
            server_id,
            entry.username.unwrap_or_default(),
            entry.password.unwrap_or_default(),
        ))
    }
}

fn missing_server_message(server_id: &str) -> String {
    format!(
        "No server entry found for '{server_id}' so we cannot connect!\n\n\
         Please add the following to your settings.toml (using the correct user/password values):\n\n\
         [servers.\"{server_id}\"]\n\
         username = \"admin\"\n\
         password = \"admin\"\n"
    )
}
