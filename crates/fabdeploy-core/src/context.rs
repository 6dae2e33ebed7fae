//! Per-invocation server credentials.

use crate::error::{DeployError, DeployResult};

/// Username and password for the management endpoint.
///
/// Constructed once by the settings layer and handed by value to the
/// client. `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerCredentials {
    server_id: String,
    username: String,
    password: String,
}

impl ServerCredentials {
    pub fn new(
        server_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Fail when either value is blank.
    pub fn validate(&self) -> DeployResult<()> {
        if self.username.trim().is_empty() {
            return Err(DeployError::configuration(format!(
                "No username defined for server '{}'. Please add a value!",
                self.server_id
            )));
        }
        if self.password.trim().is_empty() {
            return Err(DeployError::configuration(format!(
                "No password defined for server '{}'. Please add a value!",
                self.server_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("server_id", &self.server_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
