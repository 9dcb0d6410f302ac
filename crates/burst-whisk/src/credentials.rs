use std::{env, fmt};

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::errors::WhiskError;

pub const APIHOST_ENV: &str = "WHISK_APIHOST";
pub const AUTH_ENV: &str = "WHISK_AUTH";

const WSK: &str = "wsk";

/// Platform endpoint and API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Reads credentials from `WHISK_APIHOST`/`WHISK_AUTH`, falling back to the `wsk` tool.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    program: String,
    apihost: Option<String>,
    auth: Option<String>,
}

impl CredentialResolver {
    pub fn new(program: impl Into<String>, apihost: Option<String>, auth: Option<String>) -> Self {
        Self {
            program: program.into(),
            apihost: apihost.filter(|v| !v.trim().is_empty()),
            auth: auth.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(WSK, env::var(APIHOST_ENV).ok(), env::var(AUTH_ENV).ok())
    }

    #[instrument(level = "debug", skip(self), fields(program = %self.program))]
    pub async fn resolve(&self) -> Result<Credentials, WhiskError> {
        let host = match &self.apihost {
            Some(host) => host.trim().to_string(),
            None => parse_apihost(&self.property("--apihost").await?)?,
        };
        let (user, secret) = match &self.auth {
            Some(key) => split_key(key.trim())?,
            None => parse_auth(&self.property("--auth").await?)?,
        };
        debug!(%host, %user, "credentials resolved");
        Ok(Credentials { host, user, secret })
    }

    async fn property(&self, flag: &str) -> Result<String, WhiskError> {
        let output = Command::new(&self.program)
            .args(["property", "get", flag])
            .output()
            .await
            .map_err(|e| WhiskError::CredentialSource {
                source_name: format!("{} property get {flag}", self.program),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(WhiskError::CredentialSource {
                source_name: format!("{} property get {flag}", self.program),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Host out of `wsk property get --apihost` output (`whisk API host <HOST>`).
pub fn parse_apihost(output: &str) -> Result<String, WhiskError> {
    output
        .split_whitespace()
        .nth(3)
        .map(str::to_string)
        .ok_or_else(|| WhiskError::MalformedCredential {
            what: "apihost output",
            value: output.trim().to_string(),
        })
}

/// Key out of `wsk property get --auth` output (`whisk auth <USER>:<SECRET>`).
pub fn parse_auth(output: &str) -> Result<(String, String), WhiskError> {
    let key = output
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| WhiskError::MalformedCredential {
            what: "auth output",
            value: output.trim().to_string(),
        })?;
    split_key(key)
}

fn split_key(key: &str) -> Result<(String, String), WhiskError> {
    match key.split_once(':') {
        Some((user, secret)) if !user.is_empty() && !secret.is_empty() => {
            Ok((user.to_string(), secret.to_string()))
        }
        _ => Err(WhiskError::MalformedCredential {
            what: "auth key",
            value: key.chars().take_while(|c| *c != ':').collect(),
        }),
    }
}
