use std::time::Duration;

use async_trait::async_trait;
use burst_core::{ActivationPoll, InvokeOutcome, Platform, PlatformError};
use burst_model::{ActivationId, WorkUnit};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::{config::WhiskConfig, credentials::Credentials, errors::WhiskError};

const STATUS_SUCCESS: &str = "success";
const STATUS_INTERNAL_ERROR: &str = "whisk internal error";

/// Root of the namespace-scoped REST API, with a trailing slash.
///
/// Hosts without a scheme are reached over https.
pub fn base_url(host: &str, namespace: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/api/v1/namespaces/{namespace}/")
    } else {
        format!("https://{host}/api/v1/namespaces/{namespace}/")
    }
}

#[derive(Deserialize)]
struct InvokeAccepted {
    #[serde(rename = "activationId")]
    activation_id: ActivationId,
}

#[derive(Deserialize)]
struct ActivationRecord {
    response: ActivationResponse,
}

#[derive(Deserialize)]
struct ActivationResponse {
    status: String,
    #[serde(default)]
    result: Value,
}

/// OpenWhisk REST client.
pub struct WhiskClient {
    http: reqwest::Client,
    base: String,
    credentials: Credentials,
}

impl WhiskClient {
    pub fn new(config: &WhiskConfig, credentials: Credentials) -> Result<Self, WhiskError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            base: base_url(&credentials.host, &config.namespace),
            http,
            credentials,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base))
            .basic_auth(&self.credentials.user, Some(&self.credentials.secret))
    }
}

fn transport(e: reqwest::Error) -> PlatformError {
    PlatformError::Transport(e.to_string())
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), PlatformError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    Ok((status, body))
}

#[async_trait]
impl Platform for WhiskClient {
    fn name(&self) -> &'static str {
        "openwhisk"
    }

    async fn register_work(&self, unit: &WorkUnit) -> Result<(), PlatformError> {
        let path = format!("actions/{}?overwrite=true", unit.name);
        let response = self
            .request(Method::PUT, &path)
            .json(unit)
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read_body(response).await?;

        if status != StatusCode::OK {
            return Err(PlatformError::status(status.as_u16(), body));
        }
        debug!(action = %unit.name, %body, "action stored");
        Ok(())
    }

    async fn invoke(&self, action: &str, args: &Value) -> Result<InvokeOutcome, PlatformError> {
        let response = self
            .request(Method::POST, &format!("actions/{action}"))
            .json(args)
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read_body(response).await?;

        if status != StatusCode::ACCEPTED {
            warn!(%action, status = status.as_u16(), "invoke refused");
            return Ok(InvokeOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let accepted: InvokeAccepted = serde_json::from_str(&body)
            .map_err(|e| PlatformError::InvalidResponse(format!("{e}, body: {body}")))?;
        trace!(%action, activation = %accepted.activation_id, "invoke accepted");
        Ok(InvokeOutcome::Accepted(accepted.activation_id))
    }

    async fn activation_result(&self, id: &ActivationId) -> Result<ActivationPoll, PlatformError> {
        let response = self
            .request(Method::GET, &format!("activations/{id}"))
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read_body(response).await?;

        match status {
            StatusCode::NOT_FOUND => Ok(ActivationPoll::NotReady),
            StatusCode::OK => {
                let record: ActivationRecord = serde_json::from_str(&body)
                    .map_err(|e| PlatformError::InvalidResponse(format!("{e}, body: {body}")))?;
                let ActivationResponse { status, result } = record.response;
                Ok(match status.as_str() {
                    STATUS_SUCCESS => ActivationPoll::Success(result),
                    STATUS_INTERNAL_ERROR => ActivationPoll::TransientInternalError(format!("{status}: {result}")),
                    _ => ActivationPoll::OtherError { status },
                })
            }
            other => Err(PlatformError::status(other.as_u16(), body)),
        }
    }
}
