use crate::errors::WhiskError;

#[derive(Debug, Clone)]
pub struct WhiskConfig {
    /// Namespace segment of every request path (`_` is the key's default namespace).
    pub namespace: String,
    /// Skip TLS certificate verification (default: true, deployments are commonly self-signed).
    pub insecure: bool,
    /// Timeout of a single HTTP request (default: 30 seconds).
    pub request_timeout_ms: u64,
}

impl Default for WhiskConfig {
    fn default() -> Self {
        Self {
            namespace: "_".to_string(),
            insecure: true,
            request_timeout_ms: 30_000,
        }
    }
}

impl WhiskConfig {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), WhiskError> {
        if self.namespace.trim().is_empty() {
            return Err(WhiskError::Config("namespace must not be empty".into()));
        }
        if self.namespace.contains('/') {
            return Err(WhiskError::Config("namespace must not contain '/'".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(WhiskError::Config("request timeout must be positive".into()));
        }
        Ok(())
    }
}
