use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhiskError {
    #[error("credential source '{source_name}' unavailable: {reason}")]
    CredentialSource { source_name: String, reason: String },

    #[error("malformed {what}: {value:?}")]
    MalformedCredential { what: &'static str, value: String },

    #[error("invalid whisk configuration: {0}")]
    Config(String),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
