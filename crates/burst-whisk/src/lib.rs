//! Apache OpenWhisk adapter for the burst engine.
//!
//! [`CredentialResolver`] reads the platform host and key from the environment or the local
//! `wsk` tool, [`WhiskClient`] implements [`burst_core::Platform`] over the REST API.

mod client;
pub use client::{WhiskClient, base_url};

mod config;
pub use config::WhiskConfig;

mod credentials;
pub use credentials::{CredentialResolver, Credentials, parse_apihost, parse_auth};

mod errors;
pub use errors::WhiskError;
