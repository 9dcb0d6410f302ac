use std::sync::Arc;

use burst_model::WorkUnit;
use tracing::{error, info, instrument};

use crate::{error::CoreError, platform::Platform};

/// Stores work units on the platform.
///
/// Registration is create-or-overwrite: the platform copy of `unit.name` is replaced on every call.
pub struct WorkRegistrar {
    platform: Arc<dyn Platform>,
}

impl WorkRegistrar {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    #[instrument(level = "debug", skip_all, fields(action = %unit.name, namespace = %unit.namespace))]
    pub async fn register(&self, unit: &WorkUnit) -> Result<(), CoreError> {
        info!(platform = self.platform.name(), "registering action");
        match self.platform.register_work(unit).await {
            Ok(()) => {
                info!("action registered");
                Ok(())
            }
            Err(source) => {
                error!(error = %source, "action registration failed");
                Err(CoreError::Registration {
                    action: unit.name.clone(),
                    source,
                })
            }
        }
    }
}
