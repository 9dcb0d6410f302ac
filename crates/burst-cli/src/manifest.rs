use std::{
    fs,
    path::{Path, PathBuf},
};

use burst_model::{ActionExec, DEFAULT_EXEC_KIND, DispatchPolicy, ModelError, WorkUnitConfig};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid manifest: {0}")]
    Invalid(#[from] ModelError),
    #[error("cannot read action code {path}: {source}")]
    Code {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown workload '{0}' (expected: monte-carlo-pi|collect)")]
    UnknownWorkload(String),
    #[error("invalid params for workload '{workload}': {reason}")]
    Params { workload: String, reason: String },
}

fn default_kind() -> String {
    DEFAULT_EXEC_KIND.to_string()
}

/// Where the remote entry point comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExecSource {
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Relative paths are resolved against the manifest directory.
    pub code_path: PathBuf,
}

/// A batch job as written by the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    pub workload: String,
    pub configs: WorkUnitConfig,
    pub exec: ExecSource,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub dispatch: DispatchPolicy,
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

impl Manifest {
    /// Parse and validate the manifest at `path`.
    ///
    /// Relative `exec.codePath` and `metricsPath` are rebased on the manifest directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_json(&raw).map_err(|e| match e {
            ManifestError::Parse { source, .. } => ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.exec.code_path = rebase(dir, &manifest.exec.code_path);
        manifest.metrics_path = manifest.metrics_path.map(|p| rebase(dir, &p));
        Ok(manifest)
    }

    pub fn from_json(raw: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(raw).map_err(|source| ManifestError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        self.configs.validate()?;
        self.dispatch.validate()?;
        if self.exec.kind.trim().is_empty() {
            return Err(ModelError::invalid("exec.kind", "must not be empty").into());
        }
        if !(self.params.is_null() || self.params.is_object()) {
            return Err(ModelError::invalid("params", "must be an object").into());
        }
        Ok(())
    }

    pub fn read_exec(&self) -> Result<ActionExec, ManifestError> {
        let code = fs::read_to_string(&self.exec.code_path).map_err(|source| ManifestError::Code {
            path: self.exec.code_path.clone(),
            source,
        })?;
        Ok(ActionExec::new(self.exec.kind.clone(), code))
    }
}

fn rebase(dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        dir.join(p)
    }
}
