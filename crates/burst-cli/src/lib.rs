//! `burst`: run one manifest-described batch on Apache OpenWhisk.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use burst_core::{BatchRunner, RunReport, Subscribe};
use burst_observe::{LogSubscriber, LoggerFormat};
use burst_prometheus::PrometheusMetrics;
use burst_whisk::{CredentialResolver, WhiskClient, WhiskConfig};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod manifest;
pub use manifest::{Manifest, ManifestError};

pub mod workloads;

#[derive(Debug, Parser)]
#[command(name = "burst", version, about = "Fan a work unit out over OpenWhisk and reduce the results")]
pub struct Cli {
    /// Path to the JSON manifest describing the batch.
    pub manifest: PathBuf,

    /// Log filter directive (`RUST_LOG` overrides it).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log output format: text, json or journald.
    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,

    /// Verify the platform TLS certificate.
    #[arg(long)]
    pub secure: bool,
}

/// Load the manifest, resolve credentials and run the batch to completion.
///
/// Ctrl-C cancels every live invocation and fails the run.
pub async fn execute(cli: &Cli) -> anyhow::Result<RunReport> {
    let manifest = Manifest::load(&cli.manifest)?;
    let exec = manifest.read_exec()?;
    let workload = workloads::resolve(
        &manifest.workload,
        &manifest.params,
        manifest.configs.num_actions,
    )?;

    let credentials = CredentialResolver::from_env()
        .resolve()
        .await
        .context("resolving platform credentials")?;
    let whisk = WhiskConfig {
        insecure: !cli.secure,
        ..WhiskConfig::with_namespace(&manifest.configs.namespace)
    };
    let platform = Arc::new(WhiskClient::new(&whisk, credentials)?);
    info!(base = platform.base(), workload = %manifest.workload, "platform client ready");

    let metrics = PrometheusMetrics::new()?;
    let subscribers: Vec<Arc<dyn Subscribe>> =
        vec![Arc::new(LogSubscriber::new()), Arc::new(metrics.clone())];
    let runner = BatchRunner::new(platform, manifest.dispatch, subscribers);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling live invocations");
            on_signal.cancel();
        }
    });

    let outcome = runner
        .run(&manifest.configs, exec, workload, cancel.clone())
        .await;
    cancel.cancel();

    if let Some(path) = &manifest.metrics_path {
        if let Err(e) = write_metrics(&metrics, path) {
            warn!(path = %path.display(), error = %e, "failed to write metrics");
        }
    }
    Ok(outcome?)
}

/// Command-line errors that end the process with a failure; `--help` and `--version` do not.
pub fn is_usage_error(e: &clap::Error) -> bool {
    e.use_stderr()
}

/// Render an error with its causes, skipping a cause the message before it already spells out.
pub fn describe(e: &anyhow::Error) -> String {
    let mut out = e.to_string();
    let mut last = out.clone();
    for cause in e.chain().skip(1) {
        let msg = cause.to_string();
        if !last.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        last = msg;
    }
    out
}

fn write_metrics(metrics: &PrometheusMetrics, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, metrics.encode_text()?)?;
    info!(path = %path.display(), "metrics written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use burst_model::RunEvent;

    use super::*;

    #[test]
    fn parses_arguments() {
        let cli = Cli::try_parse_from(["burst", "demo.json", "--log-format", "json", "--secure"]).unwrap();
        assert_eq!(cli.manifest, PathBuf::from("demo.json"));
        assert_eq!(cli.log_format, LoggerFormat::Json);
        assert_eq!(cli.log_level, "info");
        assert!(cli.secure);
    }

    #[test]
    fn manifest_is_required() {
        let missing = Cli::try_parse_from(["burst"]).unwrap_err();
        assert_eq!(missing.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(is_usage_error(&missing));

        let bad_format = Cli::try_parse_from(["burst", "m.json", "--log-format", "xml"]).unwrap_err();
        assert!(is_usage_error(&bad_format));
    }

    #[test]
    fn help_and_version_are_not_failures() {
        let help = Cli::try_parse_from(["burst", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(!is_usage_error(&help));

        let version = Cli::try_parse_from(["burst", "--version"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(!is_usage_error(&version));
    }

    #[test]
    fn describe_names_each_cause_once() {
        let err = anyhow::Error::from(ManifestError::Read {
            path: PathBuf::from("w.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(describe(&err), "cannot read manifest w.json: gone");

        let wrapped = anyhow::Error::from(std::io::Error::other("refused")).context("resolving platform credentials");
        assert_eq!(describe(&wrapped), "resolving platform credentials: refused");
    }

    #[test]
    fn metrics_file_is_written() {
        let dir = std::env::temp_dir().join(format!("burst-metrics-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested/metrics.prom");
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.on_event(&RunEvent::Finished {
            total: 1,
            elapsed_ms: 10,
        });

        write_metrics(&metrics, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("burst_runs_total{outcome=\"finished\"} 1"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn unreadable_manifest_fails_before_network() {
        let cli = Cli::try_parse_from(["burst", "/nonexistent/workunit.json"]).unwrap();
        let err = execute(&cli).await.unwrap_err();
        assert!(err.downcast_ref::<ManifestError>().is_some());
        let text = describe(&err);
        assert!(text.starts_with("cannot read manifest /nonexistent/workunit.json"));
        assert_eq!(text.matches("os error").count(), 1);
    }
}
