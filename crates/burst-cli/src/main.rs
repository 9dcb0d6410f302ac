use std::process::ExitCode;

use burst_observe::{LoggerConfig, logger_init};
use clap::Parser;
use tracing::{error, info};

use burst_cli::{Cli, describe, execute, is_usage_error};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if is_usage_error(&e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    let cfg = LoggerConfig::new(cli.log_level.clone(), cli.log_format);
    if let Err(e) = logger_init(&cfg) {
        eprintln!("burst: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(&cli)) {
        Ok(report) => {
            info!(total = report.total, elapsed_ms = report.elapsed.as_millis() as u64, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %describe(&e), "operation failed");
            ExitCode::FAILURE
        }
    }
}
