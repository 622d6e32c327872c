use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // stdout carries the JSON payload; diagnostics go to stderr.
    let filter = EnvFilter::try_from_env("SYNTHAI_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).compact().init();

    synthai_cli::run()
}
