mod cli;
use cli::{parse_cli_mode, print_usage, run, CliMode};
mod sample_schedule;

use clinic_grid::storage::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let options = match parse_cli_mode(std::env::args().skip(1)) {
        Ok(CliMode::Run(options)) => options,
        Ok(CliMode::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            return Ok(());
        }
    };

    if let Err(e) = run(options).await {
        tracing::error!("clinic-grid failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "clinic-grid.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("clinic-grid started");
}
