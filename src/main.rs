use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use esi_orders::config::Settings;
use esi_orders::esi::{EsiClient, LatencyRecorder};
use esi_orders::export::export_orders;
use esi_orders::telemetry;

/// Export every ESI market order of every region into a CSV file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Profiling instrumentation to enable for this run
    #[arg(long, value_enum, default_value_t = Mode::None)]
    mode: Mode,

    /// Only log warnings and errors, and skip the profiling summary
    #[arg(short, long)]
    quiet: bool,

    /// Output file (overrides ESI_OUTPUT / esi-orders.toml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// ESI base url (overrides ESI_BASE_URL / esi-orders.toml)
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    None,
    /// Log the duration of every request and pipeline span
    Trace,
    /// Print a request latency histogram summary at exit
    Latency,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // load .env

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ClapErrorKind::DisplayVersion => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // usage and help both exit 2
            let _ = e.print();
            return ExitCode::from(2);
        }
    };

    // request spans are debug-level; trace mode needs them enabled to time them
    let default_filter = match (cli.quiet, cli.mode) {
        (true, _) => "warn",
        (false, Mode::Trace) => "info,esi_orders=debug",
        (false, _) => "info",
    };
    telemetry::init_tracing(default_filter, cli.mode == Mode::Trace);
    if let Err(e) = telemetry::init_metrics() {
        warn!(error = %e, "Metrics exporter unavailable");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load().context("loading configuration")?;
    if let Some(output) = cli.output {
        settings.output = output;
    }
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    let endpoint = settings.endpoint()?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let file = File::create(&settings.output)
        .with_context(|| format!("failed to create {}", settings.output.display()))?;
    let sink = BufWriter::new(file);
    let client = EsiClient::new(&settings.user_agent).context("building http client")?;

    let written = match cli.mode {
        Mode::Latency => {
            let recorder = LatencyRecorder::new(client)?;
            let result = export_orders(&cancel, &recorder, &endpoint, sink).await;
            if !cli.quiet {
                eprintln!("{}", recorder.summary());
            }
            result?
        }
        Mode::None | Mode::Trace => export_orders(&cancel, &client, &endpoint, sink).await?,
    };

    info!(rows = written, path = %settings.output.display(), "Wrote market orders");
    Ok(())
}

// Resolves on SIGINT, or SIGTERM on unix.
async fn cancel_on_shutdown(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    warn!("Shutdown signal received, cancelling export");
    cancel.cancel();
}
