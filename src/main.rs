use clap::Parser;
use scribe_console::api::HttpBackend;
use scribe_console::config::{self, ClientConfig};
use scribe_console::controller::{AudioSelection, FlowOutcome, SessionController};
use scribe_console::ui::{ConsoleUi, Tab};
use std::path::PathBuf;
use std::process;

/// Upload an audio file for transcription and follow the server's progress.
#[derive(Parser)]
#[command(name = "scribe-console", version)]
struct Cli {
    /// Audio file to upload (.wav or .mp3).
    file: PathBuf,

    /// Base URL of the transcription server.
    #[arg(long)]
    server: Option<String>,

    /// Fetch the per-speaker summary once processing completes.
    #[arg(long)]
    summary: bool,

    /// Fetch the session statistics once processing completes.
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server.as_deref() {
        config.server_url = config::normalize_server_url(server);
    }

    let bytes = match tokio::fs::read(&cli.file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", cli.file.display(), e);
            process::exit(1);
        }
    };

    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());

    let backend = HttpBackend::new(&config);
    let mut controller = SessionController::new(backend, ConsoleUi::new());

    let outcome = controller
        .start(Some(AudioSelection { file_name, bytes }))
        .await;

    if outcome == FlowOutcome::Completed {
        if cli.summary {
            controller.show_tab(Tab::Summary).await;
        }
        if cli.stats {
            controller.show_tab(Tab::Stats).await;
        }
    } else {
        process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
