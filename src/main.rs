use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rendezvous::config::AppConfig;
use rendezvous::handlers;
use rendezvous::i18n::{message, MessageKey};
use rendezvous::models::Locale;
use rendezvous::services::operator::{ConsoleOperator, Headless, Operator};
use rendezvous::services::scheduler::{summarize, MeetingScheduler};
use rendezvous::state::AppState;

#[derive(Parser)]
#[command(name = "rendezvous", about = "Book a meeting from a single free-text request")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read one request from stdin and ask for anything missing (default).
    Prompt,
    /// Process the request given as argument.
    Schedule {
        text: String,
        /// Fail instead of prompting when information is missing.
        #[arg(long)]
        non_interactive: bool,
    },
    /// Serve the non-interactive HTTP API.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "initialization failed");
            eprintln!("\nError: {e}");
            std::process::exit(1);
        }
    };
    let scheduler = MeetingScheduler::from_config(&config);

    match cli.command.unwrap_or(Command::Prompt) {
        Command::Prompt => {
            let console = ConsoleOperator::new();
            println!("{}", message(Locale::En, MessageKey::Banner, &[]));
            let request = console
                .ask(&format!("{}\n", message(Locale::Fr, MessageKey::Banner, &[])))
                .await?;
            run_once(&scheduler, &request, &console).await;
        }
        Command::Schedule {
            text,
            non_interactive,
        } => {
            if non_interactive {
                run_once(&scheduler, &text, &Headless).await;
            } else {
                run_once(&scheduler, &text, &ConsoleOperator::new()).await;
            }
        }
        Command::Serve => {
            let addr = format!("0.0.0.0:{}", config.port);
            let state = Arc::new(AppState { config, scheduler });
            let app = handlers::router(state);

            tracing::info!("starting server on {addr}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn run_once(scheduler: &MeetingScheduler, request: &str, operator: &dyn Operator) {
    match scheduler.process_meeting_request(request, operator).await {
        Ok(outcome) => {
            println!();
            for line in summarize(&outcome) {
                println!("{line}");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "processing error");
            println!("\nError: {e}");
        }
    }
}
