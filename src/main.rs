use anyhow::Result;
use clap::{Parser, Subcommand};
use outfit_transfer::cli::{run_transfer, TransferJob, DEFAULT_OUTPUT_PREFIX};
use outfit_transfer::engine::{classify, Engine};
use outfit_transfer::models::Config;
use outfit_transfer::{server, Error};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "outfit-transfer")]
#[command(about = "Dress a person in the outfit from another photo")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Run a single transfer from two local image files.
    Transfer {
        /// Photo of the person to dress.
        user_image: PathBuf,
        /// Photo of the outfit to transfer.
        outfit_image: PathBuf,
        /// Results are written as <PREFIX>_<n>.<ext>.
        #[arg(value_name = "PREFIX", default_value = DEFAULT_OUTPUT_PREFIX)]
        output_prefix: String,
        /// Google AI Studio key. Defaults to GOOGLE_AI_API_KEY.
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outfit_transfer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting outfit-transfer server");
            if let Err(e) = server::serve(config).await {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Transfer {
            user_image,
            outfit_image,
            output_prefix,
            api_key,
        } => {
            let job = TransferJob {
                user_image,
                outfit_image,
                output_prefix,
                api_key: api_key
                    .or_else(|| config.default_api_key.clone())
                    .unwrap_or_default(),
            };
            transfer(&config, &job).await
        }
    }
}

async fn transfer(config: &Config, job: &TransferJob) -> Result<()> {
    let engine = Engine::from_config(config)?;

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling generation");
            on_interrupt.cancel();
        }
    });

    match run_transfer(&engine, job, &token).await {
        Ok(report) => {
            info!(
                "Generated {} images in {}ms",
                report.saved.len(),
                report.elapsed.as_millis()
            );
            if !report.text.is_empty() {
                info!("Model response: {}", report.text);
            }
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            std::process::exit(1);
        }
    }
}

fn report_failure(failure: &Error) {
    match failure {
        Error::Validation(_) | Error::Cancelled => error!("{}", failure),
        Error::NoImagesProduced { text } => {
            error!("{}", failure);
            if !text.is_empty() {
                error!("Model response: {}", text);
            }
        }
        _ => {
            let classified = classify(failure);
            error!(
                "{} (status {})",
                classified.user_message, classified.http_status
            );
            error!("Details: {}", classified.raw_detail);
        }
    }
}
