use crate::infra::{build_classifier, build_content_fetcher};
use crate::server;
use clap::{Args, Parser, Subcommand};
use post_verifier::config::AppConfig;
use post_verifier::error::AppError;
use post_verifier::telemetry;
use post_verifier::workflows::content::{extract_post_reference, normalize};
use post_verifier::workflows::sentiment::Classifier;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(
    name = "Community Post Verifier",
    about = "Verify community handles and review sentiment-gated post submissions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the extraction job for one post and print the normalized content
    Fetch(FetchArgs),
    /// Classify a piece of text and print the sentiment result
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    /// Post URL or numeric post id
    pub(crate) reference: String,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Text to classify
    pub(crate) text: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fetch(args) => run_fetch(args).await,
        Command::Classify(args) => run_classify(args).await,
    }
}

async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let fetcher = build_content_fetcher(&config)?;
    let reference = extract_post_reference(&args.reference);
    let fetched = fetcher
        .fetch_raw(&reference)
        .await
        .map_err(|err| AppError::Command(err.to_string()))?;
    let content = normalize(&fetched.item)
        .map_err(|err| AppError::Command(err.to_string()))?;

    let output = json!({
        "run_id": fetched.run.run_id,
        "dataset_id": fetched.run.dataset_id,
        "content": content,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let classifier = build_classifier(&config)?;
    let classification = classifier
        .classify(&args.text)
        .await
        .map_err(|err| AppError::Command(err.to_string()))?;
    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}
