mod cli;
mod infra;
mod routes;
mod server;

use post_verifier::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
