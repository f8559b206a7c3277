mod cli;
mod infra;
mod server;
mod walkthrough;

use expert_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
