mod cli;
mod infra;
mod loader;
mod routes;
mod server;

use report_card::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
