mod calc;
mod cli;
mod infra;
mod routes;
mod server;

use grade_sim::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
