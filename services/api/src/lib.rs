mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use lucky_draw::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
