//! SahiBin API server binary.

use anyhow::Result;
use sahibin_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env()?;
    run_server(config).await
}
