//! Serves the item API.

use item_catalog::infra::{config, database, logging};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let _guard = logging::init_logging();

    let config = config::load_config()?;
    let items = database::init_item_store(&config.database).await?;

    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.server.http_address, config.server.http_port
    ))
    .await?;
    item_catalog::server::run_app(listener, items, config).await?;

    Ok(())
}
