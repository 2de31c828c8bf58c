use std::sync::Arc;
use tileroom::{actor::RoomRegistry, broadcast, config::Config, create_app, store::Store};
use uuid::Uuid;

/// Connect both halves of the broker-backed mode, or fail as a unit.
async fn connect_broker(url: &str) -> anyhow::Result<(Store, broadcast::Fabric, String)> {
    let store = Store::redis(url).await?;
    let node_id = Uuid::new_v4().to_string();
    let fabric = broadcast::Fabric::broker(url, node_id.clone()).await?;
    Ok((store, fabric, node_id))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!("Starting tileroom server on {}", config.server_addr());

    let (store, fabric, node_id) = match &config.broker_url {
        Some(url) => match connect_broker(url).await {
            Ok((store, fabric, node_id)) => {
                tracing::info!("Broker connected, multi-node broadcast enabled");
                (store, fabric, Some(node_id))
            }
            Err(e) => {
                tracing::warn!(
                    "Broker unreachable ({}), falling back to memory store + single-node mode",
                    e
                );
                (Store::memory(), broadcast::Fabric::local(), None)
            }
        },
        None => (Store::memory(), broadcast::Fabric::local(), None),
    };

    let config = Arc::new(config);
    let registry = Arc::new(RoomRegistry::new(store, fabric, config.clone()));

    if let (Some(url), Some(node_id)) = (config.broker_url.clone(), node_id) {
        tokio::spawn(broadcast::run_consumer(url, node_id, registry.clone()));
    }

    let app = create_app(registry);

    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("Server listening on {}", config.server_addr());
    axum::serve(listener, app).await?;

    Ok(())
}
