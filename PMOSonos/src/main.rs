use anyhow::Context;
use pmoabs::AbsClient;
use pmoconfig::Config;
use pmoserver::ServerBuilder;
use pmosmapi::{SmapiServerExt, SmapiService};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration et logs ==========
    let config = Config::load_config("").context("Cannot load configuration")?;

    let mut server = ServerBuilder::from_config(&config).build();
    server.init_logging(&config).await;

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    // ========== PHASE 2 : Catalogue et service SMAPI ==========
    let client = AbsClient::from_config(&config).context("Cannot configure Audiobookshelf client")?;
    info!(
        "📚 Audiobookshelf library {} at {}",
        client.library_id(),
        client.base_url()
    );

    let service = SmapiService::from_config(Arc::new(client), &config);
    info!(
        "🔊 SMAPI endpoint: {}{}",
        service.settings().public_url,
        service.settings().soap_endpoint
    );
    server.register_smapi(Arc::new(service)).await;

    // ========== PHASE 3 : Démarrage ==========
    server.start().await;
    server.wait().await;

    Ok(())
}
