//! # pmoserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour créer des serveurs HTTP
//! avec Axum. Les crates de domaine y ajoutent leurs routes via des traits
//! d'extension (par exemple `pmosmapi::SmapiServerExt`).
//!
//! ## Fonctionnalités
//!
//! - **API de haut niveau** : routes JSON, handlers et sous-routers
//! - **Logs** : buffer circulaire consultable sur `/log-dump`, niveau
//!   modifiable à chaud sur `/api/log_setup`
//! - **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Architecture
//!
//! - [`server`] : Implémentation du serveur principal et du builder
//! - [`logs`] : Initialisation de `tracing` et API des logs
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use pmoconfig::Config;
//! use pmoserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_config("")?;
//!     let mut server = ServerBuilder::from_config(&config).build();
//!     server.init_logging(&config).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{BufferLayer, LogState, log_dump};
pub use server::{Server, ServerBuilder, ServerInfo};
