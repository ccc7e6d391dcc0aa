//! Client HTTP pour l'API REST d'Audiobookshelf
//!
//! Chaque requête porte le jeton d'API dans un en-tête Bearer. Les URLs de
//! lecture et de couverture transmises aux lecteurs le portent dans le
//! paramètre `token`, les lecteurs ne pouvant pas ajouter d'en-têtes.
//!
//! # Exemple
//!
//! ```no_run
//! use pmoabs::AbsClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AbsClient::builder()
//!         .base_url("http://audiobookshelf.local:13378")
//!         .library_id("lib_xxxxxxxx")
//!         .token("secret")
//!         .build()?;
//!
//!     let items = client.fetch_library_items().await?;
//!     println!("{} livres", items.total);
//!     Ok(())
//! }
//! ```

use crate::config_ext::AbsConfigExt;
use crate::error::{AbsError, Result};
use crate::models::{LibraryItem, LibraryItemsResponse, MediaProgress, ProgressPatch};
use pmoaudiobook::TrackId;
use pmoconfig::Config;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Timeout par défaut des requêtes HTTP (30 secondes)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent par défaut
pub const DEFAULT_USER_AGENT: &str = concat!("PMOSonos/", env!("CARGO_PKG_VERSION"), " (pmoabs)");

/// Client HTTP Audiobookshelf
///
/// Le client est lié à une bibliothèque. Il ne garde aucun état et ne met
/// rien en cache : chaque appel reflète l'état courant du serveur.
#[derive(Clone)]
pub struct AbsClient {
    client: Client,
    base_url: String,
    library_id: String,
    token: String,
    timeout: Duration,
}

impl fmt::Debug for AbsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbsClient")
            .field("base_url", &self.base_url)
            .field("library_id", &self.library_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AbsClient {
    /// Crée un builder pour configurer le client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Crée un client depuis la section `audiobookshelf` de la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder()
            .base_url(config.get_abs_url()?)
            .library_id(config.get_abs_library_id()?)
            .token(config.get_abs_token()?)
            .timeout(config.get_abs_timeout())
            .build()
    }

    /// URL de base du serveur
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn library_id(&self) -> &str {
        &self.library_id
    }

    /// Construit `{base_url}/{segments...}`, chaque segment étant encodé
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AbsError::configuration(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL transmise aux lecteurs : le jeton passe en paramètre de requête
    fn public_url(&self, segments: &[&str]) -> String {
        match self.endpoint(segments) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("token", &self.token);
                url.into()
            }
            Err(e) => {
                warn!("Cannot build URL from {}: {}", self.base_url, e);
                format!("{}/{}?token={}", self.base_url, segments.join("/"), self.token)
            }
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET Audiobookshelf");

        let response = self.request(Method::GET, url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AbsError::from_status_code(
                status.as_u16(),
                format!("GET {}: {}", url.path(), body),
            ));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Liste les livres de la bibliothèque configurée
    ///
    /// `GET /api/libraries/{library}/items`
    pub async fn fetch_library_items(&self) -> Result<LibraryItemsResponse> {
        if self.library_id.is_empty() {
            return Err(AbsError::configuration("library id is empty"));
        }
        self.get_json(&["api", "libraries", self.library_id.as_str(), "items"])
            .await
    }

    /// Récupère un livre avec ses fichiers audio
    ///
    /// `GET /api/items/{id}`
    pub async fn fetch_item(&self, item_id: &str) -> Result<LibraryItem> {
        self.get_json(&["api", "items", item_id]).await
    }

    /// Récupère la progression de l'utilisateur sur un livre
    ///
    /// `GET /api/me/progress/{id}`. Le serveur répond 404 si le livre n'a
    /// jamais été commencé.
    pub async fn fetch_progress(&self, item_id: &str) -> Result<MediaProgress> {
        self.get_json(&["api", "me", "progress", item_id]).await
    }

    /// Enregistre une nouvelle progression pour un livre
    ///
    /// `PATCH /api/me/progress/{id}`
    pub async fn update_progress(&self, item_id: &str, patch: &ProgressPatch) -> Result<()> {
        let url = self.endpoint(&["api", "me", "progress", item_id])?;
        debug!(url = %url, current_time = patch.current_time, "PATCH Audiobookshelf progress");

        let response = self
            .request(Method::PATCH, url.clone())
            .json(patch)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AbsError::from_status_code(
                status.as_u16(),
                format!("PATCH {}: {}", url.path(), body),
            ));
        }
        Ok(())
    }

    /// URL de lecture d'une partie : `{base}/api/items/{item}/file/{ino}?token=...`
    pub fn stream_uri(&self, track: &TrackId) -> String {
        self.public_url(&["api", "items", track.item_id.as_str(), "file", track.part_id.as_str()])
    }

    /// URL de couverture d'un livre : `{base}/api/items/{item}/cover?token=...`
    pub fn cover_uri(&self, item_id: &str) -> String {
        self.public_url(&["api", "items", item_id, "cover"])
    }
}

/// Builder pour créer un AbsClient personnalisé
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    library_id: String,
    token: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: String::new(),
            library_id: String::new(),
            token: String::new(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Crée un builder avec les paramètres par défaut
    pub fn new() -> Self {
        Self::default()
    }

    /// Utilise un client HTTP personnalisé
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// URL du serveur (le `/` final est ignoré)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn library_id(mut self, library_id: impl Into<String>) -> Self {
        self.library_id = library_id.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Timeout des requêtes
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// En-tête User-Agent personnalisé
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Construit le client
    pub fn build(self) -> Result<AbsClient> {
        Url::parse(&self.base_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(AbsClient {
            client,
            base_url: self.base_url,
            library_id: self.library_id,
            token: self.token,
            timeout: self.timeout,
        })
    }
}
