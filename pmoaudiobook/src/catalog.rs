//! Interface du catalogue distant
//!
//! Le cœur ne fait aucune entrée/sortie : les livres et les progressions lui
//! sont fournis par une implémentation de [`AudiobookCatalog`] (le client
//! Audiobookshelf en production, un catalogue en mémoire dans les tests).
//!
//! Chaque lecture distingue explicitement trois cas :
//! `Ok(Some(_))` (données), `Ok(None)` (absence) et `Err(_)` (échec).

use crate::error::BookError;
use crate::model::{Book, BookSummary, ProgressUpdate, Seconds, TrackId};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Échec d'un appel au catalogue distant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Le service ne répond pas ou a renvoyé une erreur de transport
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Le jeton d'accès a été refusé
    #[error("Catalog access denied: {0}")]
    Unauthorized(String),

    /// La réponse n'a pas pu être interprétée
    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

impl From<CatalogError> for BookError {
    fn from(err: CatalogError) -> Self {
        BookError::UpstreamUnavailable(err.to_string())
    }
}

/// Catalogue de livres audio consommé par le service
#[async_trait]
pub trait AudiobookCatalog: Debug + Send + Sync {
    /// Liste les livres de la bibliothèque configurée
    async fn library_items(&self) -> Result<Option<Vec<BookSummary>>, CatalogError>;

    /// Récupère un livre complet avec ses parties
    async fn item(&self, item_id: &str) -> Result<Option<Book>, CatalogError>;

    /// Position absolue mémorisée pour un livre, s'il y en a une
    async fn progress(&self, item_id: &str) -> Result<Option<Seconds>, CatalogError>;

    /// Enregistre une nouvelle progression
    async fn persist_progress(
        &self,
        item_id: &str,
        update: &ProgressUpdate,
    ) -> Result<(), CatalogError>;

    /// URL de lecture d'une piste
    fn media_uri(&self, track: &TrackId) -> String;
}
