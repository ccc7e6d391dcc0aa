//! Gestion des erreurs du cœur audiobook

use crate::model::Seconds;
use thiserror::Error;

/// Type Result personnalisé pour pmoaudiobook
pub type Result<T> = std::result::Result<T, BookError>;

/// Erreurs des conversions de position et de la pagination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    /// Partie ou livre absent du catalogue
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Position au-delà de la durée totale du livre
    #[error("Position {requested}s is past the end of the book ({total}s)")]
    OutOfRange { requested: Seconds, total: Seconds },

    /// Position négative ou non finie
    #[error("Invalid position: {0}")]
    InvalidPosition(Seconds),

    /// Identifiant de piste mal formé (attendu: `{item}/file/{part}`)
    #[error("Invalid track id: {0}")]
    InvalidTrackId(String),

    /// Le catalogue distant n'a pas pu fournir les données
    #[error("Upstream catalog unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl BookError {
    /// Crée une erreur NotFound
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
