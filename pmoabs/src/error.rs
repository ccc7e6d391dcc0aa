//! Gestion des erreurs pour le client Audiobookshelf

use pmoaudiobook::CatalogError;
use thiserror::Error;

/// Type Result personnalisé pour pmoabs
pub type Result<T> = std::result::Result<T, AbsError>;

/// Erreurs possibles lors de l'utilisation du client Audiobookshelf
#[derive(Error, Debug)]
pub enum AbsError {
    /// Jeton refusé par le serveur
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (bibliothèque, livre, progression)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// URL invalide
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Paramètre du client manquant ou invalide
    #[error("Audiobookshelf configuration error: {0}")]
    Configuration(String),

    /// Erreur de l'API Audiobookshelf
    #[error("Audiobookshelf API error (code {code}): {message}")]
    ApiError { code: u16, message: String },
}

impl AbsError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<AbsError> for CatalogError {
    fn from(err: AbsError) -> Self {
        match err {
            AbsError::Unauthorized(msg) => CatalogError::Unauthorized(msg),
            AbsError::JsonParse(e) => CatalogError::InvalidResponse(e.to_string()),
            other => CatalogError::Unavailable(other.to_string()),
        }
    }
}
