//! Structures de données de l'API Audiobookshelf
//!
//! Seuls les champs utilisés par le pont sont décodés. Les champs absents
//! prennent leur valeur par défaut : un livre sans fichiers audio reste
//! listable, il n'a simplement aucune partie.

use pmoaudiobook::{Author, Part, ProgressUpdate, Seconds};
use serde::{Deserialize, Serialize};

/// Réponse de `GET /api/libraries/{id}/items`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItemsResponse {
    #[serde(default)]
    pub results: Vec<LibraryItem>,
    #[serde(default)]
    pub total: usize,
}

/// Un élément de bibliothèque (un livre)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub metadata: BookMetadata,
    /// Chemin de la couverture sur le serveur (présent si le livre en a une)
    #[serde(default)]
    pub cover_path: Option<String>,
    /// Fichiers audio, dans l'ordre de lecture
    #[serde(default)]
    pub audio_files: Vec<AudioFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Présent dans les réponses « minifiées » des listes
    #[serde(default)]
    pub author_name: Option<String>,
    /// Présent dans les réponses complètes
    #[serde(default)]
    pub authors: Vec<AuthorRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
}

/// Fichier audio d'un livre
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    /// Inode du fichier, sert d'identifiant de partie
    pub ino: String,
    #[serde(default)]
    pub duration: Option<Seconds>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub metadata: FileMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(default)]
    pub filename: Option<String>,
}

/// Réponse de `GET /api/me/progress/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProgress {
    #[serde(default)]
    pub current_time: Seconds,
    #[serde(default)]
    pub duration: Option<Seconds>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub is_finished: bool,
}

/// Corps de `PATCH /api/me/progress/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    pub duration: Seconds,
    pub current_time: Seconds,
    pub progress: f64,
}

impl From<&ProgressUpdate> for ProgressPatch {
    fn from(update: &ProgressUpdate) -> Self {
        Self {
            duration: update.duration,
            current_time: update.current_time,
            progress: update.progress,
        }
    }
}

impl LibraryItem {
    /// Titre du livre, ou son identifiant à défaut
    pub fn title(&self) -> String {
        self.media
            .metadata
            .title
            .clone()
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn authors(&self) -> Vec<Author> {
        self.media
            .metadata
            .authors
            .iter()
            .map(|a| Author {
                id: a.id.clone(),
                name: a.name.clone(),
            })
            .collect()
    }

    /// Nom du premier auteur, quelle que soit la forme de la réponse
    pub fn author_name(&self) -> Option<String> {
        self.media
            .metadata
            .authors
            .first()
            .map(|a| a.name.clone())
            .or_else(|| self.media.metadata.author_name.clone())
    }

    /// Parties du livre, dans l'ordre des fichiers audio
    pub fn parts(&self) -> Vec<Part> {
        self.media.audio_files.iter().map(AudioFile::to_part).collect()
    }

    pub fn has_cover(&self) -> bool {
        self.media
            .cover_path
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }
}

impl AudioFile {
    pub fn to_part(&self) -> Part {
        let mut part = Part::new(&self.ino, self.duration.unwrap_or(0.0));
        if let Some(filename) = &self.metadata.filename {
            part = part.with_title(filename);
        }
        if let Some(mime_type) = &self.mime_type {
            part = part.with_mime_type(mime_type);
        }
        part
    }
}
