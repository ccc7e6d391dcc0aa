//! # PMOAbs - Client Audiobookshelf
//!
//! Client HTTP pour l'API REST d'Audiobookshelf, utilisé par PMOSonos comme
//! catalogue de livres audio.
//!
//! ## Fonctionnalités
//!
//! - Liste des livres d'une bibliothèque
//! - Détail d'un livre (fichiers audio, auteurs, couverture)
//! - Lecture et écriture de la progression de l'utilisateur
//! - Construction des URLs de lecture et de couverture
//!
//! Le client implémente [`pmoaudiobook::AudiobookCatalog`].
//!
//! ## Configuration
//!
//! ```yaml
//! audiobookshelf:
//!   url: http://audiobookshelf.local:13378
//!   library_id: lib_xxxxxxxx
//!   token: ...
//!   timeout_secs: 30
//! ```

pub mod catalog;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;

pub use client::{AbsClient, ClientBuilder};
pub use config_ext::AbsConfigExt;
pub use error::{AbsError, Result};
pub use models::{AudioFile, LibraryItem, LibraryItemsResponse, MediaProgress, ProgressPatch};
