//! # PMOAudiobook
//!
//! Cœur du pont PMOSonos entre un catalogue de livres audio (modèle plat,
//! position absolue en secondes) et un lecteur qui parcourt un catalogue
//! hiérarchique paginé et reprend la lecture sur une partie précise.
//!
//! ## Composants
//!
//! - [`CatalogPager`] : découpe déterministe d'une collection en pages
//! - [`PositionResolver`] : position absolue → (partie, décalage)
//! - [`ProgressAccumulator`] : (partie, décalage) → position absolue
//! - [`AudiobookCatalog`] : interface du catalogue distant
//!
//! Les trois composants sont des fonctions pures, sans état partagé : ils
//! peuvent être appelés en parallèle depuis des tâches indépendantes.
//!
//! ## Example
//!
//! ```
//! use pmoaudiobook::{Part, PositionResolver, ProgressAccumulator};
//!
//! let parts = vec![Part::new("a", 100.0), Part::new("b", 200.0)];
//! let resolved = PositionResolver::resolve(&parts, 150.0)?;
//! let absolute = ProgressAccumulator::accumulate(&parts, resolved.position())?;
//! assert_eq!(absolute, 150.0);
//! # Ok::<(), pmoaudiobook::BookError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod model;
pub mod pager;
pub mod position;

pub use catalog::{AudiobookCatalog, CatalogError};
pub use error::{BookError, Result};
pub use model::{Author, Book, BookSummary, Part, PartPosition, ProgressUpdate, Seconds, TrackId};
pub use pager::{CatalogEntry, CatalogPager, Page};
pub use position::{PositionResolver, ProgressAccumulator, Resolution};
