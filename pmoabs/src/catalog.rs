//! Implémentation de [`AudiobookCatalog`] pour le client Audiobookshelf
//!
//! Un 404 est une absence (`Ok(None)`), tout autre échec remonte comme
//! [`CatalogError`].

use crate::client::AbsClient;
use crate::error::AbsError;
use crate::models::{LibraryItem, ProgressPatch};
use async_trait::async_trait;
use pmoaudiobook::{
    AudiobookCatalog, Book, BookSummary, CatalogError, ProgressUpdate, Seconds, TrackId,
};
use tracing::{debug, warn};

/// Convertit un 404 en absence
fn absent_if_not_found<T>(result: Result<T, AbsError>) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            debug!("Audiobookshelf: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl AbsClient {
    fn item_cover(&self, item: &LibraryItem) -> Option<String> {
        item.has_cover().then(|| self.cover_uri(&item.id))
    }

    /// Entrée de liste pour un élément de bibliothèque
    pub fn to_summary(&self, item: &LibraryItem) -> BookSummary {
        BookSummary {
            id: item.id.clone(),
            title: item.title(),
            summary: item.media.metadata.description.clone(),
            author: item.author_name(),
            cover_uri: self.item_cover(item),
        }
    }

    /// Livre complet avec ses parties
    pub fn to_book(&self, item: &LibraryItem) -> Book {
        let mut book = Book::new(&item.id, item.title(), item.parts());
        book.summary = item.media.metadata.description.clone();
        book.authors = item.authors();
        book.cover_uri = self.item_cover(item);
        book
    }
}

#[async_trait]
impl AudiobookCatalog for AbsClient {
    async fn library_items(&self) -> Result<Option<Vec<BookSummary>>, CatalogError> {
        let response = absent_if_not_found(self.fetch_library_items().await)?;
        Ok(response.map(|r| r.results.iter().map(|item| self.to_summary(item)).collect()))
    }

    async fn item(&self, item_id: &str) -> Result<Option<Book>, CatalogError> {
        let item = absent_if_not_found(self.fetch_item(item_id).await)?;
        Ok(item.map(|item| self.to_book(&item)))
    }

    async fn progress(&self, item_id: &str) -> Result<Option<Seconds>, CatalogError> {
        let progress = absent_if_not_found(self.fetch_progress(item_id).await)?;
        Ok(progress.map(|p| p.current_time))
    }

    async fn persist_progress(
        &self,
        item_id: &str,
        update: &ProgressUpdate,
    ) -> Result<(), CatalogError> {
        self.update_progress(item_id, &ProgressPatch::from(update))
            .await
            .map_err(|e| {
                warn!(item_id, "Failed to store progress: {}", e);
                CatalogError::from(e)
            })
    }

    fn media_uri(&self, track: &TrackId) -> String {
        self.stream_uri(track)
    }
}
