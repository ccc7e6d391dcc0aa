//! Catalogue en mémoire pour les tests

use async_trait::async_trait;
use pmoaudiobook::{
    AudiobookCatalog, Author, Book, BookSummary, CatalogError, Part, ProgressUpdate, Seconds,
    TrackId,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    pub books: Vec<Book>,
    pub progress: HashMap<String, Seconds>,
    pub persisted: Mutex<Vec<(String, ProgressUpdate)>>,
    pub unavailable: bool,
    /// La bibliothèque configurée n'existe pas côté catalogue
    pub missing_library: bool,
}

impl MemoryCatalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            ..Default::default()
        }
    }

    pub fn with_progress(mut self, item_id: &str, seconds: Seconds) -> Self {
        self.progress.insert(item_id.to_string(), seconds);
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn without_library(books: Vec<Book>) -> Self {
        Self {
            missing_library: true,
            ..Self::new(books)
        }
    }

    pub fn persisted(&self) -> Vec<(String, ProgressUpdate)> {
        self.persisted.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.unavailable {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AudiobookCatalog for MemoryCatalog {
    async fn library_items(&self) -> Result<Option<Vec<BookSummary>>, CatalogError> {
        self.check()?;
        if self.missing_library {
            return Ok(None);
        }
        Ok(Some(self.books.iter().map(Book::summary_entry).collect()))
    }

    async fn item(&self, item_id: &str) -> Result<Option<Book>, CatalogError> {
        self.check()?;
        Ok(self.books.iter().find(|b| b.id == item_id).cloned())
    }

    async fn progress(&self, item_id: &str) -> Result<Option<Seconds>, CatalogError> {
        self.check()?;
        Ok(self.progress.get(item_id).copied())
    }

    async fn persist_progress(
        &self,
        item_id: &str,
        update: &ProgressUpdate,
    ) -> Result<(), CatalogError> {
        self.check()?;
        self.persisted
            .lock()
            .unwrap()
            .push((item_id.to_string(), update.clone()));
        Ok(())
    }

    fn media_uri(&self, track: &TrackId) -> String {
        format!("http://abs.test/api/items/{}?token=t", track)
    }
}

/// Deux livres : « Dune » (a: 100 s, b: 200 s) et « Anathem » (une partie)
pub fn sample_books() -> Vec<Book> {
    let mut dune = Book::new(
        "li_dune",
        "Dune",
        vec![
            Part::new("a", 100.0).with_title("01.mp3").with_mime_type("audio/mpeg"),
            Part::new("b", 200.0).with_title("02.mp3").with_mime_type("audio/mpeg"),
        ],
    );
    dune.authors = vec![Author {
        id: "au_1".to_string(),
        name: "Frank Herbert".to_string(),
    }];

    let anathem = Book::new("li_anathem", "Anathem", vec![Part::new("x", 3600.0)]);

    vec![dune, anathem]
}

/// Livre dont aucune partie n'a de durée
pub fn silent_book() -> Book {
    Book::new(
        "li_silence",
        "Silence",
        vec![Part::new("s1", 0.0), Part::new("s2", 0.0)],
    )
}
