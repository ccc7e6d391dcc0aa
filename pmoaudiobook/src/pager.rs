//! # Pagination du catalogue
//!
//! Le lecteur parcourt une bibliothèque par pages bornées (`index`, `count`)
//! et vérifie que `count`, `total` et `index` de chaque réponse sont
//! cohérents avec la collection complète : la moindre incohérence interrompt
//! silencieusement la navigation côté client.
//!
//! [`CatalogPager::page`] trie la collection de façon déterministe avant de
//! la découper, pour que des appels successifs avec des `start_index`
//! différents forment une partition sans recouvrement.
//! [`CatalogPager::page_in_order`] découpe sans trier (parties d'un livre).

use std::cmp::Ordering;

/// Entrée paginable du catalogue
pub trait CatalogEntry {
    /// Clé de tri principale (comparaison lexicographique sensible à la casse)
    fn sort_title(&self) -> &str;

    /// Clé secondaire, départage les titres identiques
    fn entry_id(&self) -> &str;
}

impl CatalogEntry for crate::model::BookSummary {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn entry_id(&self) -> &str {
        &self.id
    }
}

impl CatalogEntry for crate::model::Book {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn entry_id(&self) -> &str {
        &self.id
    }
}

/// Une page d'une collection plus large
///
/// `total()` est toujours la taille de la collection complète et
/// `returned()` toujours la longueur de `items()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    index: usize,
    total: usize,
}

impl<T> Page<T> {
    /// Page vide à `index` pour une collection de `total` entrées
    pub fn empty(index: usize, total: usize) -> Self {
        Self {
            items: Vec::new(),
            index,
            total,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Index de départ de la page dans la collection complète
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nombre d'entrées retournées dans cette page
    pub fn returned(&self) -> usize {
        self.items.len()
    }

    /// Taille de la collection complète
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indique s'il reste des entrées après cette page
    pub fn has_more(&self) -> bool {
        self.index + self.items.len() < self.total
    }

    /// Transforme les entrées sans toucher aux compteurs
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            index: self.index,
            total: self.total,
        }
    }
}

/// Découpe des collections en pages bornées
#[derive(Debug, Clone, Copy)]
pub struct CatalogPager {
    max_page_size: usize,
}

impl Default for CatalogPager {
    fn default() -> Self {
        Self {
            max_page_size: usize::MAX,
        }
    }
}

impl CatalogPager {
    /// Pager sans limite de taille de page
    pub fn new() -> Self {
        Self::default()
    }

    /// Borne la taille des pages (un `page_size` nul ou supérieur est ramené à cette limite)
    pub fn with_max_page_size(max_page_size: usize) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Trie la collection puis retourne la page `[start_index, start_index + page_size)`
    ///
    /// Le tri se fait sur le titre puis sur l'identifiant. Un `start_index`
    /// hors limites produit une page vide dont le total reste celui de la
    /// collection.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmoaudiobook::{BookSummary, CatalogPager};
    ///
    /// let books = vec![BookSummary::new("2", "Beta"), BookSummary::new("1", "Alpha")];
    /// let page = CatalogPager::new().page(books, 0, 1);
    /// assert_eq!(page.items()[0].title, "Alpha");
    /// assert_eq!((page.index(), page.returned(), page.total()), (0, 1, 2));
    /// ```
    pub fn page<T: CatalogEntry>(
        &self,
        mut collection: Vec<T>,
        start_index: usize,
        page_size: usize,
    ) -> Page<T> {
        collection.sort_by(compare_entries);
        self.page_in_order(collection, start_index, page_size)
    }

    /// Découpe la collection en conservant son ordre
    pub fn page_in_order<T>(&self, collection: Vec<T>, start_index: usize, page_size: usize) -> Page<T> {
        let total = collection.len();
        if start_index >= total {
            return Page::empty(start_index, total);
        }

        let count = self.effective_page_size(page_size);
        let items: Vec<T> = collection.into_iter().skip(start_index).take(count).collect();

        tracing::trace!(
            start_index,
            returned = items.len(),
            total,
            "Catalog page computed"
        );

        Page {
            items,
            index: start_index,
            total,
        }
    }

    fn effective_page_size(&self, requested: usize) -> usize {
        if requested == 0 || requested > self.max_page_size {
            self.max_page_size
        } else {
            requested
        }
    }
}

fn compare_entries<T: CatalogEntry>(a: &T, b: &T) -> Ordering {
    a.sort_title()
        .cmp(b.sort_title())
        .then_with(|| a.entry_id().cmp(b.entry_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookSummary;

    fn books(titles: &[(&str, &str)]) -> Vec<BookSummary> {
        titles
            .iter()
            .map(|(id, title)| BookSummary::new(*id, *title))
            .collect()
    }

    #[test]
    fn test_empty_catalog() {
        let page = CatalogPager::new().page(Vec::<BookSummary>::new(), 0, 50);
        assert!(page.is_empty());
        assert_eq!(page.index(), 0);
        assert_eq!(page.returned(), 0);
        assert_eq!(page.total(), 0);
    }

    #[test]
    fn test_sorted_case_sensitive() {
        let collection = books(&[("1", "alpha"), ("2", "Beta"), ("3", "Alpha")]);
        let page = CatalogPager::new().page(collection, 0, 10);
        let titles: Vec<_> = page.items().iter().map(|b| b.title.as_str()).collect();
        // Les majuscules précèdent les minuscules en ordre lexicographique
        assert_eq!(titles, vec!["Alpha", "Beta", "alpha"]);
    }

    #[test]
    fn test_identical_titles_ordered_by_id() {
        let collection = books(&[("b", "Same"), ("a", "Same"), ("c", "Same")]);
        let page = CatalogPager::new().page(collection, 0, 10);
        let ids: Vec<_> = page.items().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_out_of_range_start() {
        let collection = books(&[("1", "A"), ("2", "B")]);
        let page = CatalogPager::new().page(collection, 5, 10);
        assert!(page.is_empty());
        assert_eq!(page.index(), 5);
        assert_eq!(page.total(), 2);
    }

    #[test]
    fn test_last_page_is_partial() {
        let collection = books(&[("1", "A"), ("2", "B"), ("3", "C")]);
        let page = CatalogPager::new().page(collection, 2, 2);
        assert_eq!(page.returned(), 1);
        assert_eq!(page.total(), 3);
        assert!(!page.has_more());
    }

    #[test]
    fn test_max_page_size_caps_requests() {
        let collection = books(&[("1", "A"), ("2", "B"), ("3", "C")]);
        let pager = CatalogPager::with_max_page_size(2);

        let page = pager.page(collection.clone(), 0, 0);
        assert_eq!(page.returned(), 2);
        assert!(page.has_more());

        let page = pager.page(collection, 0, 100);
        assert_eq!(page.returned(), 2);
    }

    #[test]
    fn test_zero_page_size_without_limit_returns_remaining() {
        let collection = books(&[("1", "A"), ("2", "B"), ("3", "C")]);
        let page = CatalogPager::new().page(collection, 1, 0);
        assert_eq!(page.returned(), 2);
    }

    #[test]
    fn test_page_in_order_keeps_order() {
        let page = CatalogPager::new().page_in_order(vec!["z", "a", "m"], 1, 5);
        assert_eq!(page.items(), &["a", "m"]);
        assert_eq!(page.total(), 3);
    }
}
