//! # Service SMAPI
//!
//! Relie les requêtes des lecteurs au catalogue distant et aux trois
//! composants du cœur :
//!
//! - la liste de la bibliothèque passe par [`CatalogPager`] ;
//! - l'ouverture d'un livre convertit la progression mémorisée avec
//!   [`PositionResolver`] ;
//! - les rapports de lecture sont reconvertis avec [`ProgressAccumulator`].
//!
//! Un catalogue indisponible ne produit jamais d'erreur côté lecteur pour les
//! listes : la réponse est simplement vide.

use crate::config_ext::{
    DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REPORT_INTERVAL_MILLIS,
    DEFAULT_SOAP_ENDPOINT, SonosConfigExt,
};
use crate::metadata::{media_collection, media_list, position_information, track_metadata};
use crate::request::SmapiRequest;
use crate::soap::{SoapFault, fault_codes, text_element};
use pmoaudiobook::{
    AudiobookCatalog, Book, BookError, BookSummary, CatalogPager, Page, Part, PartPosition,
    PositionResolver, ProgressAccumulator, ProgressUpdate, Resolution, TrackId,
};
use pmoconfig::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xmltree::XMLNode;

/// Paramètres du service
#[derive(Debug, Clone)]
pub struct SmapiSettings {
    /// URL publique du pont (annoncée dans le manifeste)
    pub public_url: String,
    /// Chemin HTTP du point d'entrée SOAP
    pub soap_endpoint: String,
    pub wsdl_file: Option<PathBuf>,
    /// Taille de page par défaut et maximale
    pub page_size: usize,
    pub poll_interval: u64,
    pub report_interval_millis: u64,
}

impl Default for SmapiSettings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".to_string(),
            soap_endpoint: DEFAULT_SOAP_ENDPOINT.to_string(),
            wsdl_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL_SECS,
            report_interval_millis: DEFAULT_REPORT_INTERVAL_MILLIS,
        }
    }
}

impl SmapiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            public_url: config.get_base_url(),
            soap_endpoint: config.get_sonos_soap_endpoint(),
            wsdl_file: config.get_sonos_wsdl_file(),
            page_size: config.get_sonos_page_size(),
            poll_interval: config.get_sonos_poll_interval(),
            report_interval_millis: config.get_sonos_report_interval_millis(),
        }
    }
}

/// Contenu d'un livre ouvert par le lecteur
#[derive(Debug, Clone)]
pub struct ItemListing {
    pub book: Book,
    /// Page des parties, dans l'ordre du livre
    pub tracks: Page<Part>,
    /// Point de reprise, si une progression est mémorisée
    pub resume: Option<Resolution>,
}

/// Réponse de `getLastUpdate`
#[derive(Debug, Clone, PartialEq)]
pub struct LastUpdate {
    pub catalog: String,
    pub favorites: String,
    pub poll_interval: u64,
    pub auto_refresh_enabled: bool,
}

/// Service SMAPI
#[derive(Debug, Clone)]
pub struct SmapiService {
    catalog: Arc<dyn AudiobookCatalog>,
    pager: CatalogPager,
    settings: SmapiSettings,
}

impl SmapiService {
    pub fn new(catalog: Arc<dyn AudiobookCatalog>, settings: SmapiSettings) -> Self {
        Self {
            pager: CatalogPager::with_max_page_size(settings.page_size),
            catalog,
            settings,
        }
    }

    pub fn from_config(catalog: Arc<dyn AudiobookCatalog>, config: &Config) -> Self {
        Self::new(catalog, SmapiSettings::from_config(config))
    }

    pub fn settings(&self) -> &SmapiSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Arc<dyn AudiobookCatalog> {
        &self.catalog
    }

    /// Une page de la bibliothèque, triée par titre
    ///
    /// `count == 0` demande la taille de page par défaut.
    pub async fn list_catalog(&self, index: usize, count: usize) -> Page<BookSummary> {
        let books = match self.catalog.library_items().await {
            Ok(Some(books)) => books,
            Ok(None) => {
                warn!("Library not found, returning an empty catalog");
                Vec::new()
            }
            Err(e) => {
                warn!("Catalog unavailable, returning an empty catalog: {}", e);
                Vec::new()
            }
        };
        self.pager.page(books, index, count)
    }

    /// Les parties d'un livre et le point de reprise
    ///
    /// Retourne `None` si le livre est absent ou si le catalogue ne répond pas.
    pub async fn resolve_item(
        &self,
        item_id: &str,
        index: usize,
        count: usize,
    ) -> Option<ItemListing> {
        let (book, progress) = tokio::join!(
            self.catalog.item(item_id),
            self.catalog.progress(item_id)
        );

        let book = match book {
            Ok(Some(book)) => book,
            Ok(None) => {
                debug!(item_id, "Item not found");
                return None;
            }
            Err(e) => {
                warn!(item_id, "Cannot fetch item: {}", e);
                return None;
            }
        };

        let resume = match progress {
            Ok(Some(seconds)) => match PositionResolver::resolve(&book.parts, seconds) {
                Ok(resolution) => {
                    if resolution.is_past_end() {
                        debug!(item_id, seconds, "Stored progress is past the end of the book");
                    }
                    Some(resolution)
                }
                Err(e) => {
                    warn!(item_id, seconds, "Cannot resolve stored progress: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(item_id, "Cannot fetch progress: {}", e);
                None
            }
        };

        let tracks = self.pager.page_in_order(book.parts.clone(), index, count);
        Some(ItemListing {
            book,
            tracks,
            resume,
        })
    }

    async fn fetch_book(&self, item_id: &str) -> Result<Book, BookError> {
        self.catalog
            .item(item_id)
            .await?
            .ok_or_else(|| BookError::not_found(format!("item {}", item_id)))
    }

    /// Le livre contenant une piste, et l'index de la piste dans ce livre
    pub async fn media_metadata(&self, track: &TrackId) -> Result<(Book, usize), BookError> {
        let book = self.fetch_book(&track.item_id).await?;
        let index = book
            .part(&track.part_id)
            .map(|(index, _)| index)
            .ok_or_else(|| BookError::not_found(track.to_string()))?;
        Ok((book, index))
    }

    pub fn media_uri(&self, track: &TrackId) -> String {
        self.catalog.media_uri(track)
    }

    /// Horodatages du catalogue : toujours « maintenant » pour forcer le rafraîchissement
    pub fn last_update(&self) -> LastUpdate {
        let now = chrono::Utc::now().timestamp_millis().to_string();
        LastUpdate {
            catalog: now.clone(),
            favorites: now,
            poll_interval: self.settings.poll_interval,
            auto_refresh_enabled: true,
        }
    }

    /// Convertit une position de lecture en progression absolue et l'enregistre
    pub async fn report_progress(
        &self,
        item_id: &str,
        position: &PartPosition,
    ) -> Result<ProgressUpdate, BookError> {
        let book = self.fetch_book(item_id).await?;
        let current_time = ProgressAccumulator::accumulate(&book.parts, position)?;
        let update = ProgressUpdate::new(current_time, book.total_duration());

        self.catalog.persist_progress(item_id, &update).await?;
        info!(
            item_id,
            current_time = update.current_time,
            progress = update.progress,
            "Progress stored"
        );
        Ok(update)
    }

    /// Exécute une requête SMAPI et produit le contenu de `{action}Result`
    pub async fn execute(&self, request: SmapiRequest) -> Result<Vec<XMLNode>, SoapFault> {
        match request {
            SmapiRequest::ListCatalog { index, count } => {
                let page = self
                    .list_catalog(index, count)
                    .await
                    .map(|book| media_collection(&book));
                Ok(media_list(&page, None))
            }

            SmapiRequest::ResolveItem {
                item_id,
                index,
                count,
            } => match self.resolve_item(&item_id, index, count).await {
                Some(ItemListing {
                    book,
                    tracks,
                    resume,
                }) => {
                    let position = resume.map(|resume| {
                        let track = TrackId::new(&book.id, &resume.position().part_id);
                        position_information(&track, resume.index(), resume.position())
                    });
                    let page = tracks.map(|part| track_metadata(&book, &part));
                    Ok(media_list(&page, position))
                }
                None => Ok(media_list(&Page::empty(index, 0), None)),
            },

            SmapiRequest::GetMediaMetadata { track } => {
                let (book, index) = self.media_metadata(&track).await.map_err(book_fault)?;
                Ok(vec![XMLNode::Element(track_metadata(
                    &book,
                    &book.parts[index],
                ))])
            }

            SmapiRequest::GetMediaUri { track } => {
                Ok(vec![XMLNode::Text(self.media_uri(&track))])
            }

            SmapiRequest::GetLastUpdate => {
                let update = self.last_update();
                Ok([
                    text_element("catalog", update.catalog),
                    text_element("favorites", update.favorites),
                    text_element("pollInterval", update.poll_interval),
                    text_element("autoRefreshEnabled", update.auto_refresh_enabled),
                ]
                .into_iter()
                .map(XMLNode::Element)
                .collect())
            }
        }
    }
}

/// Code `SonosError` joint aux faults `ItemNotFound`
pub const SONOS_ERROR_ITEM_NOT_FOUND: u32 = 404;

/// Traduit une erreur du cœur en fault SOAP
fn book_fault(err: BookError) -> SoapFault {
    match &err {
        BookError::NotFound(what) | BookError::InvalidTrackId(what) => {
            SoapFault::new(fault_codes::ITEM_NOT_FOUND, err.to_string())
                .with_sonos_error(SONOS_ERROR_ITEM_NOT_FOUND, what.clone())
        }
        BookError::UpstreamUnavailable(_) => {
            SoapFault::new(fault_codes::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => SoapFault::new(fault_codes::CLIENT, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCatalog, sample_books, silent_book};

    fn service(catalog: MemoryCatalog) -> (Arc<MemoryCatalog>, SmapiService) {
        let catalog = Arc::new(catalog);
        let service = SmapiService::new(catalog.clone(), SmapiSettings::default());
        (catalog, service)
    }

    fn child_text(nodes: &[XMLNode], name: &str) -> Option<String> {
        nodes
            .iter()
            .filter_map(|n| n.as_element())
            .find(|e| e.name == name)
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned())
    }

    #[tokio::test]
    async fn test_list_catalog_sorted_by_title() {
        let (_, service) = service(MemoryCatalog::new(sample_books()));

        let page = service.list_catalog(0, 0).await;
        assert_eq!(page.total(), 2);
        let titles: Vec<_> = page.items().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Anathem", "Dune"]);

        let page = service.list_catalog(1, 1).await;
        assert_eq!(page.returned(), 1);
        assert_eq!(page.items()[0].id, "li_dune");
    }

    #[tokio::test]
    async fn test_list_catalog_page_size_is_capped() {
        let catalog = Arc::new(MemoryCatalog::new(sample_books()));
        let settings = SmapiSettings {
            page_size: 1,
            ..Default::default()
        };
        let service = SmapiService::new(catalog, settings);

        assert_eq!(service.list_catalog(0, 0).await.returned(), 1);
        assert_eq!(service.list_catalog(0, 50).await.returned(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_catalog_gives_empty_lists() {
        let (_, service) = service(MemoryCatalog::unavailable());

        let page = service.list_catalog(0, 10).await;
        assert_eq!(page.total(), 0);
        assert!(service.resolve_item("li_dune", 0, 10).await.is_none());

        let nodes = service
            .execute(SmapiRequest::ResolveItem {
                item_id: "li_dune".to_string(),
                index: 0,
                count: 10,
            })
            .await
            .unwrap();
        assert_eq!(child_text(&nodes, "count").as_deref(), Some("0"));
        assert_eq!(child_text(&nodes, "total").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_resolve_item_with_progress() {
        let (_, service) = service(MemoryCatalog::new(sample_books()).with_progress("li_dune", 150.0));

        let listing = service.resolve_item("li_dune", 0, 0).await.unwrap();
        assert_eq!(listing.tracks.returned(), 2);
        let resume = listing.resume.unwrap();
        assert_eq!(resume.index(), 1);
        assert_eq!(resume.position().part_id, "b");
        assert_eq!(resume.position().offset_millis(), 50_000);

        let nodes = service
            .execute(SmapiRequest::ResolveItem {
                item_id: "li_dune".to_string(),
                index: 0,
                count: 0,
            })
            .await
            .unwrap();
        let position = nodes
            .iter()
            .filter_map(|n| n.as_element())
            .find(|e| e.name == "positionInformation")
            .unwrap();
        let text = |name: &str| {
            position
                .get_child(name)
                .and_then(|e| e.get_text())
                .map(|t| t.into_owned())
        };
        assert_eq!(text("id").as_deref(), Some("li_dune/file/b"));
        assert_eq!(text("index").as_deref(), Some("1"));
        assert_eq!(text("offsetMillis").as_deref(), Some("50000"));
    }

    fn position_of(nodes: &[XMLNode]) -> Option<&xmltree::Element> {
        nodes
            .iter()
            .filter_map(|n| n.as_element())
            .find(|e| e.name == "positionInformation")
    }

    #[tokio::test]
    async fn test_missing_library_gives_empty_catalog() {
        let (_, service) = service(MemoryCatalog::without_library(sample_books()));

        let page = service.list_catalog(0, 10).await;
        assert_eq!(page.total(), 0);
        assert_eq!(page.returned(), 0);

        let nodes = service
            .execute(SmapiRequest::ListCatalog { index: 0, count: 10 })
            .await
            .unwrap();
        assert_eq!(child_text(&nodes, "count").as_deref(), Some("0"));
        assert_eq!(child_text(&nodes, "total").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_resume_past_end_is_clamped_to_last_part() {
        let (_, service) =
            service(MemoryCatalog::new(sample_books()).with_progress("li_dune", 305.0));

        let listing = service.resolve_item("li_dune", 0, 0).await.unwrap();
        let resume = listing.resume.unwrap();
        assert!(resume.is_past_end());

        let nodes = service
            .execute(SmapiRequest::ResolveItem {
                item_id: "li_dune".to_string(),
                index: 0,
                count: 0,
            })
            .await
            .unwrap();
        let position = position_of(&nodes).unwrap();
        let text = |name: &str| {
            position
                .get_child(name)
                .and_then(|e| e.get_text())
                .map(|t| t.into_owned())
        };
        assert_eq!(text("id").as_deref(), Some("li_dune/file/b"));
        assert_eq!(text("index").as_deref(), Some("1"));
        assert_eq!(text("offsetMillis").as_deref(), Some("200000"));
    }

    #[tokio::test]
    async fn test_unresolvable_progress_has_no_resume_point() {
        let (_, service) =
            service(MemoryCatalog::new(vec![silent_book()]).with_progress("li_silence", 10.0));

        let listing = service.resolve_item("li_silence", 0, 0).await.unwrap();
        assert!(listing.resume.is_none());
        assert_eq!(listing.tracks.total(), 2);

        let nodes = service
            .execute(SmapiRequest::ResolveItem {
                item_id: "li_silence".to_string(),
                index: 0,
                count: 0,
            })
            .await
            .unwrap();
        assert!(position_of(&nodes).is_none());
        assert_eq!(child_text(&nodes, "total").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_resolve_item_without_progress() {
        let (_, service) = service(MemoryCatalog::new(sample_books()));

        let nodes = service
            .execute(SmapiRequest::ResolveItem {
                item_id: "li_dune".to_string(),
                index: 0,
                count: 0,
            })
            .await
            .unwrap();
        let entries = nodes
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.name == "mediaMetadata")
            .count();
        assert_eq!(entries, 2);
        assert!(
            !nodes
                .iter()
                .filter_map(|n| n.as_element())
                .any(|e| e.name == "positionInformation")
        );
    }

    #[tokio::test]
    async fn test_report_progress_is_persisted() {
        let (catalog, service) = service(MemoryCatalog::new(sample_books()));

        let update = service
            .report_progress("li_dune", &PartPosition::new("b", 50.0))
            .await
            .unwrap();
        assert_eq!(update.current_time, 150.0);
        assert_eq!(update.duration, 300.0);
        assert_eq!(update.progress, 0.5);

        let persisted = catalog.persisted();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].0, "li_dune");
        assert_eq!(persisted[0].1, update);
    }

    #[tokio::test]
    async fn test_report_progress_unknown_part() {
        let (catalog, service) = service(MemoryCatalog::new(sample_books()));

        let result = service
            .report_progress("li_dune", &PartPosition::new("zz", 1.0))
            .await;
        assert!(matches!(result, Err(BookError::NotFound(_))));
        assert!(catalog.persisted().is_empty());
    }

    #[tokio::test]
    async fn test_media_metadata_faults() {
        let (_, service) = service(MemoryCatalog::new(sample_books()));
        let fault = service
            .execute(SmapiRequest::GetMediaMetadata {
                track: TrackId::new("li_dune", "zz"),
            })
            .await
            .unwrap_err();
        assert_eq!(fault.fault_code, fault_codes::ITEM_NOT_FOUND);
        let detail = fault.sonos_error.as_ref().unwrap();
        assert_eq!(detail.code, SONOS_ERROR_ITEM_NOT_FOUND);
        assert_eq!(detail.exception_info, "li_dune/file/zz");

        let (_, service) = self::service(MemoryCatalog::unavailable());
        let fault = service
            .execute(SmapiRequest::GetMediaMetadata {
                track: TrackId::new("li_dune", "a"),
            })
            .await
            .unwrap_err();
        assert_eq!(fault.fault_code, fault_codes::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_media_uri_and_last_update() {
        let (_, service) = service(MemoryCatalog::new(sample_books()));

        let nodes = service
            .execute(SmapiRequest::GetMediaUri {
                track: TrackId::new("li_dune", "a"),
            })
            .await
            .unwrap();
        assert_eq!(
            nodes,
            vec![XMLNode::Text(
                "http://abs.test/api/items/li_dune/file/a?token=t".to_string()
            )]
        );

        let nodes = service.execute(SmapiRequest::GetLastUpdate).await.unwrap();
        assert_eq!(child_text(&nodes, "pollInterval").as_deref(), Some("10"));
        assert_eq!(child_text(&nodes, "autoRefreshEnabled").as_deref(), Some("true"));
        assert!(child_text(&nodes, "catalog").unwrap().parse::<i64>().is_ok());
    }
}
