//! Conversion du modèle audiobook en éléments SMAPI
//!
//! L'ordre des enfants suit le schéma SMAPI : `index`, `count`, `total`,
//! puis les entrées, puis `positionInformation`.

use crate::soap::{parent_element, text_element};
use pmoaudiobook::{Book, BookSummary, Page, Part, PartPosition, TrackId};
use xmltree::{Element, XMLNode};

/// `mediaCollection` d'un livre dans la liste du catalogue
pub fn media_collection(book: &BookSummary) -> Element {
    let mut children = vec![
        text_element("id", &book.id),
        text_element("itemType", "audiobook"),
        text_element("title", &book.title),
    ];
    if let Some(author) = &book.author {
        children.push(text_element("author", author));
    }
    if let Some(summary) = &book.summary {
        children.push(text_element("summary", summary));
    }
    if let Some(cover) = &book.cover_uri {
        children.push(text_element("albumArtURI", cover));
    }
    children.push(text_element("canPlay", true));
    children.push(text_element("canResume", true));

    parent_element("mediaCollection", children)
}

/// `mediaMetadata` d'une partie de livre
pub fn track_metadata(book: &Book, part: &Part) -> Element {
    let mut track = Vec::new();
    if let Some(author) = book.first_author() {
        track.push(text_element("authorId", &author.id));
        track.push(text_element("author", &author.name));
    }
    // Durée en secondes entières
    track.push(text_element(
        "duration",
        part.playable_duration().round() as u64,
    ));
    track.push(text_element("book", &book.title));
    if let Some(cover) = &book.cover_uri {
        track.push(text_element("albumArtURI", cover));
    }
    track.push(text_element("canPlay", true));
    track.push(text_element("canAddToFavorites", false));

    let mut children = vec![
        text_element("id", book.track_id(part)),
        text_element("itemType", "track"),
        text_element("title", &part.title),
    ];
    if let Some(mime_type) = &part.mime_type {
        children.push(text_element("mimeType", mime_type));
    }
    children.push(parent_element("trackMetadata", track));

    parent_element("mediaMetadata", children)
}

/// `positionInformation` : où reprendre la lecture d'un livre
pub fn position_information(track: &TrackId, index: usize, position: &PartPosition) -> Element {
    parent_element(
        "positionInformation",
        [
            text_element("id", track),
            text_element("index", index),
            text_element("offsetMillis", position.offset_millis()),
        ],
    )
}

/// Contenu d'un `getMetadataResult`
///
/// Les compteurs viennent de la page : `count` est le nombre d'entrées
/// retournées, `total` la taille de la collection complète.
pub fn media_list(page: &Page<Element>, position: Option<Element>) -> Vec<XMLNode> {
    let mut nodes = vec![
        XMLNode::Element(text_element("index", page.index())),
        XMLNode::Element(text_element("count", page.returned())),
        XMLNode::Element(text_element("total", page.total())),
    ];
    nodes.extend(page.items().iter().cloned().map(XMLNode::Element));
    if let Some(position) = position {
        nodes.push(XMLNode::Element(position));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmoaudiobook::{Author, CatalogPager};

    fn text_of(elem: &Element, name: &str) -> Option<String> {
        elem.get_child(name)
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned())
    }

    fn sample_book() -> Book {
        let mut book = Book::new(
            "li_1",
            "Dune",
            vec![
                Part::new("101", 100.4).with_title("01.mp3").with_mime_type("audio/mpeg"),
                Part::new("102", 200.0).with_title("02.mp3"),
            ],
        );
        book.authors = vec![Author {
            id: "au_1".to_string(),
            name: "Frank Herbert".to_string(),
        }];
        book.cover_uri = Some("http://abs/api/items/li_1/cover?token=t".to_string());
        book
    }

    #[test]
    fn test_media_collection() {
        let mut summary = BookSummary::new("li_1", "Dune");
        summary.summary = Some("Sand.".to_string());
        let elem = media_collection(&summary);

        assert_eq!(elem.name, "mediaCollection");
        assert_eq!(text_of(&elem, "itemType").as_deref(), Some("audiobook"));
        assert_eq!(text_of(&elem, "summary").as_deref(), Some("Sand."));
        assert_eq!(text_of(&elem, "canResume").as_deref(), Some("true"));
        assert!(elem.get_child("albumArtURI").is_none());
    }

    #[test]
    fn test_track_metadata() {
        let book = sample_book();
        let elem = track_metadata(&book, &book.parts[0]);

        assert_eq!(text_of(&elem, "id").as_deref(), Some("li_1/file/101"));
        assert_eq!(text_of(&elem, "itemType").as_deref(), Some("track"));
        assert_eq!(text_of(&elem, "title").as_deref(), Some("01.mp3"));
        assert_eq!(text_of(&elem, "mimeType").as_deref(), Some("audio/mpeg"));

        let track = elem.get_child("trackMetadata").unwrap();
        assert_eq!(text_of(track, "authorId").as_deref(), Some("au_1"));
        assert_eq!(text_of(track, "author").as_deref(), Some("Frank Herbert"));
        assert_eq!(text_of(track, "duration").as_deref(), Some("100"));
        assert_eq!(text_of(track, "book").as_deref(), Some("Dune"));
        assert_eq!(text_of(track, "canAddToFavorites").as_deref(), Some("false"));
    }

    #[test]
    fn test_position_information() {
        let elem = position_information(
            &TrackId::new("li_1", "102"),
            1,
            &PartPosition::new("102", 50.0004),
        );
        assert_eq!(text_of(&elem, "id").as_deref(), Some("li_1/file/102"));
        assert_eq!(text_of(&elem, "index").as_deref(), Some("1"));
        assert_eq!(text_of(&elem, "offsetMillis").as_deref(), Some("50000"));
    }

    #[test]
    fn test_media_list_counters() {
        let books: Vec<BookSummary> = (0..5)
            .map(|i| BookSummary::new(format!("li_{i}"), format!("Book {i}")))
            .collect();
        let page = CatalogPager::new().page(books, 3, 10).map(|b| media_collection(&b));
        let nodes = media_list(&page, None);

        let names: Vec<_> = nodes
            .iter()
            .filter_map(|n| n.as_element())
            .map(|e| (e.name.clone(), e.get_text().map(|t| t.into_owned())))
            .take(3)
            .collect();
        assert_eq!(
            names,
            vec![
                ("index".to_string(), Some("3".to_string())),
                ("count".to_string(), Some("2".to_string())),
                ("total".to_string(), Some("5".to_string())),
            ]
        );
        assert_eq!(nodes.len(), 5);
    }
}
