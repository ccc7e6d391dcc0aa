//! Structures de données pour représenter les livres audio
//!
//! Toutes ces structures sont reconstruites à chaque requête à partir des
//! données fournies par le catalogue distant. Le cœur ne les modifie jamais
//! et ne les conserve pas entre deux appels.

use crate::error::BookError;
use std::fmt;
use std::str::FromStr;

/// Secondes écoulées (positions et durées)
pub type Seconds = f64;

/// Segment central des identifiants de piste (`{item}/file/{part}`)
const TRACK_ID_SEPARATOR: &str = "file";

/// Une partie jouable d'un livre (typiquement un fichier audio)
///
/// L'ordre des parties dans un [`Book`] est significatif : il définit le
/// temps cumulé du livre.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Identifiant de la partie (inode du fichier côté Audiobookshelf)
    pub id: String,
    /// Durée en secondes
    pub duration: Seconds,
    /// Titre affiché (nom du fichier)
    pub title: String,
    /// Type MIME du fichier audio
    pub mime_type: Option<String>,
}

impl Part {
    pub fn new(id: impl Into<String>, duration: Seconds) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            duration,
            mime_type: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Une partie de durée nulle (ou invalide) n'a aucune plage jouable
    pub fn is_playable(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Durée prise en compte dans le temps cumulé (0 pour une partie non jouable)
    pub fn playable_duration(&self) -> Seconds {
        if self.is_playable() { self.duration } else { 0.0 }
    }
}

/// Auteur d'un livre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// Un livre complet, avec ses parties ordonnées
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub authors: Vec<Author>,
    /// URL absolue de la couverture, déjà résolue par le catalogue
    pub cover_uri: Option<String>,
    pub parts: Vec<Part>,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: None,
            authors: Vec::new(),
            cover_uri: None,
            parts,
        }
    }

    /// Somme des durées de toutes les parties
    pub fn total_duration(&self) -> Seconds {
        self.parts.iter().map(Part::playable_duration).sum()
    }

    pub fn first_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// Recherche une partie par son identifiant
    pub fn part(&self, part_id: &str) -> Option<(usize, &Part)> {
        self.parts.iter().enumerate().find(|(_, p)| p.id == part_id)
    }

    /// Identifiant de piste d'une partie de ce livre
    pub fn track_id(&self, part: &Part) -> TrackId {
        TrackId::new(&self.id, &part.id)
    }

    /// Résumé utilisé pour les listes du catalogue
    pub fn summary_entry(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            author: self.first_author().map(|a| a.name.clone()),
            cover_uri: self.cover_uri.clone(),
        }
    }
}

/// Entrée de la liste d'une bibliothèque (sans les parties)
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub cover_uri: Option<String>,
}

impl BookSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: None,
            author: None,
            cover_uri: None,
        }
    }
}

/// Position relative à une partie: identifiant de partie et décalage
/// depuis le début de cette partie
#[derive(Debug, Clone, PartialEq)]
pub struct PartPosition {
    pub part_id: String,
    pub offset: Seconds,
}

impl PartPosition {
    pub fn new(part_id: impl Into<String>, offset: Seconds) -> Self {
        Self {
            part_id: part_id.into(),
            offset,
        }
    }

    /// Décalage en millisecondes entières, comme l'attendent les lecteurs
    pub fn offset_millis(&self) -> u64 {
        (self.offset * 1000.0).round().max(0.0) as u64
    }

    /// Construit une position depuis un décalage en millisecondes
    pub fn from_millis(part_id: impl Into<String>, millis: u64) -> Self {
        Self::new(part_id, millis as Seconds / 1000.0)
    }
}

/// Identifiant de piste exposé au lecteur: `{item}/file/{part}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId {
    pub item_id: String,
    pub part_id: String,
}

impl TrackId {
    pub fn new(item_id: impl Into<String>, part_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            part_id: part_id.into(),
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.item_id, TRACK_ID_SEPARATOR, self.part_id)
    }
}

impl FromStr for TrackId {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.splitn(3, '/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(item), Some(TRACK_ID_SEPARATOR), Some(part))
                if !item.is_empty() && !part.is_empty() =>
            {
                Ok(Self::new(item, part))
            }
            _ => Err(BookError::InvalidTrackId(s.to_string())),
        }
    }
}

/// Progression à transmettre au catalogue distant
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Durée totale du livre
    pub duration: Seconds,
    /// Position absolue
    pub current_time: Seconds,
    /// Fraction écoulée, bornée à [0, 1]
    pub progress: f64,
}

impl ProgressUpdate {
    pub fn new(current_time: Seconds, duration: Seconds) -> Self {
        let progress = if duration > 0.0 {
            (current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            duration,
            current_time,
            progress,
        }
    }
}
