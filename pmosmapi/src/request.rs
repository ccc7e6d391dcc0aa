//! Requêtes SMAPI typées
//!
//! `getMetadata` sert à deux usages distincts selon son `id` : lister le
//! catalogue (`root`) ou ouvrir un livre. Les deux cas sont séparés ici pour
//! que le service n'ait jamais à réinterpréter un identifiant.

use crate::soap::{SoapAction, SoapFault, fault_codes};
use pmoaudiobook::TrackId;
use thiserror::Error;

/// Identifiant du conteneur racine du catalogue
pub const ROOT_ID: &str = "root";

/// Requête SMAPI décodée
#[derive(Debug, Clone, PartialEq)]
pub enum SmapiRequest {
    /// `getMetadata(id="root")` : une page de la bibliothèque
    ListCatalog { index: usize, count: usize },

    /// `getMetadata(id=<livre>)` : les parties d'un livre et la reprise
    ResolveItem {
        item_id: String,
        index: usize,
        count: usize,
    },

    /// `getMediaMetadata(id=<piste>)`
    GetMediaMetadata { track: TrackId },

    /// `getMediaURI(id=<piste>)`
    GetMediaUri { track: TrackId },

    /// `getLastUpdate`
    GetLastUpdate,
}

/// Requête impossible à décoder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid value for argument {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("Unknown track id: {0}")]
    InvalidTrackId(String),
}

impl From<RequestError> for SoapFault {
    fn from(err: RequestError) -> Self {
        let code = match &err {
            RequestError::UnsupportedOperation(_) => fault_codes::UNSUPPORTED_OPERATION,
            RequestError::MissingArgument(_) | RequestError::InvalidArgument { .. } => {
                fault_codes::CLIENT
            }
            RequestError::InvalidTrackId(_) => fault_codes::ITEM_NOT_FOUND,
        };
        SoapFault::new(code, err.to_string())
    }
}

fn required<'a>(action: &'a SoapAction, name: &'static str) -> Result<&'a str, RequestError> {
    action
        .arg(name)
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingArgument(name))
}

/// Argument numérique optionnel (0 si absent ou vide)
fn number(action: &SoapAction, name: &'static str) -> Result<usize, RequestError> {
    match action.arg(name) {
        None | Some("") => Ok(0),
        Some(value) => value.parse().map_err(|_| RequestError::InvalidArgument {
            name,
            value: value.to_string(),
        }),
    }
}

fn track(action: &SoapAction) -> Result<TrackId, RequestError> {
    let id = required(action, "id")?;
    id.parse()
        .map_err(|_| RequestError::InvalidTrackId(id.to_string()))
}

impl TryFrom<&SoapAction> for SmapiRequest {
    type Error = RequestError;

    fn try_from(action: &SoapAction) -> Result<Self, Self::Error> {
        match action.name.as_str() {
            "getMetadata" => {
                let id = required(action, "id")?;
                let index = number(action, "index")?;
                let count = number(action, "count")?;
                if id == ROOT_ID {
                    Ok(Self::ListCatalog { index, count })
                } else {
                    Ok(Self::ResolveItem {
                        item_id: id.to_string(),
                        index,
                        count,
                    })
                }
            }
            "getMediaMetadata" => Ok(Self::GetMediaMetadata {
                track: track(action)?,
            }),
            "getMediaURI" => Ok(Self::GetMediaUri {
                track: track(action)?,
            }),
            "getLastUpdate" => Ok(Self::GetLastUpdate),
            other => Err(RequestError::UnsupportedOperation(other.to_string())),
        }
    }
}
