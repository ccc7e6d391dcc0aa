//! # PMOSmapi
//!
//! Service SMAPI (Sonos Music API) de PMOSonos : expose un catalogue de
//! livres audio aux lecteurs Sonos.
//!
//! ## Actions prises en charge
//!
//! | Action             | Rôle                                              |
//! |--------------------|---------------------------------------------------|
//! | `getMetadata`      | Liste de la bibliothèque (`root`) ou d'un livre   |
//! | `getMediaMetadata` | Métadonnées d'une partie                          |
//! | `getMediaURI`      | URL de lecture d'une partie                       |
//! | `getLastUpdate`    | Horodatages de rafraîchissement                   |
//!
//! Les lecteurs rapportent ensuite leur position en JSON sur
//! `/playback/v2.1/report/timePlayed`, annoncé par `/manifest`.
//!
//! ## Utilisation
//!
//! ```ignore
//! use pmosmapi::{SmapiServerExt, SmapiService};
//!
//! let service = SmapiService::from_config(Arc::new(abs_client), &config);
//! server.register_smapi(Arc::new(service)).await;
//! ```

pub mod config_ext;
pub mod metadata;
pub mod reporting;
pub mod request;
pub mod server_ext;
pub mod service;
pub mod soap;

#[cfg(test)]
mod testing;

pub use config_ext::SonosConfigExt;
pub use reporting::{Manifest, TimePlayedItem, TimePlayedReport, TimePlayedResponse};
pub use request::{RequestError, SmapiRequest};
pub use server_ext::{SmapiServerExt, smapi_router};
pub use service::{ItemListing, LastUpdate, SmapiService, SmapiSettings};
pub use soap::SoapFault;
