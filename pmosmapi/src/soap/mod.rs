//! # Module SOAP
//!
//! Codec SOAP minimal pour le Sonos Music API (SMAPI) : les lecteurs envoient
//! une enveloppe par appel, le service répond par une enveloppe contenant soit
//! `<{action}Response>`, soit un `Fault`.
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP complète
//! - [`SoapAction`] : Action extraite, avec ses arguments et l'en-tête `credentials`
//! - [`build_soap_response`] : Réponse imbriquée
//! - [`SoapFault`] : Erreur SOAP avec détail `SonosError`
//!
//! ## Example
//!
//! ```
//! use pmosmapi::soap::parse_soap_action;
//!
//! let body = r#"<?xml version="1.0"?>
//! <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
//!   <s:Body>
//!     <getMediaURI xmlns="http://www.sonos.com/Services/1.1">
//!       <id>li_1/file/42</id>
//!     </getMediaURI>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let action = parse_soap_action(body.as_bytes()).unwrap();
//! assert_eq!(action.name, "getMediaURI");
//! assert_eq!(action.arg("id"), Some("li_1/file/42"));
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{build_soap_response, parent_element, text_element};
pub use envelope::{Credentials, SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, SonosError, build_soap_fault};
pub use parser::{SoapAction, SoapParseError, parse_soap_action, parse_soap_envelope};

/// Namespace des enveloppes SOAP 1.1
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace du service SMAPI
pub const SMAPI_NAMESPACE: &str = "http://www.sonos.com/Services/1.1";

/// Codes de fault SMAPI
pub mod fault_codes {
    /// Requête mal formée ou argument invalide
    pub const CLIENT: &str = "s:Client";

    /// Action non implémentée par ce service
    pub const UNSUPPORTED_OPERATION: &str = "s:Client.UnsupportedOperation";

    /// Identifiant inconnu
    pub const ITEM_NOT_FOUND: &str = "s:Client.ItemNotFound";

    /// Le catalogue distant ne répond pas
    pub const SERVICE_UNAVAILABLE: &str = "s:Server.ServiceUnavailable";
}
