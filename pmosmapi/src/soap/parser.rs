//! Parser SOAP pour les requêtes SMAPI

use super::{Credentials, SoapBody, SoapEnvelope, SoapHeader};
use std::collections::HashMap;
use std::io::BufReader;
use xmltree::Element;

/// Action SMAPI extraite d'une enveloppe SOAP
#[derive(Debug, Clone)]
pub struct SoapAction {
    /// Nom de l'action (ex: "getMetadata", "getMediaURI")
    pub name: String,

    /// Namespace de l'action (normalement `http://www.sonos.com/Services/1.1`)
    pub namespace: Option<String>,

    /// Arguments de l'action (enfants directs, valeur textuelle)
    pub args: HashMap<String, String>,

    /// Identification du lecteur, si l'en-tête la fournit
    pub credentials: Option<Credentials>,
}

impl SoapAction {
    /// Valeur d'un argument, espaces retirés
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(|v| v.trim())
    }
}

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("No action found in SOAP Body")]
    NoAction,
}

/// Parse une action SOAP à partir de bytes XML
pub fn parse_soap_action(xml: &[u8]) -> Result<SoapAction, SoapParseError> {
    let envelope = parse_soap_envelope(xml)?;
    let mut action = extract_action_from_body(&envelope.body)?;
    action.credentials = envelope.header.as_ref().and_then(SoapHeader::credentials);
    Ok(action)
}

fn find_child<'a>(root: &'a Element, suffix: &str) -> Option<&'a Element> {
    root.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|e| e.name.ends_with(suffix))
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    // Vérifier que c'est bien une Envelope
    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    // Extraire Header (optionnel)
    let header = find_child(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    // Extraire Body (obligatoire)
    let body = find_child(&root, "Body")
        .map(|e| SoapBody { content: e.clone() })
        .ok_or(SoapParseError::MissingBody)?;

    Ok(match header {
        Some(header) => SoapEnvelope::with_header(header, body),
        None => SoapEnvelope::new(body),
    })
}

/// Extrait l'action du corps SOAP
fn extract_action_from_body(body: &SoapBody) -> Result<SoapAction, SoapParseError> {
    // Format: <ns:actionName xmlns:ns="...">...</ns:actionName>
    let action_elem = body
        .content
        .children
        .iter()
        .find_map(|n| n.as_element())
        .ok_or(SoapParseError::NoAction)?;

    let mut args = HashMap::new();
    for child in &action_elem.children {
        if let Some(elem) = child.as_element() {
            let arg_value = elem.get_text().unwrap_or_default().to_string();
            args.insert(elem.name.clone(), arg_value);
        }
    }

    Ok(SoapAction {
        name: action_elem.name.clone(),
        namespace: action_elem.namespace.clone(),
        args,
        credentials: None,
    })
}
