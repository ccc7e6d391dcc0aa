//! Structures de l'enveloppe SOAP

use xmltree::Element;

/// Enveloppe SOAP complète
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// En-tête SOAP optionnel
    pub header: Option<SoapHeader>,

    /// Corps SOAP contenant l'action
    pub body: SoapBody,
}

/// En-tête SOAP
#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Contenu XML brut de l'en-tête
    pub content: Element,
}

/// Corps SOAP
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Contenu XML brut du corps
    pub content: Element,
}

/// Identification du lecteur transmise dans l'en-tête `credentials`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub device_id: Option<String>,
    pub device_provider: Option<String>,
    pub session_id: Option<String>,
    pub login_token: Option<String>,
    pub household_id: Option<String>,
}

impl SoapEnvelope {
    /// Crée une nouvelle enveloppe SOAP
    pub fn new(body: SoapBody) -> Self {
        Self { header: None, body }
    }

    /// Crée une nouvelle enveloppe avec header
    pub fn with_header(header: SoapHeader, body: SoapBody) -> Self {
        Self {
            header: Some(header),
            body,
        }
    }
}

fn child_text(elem: &Element, name: &str) -> Option<String> {
    elem.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl SoapHeader {
    /// Extrait l'élément `credentials` s'il est présent
    pub fn credentials(&self) -> Option<Credentials> {
        let creds = self.content.get_child("credentials")?;
        let login = creds.get_child("loginToken");

        Some(Credentials {
            device_id: child_text(creds, "deviceId"),
            device_provider: child_text(creds, "deviceProvider"),
            session_id: child_text(creds, "sessionId"),
            login_token: login.and_then(|l| child_text(l, "token")),
            household_id: login.and_then(|l| child_text(l, "householdId")),
        })
    }
}
