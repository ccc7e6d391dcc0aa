//! SOAP Faults pour SMAPI

use super::builder::{text_element, write_envelope};
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, PartialEq)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Client.ItemNotFound")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Détail Sonos optionnel
    pub sonos_error: Option<SonosError>,
}

/// Détail `SonosError` d'un fault
#[derive(Debug, Clone, PartialEq)]
pub struct SonosError {
    /// Code numérique propre au service
    pub code: u32,

    /// Message destiné aux journaux du lecteur
    pub exception_info: String,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            sonos_error: None,
        }
    }

    /// Ajoute un détail SonosError
    pub fn with_sonos_error(mut self, code: u32, exception_info: impl Into<String>) -> Self {
        self.sonos_error = Some(SonosError {
            code,
            exception_info: exception_info.into(),
        });
        self
    }

    /// Sérialise le fault dans une enveloppe SOAP
    pub fn to_xml(&self) -> Result<String, xmltree::Error> {
        build_soap_fault(
            &self.fault_code,
            &self.fault_string,
            self.sonos_error.as_ref(),
        )
    }
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "s:Client")
/// * `fault_string` - Message d'erreur
/// * `sonos_error` - Détail Sonos optionnel
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    sonos_error: Option<&SonosError>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new("s:Fault");
    fault
        .children
        .push(XMLNode::Element(text_element("faultcode", fault_code)));
    fault
        .children
        .push(XMLNode::Element(text_element("faultstring", fault_string)));

    if let Some(err) = sonos_error {
        let mut detail = Element::new("detail");
        detail
            .children
            .push(XMLNode::Element(text_element("SonosError", err.code)));
        detail.children.push(XMLNode::Element(text_element(
            "ExceptionInfo",
            &err.exception_info,
        )));
        fault.children.push(XMLNode::Element(detail));
    }

    write_envelope(fault)
}
