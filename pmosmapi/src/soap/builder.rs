//! Construction de réponses SOAP

use super::{SMAPI_NAMESPACE, SOAP_ENVELOPE_NAMESPACE};
use xmltree::{Element, XMLNode};

/// Élément feuille `<name>value</name>`
pub fn text_element(name: &str, value: impl ToString) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(value.to_string()));
    elem
}

/// Élément `<name>` contenant les enfants donnés, dans l'ordre
pub fn parent_element(name: &str, children: impl IntoIterator<Item = Element>) -> Element {
    let mut elem = Element::new(name);
    elem.children
        .extend(children.into_iter().map(XMLNode::Element));
    elem
}

pub(crate) fn write_envelope(body_child: Element) -> Result<String, xmltree::Error> {
    // Body
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        SOAP_ENVELOPE_NAMESPACE.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Construit une réponse SMAPI
///
/// Produit `<{action}Response xmlns="..."><{action}Result>…</{action}Result></{action}Response>`.
///
/// # Arguments
///
/// * `action` - Nom de l'action (ex: "getMetadata")
/// * `result` - Contenu de l'élément `{action}Result` (éléments ou texte)
pub fn build_soap_response(action: &str, result: Vec<XMLNode>) -> Result<String, xmltree::Error> {
    let mut result_elem = Element::new(&format!("{}Result", action));
    result_elem.children = result;

    let mut response_elem = Element::new(&format!("{}Response", action));
    response_elem
        .attributes
        .insert("xmlns".to_string(), SMAPI_NAMESPACE.to_string());
    response_elem.children.push(XMLNode::Element(result_elem));

    write_envelope(response_elem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nested_response() {
        let result = vec![
            XMLNode::Element(text_element("index", 0)),
            XMLNode::Element(text_element("count", 1)),
            XMLNode::Element(parent_element(
                "mediaCollection",
                [text_element("id", "li_1"), text_element("title", "Dune & co")],
            )),
        ];

        let xml = build_soap_response("getMetadata", result).unwrap();

        assert!(xml.contains("<getMetadataResponse xmlns=\"http://www.sonos.com/Services/1.1\">"));
        assert!(xml.contains("<getMetadataResult>"));
        assert!(xml.contains("<index>0</index>"));
        assert!(xml.contains("<id>li_1</id>"));
        assert!(xml.contains("<title>Dune &amp; co</title>"));
        assert!(xml.contains("xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\""));
    }

    #[test]
    fn test_build_text_result() {
        let xml = build_soap_response(
            "getMediaURI",
            vec![XMLNode::Text("http://abs/api/items/li_1/file/2?token=t".to_string())],
        )
        .unwrap();

        assert!(xml.contains("<getMediaURIResult>http://abs/api/items/li_1/file/2?token=t</getMediaURIResult>"));
    }
}
