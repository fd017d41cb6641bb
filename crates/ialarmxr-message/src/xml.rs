//! Mapping between field trees and XML documents.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::trace;

use crate::error::{MessageError, Result};
use crate::node::{Field, Node};
use crate::path::ResponsePath;
use crate::scalar::Scalar;

/// Build a request document.
///
/// The first segment of `root_path` becomes the document element, the
/// remaining segments nest inside it, and `fields` are placed in the
/// deepest one. No XML declaration is written.
///
/// ```
/// use ialarmxr_message::{build_document, Node, Scalar};
///
/// let fields = Node::new().with("DevStatus", Scalar::type_enum("ARM", 0));
/// let xml = build_document("/Root/Host/SetAlarmStatus", &fields).unwrap();
/// assert_eq!(
///     xml,
///     "<Root><Host><SetAlarmStatus><DevStatus>TYP,ARM|0</DevStatus></SetAlarmStatus></Host></Root>"
/// );
/// ```
pub fn build_document(root_path: &str, fields: &Node) -> Result<String> {
    let path = ResponsePath::parse(root_path);
    let names = path
        .names()
        .ok_or_else(|| MessageError::Malformed(format!("index in request path {root_path}")))?;
    let Some((leaf, outer)) = names.split_last() else {
        return Err(MessageError::Malformed("empty request path".to_string()));
    };

    let mut writer = Writer::new(Vec::new());
    for name in outer {
        start(&mut writer, name)?;
    }
    write_node(&mut writer, leaf, fields)?;
    for name in outer.iter().rev() {
        end(&mut writer, name)?;
    }

    let xml = String::from_utf8(writer.into_inner())
        .map_err(|err| MessageError::InvalidUtf8(err.utf8_error()))?;
    trace!(path = %path, len = xml.len(), "built request document");
    Ok(xml)
}

fn write_field(writer: &mut Writer<Vec<u8>>, name: &str, field: &Field) -> Result<()> {
    match field {
        Field::Scalar(None) => empty(writer, name),
        Field::Scalar(Some(value)) => {
            let text = value.encode()?;
            start(writer, name)?;
            if !text.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))))
                    .map_err(xml_err)?;
            }
            end(writer, name)
        }
        Field::Node(node) => write_node(writer, name, node),
        Field::List(items) => items
            .iter()
            .try_for_each(|item| write_field(writer, name, item)),
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> Result<()> {
    if node.is_empty() {
        return empty(writer, name);
    }
    start(writer, name)?;
    for (child, field) in node.iter() {
        write_field(writer, child, field)?;
    }
    end(writer, name)
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn empty(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::Empty(BytesStart::new(name)))
        .map_err(xml_err)
}

fn xml_err(err: impl std::fmt::Display) -> MessageError {
    MessageError::Xml(err.to_string())
}

struct OpenElement {
    name: String,
    node: Node,
    text: String,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            node: Node::new(),
            text: String::new(),
        }
    }

    /// Elements with children become nodes; text leaves are decoded as
    /// scalars; anything else is an empty leaf.
    fn finish(self) -> (String, Field) {
        let field = if !self.node.is_empty() {
            Field::Node(self.node)
        } else if self.text.is_empty() {
            Field::Scalar(None)
        } else {
            Field::Scalar(Some(Scalar::decode(&self.text)))
        };
        (self.name, field)
    }
}

/// Parse a response payload into a tree rooted above the document element.
///
/// Repeated sibling elements are collected into [`Field::List`]. Text around
/// child elements is dropped, and surrounding whitespace is trimmed.
pub fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![OpenElement::new(String::new())];
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(element) => {
                stack.push(OpenElement::new(element_name(&element)?));
            }
            Event::Empty(element) => {
                let name = element_name(&element)?;
                if let Some(parent) = stack.last_mut() {
                    parent.node.append(name, Field::Scalar(None));
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_err)?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(text);
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(MessageError::Malformed("unbalanced end tag".to_string()));
                }
                if let Some(open) = stack.pop() {
                    let (name, field) = open.finish();
                    if let Some(parent) = stack.last_mut() {
                        parent.node.append(name, field);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(MessageError::Malformed("unclosed element".to_string()));
    }
    let document = stack.pop().map(|open| open.node).unwrap_or_default();
    if document.is_empty() {
        return Err(MessageError::Malformed("document has no root element".to_string()));
    }
    Ok(document)
}

/// [`parse_document`] for raw payload bytes.
pub fn parse_document_bytes(payload: &[u8]) -> Result<Node> {
    parse_document(std::str::from_utf8(payload)?)
}

fn element_name(element: &BytesStart<'_>) -> Result<String> {
    Ok(std::str::from_utf8(element.name().as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::MacAddress;

    #[test]
    fn builds_nested_request() {
        let fields = Node::new()
            .with("DevStatus", Scalar::type_enum("ARM", 0));
        let xml = build_document("/Root/Host/SetAlarmStatus", &fields).unwrap();
        assert_eq!(
            xml,
            "<Root><Host><SetAlarmStatus><DevStatus>TYP,ARM|0</DevStatus></SetAlarmStatus></Host></Root>"
        );
    }

    #[test]
    fn null_fields_are_empty_elements() {
        let fields = Node::new()
            .with_null("Addr")
            .with_null("Flag")
            .with_null("Err");
        let xml = build_document("/Root/Pair/P2p", &fields).unwrap();
        assert_eq!(
            xml,
            "<Root><Pair><P2p><Addr/><Flag/><Err/></P2p></Pair></Root>"
        );
    }

    #[test]
    fn empty_field_set_is_empty_element() {
        let xml = build_document("Root/Host/GetLog", &Node::new()).unwrap();
        assert_eq!(xml, "<Root><Host><GetLog/></Host></Root>");
    }

    #[test]
    fn lists_flatten_into_repeated_siblings() {
        let items = vec![
            Node::new().with("Id", Scalar::int(1)),
            Node::new().with("Id", Scalar::int(2)),
        ];
        let fields = Node::new().with("Zone", items).with_null("Err");
        let xml = build_document("/Root/Host/SetByWay", &fields).unwrap();
        assert_eq!(
            xml,
            "<Root><Host><SetByWay><Zone><Id>S32,0,0|1</Id></Zone><Zone><Id>S32,0,0|2</Id></Zone><Err/></SetByWay></Host></Root>"
        );
    }

    #[test]
    fn escapes_markup_in_text() {
        let fields = Node::new().with("Pwd", Scalar::password("a<b&c"));
        let xml = build_document("/Root/Pair/Client", &fields).unwrap();
        assert!(xml.contains("<Pwd>PWD,5|a&lt;b&amp;c</Pwd>"), "{xml}");
    }

    #[test]
    fn rejects_unusable_request_paths() {
        assert!(matches!(
            build_document("/", &Node::new()),
            Err(MessageError::Malformed(_))
        ));
        assert!(matches!(
            build_document("/Root/0/Host", &Node::new()),
            Err(MessageError::Malformed(_))
        ));
    }

    #[test]
    fn parses_response_with_typed_leaves() {
        let xml = "<?xml version=\"1.0\"?>\n<Root><Host><GetNet>\
                   <Mac>MAC,17|00:1A:2B:3C:4D:5E</Mac>\
                   <Name>STR,4|home</Name>\
                   <Ip/>\
                   <Err>ERR|00</Err>\
                   </GetNet></Host></Root>";
        let doc = parse_document(xml).unwrap();
        let net = doc.select("/Root/Host/GetNet").unwrap().as_node().unwrap();
        assert_eq!(
            net.get("Mac").and_then(Field::as_scalar).and_then(Scalar::as_mac),
            Some(MacAddress([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]))
        );
        assert_eq!(net.get("Name").and_then(Field::as_str), Some("home"));
        assert!(net.get("Ip").unwrap().is_null());
        assert_eq!(
            doc.select("/Root/Host/GetNet/Err")
                .and_then(Field::as_scalar)
                .and_then(Scalar::error_code),
            Some(0)
        );
    }

    #[test]
    fn parses_repeated_siblings_as_list() {
        let xml = "<Root><Host><List><Item>S32,0,0|4</Item><Item>S32,0,0|8</Item></List></Host></Root>";
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.select("/Root/Host/List/Item/1").and_then(Field::as_i32), Some(8));
    }

    #[test]
    fn whitespace_between_elements_is_ignored() {
        let xml = "<Root>\n  <Host>\n    <Ver>STR,5|1.0.2</Ver>\n  </Host>\n</Root>\n";
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.select("/Root/Host/Ver").and_then(Field::as_str), Some("1.0.2"));
    }

    #[test]
    fn unescapes_entities() {
        let doc = parse_document("<Root><N>STR,3|a&amp;b</N></Root>").unwrap();
        assert_eq!(doc.select("/Root/N").and_then(Field::as_str), Some("a&b"));
    }

    #[test]
    fn unencodable_values_fail_the_build() {
        let fields = Node::new().with("DevStatus", Scalar::type_enum("ARM AWAY", 0));
        assert!(matches!(
            build_document("/Root/Host/SetAlarmStatus", &fields),
            Err(MessageError::Unencodable(_))
        ));
    }

    #[test]
    fn request_document_parses_back() {
        let fields = Node::new()
            .with("Id", Scalar::string("panel-01"))
            .with("Offset", Scalar::int(0))
            .with_null("Err");
        let xml = build_document("/Root/Pair/Push", &fields).unwrap();
        let doc = parse_document(&xml).unwrap();
        assert_eq!(
            doc.select("/Root/Pair/Push").and_then(Field::as_node),
            Some(&fields)
        );
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(parse_document("<Root><Host></Root>").is_err());
        assert!(parse_document("<Root><Host>").is_err());
        assert!(parse_document("").is_err());
        assert!(parse_document_bytes(&[0x3c, 0xff, 0xfe]).is_err());
    }
}
