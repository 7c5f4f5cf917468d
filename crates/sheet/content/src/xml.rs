//! Minimal element tree over `quick-xml` events.
//!
//! Template and character documents are small, so both are read into an
//! [`XmlElement`] tree first and interpreted afterwards. Text is kept
//! verbatim, except that whitespace-only text between elements is dropped.
//! Comments and processing instructions are dropped too.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element (<{0}>)")]
    MultipleRoots(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("failed to write XML: {0}")]
    Write(#[source] quick_xml::Error),
}

/// One element with its attributes, text and children, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, `None` when missing or empty.
    pub fn non_empty_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).filter(|v| !v.is_empty())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Every element below this one with the given name, depth first.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    // ===== reading =====

    pub fn parse(input: &str) -> Result<XmlElement, XmlError> {
        let mut reader = Reader::from_str(input);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|source| XmlError::Syntax {
                position: reader.buffer_position(),
                source,
            })?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let name = std::str::from_utf8(end.name().as_ref())?.to_string();
                    let element = stack.pop().ok_or(XmlError::UnexpectedEnd(name))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|source| XmlError::Syntax {
                        position: reader.buffer_position(),
                        source,
                    })?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(std::str::from_utf8(&data)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::NoRoot)
    }

    // ===== writing =====

    /// Serializes the tree with an XML declaration and two-space indentation.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(XmlError::Write)?;
        self.write_to(&mut writer)?;

        let bytes = writer.into_inner();
        Ok(String::from_utf8(bytes).map_err(|e| e.utf8_error())?)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let start = BytesStart::new(self.name.as_str()).with_attributes(
            self.attributes
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        if self.text.is_empty() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(XmlError::Write);
        }

        writer
            .write_event(Event::Start(start))
            .map_err(XmlError::Write)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(XmlError::Write)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(XmlError::Write)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(|source| XmlError::Syntax {
                position: 0,
                source,
            })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots(element.name));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_attributes_and_text() {
        let root = XmlElement::parse(
            r#"<?xml version="1.0"?>
            <SoulCreator version="0.8">
              <species>Vampire</species>
              <armor/>
              <!-- ignored -->
              <description>Tall &amp; pale</description>
            </SoulCreator>"#,
        )
        .unwrap();

        assert_eq!(root.name, "SoulCreator");
        assert_eq!(root.attribute("version"), Some("0.8"));
        assert_eq!(root.child("species").unwrap().text(), "Vampire");
        assert_eq!(root.child("description").unwrap().text(), "Tall & pale");
        assert_eq!(root.children.len(), 3);
    }

    #[test]
    fn multi_line_text_keeps_its_whitespace() {
        let description = "  First line.\n\n    Indented second line.  ";
        let tree = XmlElement::new("character")
            .with_child(XmlElement::new("description").with_text(description))
            .with_child(XmlElement::new("eyes").with_text("grey"));

        let text = tree.to_xml_string().unwrap();
        let parsed = XmlElement::parse(&text).unwrap();
        assert_eq!(parsed.child("description").unwrap().text(), description);
        assert_eq!(parsed.child("eyes").unwrap().text(), "grey");
        assert!(parsed.text().is_empty());
    }

    #[test]
    fn descendants_search_all_depths_in_order() {
        let root = XmlElement::parse(
            "<a><b><trait name='x'/></b><trait name='y'><trait name='z'/></trait></a>",
        )
        .unwrap();
        let names: Vec<_> = root
            .descendants("trait")
            .into_iter()
            .filter_map(|e| e.attribute("name"))
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn broken_documents_are_errors() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(matches!(
            XmlElement::parse("<a/><b/>"),
            Err(XmlError::MultipleRoots(_))
        ));
    }

    #[test]
    fn written_tree_parses_back() {
        let tree = XmlElement::new("root")
            .with_attribute("version", "0.8")
            .with_child(XmlElement::new("name").with_text("<Bob>"))
            .with_child(XmlElement::new("empty"));

        let text = tree.to_xml_string().unwrap();
        assert!(text.starts_with("<?xml"));
        assert_eq!(XmlElement::parse(&text).unwrap(), tree);
    }
}
