//! Schema Document
//!
//! A small element tree over `quick-xml` events. The compiler never looks
//! at raw markup: it walks this tree by path, reads attributes and reads
//! child text.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CompileError, Result};

/// One element of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name (local name, namespace prefix stripped)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Look up an attribute by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute that must be present.
    ///
    /// `context` names the element for the error message (e.g. "entity Genome").
    pub fn required_attr(&self, name: &str, context: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            CompileError::MalformedSchema(format!(
                "<{}> for {} is missing attribute '{}'",
                self.name, context, name
            ))
        })
    }

    /// All descendants matching a slash-separated path of tag names
    pub fn find(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(move |c| c.name == segment))
                .collect();
        }
        current
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == tag)
    }

    /// Trimmed text of the first child with the given tag, empty when absent
    pub fn child_text(&self, tag: &str) -> String {
        self.child(tag)
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default()
    }
}

/// A parsed schema document
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a document from a string
    pub fn parse(xml: &str) -> Result<Self> {
        parse_tree(xml)
            .map(|root| Self { root })
            .map_err(|message| CompileError::Parse {
                path: None,
                message,
            })
    }

    /// Read and parse a document from disk
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        parse_tree(&content)
            .map(|root| Self { root })
            .map_err(|message| CompileError::Parse {
                path: Some(path.to_path_buf()),
                message,
            })
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Shorthand for `root().find(path)`
    pub fn find(&self, path: &str) -> Vec<&Element> {
        self.root.find(path)
    }
}

fn element_from(start: &BytesStart<'_>) -> std::result::Result<Element, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{}>: {}", name, e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value on <{}>: {}", name, e))?
            .to_string();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Default::default()
    })
}

fn parse_tree(xml: &str) -> std::result::Result<Element, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from(&e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or("unbalanced closing tag")?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                if let Some(top) = stack.last_mut() {
                    push_text(&mut top.text, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                if let Some(top) = stack.last_mut() {
                    push_text(&mut top.text, &String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element <{}>", element.name)),
    }
    Ok(())
}

fn push_text(buf: &mut String, text: &str) {
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
        <Database>
          <Entities>
            <Entity name="Genome" keyType="string">
              <Notes>A genome &amp; its features.</Notes>
              <Fields>
                <Field name="pegs" type="counter" />
                <Field name="name" type="string"><Notes>Scientific name</Notes></Field>
              </Fields>
            </Entity>
            <Entity name="Feature" keyType="string" />
          </Entities>
        </Database>"#;

    #[test]
    fn test_find_by_path() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.root().name, "Database");

        let entities = doc.find("Entities/Entity");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].attr("name"), Some("Genome"));
        assert_eq!(entities[1].attr("keyType"), Some("string"));

        let fields = entities[0].find("Fields/Field");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].child_text("Notes"), "Scientific name");
    }

    #[test]
    fn test_child_text_unescapes_and_defaults() {
        let doc = Document::parse(SAMPLE).unwrap();
        let entities = doc.find("Entities/Entity");
        assert_eq!(entities[0].child_text("Notes"), "A genome & its features.");
        assert_eq!(entities[1].child_text("Notes"), "");
    }

    #[test]
    fn test_required_attr_missing() {
        let doc = Document::parse(r#"<Entity keyType="string"/>"#).unwrap();
        let err = doc.root().required_attr("name", "entity #1").unwrap_err();
        assert!(matches!(err, CompileError::MalformedSchema(_)));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Document::parse("<Database><Entities></Database>"),
            Err(CompileError::Parse { .. })
        ));
        assert!(matches!(
            Document::parse(""),
            Err(CompileError::Parse { .. })
        ));
    }
}
