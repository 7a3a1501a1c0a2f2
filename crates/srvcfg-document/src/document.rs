//! Parsed configuration file

use srvcfg_fs::ContentChecksum;

use crate::directive::Directive;
use crate::element::{XmlAttribute, XmlElement};
use crate::error::{Error, Result};

const UTF8_BOM: &str = "\u{feff}";

/// One physical configuration file parsed into an owned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    root: XmlElement,
    checksum: ContentChecksum,
}

impl ConfigDocument {
    /// Parse raw file content.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::Encoding {
            message: e.to_string(),
        })?;
        Self::build(text, ContentChecksum::of(bytes))
    }

    /// Parse text content.
    pub fn parse_str(text: &str) -> Result<Self> {
        Self::build(text, ContentChecksum::of(text.as_bytes()))
    }

    fn build(text: &str, checksum: ContentChecksum) -> Result<Self> {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            let pos = e.pos();
            Error::Malformed {
                line: pos.row,
                column: pos.col,
                message: e.to_string(),
            }
        })?;

        let root = convert(&doc, doc.root_element());
        tracing::trace!(root = %root.name, "Parsed document");
        Ok(Self { root, checksum })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Digest of the parsed content.
    pub fn checksum(&self) -> &ContentChecksum {
        &self.checksum
    }

    /// Top-level directives in document order.
    pub fn directives(&self) -> Vec<Directive> {
        self.root
            .children
            .iter()
            .filter_map(Directive::from_element)
            .collect()
    }

    /// Top-level configuration elements, directives excluded.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.root
            .children
            .iter()
            .filter(|e| !Directive::is_directive(&e.name))
    }
}

/// Pending work for one element during conversion.
struct Frame<'a, 'input> {
    element: XmlElement,
    pending: std::vec::IntoIter<roxmltree::Node<'a, 'input>>,
}

fn open_frame<'a, 'input>(
    doc: &roxmltree::Document<'input>,
    node: roxmltree::Node<'a, 'input>,
) -> Frame<'a, 'input> {
    let line_of = |pos: usize| doc.text_pos_at(pos).row;

    let mut element = XmlElement::new(node.tag_name().name(), line_of(node.range().start));
    element.attributes = node
        .attributes()
        .map(|attr| XmlAttribute {
            name: attr.name().to_string(),
            value: attr.value().to_string(),
            line: line_of(attr.range().start),
        })
        .collect();

    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let text = text.trim();
    if !text.is_empty() {
        element.text = Some(text.to_string());
    }

    let pending: Vec<_> = node.children().filter(|c| c.is_element()).collect();
    Frame {
        element,
        pending: pending.into_iter(),
    }
}

/// Copy a roxmltree node into an owned element without recursion.
fn convert<'a, 'input>(
    doc: &roxmltree::Document<'input>,
    node: roxmltree::Node<'a, 'input>,
) -> XmlElement {
    let mut stack = vec![open_frame(doc, node)];
    let mut finished = None;
    while let Some(top) = stack.last_mut() {
        if let Some(child) = top.pending.next() {
            stack.push(open_frame(doc, child));
            continue;
        }
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.element.children.push(done.element),
            None => finished = Some(done.element),
        }
    }
    finished.unwrap_or_else(|| XmlElement::new(node.tag_name().name(), 1))
}
