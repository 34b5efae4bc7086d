//! Forward-only event cursor over an XML document.
//!
//! [`Cursor`] is a thin adapter over `quick_xml::Reader` that holds exactly
//! one current event and exposes the four primitives the object builder
//! needs: event kind, tag name, attribute lookup, and advance. Self-closing
//! tags (`<pet/>`) are expanded into a start event followed by a synthetic
//! end event so that callers never see a third tag shape. Entity references
//! in character data (`&amp;`, `&#x41;`) are resolved and merged with the
//! surrounding text fragments into a single text event.
//!
//! The two stream-position helpers used by the builder live here as well:
//! [`Cursor::step_to_tag`] and [`Cursor::step_out_tag`].

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;

use crate::error::{BindError, Result};

/// The kind of event the cursor is currently positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An element start tag. Tag name and attributes are readable.
    Start,
    /// An element end tag. Tag name is readable.
    End,
    /// Character data (text or CDATA).
    Text,
    /// Anything ignorable: XML declaration, comment, processing
    /// instruction, doctype.
    Other,
    /// End of the document.
    Eof,
}

enum Node {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(String),
    Other,
    Eof,
}

/// A forward-only, non-rewindable cursor over the events of one document.
///
/// The cursor is positioned on its first event immediately after
/// construction. It is single-use: parsing one document is one cursor.
pub struct Cursor<'xml> {
    reader: Reader<&'xml [u8]>,
    buf: Vec<u8>,
    node: Node,
    /// Event read past the end of a text run while coalescing fragments.
    lookahead: Option<Node>,
    /// Synthetic end tag queued when the current start tag came from a
    /// self-closing element.
    pending_end: Option<String>,
}

impl<'xml> Cursor<'xml> {
    /// Creates a cursor over `doc`, positioned on the first event.
    pub fn new(doc: &'xml str) -> Result<Self> {
        let reader = Reader::from_str(doc);
        let mut cursor = Cursor {
            reader,
            buf: Vec::new(),
            node: Node::Other,
            lookahead: None,
            pending_end: None,
        };
        cursor.load()?;
        Ok(cursor)
    }

    /// The kind of the current event.
    pub fn kind(&self) -> EventKind {
        match self.node {
            Node::Start { .. } => EventKind::Start,
            Node::End { .. } => EventKind::End,
            Node::Text(_) => EventKind::Text,
            Node::Other => EventKind::Other,
            Node::Eof => EventKind::Eof,
        }
    }

    /// The local name of the current tag. Valid only on start and end tags;
    /// empty otherwise.
    pub fn tag_name(&self) -> &str {
        match &self.node {
            Node::Start { name, .. } | Node::End { name } => name,
            _ => "",
        }
    }

    /// Looks up an attribute value by name on the current start tag.
    ///
    /// Returns `None` when the attribute is absent or the cursor is not on a
    /// start tag. Attribute names match exactly; `xmlns` declarations were
    /// already dropped at capture time.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.node {
            Node::Start { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// The character data of the current text event; empty otherwise.
    pub fn text(&self) -> &str {
        match &self.node {
            Node::Text(content) => content,
            _ => "",
        }
    }

    /// Advances to the next event.
    ///
    /// Advancing when already positioned at end-of-document is an error:
    /// the stream cannot be read past its end.
    pub fn advance(&mut self) -> Result<()> {
        if matches!(self.node, Node::Eof) {
            return Err(BindError::Structure(
                "cannot advance past end of document".into(),
            ));
        }
        if let Some(node) = self.lookahead.take() {
            self.node = node;
            return Ok(());
        }
        if let Some(name) = self.pending_end.take() {
            self.node = Node::End { name };
            return Ok(());
        }
        self.load()
    }

    /// Reads the next node, coalescing consecutive text fragments. The
    /// tokenizer reports an entity reference as its own event, splitting
    /// `Ann &amp; Bob` into three pieces; callers see them as one text node.
    fn load(&mut self) -> Result<()> {
        let mut node = self.read_node()?;
        if let Node::Text(ref mut content) = node {
            loop {
                match self.read_node()? {
                    Node::Text(more) => content.push_str(&more),
                    other => {
                        self.lookahead = Some(other);
                        break;
                    }
                }
            }
        }
        self.node = node;
        Ok(())
    }

    fn read_node(&mut self) -> Result<Node> {
        self.buf.clear();
        Ok(match self.reader.read_event_into(&mut self.buf)? {
            Event::Start(e) => {
                let name = local_name(e.name().local_name().as_ref());
                let attributes = capture_attributes(&e)?;
                Node::Start { name, attributes }
            }
            Event::Empty(e) => {
                let name = local_name(e.name().local_name().as_ref());
                let attributes = capture_attributes(&e)?;
                self.pending_end = Some(name.clone());
                Node::Start { name, attributes }
            }
            Event::End(e) => Node::End {
                name: local_name(e.name().local_name().as_ref()),
            },
            Event::Text(t) => Node::Text(t.decode()?.into_owned()),
            Event::CData(c) => Node::Text(c.decode()?.into_owned()),
            Event::GeneralRef(e) => Node::Text(resolve_entity(&e.decode()?)?),
            Event::Eof => Node::Eof,
            _ => Node::Other,
        })
    }

    /// Steps forward past ignorable events until positioned on a start tag
    /// (returns `true`) or an end tag (returns `false`, cursor left on it).
    ///
    /// Reaching end-of-document before either is a structure error: the
    /// caller expected more content inside an open element.
    pub fn step_to_tag(&mut self) -> Result<bool> {
        loop {
            match self.kind() {
                EventKind::Start => return Ok(true),
                EventKind::End => return Ok(false),
                EventKind::Eof => {
                    return Err(BindError::Structure(
                        "unexpected end of document while scanning for a tag".into(),
                    ));
                }
                EventKind::Text | EventKind::Other => self.advance()?,
            }
        }
    }

    /// Skips past the end of the current element.
    ///
    /// On an end tag this just advances past it. On a start tag it discards
    /// the entire subtree by depth-counting nested tags until the matching
    /// end tag, then advances past that. On return the cursor sits on the
    /// next sibling, the parent's end tag, or end-of-document.
    pub fn step_out_tag(&mut self) -> Result<()> {
        if matches!(self.node, Node::End { .. }) {
            return self.advance();
        }
        let mut depth = 1usize;
        loop {
            self.advance()?;
            match self.node {
                Node::Start { .. } => depth += 1,
                Node::End { .. } => {
                    depth -= 1;
                    if depth == 0 {
                        return self.advance();
                    }
                }
                Node::Eof => {
                    return Err(BindError::Structure(
                        "unexpected end of document while skipping an element".into(),
                    ));
                }
                _ => {}
            }
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Resolves one entity reference, given its name without the `&`/`;`
/// delimiters: the predefined XML entities and decimal/hex character
/// references. Anything else is a structure fault of the document.
fn resolve_entity(raw: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_owned());
    }
    if let Some(rest) = raw.strip_prefix('#') {
        let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            rest.parse::<u32>().ok()
        };
        if let Some(ch) = code.and_then(char::from_u32) {
            return Ok(ch.to_string());
        }
    }
    Err(BindError::Structure(format!(
        "unresolvable entity reference &{raw};"
    )))
}

fn capture_attributes(start: &quick_xml::events::BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        // Namespace declarations are not data.
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let name = local_name(attr.key.local_name().as_ref());
        let value = attr.unescape_value()?.into_owned();
        attributes.push((name, value));
    }
    Ok(attributes)
}
