//! The recursive descent object builder.
//!
//! [`build`] consumes one element, attributes then named children, into a
//! fresh instance of the target type, recursing through [`FromElement`] for
//! nested types and list items. Unrecognized child elements are skipped as
//! whole subtrees, so sibling traversal never loses its position.

use tracing::{debug, trace};

use crate::cursor::{Cursor, EventKind};
use crate::error::{BindError, Result};
use crate::mapping::{FromXml, ListBinding, ListShape, short_type_name};

/// Parses a whole document into `T`.
///
/// The document's outer tag must match `T`'s declared root tag
/// (ASCII case-insensitively); the XML declaration, comments and doctype
/// before it are ignored.
///
/// # Example
///
/// ```
/// use xmlbind::FromXml;
///
/// #[derive(FromXml, Default, Debug, PartialEq)]
/// #[xml(root = "point")]
/// struct Point {
///     #[xml(attribute = "x")]
///     x: i32,
///     #[xml(attribute = "y")]
///     y: i32,
/// }
///
/// let point: Point = xmlbind::from_str(r#"<point x="3" y="4"/>"#).unwrap();
/// assert_eq!(point, Point { x: 3, y: 4 });
/// ```
pub fn from_str<T: FromXml>(doc: &str) -> Result<T> {
    let type_name = short_type_name::<T>();
    let root = T::mapping().root().ok_or(BindError::Metadata {
        type_name,
        field: "(root)",
        reason: "type declares no root tag",
    })?;

    let mut cursor = Cursor::new(doc)?;
    if !cursor.step_to_tag()? {
        return Err(BindError::Structure("document has no root element".into()));
    }
    let found = cursor.tag_name();
    if !found.eq_ignore_ascii_case(root) {
        return Err(BindError::Structure(format!(
            "root element <{found}> does not match declared root <{root}>"
        )));
    }
    build(&mut cursor)
}

/// Parses a whole document, given as bytes, into `T`.
pub fn from_slice<T: FromXml>(doc: &[u8]) -> Result<T> {
    let doc = std::str::from_utf8(doc)
        .map_err(|e| BindError::Structure(format!("invalid UTF-8 in document: {e}")))?;
    from_str(doc)
}

/// Builds one instance of `T` from the element under the cursor.
///
/// Precondition: the cursor is positioned on `T`'s opening start tag.
/// Postcondition: the cursor is positioned after the matching end tag, on
/// the next sibling's start tag, the parent's end tag, or end-of-document.
///
/// This is the recursion point of the engine; it is public so that nested
/// fragments can be built from a pre-positioned cursor directly.
pub fn build<T: FromXml>(cursor: &mut Cursor<'_>) -> Result<T> {
    let type_name = short_type_name::<T>();
    if cursor.kind() != EventKind::Start {
        return Err(BindError::Structure(format!(
            "expected a start tag to build {type_name}"
        )));
    }
    trace!(type_name, tag = cursor.tag_name(), "building element");

    let mapping = T::mapping();
    let mut value = T::default();

    // Attributes come off the still-open start tag. Absent attributes leave
    // the field at its default; only coercion can fail here.
    for binding in mapping.attributes() {
        if let Some(raw) = cursor.attribute(binding.name) {
            (binding.assign)(&mut value, raw)?;
        }
    }
    cursor.advance()?;

    // Resolve every list binding's dispatch tag up front, so that broken
    // binding metadata surfaces before any child is consumed.
    let list_tags: Vec<&'static str> = mapping
        .lists()
        .iter()
        .map(|binding| binding.effective_tag(type_name))
        .collect::<Result<_>>()?;

    let mut seen_elements = vec![false; mapping.elements().len()];
    let mut seen_lists = vec![false; mapping.lists().len()];

    while cursor.step_to_tag()? {
        let tag = cursor.tag_name().to_owned();

        // A satisfied single-element binding stops matching; a duplicate of
        // its tag falls through to the skip path below.
        if let Some(idx) = mapping
            .elements()
            .iter()
            .enumerate()
            .position(|(i, binding)| !seen_elements[i] && tag.eq_ignore_ascii_case(binding.tag))
        {
            seen_elements[idx] = true;
            (mapping.elements()[idx].assign)(&mut value, cursor)?;
            continue;
        }

        // List bindings keep matching: every later occurrence appends.
        if let Some(idx) = list_tags
            .iter()
            .position(|list_tag| tag.eq_ignore_ascii_case(list_tag))
        {
            seen_lists[idx] = true;
            parse_list(&mapping.lists()[idx], list_tags[idx], &mut value, cursor)?;
            continue;
        }

        debug!(type_name, tag = %tag, "skipping unrecognized element");
        cursor.step_out_tag()?;
    }

    for (binding, seen) in mapping.elements().iter().zip(&seen_elements) {
        if !seen {
            return Err(BindError::MissingElement {
                type_name,
                tag: binding.tag,
            });
        }
    }
    // A wrapped list's wrapper must appear; an inline list with zero atoms
    // is simply empty.
    for ((binding, tag), seen) in mapping.lists().iter().zip(&list_tags).zip(&seen_lists) {
        if !seen && matches!(binding.shape, ListShape::Wrapped { .. }) {
            return Err(BindError::MissingElement {
                type_name,
                tag: *tag,
            });
        }
    }

    // The scan loop left the cursor on the closing end tag.
    cursor.step_out_tag()?;
    trace!(type_name, "element complete");
    Ok(value)
}

/// Consumes one run of a list binding.
///
/// Wrapped: the cursor is on the wrapper start tag; every child element,
/// whatever its tag, is built as one item, and the wrapper is fully
/// consumed. Inline: the cursor is on what may already be the first atom;
/// items are appended while the tag matches, and the first non-matching tag
/// is left unconsumed for the caller's dispatch loop. Zero items is valid
/// for both shapes.
fn parse_list<T>(
    binding: &ListBinding<T>,
    tag: &'static str,
    value: &mut T,
    cursor: &mut Cursor<'_>,
) -> Result<()> {
    match binding.shape {
        ListShape::Inline { .. } => {
            while cursor.step_to_tag()? {
                if !cursor.tag_name().eq_ignore_ascii_case(tag) {
                    break;
                }
                (binding.append)(value, cursor)?;
            }
        }
        ListShape::Wrapped { .. } => {
            cursor.advance()?;
            while cursor.step_to_tag()? {
                (binding.append)(value, cursor)?;
            }
            cursor.step_out_tag()?;
        }
    }
    Ok(())
}
