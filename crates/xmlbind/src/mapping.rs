//! The declarative mapping vocabulary and its per-type binding table.
//!
//! Instead of scanning a type for annotations at parse time, every bindable
//! type carries an explicit [`Mapping`]: a read-only table of attribute,
//! single-element and list bindings, each holding a plain `fn` pointer that
//! assigns into the target value. The `#[derive(FromXml)]` macro builds this
//! table from `#[xml(...)]` field attributes; it can equally be written by
//! hand.
//!
//! The table is pure data. It is re-derived on every visit of a type and
//! never mutated after construction; completeness tracking during a parse
//! happens in the builder, not here.

use crate::cursor::{Cursor, EventKind};
use crate::error::{BindError, Result};

/// A type that can be populated from XML under a declared mapping.
///
/// `Default` supplies the zero-initialized instance the builder fills in;
/// a type that cannot be default-constructed cannot be bound at all.
pub trait FromXml: Default + Sized {
    /// The declared root tag, present only for types that can stand as a
    /// document root or as the atom of an inline list.
    const ROOT: Option<&'static str> = None;

    /// The binding table for this type.
    fn mapping() -> Mapping<Self>;
}

/// A value buildable from the element currently under the cursor.
///
/// This is the recursion seam of the engine: scalars read their text
/// content, bound types delegate to the object builder. Implemented here
/// for the text scalars and generated by `#[derive(FromXml)]` for every
/// derived type.
pub trait FromElement: Sized {
    /// Builds one value. Precondition: cursor on the element's start tag.
    /// Postcondition: cursor positioned after its end tag.
    fn from_element(cursor: &mut Cursor<'_>) -> Result<Self>;
}

/// Text-to-scalar coercion for attribute values and scalar element content.
///
/// The coercion table is deliberately small: strings pass through, the
/// integer family parses. A field type without an impl cannot be bound,
/// which turns the "unregistered coercion" failure into a compile error.
pub trait FromText: Sized {
    /// Coerces `raw`; `name` is the binding name, used in error reports.
    fn from_text(name: &str, raw: &str) -> Result<Self>;
}

/// Assigns one coerced attribute value into the target.
pub type AttrFn<T> = fn(&mut T, &str) -> Result<()>;
/// Builds one child value from the cursor and assigns or appends it.
pub type ElementFn<T> = fn(&mut T, &mut Cursor<'_>) -> Result<()>;

pub struct AttributeBinding<T> {
    pub(crate) name: &'static str,
    pub(crate) assign: AttrFn<T>,
}

pub struct ElementBinding<T> {
    pub(crate) tag: &'static str,
    pub(crate) assign: ElementFn<T>,
}

/// How a list binding recognizes its items in the stream.
pub(crate) enum ListShape {
    /// Item elements appear directly among the parent's children; they are
    /// recognized by the atom type's own declared root tag.
    Inline { atom_root: Option<&'static str> },
    /// Item elements live inside a dedicated wrapper element.
    Wrapped { tag: &'static str },
}

pub struct ListBinding<T> {
    pub(crate) field: &'static str,
    pub(crate) shape: ListShape,
    pub(crate) append: ElementFn<T>,
}

impl<T> ListBinding<T> {
    /// The child tag this binding dispatches on.
    ///
    /// Inline bindings take it from the atom type's root declaration;
    /// wrapped bindings from their declared wrapper name. Either source
    /// being absent or empty is a metadata fault of the binding, not of the
    /// document.
    pub(crate) fn effective_tag(&self, type_name: &'static str) -> Result<&'static str> {
        let tag = match self.shape {
            ListShape::Inline { atom_root } => atom_root.ok_or(BindError::Metadata {
                type_name,
                field: self.field,
                reason: "inline list atom type declares no root tag",
            })?,
            ListShape::Wrapped { tag } => tag,
        };
        if tag.is_empty() {
            return Err(BindError::Metadata {
                type_name,
                field: self.field,
                reason: "list binding has an empty tag name",
            });
        }
        Ok(tag)
    }
}

/// The binding table of one target type.
pub struct Mapping<T> {
    root: Option<&'static str>,
    attributes: Vec<AttributeBinding<T>>,
    elements: Vec<ElementBinding<T>>,
    lists: Vec<ListBinding<T>>,
}

impl<T> Mapping<T> {
    /// Starts an empty table with the given root declaration.
    pub fn new(root: Option<&'static str>) -> Self {
        Mapping {
            root,
            attributes: Vec::new(),
            elements: Vec::new(),
            lists: Vec::new(),
        }
    }

    /// Declares an attribute binding. Attributes are optional: an absent
    /// attribute leaves the field at its default value.
    pub fn attribute(mut self, name: &'static str, assign: AttrFn<T>) -> Self {
        self.attributes.push(AttributeBinding { name, assign });
        self
    }

    /// Declares a required single-element binding for `tag`.
    pub fn element(mut self, tag: &'static str, assign: ElementFn<T>) -> Self {
        self.elements.push(ElementBinding { tag, assign });
        self
    }

    /// Declares an inline list binding. `atom_root` is the item type's root
    /// declaration (`<E as FromXml>::ROOT`); items are matched against it
    /// directly among the parent's children.
    pub fn list_inline(
        mut self,
        field: &'static str,
        atom_root: Option<&'static str>,
        append: ElementFn<T>,
    ) -> Self {
        self.lists.push(ListBinding {
            field,
            shape: ListShape::Inline { atom_root },
            append,
        });
        self
    }

    /// Declares a wrapped list binding: items are the children of a
    /// dedicated `tag` wrapper element.
    pub fn list_wrapped(
        mut self,
        field: &'static str,
        tag: &'static str,
        append: ElementFn<T>,
    ) -> Self {
        self.lists.push(ListBinding {
            field,
            shape: ListShape::Wrapped { tag },
            append,
        });
        self
    }

    pub(crate) fn root(&self) -> Option<&'static str> {
        self.root
    }

    pub(crate) fn attributes(&self) -> &[AttributeBinding<T>] {
        &self.attributes
    }

    pub(crate) fn elements(&self) -> &[ElementBinding<T>] {
        &self.elements
    }

    pub(crate) fn lists(&self) -> &[ListBinding<T>] {
        &self.lists
    }
}

/// Reads the text content of the element under the cursor and leaves the
/// cursor positioned after its end tag. Surrounding whitespace is trimmed
/// from the assembled content; whitespace between fragments is kept. Child
/// elements inside a scalar element are a structure fault.
fn read_text_content(cursor: &mut Cursor<'_>) -> Result<String> {
    let tag = cursor.tag_name().to_owned();
    cursor.advance()?;
    let mut content = String::new();
    loop {
        match cursor.kind() {
            EventKind::Text => {
                content.push_str(cursor.text());
                cursor.advance()?;
            }
            EventKind::Other => cursor.advance()?,
            EventKind::End => break,
            EventKind::Start => {
                return Err(BindError::Structure(format!(
                    "scalar element <{tag}> contains child elements"
                )));
            }
            EventKind::Eof => {
                return Err(BindError::Structure(format!(
                    "unexpected end of document inside <{tag}>"
                )));
            }
        }
    }
    cursor.advance()?;
    Ok(content.trim().to_owned())
}

impl FromText for String {
    fn from_text(_name: &str, raw: &str) -> Result<Self> {
        Ok(raw.to_owned())
    }
}

macro_rules! int_coercions {
    ($($ty:ty),* $(,)?) => {$(
        impl FromText for $ty {
            fn from_text(name: &str, raw: &str) -> Result<Self> {
                raw.trim().parse().map_err(|_| BindError::Coercion {
                    name: name.to_owned(),
                    value: raw.to_owned(),
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

int_coercions!(i32, i64, u32, u64);

macro_rules! text_elements {
    ($($ty:ty),* $(,)?) => {$(
        impl FromElement for $ty {
            fn from_element(cursor: &mut Cursor<'_>) -> Result<Self> {
                let tag = cursor.tag_name().to_owned();
                let content = read_text_content(cursor)?;
                <$ty as FromText>::from_text(&tag, &content)
            }
        }
    )*};
}

text_elements!(String, i32, i64, u32, u64);

/// Bare type name without its module path, for error reports.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_passes_through() {
        assert_eq!(String::from_text("x", "Ann").unwrap(), "Ann");
    }

    #[test]
    fn integer_parse_failure_names_binding_and_value() {
        let err = i32::from_text("id", "x").unwrap_err();
        match err {
            BindError::Coercion {
                name,
                value,
                target,
            } => {
                assert_eq!(name, "id");
                assert_eq!(value, "x");
                assert_eq!(target, "i32");
            }
            other => panic!("expected Coercion, got {other:?}"),
        }
    }

    #[test]
    fn integer_parse_tolerates_surrounding_whitespace() {
        assert_eq!(i64::from_text("n", " 42 ").unwrap(), 42);
    }

    #[test]
    fn scalar_element_reads_text_and_ends_after_close_tag() {
        let mut cur = Cursor::new("<name>Ann</name><next/>").unwrap();
        let value = String::from_element(&mut cur).unwrap();
        assert_eq!(value, "Ann");
        assert_eq!(cur.kind(), EventKind::Start);
        assert_eq!(cur.tag_name(), "next");
    }

    #[test]
    fn empty_scalar_element_yields_empty_string() {
        let mut cur = Cursor::new("<name/>").unwrap();
        assert_eq!(String::from_element(&mut cur).unwrap(), "");
    }

    #[test]
    fn scalar_element_rejects_child_elements() {
        let mut cur = Cursor::new("<name><b>Ann</b></name>").unwrap();
        assert!(matches!(
            String::from_element(&mut cur),
            Err(BindError::Structure(_))
        ));
    }

    #[test]
    fn inline_list_without_atom_root_is_a_metadata_error() {
        struct Holder;
        let binding: ListBinding<Holder> = ListBinding {
            field: "items",
            shape: ListShape::Inline { atom_root: None },
            append: |_, _| Ok(()),
        };
        assert!(matches!(
            binding.effective_tag("Holder"),
            Err(BindError::Metadata { field: "items", .. })
        ));
    }

    #[test]
    fn wrapped_list_with_empty_tag_is_a_metadata_error() {
        struct Holder;
        let binding: ListBinding<Holder> = ListBinding {
            field: "items",
            shape: ListShape::Wrapped { tag: "" },
            append: |_, _| Ok(()),
        };
        assert!(matches!(
            binding.effective_tag("Holder"),
            Err(BindError::Metadata { .. })
        ));
    }
}
