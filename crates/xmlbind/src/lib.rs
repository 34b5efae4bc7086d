//! # xmlbind
//!
//! Declarative XML-to-object binding: annotate a type with its mapping
//! metadata and populate instances of it from a streaming sequence of XML
//! parse events, recursing through nested types as the annotations direct.
//!
//! ## Binding vocabulary
//!
//! | Binding | Declaration | Matches |
//! |---------|-------------|---------|
//! | Root tag | `#[xml(root = "person")]` on the type | the document's outer element (case-insensitive) |
//! | Attribute | `#[xml(attribute = "id")]` | a start-tag attribute; optional, default kept if absent |
//! | Element | `#[xml(element = "name")]` | exactly one required child element; scalar or nested type |
//! | Wrapped list | `#[xml(elements = "toys")]` | zero or more items inside a `<toys>` wrapper |
//! | Inline list | `#[xml(elements(inline))]` | item elements directly among siblings, recognized by the item type's own root tag |
//!
//! Names default to the lowerCamelCase form of the field identifier when
//! omitted. Unannotated fields are not bound and keep their `Default` value.
//! Unrecognized child elements are skipped as whole subtrees without
//! disturbing sibling traversal.
//!
//! ## Example
//!
//! ```
//! use xmlbind::FromXml;
//!
//! #[derive(FromXml, Default, Debug, PartialEq)]
//! #[xml(root = "pet")]
//! struct Pet {
//!     #[xml(attribute = "name")]
//!     name: String,
//! }
//!
//! #[derive(FromXml, Default, Debug)]
//! #[xml(root = "person")]
//! struct Person {
//!     #[xml(attribute = "id")]
//!     id: i32,
//!     #[xml(element = "name")]
//!     name: String,
//!     #[xml(elements(inline))]
//!     pets: Vec<Pet>,
//! }
//!
//! let doc = r#"<person id="7"><name>Ann</name><pet name="Rex"/><pet name="Ivy"/></person>"#;
//! let person: Person = xmlbind::from_str(doc).unwrap();
//! assert_eq!(person.id, 7);
//! assert_eq!(person.name, "Ann");
//! assert_eq!(person.pets.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! - [`Cursor`] adapts the quick-xml event stream into four primitives:
//!   event kind, tag name, attribute lookup, advance.
//! - [`Mapping`] is the explicit per-type binding table, built by the
//!   derive macro or by hand through its builder methods.
//! - [`build`] is the recursive descent deserializer: it consumes one
//!   element's attributes and children, dispatching named child tags to
//!   element, list, or skip paths, and validates that every declared
//!   binding was satisfied before the element closed.
//!
//! Parsing is single-threaded and synchronous; one call to [`from_str`]
//! owns one cursor over one document, and every failure aborts the whole
//! call with a [`BindError`]; no partial object is ever returned.

pub mod cursor;
pub mod de;
pub mod error;
pub mod mapping;

pub use cursor::{Cursor, EventKind};
pub use de::{build, from_slice, from_str};
pub use error::{BindError, Result};
pub use mapping::{FromElement, FromText, FromXml, Mapping};

/// Derives [`FromXml`] (and [`FromElement`]) from `#[xml(...)]` attributes.
pub use xmlbind_macro::FromXml;
