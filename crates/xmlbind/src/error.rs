//! Error types for XML binding.
//!
//! Every error is terminal: a failure anywhere in a document aborts the whole
//! `from_str` call and no partial object is returned. XML documents are not
//! transiently invalid, so nothing here is retried.

use thiserror::Error;

/// The error type for all binding operations.
#[derive(Error, Debug)]
pub enum BindError {
    /// The document's structure does not match what the bindings expect:
    /// root tag mismatch, end of document while more content was expected,
    /// or non-element content where an element was required.
    #[error("invalid document structure: {0}")]
    Structure(String),

    /// A declared element or list binding was never matched before the
    /// enclosing element closed.
    #[error("required element <{tag}> missing while building {type_name}")]
    MissingElement {
        type_name: &'static str,
        tag: &'static str,
    },

    /// A text value could not be coerced to the bound field's type.
    #[error("cannot coerce {name}={value:?} to {target}")]
    Coercion {
        name: String,
        value: String,
        target: &'static str,
    },

    /// A binding declaration is unusable: an inline list whose atom type
    /// declares no root tag, or a wrapped list with an empty wrapper name.
    #[error("invalid binding metadata for {type_name}.{field}: {reason}")]
    Metadata {
        type_name: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    /// Tokenizer-level XML error.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute in a start tag.
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Byte-to-text decoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
