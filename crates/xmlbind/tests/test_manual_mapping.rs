//! Binding through hand-written mapping tables, without the derive.

use pretty_assertions::assert_eq;
use xmlbind::{
    BindError, Cursor, EventKind, FromElement, FromText, FromXml, Mapping, Result, build,
};

#[derive(Default, Debug, PartialEq)]
struct Endpoint {
    host: String,
    port: u32,
}

impl FromXml for Endpoint {
    const ROOT: Option<&'static str> = Some("endpoint");

    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new(Self::ROOT)
            .attribute("host", |value: &mut Self, raw: &str| {
                value.host = FromText::from_text("host", raw)?;
                Ok(())
            })
            .element("port", |value: &mut Self, cursor: &mut Cursor<'_>| {
                value.port = FromElement::from_element(cursor)?;
                Ok(())
            })
    }
}

impl FromElement for Endpoint {
    fn from_element(cursor: &mut Cursor<'_>) -> Result<Self> {
        build(cursor)
    }
}

#[test]
fn manual_table_parses_a_document() {
    let endpoint: Endpoint =
        xmlbind::from_str(r#"<endpoint host="db.local"><port>5432</port></endpoint>"#).unwrap();
    assert_eq!(
        endpoint,
        Endpoint {
            host: "db.local".into(),
            port: 5432,
        }
    );
}

#[test]
fn build_consumes_one_interior_fragment() {
    let doc = r#"<all><endpoint host="a"><port>1</port></endpoint><tail/></all>"#;
    let mut cursor = Cursor::new(doc).unwrap();
    assert!(cursor.step_to_tag().unwrap());
    cursor.advance().unwrap();
    assert!(cursor.step_to_tag().unwrap());

    let endpoint: Endpoint = build(&mut cursor).unwrap();
    assert_eq!(endpoint.host, "a");
    assert_eq!(endpoint.port, 1);

    // The builder stops exactly on the next sibling.
    assert_eq!(cursor.kind(), EventKind::Start);
    assert_eq!(cursor.tag_name(), "tail");
}

#[test]
fn build_requires_a_start_tag() {
    let mut cursor = Cursor::new("<a/>").unwrap();
    cursor.advance().unwrap();
    assert_eq!(cursor.kind(), EventKind::End);
    assert!(matches!(
        build::<Endpoint>(&mut cursor),
        Err(BindError::Structure(_))
    ));
}

#[derive(Default, Debug)]
struct Rootless {
    label: String,
}

impl FromXml for Rootless {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new(Self::ROOT).attribute("label", |value: &mut Self, raw: &str| {
            value.label = raw.to_owned();
            Ok(())
        })
    }
}

#[test]
fn document_parse_needs_a_declared_root() {
    let err = xmlbind::from_str::<Rootless>(r#"<x label="a"/>"#).unwrap_err();
    assert!(matches!(err, BindError::Metadata { .. }));
}

// A list of atoms whose type declares no root tag cannot be dispatched.
#[derive(Default, Debug)]
struct Crowd {
    members: Vec<Rootless>,
}

impl FromXml for Crowd {
    const ROOT: Option<&'static str> = Some("crowd");

    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new(Self::ROOT).list_inline(
            "members",
            Rootless::ROOT,
            |value: &mut Self, cursor: &mut Cursor<'_>| {
                value.members.push(build(cursor)?);
                Ok(())
            },
        )
    }
}

#[test]
fn inline_atom_without_root_tag_is_a_metadata_error() {
    let err = xmlbind::from_str::<Crowd>("<crowd/>").unwrap_err();
    match err {
        BindError::Metadata {
            type_name, field, ..
        } => {
            assert_eq!(type_name, "Crowd");
            assert_eq!(field, "members");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Default, Debug)]
struct BadWrapper {
    items: Vec<Endpoint>,
}

impl FromXml for BadWrapper {
    const ROOT: Option<&'static str> = Some("bad");

    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new(Self::ROOT).list_wrapped(
            "items",
            "",
            |value: &mut Self, cursor: &mut Cursor<'_>| {
                value.items.push(build(cursor)?);
                Ok(())
            },
        )
    }
}

#[test]
fn empty_wrapper_name_is_a_metadata_error() {
    let err = xmlbind::from_str::<BadWrapper>("<bad/>").unwrap_err();
    assert!(matches!(
        err,
        BindError::Metadata {
            field: "items",
            ..
        }
    ));
}
