//! Registration of newly created parts in the package manifest and relationships

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::XlsxResult;
use crate::namespaces::{
    CONTENT_TYPES_PART, CT_SHARED_STRINGS, REL_SHARED_STRINGS, WORKBOOK_RELS_PART,
};
use crate::package::Package;
use crate::workbook::read_relationships;
use crate::xml::attr_value;

/// What [`register_shared_strings`] had to add
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registration {
    /// An `<Override>` was added to `[Content_Types].xml`
    pub content_type_added: bool,
    /// A `<Relationship>` was added to the workbook relationships
    pub relationship_added: bool,
}

/// Register a shared-strings part with the package.
///
/// Adds the content-type override and the workbook relationship unless they already
/// exist; calling it twice changes nothing the second time.
pub fn register_shared_strings(package: &mut Package, part_name: &str) -> XlsxResult<Registration> {
    let mut registration = Registration::default();
    let part_uri = format!("/{}", part_name.trim_start_matches('/'));

    let content_types = package.require(CONTENT_TYPES_PART)?;
    if !has_override(content_types, &part_uri)? {
        let mut child = BytesStart::new("Override");
        child.push_attribute(("PartName", part_uri.as_str()));
        child.push_attribute(("ContentType", CT_SHARED_STRINGS));
        let updated = append_child(content_types, child)?;
        package.set_part(CONTENT_TYPES_PART, updated);
        registration.content_type_added = true;
    }

    let rels_bytes = package.require(WORKBOOK_RELS_PART)?;
    let rels = read_relationships(rels_bytes)?;
    if !rels.iter().any(|rel| rel.is_shared_strings()) {
        let next = rels
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");
        let target = match part_name.strip_prefix("xl/") {
            Some(relative) => relative.to_string(),
            None => part_uri.clone(),
        };

        let mut child = BytesStart::new("Relationship");
        child.push_attribute(("Id", id.as_str()));
        child.push_attribute(("Type", REL_SHARED_STRINGS));
        child.push_attribute(("Target", target.as_str()));
        let updated = append_child(rels_bytes, child)?;
        package.set_part(WORKBOOK_RELS_PART, updated);
        registration.relationship_added = true;
        log::debug!("registered {part_name} as {id}");
    }

    Ok(registration)
}

fn has_override(content_types: &[u8], part_uri: &str) -> XlsxResult<bool> {
    let mut reader = Reader::from_reader(content_types);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Override" => {
                if attr_value(&e, b"PartName")?.as_deref() == Some(part_uri) {
                    return Ok(true);
                }
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
        buf.clear();
    }
}

/// Copy a part, adding `child` as the last child of the root element.
/// The child takes the root's namespace prefix.
fn append_child(bytes: &[u8], child: BytesStart<'_>) -> XlsxResult<Vec<u8>> {
    let mut reader = Reader::from_reader(bytes);
    let mut writer = Writer::new(Vec::with_capacity(bytes.len() + 256));
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) if depth == 1 => {
                let prefix = root_prefix(e.name().as_ref());
                writer.write_event(Event::Empty(prefixed(&child, &prefix)))?;
                writer.write_event(Event::End(e))?;
                depth = 0;
            }
            Event::End(e) => {
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if depth == 0 => {
                // Childless root: expand it
                let prefix = root_prefix(e.name().as_ref());
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(Event::Start(e))?;
                writer.write_event(Event::Empty(prefixed(&child, &prefix)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

fn root_prefix(qualified: &[u8]) -> String {
    match qualified.iter().position(|&b| b == b':') {
        Some(idx) => format!("{}:", String::from_utf8_lossy(&qualified[..idx])),
        None => String::new(),
    }
}

fn prefixed(child: &BytesStart<'_>, prefix: &str) -> BytesStart<'static> {
    let name = format!("{prefix}{}", String::from_utf8_lossy(child.name().as_ref()));
    BytesStart::new(name)
        .with_attributes(child.attributes().flatten())
        .into_owned()
}
