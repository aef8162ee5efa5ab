//! Shared quick-xml helpers for reading and rewriting parts

use std::io::BufRead;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{XlsxError, XlsxResult};

/// An attribute as `(qualified name, unescaped value)`
pub type OwnedAttr = (String, String);

/// Read one attribute by qualified name, unescaped
pub fn attr_value(e: &BytesStart, key: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Read one attribute by local name, ignoring any namespace prefix
pub fn attr_value_local(e: &BytesStart, key: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Collect all attributes except those named in `skip`
pub fn attributes_except(e: &BytesStart, skip: &[&[u8]]) -> XlsxResult<Vec<OwnedAttr>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        if skip.contains(&attr.key.as_ref()) {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        attrs.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(attrs)
}

/// Qualified element name as a string (e.g., "row" or "x:row")
pub fn qualified_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Read the rest of an element whose start tag was just consumed.
///
/// Returns the start event, everything inside, and the matching end event.
pub fn read_subtree<R: BufRead>(
    reader: &mut Reader<R>,
    start: BytesStart<'static>,
) -> XlsxResult<Vec<Event<'static>>> {
    let mut events = vec![Event::Start(start)];
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?.into_owned();
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(XlsxError::Parse("unexpected end of document".into()));
            }
            _ => {}
        }
        events.push(event);
        if depth == 0 {
            return Ok(events);
        }
        buf.clear();
    }
}

/// Read the text content of an element whose start tag was just consumed,
/// up to and including its end tag. Nested markup is skipped.
pub fn read_text<R: BufRead>(reader: &mut Reader<R>) -> XlsxResult<String> {
    let mut text = String::new();
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) if depth == 1 => text.push_str(&t.unescape()?),
            Event::CData(c) if depth == 1 => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            }
            Event::Eof => {
                return Err(XlsxError::Parse("unexpected end of document".into()));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// A writer with the standard part declaration already emitted
pub fn part_writer() -> XlsxResult<Writer<Vec<u8>>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

/// Write a start tag built from a name and owned attributes
pub fn start_tag<'a>(name: &'a str, attrs: &'a [OwnedAttr]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    start
}
