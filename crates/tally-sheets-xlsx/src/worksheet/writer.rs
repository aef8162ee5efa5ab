//! Worksheet XML serialization

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use super::{CellChild, CellNode, RowNode, WorksheetDocument};
use crate::error::XlsxResult;
use crate::xml::{attributes_except, qualified_name, start_tag};

pub(super) fn write_worksheet(doc: &WorksheetDocument) -> XlsxResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    if !matches!(doc.head.first(), Some(Event::Decl(_))) {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    }

    let dimension = doc
        .used_range()
        .map(|(first, last)| format!("{}:{}", first.to_reference(), last.to_reference()));

    for event in &doc.head {
        match (event, &dimension) {
            (Event::Empty(e), Some(range)) if e.local_name().as_ref() == b"dimension" => {
                let mut attrs = attributes_except(e, &[b"ref"])?;
                attrs.insert(0, ("ref".to_string(), range.clone()));
                let name = qualified_name(e);
                writer.write_event(Event::Empty(start_tag(&name, &attrs)))?;
            }
            _ => writer.write_event(event.borrow())?,
        }
    }

    for row in &doc.rows {
        write_row(&mut writer, &doc.prefix, row)?;
    }

    for event in &doc.tail {
        writer.write_event(event.borrow())?;
    }

    Ok(writer.into_inner())
}

fn write_row(writer: &mut Writer<Vec<u8>>, prefix: &str, row: &RowNode) -> XlsxResult<()> {
    let name = format!("{prefix}row");
    let number = row.number.to_string();
    let spans = row_spans(row);

    let mut start = BytesStart::new(name.as_str());
    start.push_attribute(("r", number.as_str()));
    for (key, value) in &row.attrs {
        match (key.as_str(), &spans) {
            ("spans", Some(spans)) => start.push_attribute(("spans", spans.as_str())),
            _ => start.push_attribute((key.as_str(), value.as_str())),
        }
    }

    if row.cells.is_empty() && row.extras.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for cell in &row.cells {
        write_cell(writer, prefix, cell)?;
    }
    for event in &row.extras {
        writer.write_event(event.borrow())?;
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

/// `spans` covering the row's cells, "first:last" in column numbers
fn row_spans(row: &RowNode) -> Option<String> {
    let first = row.cells.first()?.address.column();
    let last = row.cells.last()?.address.column();
    Some(format!("{first}:{last}"))
}

fn write_cell(writer: &mut Writer<Vec<u8>>, prefix: &str, cell: &CellNode) -> XlsxResult<()> {
    let name = format!("{prefix}c");
    let reference = cell.reference();

    let mut start = BytesStart::new(name.as_str());
    start.push_attribute(("r", reference.as_str()));
    for (key, value) in &cell.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if let Some(t) = &cell.cell_type {
        start.push_attribute(("t", t.as_str()));
    }

    if cell.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &cell.children {
        match child {
            CellChild::Value(text) => {
                let v = format!("{prefix}v");
                writer.write_event(Event::Start(BytesStart::new(v.as_str())))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new(v.as_str())))?;
            }
            CellChild::Markup { events, .. } => {
                for event in events {
                    writer.write_event(event.borrow())?;
                }
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}
