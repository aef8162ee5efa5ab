//! Worksheet XML parsing

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tally_sheets_core::Address;

use super::{CellChild, CellNode, RowNode, WorksheetDocument};
use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr_value, attributes_except, read_subtree, read_text};

enum Section {
    Head,
    Data,
    Tail,
}

pub(super) fn parse_worksheet(part_name: &str, bytes: &[u8]) -> XlsxResult<WorksheetDocument> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut section = Section::Head;
    let mut prefix = String::new();
    let mut head = Vec::new();
    let mut rows: Vec<RowNode> = Vec::new();
    let mut tail = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match section {
            Section::Head => match event {
                Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                    prefix = element_prefix(&e);
                    head.push(Event::Start(e.into_owned()));
                    section = Section::Data;
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                    prefix = element_prefix(&e);
                    let start = e.into_owned();
                    tail.push(Event::End(start.to_end().into_owned()));
                    head.push(Event::Start(start));
                    section = Section::Tail;
                }
                Event::Eof => {
                    return Err(XlsxError::Parse(format!("{part_name}: no <sheetData> element")));
                }
                other => head.push(other.into_owned()),
            },
            Section::Data => match event {
                Event::Start(e) if e.local_name().as_ref() == b"row" => {
                    let number = row_number(&e, rows.last())?;
                    let mut row = new_row(&e, number)?;
                    read_row_content(&mut reader, &mut row)?;
                    rows.push(row);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                    let number = row_number(&e, rows.last())?;
                    rows.push(new_row(&e, number)?);
                }
                Event::End(e) => {
                    tail.push(Event::End(e.into_owned()));
                    section = Section::Tail;
                }
                Event::Start(e) => {
                    // Unknown child of sheetData; keep it with the preceding row
                    let events = read_subtree(&mut reader, e.into_owned())?;
                    attach_extra(&mut rows, part_name, events);
                }
                Event::Empty(e) => {
                    attach_extra(&mut rows, part_name, vec![Event::Empty(e.into_owned())]);
                }
                Event::Eof => {
                    return Err(XlsxError::Parse(format!("{part_name}: unterminated <sheetData>")));
                }
                _ => {}
            },
            Section::Tail => match event {
                Event::Eof => break,
                other => tail.push(other.into_owned()),
            },
        }
        buf.clear();
    }

    // Source order is not trusted; every later operation relies on sorted rows and cells.
    rows.sort_by_key(|r| r.number);
    for row in &mut rows {
        row.cells.sort_by_key(|c| c.address.column());
    }

    Ok(WorksheetDocument {
        part_name: part_name.to_string(),
        prefix,
        head,
        rows,
        tail,
    })
}

fn element_prefix(e: &BytesStart) -> String {
    e.name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

/// Row number from `r`, or one past the previous row when absent
fn row_number(e: &BytesStart, previous: Option<&RowNode>) -> XlsxResult<u32> {
    let fallback = previous.map_or(1, |r| r.number as i64 + 1);
    let number = match attr_value(e, b"r")? {
        Some(r) => r.trim().parse::<i64>().map_err(|_| {
            XlsxError::Parse(format!("invalid row number: {r}"))
        })?,
        None => fallback,
    };
    Ok(Address::new(number, 1).row())
}

fn new_row(e: &BytesStart, number: u32) -> XlsxResult<RowNode> {
    Ok(RowNode {
        number,
        attrs: attributes_except(e, &[b"r"])?,
        cells: Vec::new(),
        extras: Vec::new(),
    })
}

fn attach_extra(rows: &mut [RowNode], part_name: &str, events: Vec<Event<'static>>) {
    match rows.last_mut() {
        Some(row) => row.extras.extend(events),
        None => log::debug!("{part_name}: dropping markup before the first row"),
    }
}

fn read_row_content(reader: &mut Reader<&[u8]>, row: &mut RowNode) -> XlsxResult<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let mut cell = new_cell(&e, row)?;
                read_cell_content(reader, &mut cell)?;
                row.cells.push(cell);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let cell = new_cell(&e, row)?;
                row.cells.push(cell);
            }
            Event::Start(e) => {
                let events = read_subtree(reader, e.into_owned())?;
                row.extras.extend(events);
            }
            Event::Empty(e) => row.extras.push(Event::Empty(e.into_owned())),
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XlsxError::Parse("unexpected end of document".into()));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Cell with its address taken from `r` (row forced to the enclosing row),
/// or the column after the previous cell when `r` is absent or unreadable
fn new_cell(e: &BytesStart, row: &RowNode) -> XlsxResult<CellNode> {
    let next_column = row.cells.last().map_or(1, |c| c.address.column() + 1);
    let column = match attr_value(e, b"r")? {
        Some(r) => match Address::parse_strict(&r) {
            Ok(address) => address.column(),
            Err(err) => {
                log::warn!("row {}: {}, placing the cell in column {}", row.number, err, next_column);
                next_column
            }
        },
        None => next_column,
    };

    Ok(CellNode {
        address: Address::new(row.number as i64, column as i64),
        cell_type: attr_value(e, b"t")?,
        attrs: attributes_except(e, &[b"r", b"t"])?,
        children: Vec::new(),
    })
}

fn read_cell_content(reader: &mut Reader<&[u8]>, cell: &mut CellNode) -> XlsxResult<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"v" => {
                cell.children.push(CellChild::Value(read_text(reader)?));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"v" => {
                cell.children.push(CellChild::Value(String::new()));
            }
            Event::Start(e) => {
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let events = read_subtree(reader, e.into_owned())?;
                cell.children.push(CellChild::Markup { local_name, events });
            }
            Event::Empty(e) => {
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                cell.children.push(CellChild::Markup {
                    local_name,
                    events: vec![Event::Empty(e.into_owned())],
                });
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XlsxError::Parse("unexpected end of document".into()));
            }
            _ => {}
        }
        buf.clear();
    }
}
