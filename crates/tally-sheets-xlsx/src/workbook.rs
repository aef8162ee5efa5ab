//! Workbook structure: sheet display names and the parts they live in

use ahash::AHashMap;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::namespaces::{
    REL_SHARED_STRINGS, REL_WORKSHEET, SHARED_STRINGS_PART, WORKBOOK_PART, WORKBOOK_RELS_PART,
};
use crate::package::Package;
use crate::xml::{attr_value, attr_value_local};

/// One sheet listed in the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Display name (the tab label)
    pub name: String,
    /// Worksheet part path inside the package (e.g. `xl/worksheets/sheet1.xml`)
    pub part: String,
}

/// Display name → worksheet part mapping, in workbook order
#[derive(Debug, Clone, Default)]
pub struct SheetMap {
    sheets: Vec<SheetEntry>,
    shared_strings: Option<String>,
}

/// A `<Relationship>` entry of a `.rels` part
#[derive(Debug, Clone)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    // Strict-conformance files use a different URI base with the same final segment
    pub fn is_worksheet(&self) -> bool {
        self.rel_type == REL_WORKSHEET || self.rel_type.ends_with("/worksheet")
    }

    pub fn is_shared_strings(&self) -> bool {
        self.rel_type == REL_SHARED_STRINGS || self.rel_type.ends_with("/sharedStrings")
    }
}

impl SheetMap {
    /// Read the workbook and its relationships from a package
    pub fn read(package: &Package) -> XlsxResult<Self> {
        let sheets = read_workbook_xml(package.require(WORKBOOK_PART)?)?;
        let rels = read_relationships(package.require(WORKBOOK_RELS_PART)?)?;

        let mut targets = AHashMap::new();
        let mut shared_strings = None;
        for rel in rels {
            if rel.is_worksheet() {
                targets.insert(rel.id, resolve_target("xl", &rel.target));
            } else if rel.is_shared_strings() {
                shared_strings = Some(resolve_target("xl", &rel.target));
            }
        }

        let mut map = SheetMap {
            sheets: Vec::with_capacity(sheets.len()),
            shared_strings,
        };
        for (name, r_id) in sheets {
            match targets.get(&r_id) {
                Some(part) => map.sheets.push(SheetEntry {
                    name,
                    part: part.clone(),
                }),
                None => log::warn!("sheet '{name}' has no worksheet relationship ({r_id})"),
            }
        }
        Ok(map)
    }

    /// Worksheet part for a display name
    pub fn part_for(&self, name: &str) -> Option<&str> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.part.as_str())
    }

    /// Sheets in workbook order
    pub fn iter(&self) -> impl Iterator<Item = &SheetEntry> {
        self.sheets.iter()
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook lists no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Shared-strings part path, `xl/sharedStrings.xml` unless the workbook points elsewhere
    pub fn shared_strings_part(&self) -> &str {
        self.shared_strings.as_deref().unwrap_or(SHARED_STRINGS_PART)
    }

    /// Check if the workbook already has a shared-strings relationship
    pub fn has_shared_strings_relationship(&self) -> bool {
        self.shared_strings.is_some()
    }
}

/// Read `(name, r:id)` pairs from `<sheets>`
fn read_workbook_xml(bytes: &[u8]) -> XlsxResult<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(&e, b"name")?;
                // The relationships prefix is normally "r" but any prefix is legal
                let r_id = attr_value_local(&e, b"id")?;
                match (name, r_id) {
                    (Some(name), Some(r_id)) => sheets.push((name, r_id)),
                    _ => log::warn!("skipping <sheet> without name or r:id"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Read every `<Relationship>` of a `.rels` part
pub(crate) fn read_relationships(bytes: &[u8]) -> XlsxResult<Vec<Relationship>> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(&e, b"Id")?;
                let rel_type = attr_value(&e, b"Type")?;
                let target = attr_value(&e, b"Target")?;
                if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Resolve a relationship target against the directory of its source part.
///
/// Absolute targets (`/xl/...`) are package-rooted; `..` segments walk up.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
