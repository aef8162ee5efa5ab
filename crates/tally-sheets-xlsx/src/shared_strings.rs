//! Shared string table (`xl/sharedStrings.xml`)
//!
//! Loaded once per render, appended to while cells are written, and written back once
//! at the end. Entries loaded from the template keep their original markup (rich text,
//! phonetic runs) so existing cell references stay valid and keep their formatting.

use ahash::AHashMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::namespaces::namespace_uri;
use crate::xml::{attr_value, attributes_except, part_writer, qualified_name, read_subtree};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Encode text so Excel reads it back unchanged: literal `_xHHHH_` runs get their
/// underscore escaped, and control characters XML cannot carry become `_xHHHH_`.
fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        match c {
            '\t' | '\n' | '\r' => result.push(c),
            c if (c as u32) < 0x20 => result.push_str(&format!("_x{:04X}_", c as u32)),
            '_' if looks_like_escape(&s[i..]) => result.push_str("_x005F_"),
            c => result.push(c),
        }
    }

    result
}

fn looks_like_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[1] == b'x'
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}

/// One `<si>` entry
#[derive(Debug, Clone)]
struct SharedStringItem {
    /// Plain text used for deduplication
    text: String,
    /// Original markup for entries loaded from the template
    raw: Option<Vec<Event<'static>>>,
}

/// Deduplicating store of text values referenced by index from string cells
#[derive(Debug, Clone)]
pub struct SharedStringTable {
    /// `<sst>` start tag (attributes other than the counters are preserved)
    root: BytesStart<'static>,
    items: Vec<SharedStringItem>,
    /// Fast lookup for deduplication
    index: AHashMap<String, usize>,
    /// Non-`<si>` children of `<sst>` (e.g. `extLst`), written after the entries
    trailing: Vec<Event<'static>>,
    /// Total number of string-cell references
    count: u64,
    /// The part was absent or unreadable and had to be bootstrapped
    created: bool,
}

impl SharedStringTable {
    /// An empty table for a package that has no shared-string part yet
    pub fn bootstrap() -> Self {
        let mut root = BytesStart::new("sst");
        if let Some(ns) = namespace_uri("x") {
            root.push_attribute(("xmlns", ns));
        }

        Self {
            root,
            items: Vec::new(),
            index: AHashMap::new(),
            trailing: Vec::new(),
            count: 0,
            created: true,
        }
    }

    /// Load the table from the persisted part.
    ///
    /// A missing part, or one that cannot be parsed, yields an empty bootstrapped table;
    /// check [`SharedStringTable::is_created`] to know whether the part still has to be
    /// registered in the package.
    pub fn load(part: Option<&[u8]>) -> Self {
        let Some(bytes) = part else {
            log::debug!("no shared strings part, bootstrapping an empty table");
            return Self::bootstrap();
        };

        match Self::parse(bytes) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("shared strings part is unreadable ({e}), bootstrapping an empty table");
                Self::bootstrap()
            }
        }
    }

    /// Parse the persisted part, failing on malformed XML
    pub fn parse(bytes: &[u8]) -> XlsxResult<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut table: Option<Self> = None;
        let mut declared_count: Option<u64> = None;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match (&mut table, event) {
                (None, Event::Start(e)) if e.local_name().as_ref() == b"sst" => {
                    declared_count = attr_value(&e, b"count")?.and_then(|c| c.parse().ok());
                    table = Some(Self::with_root(e.into_owned()));
                }
                (None, Event::Empty(e)) if e.local_name().as_ref() == b"sst" => {
                    declared_count = attr_value(&e, b"count")?.and_then(|c| c.parse().ok());
                    let mut t = Self::with_root(e.into_owned());
                    t.finish_load(declared_count);
                    return Ok(t);
                }
                (None, Event::Start(e)) | (None, Event::Empty(e)) => {
                    return Err(XlsxError::Parse(format!(
                        "expected <sst>, found <{}>",
                        qualified_name(&e)
                    )));
                }
                (Some(t), Event::Start(e)) => {
                    let is_item = e.local_name().as_ref() == b"si";
                    let events = read_subtree(&mut reader, e.into_owned())?;
                    if is_item {
                        t.push_loaded(item_text(&events)?, events);
                    } else {
                        t.trailing.extend(events);
                    }
                }
                (Some(t), Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"si" {
                        t.push_loaded(String::new(), vec![Event::Empty(e.into_owned())]);
                    } else {
                        t.trailing.push(Event::Empty(e.into_owned()));
                    }
                }
                (Some(_), Event::End(_)) => break,
                (_, Event::Eof) => {
                    return Err(XlsxError::Parse("unexpected end of shared strings".into()));
                }
                _ => {}
            }
            buf.clear();
        }

        let mut table = table.ok_or_else(|| XlsxError::Parse("missing <sst>".into()))?;
        table.finish_load(declared_count);
        Ok(table)
    }

    fn with_root(root: BytesStart<'static>) -> Self {
        Self {
            root,
            items: Vec::new(),
            index: AHashMap::new(),
            trailing: Vec::new(),
            count: 0,
            created: false,
        }
    }

    fn push_loaded(&mut self, text: String, raw: Vec<Event<'static>>) {
        self.index.entry(text.clone()).or_insert(self.items.len());
        self.items.push(SharedStringItem {
            text,
            raw: Some(raw),
        });
    }

    fn finish_load(&mut self, declared_count: Option<u64>) {
        let unique = self.items.len() as u64;
        self.count = declared_count.unwrap_or(unique).max(unique);
        log::debug!("loaded {} shared strings", unique);
    }

    /// Add a string, returning its index.
    ///
    /// An existing entry with exactly the same text is reused. Every call counts as one
    /// more cell reference; only a new entry increases the unique count.
    pub fn add(&mut self, text: &str) -> usize {
        self.count += 1;

        if let Some(&idx) = self.index.get(text) {
            return idx;
        }

        let idx = self.items.len();
        self.items.push(SharedStringItem {
            text: text.to_string(),
            raw: None,
        });
        self.index.insert(text.to_string(), idx);
        idx
    }

    /// Text of the entry at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.text.as_str())
    }

    /// Index of an existing entry
    pub fn position(&self, text: &str) -> Option<usize> {
        self.index.get(text).copied()
    }

    /// Total number of string-cell references (`count`)
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of distinct entries (`uniqueCount`)
    pub fn unique_count(&self) -> usize {
        self.items.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the table was bootstrapped and the part must be registered in the package
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Serialize the table with updated `count`/`uniqueCount` attributes
    pub fn save(&self) -> XlsxResult<Vec<u8>> {
        let mut writer = part_writer()?;

        let name = qualified_name(&self.root);
        let attrs = attributes_except(&self.root, &[b"count", b"uniqueCount"])?;
        let count = self.count.to_string();
        let unique_count = self.unique_count().to_string();

        let mut root = BytesStart::new(name.as_str());
        for (key, value) in &attrs {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        root.push_attribute(("count", count.as_str()));
        root.push_attribute(("uniqueCount", unique_count.as_str()));
        writer.write_event(Event::Start(root))?;

        let prefix = name
            .rsplit_once(':')
            .map(|(p, _)| format!("{p}:"))
            .unwrap_or_default();
        let si = format!("{prefix}si");
        let t = format!("{prefix}t");

        for item in &self.items {
            match &item.raw {
                Some(events) => {
                    for event in events {
                        writer.write_event(event.borrow())?;
                    }
                }
                None => {
                    writer.write_event(Event::Start(BytesStart::new(si.as_str())))?;
                    let mut start = BytesStart::new(t.as_str());
                    if item.text.trim() != item.text {
                        start.push_attribute(("xml:space", "preserve"));
                    }
                    writer.write_event(Event::Start(start))?;
                    let encoded = encode_excel_escapes(&item.text);
                    writer.write_event(Event::Text(BytesText::new(&encoded)))?;
                    writer.write_event(Event::End(BytesEnd::new(t.as_str())))?;
                    writer.write_event(Event::End(BytesEnd::new(si.as_str())))?;
                }
            }
        }

        for event in &self.trailing {
            writer.write_event(event.borrow())?;
        }

        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(writer.into_inner())
    }
}

/// Plain text of a loaded `<si>`: every `<t>` in order, skipping phonetic runs
fn item_text(events: &[Event<'static>]) -> XlsxResult<String> {
    let mut text = String::new();
    let mut in_t = false;
    let mut phonetic_depth = 0usize;

    for event in events {
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth += 1,
                b"t" => in_t = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_t = false,
                _ => {}
            },
            Event::Text(t) if in_t && phonetic_depth == 0 => text.push_str(&t.unescape()?),
            Event::CData(c) if in_t && phonetic_depth == 0 => {
                text.push_str(&String::from_utf8_lossy(c))
            }
            _ => {}
        }
    }

    Ok(decode_excel_escapes(&text))
}
