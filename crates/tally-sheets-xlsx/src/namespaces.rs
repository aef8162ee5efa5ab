//! XML namespaces, relationship types and content types used by the storage layer

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Main spreadsheet namespace (Transitional conformance)
pub const NS_SPREADSHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace (`r:id` attributes)
pub const NS_OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Content types namespace (`[Content_Types].xml`)
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Package relationships namespace (`*.rels`)
pub const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type for worksheets
pub const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

/// Relationship type for shared strings
pub const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Content type of the shared strings part
pub const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

/// Content types part name
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Workbook part name
pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Workbook relationships part name
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// Default shared strings part name
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

static PREFIXES: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    AHashMap::from_iter([
        ("x", NS_SPREADSHEET),
        ("o", NS_OFFICE_RELATIONSHIPS),
        ("t", NS_CONTENT_TYPES),
        ("r", NS_PACKAGE_RELATIONSHIPS),
    ])
});

/// Namespace URI for a well-known prefix
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    PREFIXES.get(prefix).copied()
}
