//! Package loading and re-archiving.

use crate::{entry_names, read_entry, template_bytes, template_parts, INVOICE_SHEET};
use pretty_assertions::assert_eq;
use tally_sheets_xlsx::{Package, SheetMap, XlsxError};

#[test]
fn test_untouched_parts_survive_byte_for_byte() {
    let bytes = template_bytes(true);
    let package = Package::from_bytes(&bytes).unwrap();
    let out = package.to_bytes().unwrap();

    for (name, content) in template_parts(true) {
        assert_eq!(read_entry(&out, name), content, "{name}");
    }
}

#[test]
fn test_content_types_written_first() {
    let mut parts = template_parts(false);
    parts.rotate_left(2);
    let bytes = crate::build_zip(&parts);

    let mut package = Package::from_bytes(&bytes).unwrap();
    package.set_part("xl/sharedStrings.xml", b"<sst/>".to_vec());
    let names = entry_names(&package.to_bytes().unwrap());

    assert_eq!(names[0], "[Content_Types].xml");
    assert_eq!(names.last().map(String::as_str), Some("xl/sharedStrings.xml"));
    assert_eq!(names.len(), 8);
}

#[test]
fn test_not_a_package() {
    let bytes = crate::build_zip(&[("hello.txt", "hi")]);
    assert!(matches!(Package::from_bytes(&bytes), Err(XlsxError::InvalidFormat(_))));
    assert!(Package::from_bytes(b"definitely not a zip").is_err());
}

#[test]
fn test_save_and_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.xlsx");

    let package = Package::from_bytes(&template_bytes(false)).unwrap();
    package.save(&path).unwrap();

    let reopened = Package::open(&path).unwrap();
    assert_eq!(
        reopened.part("xl/worksheets/sheet1.xml"),
        Some(INVOICE_SHEET.as_bytes())
    );
    let map = SheetMap::read(&reopened).unwrap();
    assert_eq!(map.part_for("Notes"), Some("xl/worksheets/sheet2.xml"));
}
