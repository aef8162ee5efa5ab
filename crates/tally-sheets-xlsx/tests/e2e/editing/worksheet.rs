//! Worksheet edits through a full package round trip.

use crate::{read_entry, template_bytes};
use tally_sheets_core::{Address, ScalarValue};
use tally_sheets_xlsx::{Package, SharedStringTable, SheetMap, WorksheetDocument, XlsxError};

fn open() -> (Package, SheetMap, SharedStringTable) {
    let package = Package::from_bytes(&template_bytes(true)).unwrap();
    let map = SheetMap::read(&package).unwrap();
    let strings = SharedStringTable::load(package.part(map.shared_strings_part()));
    (package, map, strings)
}

#[test]
fn test_fill_template_row_block() {
    let (mut package, map, mut strings) = open();
    let part = map.part_for("Invoice").unwrap();
    let mut sheet = WorksheetDocument::open(&package, part).unwrap();

    sheet.insert_rows(3, 3);
    for (i, (name, qty)) in [("Bolt", 10), ("Nut", 20), ("Washer", 30)].into_iter().enumerate() {
        let row = 3 + i as i64;
        sheet.set_value(Address::new(row, 1), &ScalarValue::from(name), &mut strings);
        sheet.set_value(Address::new(row, 3), &ScalarValue::from(qty), &mut strings);
    }
    sheet.save_into(&mut package).unwrap();
    package.set_part(map.shared_strings_part(), strings.save().unwrap());

    let out = package.to_bytes().unwrap();
    let xml = read_entry(&out, "xl/worksheets/sheet1.xml");

    assert!(xml.contains(r#"<row r="4" spans="1:3"><c r="A4" s="1" t="s"><v>3</v></c><c r="B4"/><c r="C4"><v>20</v></c></row>"#), "{xml}");
    assert!(xml.contains(r#"<row r="13"><c r="A13" t="s"><v>1</v></c><c r="C13"><f>SUM(C3:C9)</f></c></row>"#), "{xml}");
    assert!(xml.contains(r#"<dimension ref="A1:C13"/>"#), "{xml}");
    assert!(xml.contains("<pageMargins"), "{xml}");

    let sst = read_entry(&out, "xl/sharedStrings.xml");
    assert!(sst.contains("<si><t>Washer</t></si></sst>"), "{sst}");
}

#[test]
fn test_missing_sheet_part() {
    let (mut package, _, _) = open();
    package.set_part("xl/worksheets/sheet2.xml", Vec::new());
    assert!(WorksheetDocument::open(&package, "xl/worksheets/sheet2.xml").is_err());

    let err = WorksheetDocument::open(&package, "xl/worksheets/sheet9.xml").unwrap_err();
    assert!(matches!(err, XlsxError::MissingPart(_)));
}
