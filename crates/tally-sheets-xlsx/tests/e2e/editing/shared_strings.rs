//! Shared-string table loading, bootstrapping and registration.

use crate::{read_entry, template_bytes};
use tally_sheets_xlsx::{register_shared_strings, Package, SharedStringTable, SheetMap};

#[test]
fn test_existing_table_is_extended() {
    let package = Package::from_bytes(&template_bytes(true)).unwrap();
    let map = SheetMap::read(&package).unwrap();
    let mut table = SharedStringTable::load(package.part(map.shared_strings_part()));

    assert!(!table.is_created());
    assert_eq!(table.add("Total"), 1);
    assert_eq!(table.add("Widget"), 2);
    assert_eq!(table.unique_count(), 3);
    assert_eq!(table.count(), 4);
}

#[test]
fn test_bootstrapped_table_is_registered() {
    let mut package = Package::from_bytes(&template_bytes(false)).unwrap();
    let map = SheetMap::read(&package).unwrap();
    let part = map.shared_strings_part().to_string();

    let mut table = SharedStringTable::load(package.part(&part));
    assert!(table.is_created());
    assert_eq!(table.add("Widget"), 0);
    assert_eq!(table.add("Widget"), 0);

    package.set_part(part.as_str(), table.save().unwrap());
    register_shared_strings(&mut package, &part).unwrap();
    let out = package.to_bytes().unwrap();

    let sst = read_entry(&out, "xl/sharedStrings.xml");
    assert!(sst.contains(r#"count="2" uniqueCount="1""#), "{sst}");
    assert!(read_entry(&out, "[Content_Types].xml").contains(r#"PartName="/xl/sharedStrings.xml""#));
    assert!(read_entry(&out, "xl/_rels/workbook.xml.rels").contains(r#"Id="rId4""#));

    // The reopened package sees the table it just wrote
    let reopened = Package::from_bytes(&out).unwrap();
    let map = SheetMap::read(&reopened).unwrap();
    assert!(map.has_shared_strings_relationship());
    let table = SharedStringTable::load(reopened.part(map.shared_strings_part()));
    assert!(!table.is_created());
    assert_eq!(table.get(0), Some("Widget"));
}
