//! The render pass: apply an instruction set to a template package

use tally_sheets_core::{group_by_sheet, Address, Instruction, SheetInstructions};
use tally_sheets_xlsx::{
    register_shared_strings, Package, SharedStringTable, SheetMap, WorksheetDocument, XlsxResult,
};

use crate::report::{RenderReport, SheetFailure};

/// Applies instructions to the worksheets of one package.
///
/// One shared-string table is loaded for the whole pass and persisted once at the end.
/// A sheet that cannot be opened or saved is reported and skipped; the rest still render.
pub struct RenderPipeline<'p> {
    package: &'p mut Package,
    sheets: SheetMap,
}

impl<'p> RenderPipeline<'p> {
    /// Prepare a pass over a package; fails only if the workbook itself is unreadable
    pub fn new(package: &'p mut Package) -> XlsxResult<Self> {
        let sheets = SheetMap::read(package)?;
        Ok(Self { package, sheets })
    }

    /// Sheet names and parts of the package
    pub fn sheets(&self) -> &SheetMap {
        &self.sheets
    }

    /// Run the pass.
    ///
    /// Per sheet, scalar writes go first, then repeating blocks from the lowest anchor
    /// upwards so earlier row insertions never move a later block's anchor.
    pub fn render(self, instructions: &[Instruction]) -> XlsxResult<RenderReport> {
        let strings_part = self.sheets.shared_strings_part().to_string();
        let mut strings = SharedStringTable::load(self.package.part(&strings_part));
        let mut report = RenderReport::default();

        for group in group_by_sheet(instructions) {
            let Some(part) = self.sheets.part_for(group.sheet) else {
                log::debug!("no worksheet named '{}', dropping its instructions", group.sheet);
                report.unknown_sheets.push(group.sheet.to_string());
                continue;
            };

            match render_sheet(self.package, part, &group, &mut strings) {
                Ok(()) => {
                    log::debug!("rendered sheet '{}' ({})", group.sheet, part);
                    report.sheets_rendered.push(group.sheet.to_string());
                }
                Err(err) => {
                    log::warn!("sheet '{}' not rendered: {}", group.sheet, err);
                    report.failures.push(SheetFailure::new(group.sheet, part, &err));
                }
            }
        }

        // A fresh table that nothing references is not worth adding to the package
        if strings.is_created() && strings.is_empty() {
            return Ok(report);
        }

        self.package.set_part(strings_part.as_str(), strings.save()?);
        if strings.is_created() {
            register_shared_strings(self.package, &strings_part)?;
            report.shared_strings_created = true;
        }

        Ok(report)
    }
}

fn render_sheet(
    package: &mut Package,
    part: &str,
    group: &SheetInstructions<'_>,
    strings: &mut SharedStringTable,
) -> XlsxResult<()> {
    let mut doc = WorksheetDocument::open(package, part)?;

    for write in &group.scalars {
        let address = resolve_address(&write.address, group.sheet);
        doc.set_value(address, &write.value, strings);
    }

    for block in group.blocks_bottom_up() {
        if block.items.is_empty() {
            continue;
        }
        let anchor = resolve_address(&block.anchor, group.sheet);
        let count = block.rows_that_fit();
        if (count as usize) < block.items.len() {
            log::warn!(
                "sheet '{}': block at {} has {} items, only {} fit above the last row",
                group.sheet,
                anchor,
                block.items.len(),
                count
            );
        }
        doc.insert_rows(anchor.row(), count);
        for (address, value) in block.cells() {
            doc.set_value(address, value, strings);
        }
    }

    doc.save_into(package)
}

/// Parse an address, falling back to the tolerant default with a warning
fn resolve_address(text: &str, sheet: &str) -> Address {
    match Address::parse_strict(text) {
        Ok(address) => address,
        Err(err) => {
            let fallback = Address::parse(text);
            log::warn!("sheet '{sheet}': {err}, using {fallback}");
            fallback
        }
    }
}
