//! File-level entry point: open a template, render it once, save the result

use std::io::{Read, Seek, Write};
use std::path::Path;

use tally_sheets_core::Instruction;
use tally_sheets_xlsx::{Package, SheetMap};

use crate::error::{Error, Result};
use crate::render::RenderPipeline;
use crate::report::RenderReport;

/// An XLSX template held in memory.
///
/// Each `Template` is its own copy of the template's parts, so the file it was opened
/// from is never modified. A template can be rendered once.
#[derive(Debug)]
pub struct Template {
    package: Package,
    rendered: bool,
}

impl Template {
    /// Open a `.xlsx` file or an extracted template directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_package(Package::open(path)?))
    }

    /// Read a template from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Ok(Self::from_package(Package::from_reader(reader)?))
    }

    /// Read a template from archive bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_package(Package::from_bytes(bytes)?))
    }

    /// Wrap an already loaded package
    pub fn from_package(package: Package) -> Self {
        Self {
            package,
            rendered: false,
        }
    }

    /// Sheet display names and their worksheet parts
    pub fn sheets(&self) -> Result<SheetMap> {
        Ok(SheetMap::read(&self.package)?)
    }

    /// Apply an instruction set.
    ///
    /// Sheet-level failures are reported in the returned [`RenderReport`]; an `Err` means
    /// the pass could not run at all (or the template was already rendered).
    pub fn render(&mut self, instructions: &[Instruction]) -> Result<RenderReport> {
        if self.rendered {
            return Err(Error::AlreadyRendered);
        }
        self.rendered = true;

        let report = RenderPipeline::new(&mut self.package)?.render(instructions)?;
        log::info!(
            "rendered {} sheet(s), {} failed",
            report.sheets_rendered.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Apply instructions given as a JSON array
    #[cfg(feature = "json")]
    pub fn render_json(&mut self, json: &str) -> Result<RenderReport> {
        let instructions = crate::instructions_from_json(json)?;
        self.render(&instructions)
    }

    /// Check if [`render`](Self::render) has been called
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// The underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Take the underlying package
    pub fn into_package(self) -> Package {
        self.package
    }

    /// Write the package as a `.xlsx` file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.package.save(path)?)
    }

    /// Write the package to any seekable writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<()> {
        Ok(self.package.write(writer)?)
    }

    /// Write the package into a byte buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.package.to_bytes()?)
    }
}
