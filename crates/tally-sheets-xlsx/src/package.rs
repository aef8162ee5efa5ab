//! In-memory part store for a SpreadsheetML package
//!
//! A package is loaded once from a `.xlsx` archive (or an extracted template directory),
//! its parts are edited in memory, and the whole set is re-archived on save. Each render
//! works on its own `Package`, so the template on disk is never touched.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use ahash::AHashMap;

use crate::error::{XlsxError, XlsxResult};
use crate::namespaces::CONTENT_TYPES_PART;

/// Ordered set of named parts
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Part names in archive order
    order: Vec<String>,
    /// Part contents by name
    parts: AHashMap<String, Vec<u8>>,
}

impl Package {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a `.xlsx` file, or a directory holding an extracted package
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::read_dir(path)
        } else {
            let file = File::open(path)?;
            Self::from_reader(file)
        }
    }

    /// Read a package from a zip archive
    pub fn from_reader<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut package = Self::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            package.set_part(name, data);
        }

        package.verify()?;
        log::debug!("loaded package with {} parts", package.len());
        Ok(package)
    }

    /// Read a package from archive bytes
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read an extracted package directory; part names use `/` separators
    pub fn read_dir<P: AsRef<Path>>(root: P) -> XlsxResult<Self> {
        let root = root.as_ref();
        let mut package = Self::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)?.collect::<Result<Vec<_>, _>>()?;
            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .map_err(|_| XlsxError::InvalidFormat(path.display().to_string()))?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                package.set_part(name, fs::read(&path)?);
            }
        }

        package.verify()?;
        log::debug!("loaded package directory with {} parts", package.len());
        Ok(package)
    }

    fn verify(&self) -> XlsxResult<()> {
        if !self.contains(CONTENT_TYPES_PART) {
            return Err(XlsxError::InvalidFormat(format!(
                "Missing {}",
                CONTENT_TYPES_PART
            )));
        }
        Ok(())
    }

    /// Get a part's bytes
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Get a part's bytes or fail with [`XlsxError::MissingPart`]
    pub fn require(&self, name: &str) -> XlsxResult<&[u8]> {
        self.part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))
    }

    /// Check whether a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Insert or replace a part. New parts are appended to the archive order.
    pub fn set_part<S: Into<String>>(&mut self, name: S, data: Vec<u8>) {
        let name = name.into();
        if !self.parts.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.parts.insert(name, data);
    }

    /// Part names in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the package has no parts
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Write the package as a zip archive.
    ///
    /// `[Content_Types].xml` is always written first; other parts keep their order.
    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let names = std::iter::once(CONTENT_TYPES_PART)
            .filter(|name| self.contains(name))
            .chain(self.part_names().filter(|name| *name != CONTENT_TYPES_PART));

        for name in names {
            zip.start_file(name, options)?;
            zip.write_all(self.require(name)?)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Write the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.write(file)
    }

    /// Write the package to an in-memory archive
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Package {
        let mut package = Package::new();
        package.set_part("xl/workbook.xml", b"<workbook/>".to_vec());
        package.set_part(CONTENT_TYPES_PART, b"<Types/>".to_vec());
        package
    }

    #[test]
    fn test_archive_round_trip() {
        let package = sample();
        let bytes = package.to_bytes().unwrap();

        let reopened = Package::from_bytes(&bytes).unwrap();
        let names: Vec<&str> = reopened.part_names().collect();
        assert_eq!(names, vec![CONTENT_TYPES_PART, "xl/workbook.xml"]);
        assert_eq!(reopened.part("xl/workbook.xml"), Some(&b"<workbook/>"[..]));
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut package = sample();
        package.set_part("xl/workbook.xml", b"<workbook a=\"1\"/>".to_vec());
        assert_eq!(package.len(), 2);
        assert_eq!(package.part_names().next(), Some("xl/workbook.xml"));
    }

    #[test]
    fn test_missing_content_types_rejected() {
        let mut package = Package::new();
        package.set_part("xl/workbook.xml", Vec::new());
        let bytes = package.to_bytes().unwrap();
        assert!(matches!(
            Package::from_bytes(&bytes),
            Err(XlsxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_require_missing_part() {
        let package = sample();
        assert!(matches!(
            package.require("xl/worksheets/sheet9.xml"),
            Err(XlsxError::MissingPart(name)) if name == "xl/worksheets/sheet9.xml"
        ));
    }

    #[test]
    fn test_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("xl/worksheets")).unwrap();
        fs::write(dir.path().join(CONTENT_TYPES_PART), "<Types/>").unwrap();
        fs::write(dir.path().join("xl/worksheets/sheet1.xml"), "<worksheet/>").unwrap();

        let package = Package::open(dir.path()).unwrap();
        assert!(package.contains("xl/worksheets/sheet1.xml"));
        assert_eq!(package.len(), 2);
    }
}
