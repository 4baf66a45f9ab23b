//! DOCX zip container I/O.

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::XmlTree;
use crate::error::{Error, Result};

const PACKAGE_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// An opened DOCX package.
///
/// Only the main document part is parsed; every other part is copied
/// through untouched when the package is saved.
pub struct DocxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
    main_part: String,
}

impl DocxPackage<BufReader<File>> {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> DocxPackage<R> {
    /// Open a DOCX package from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Docx(format!("Not a valid DOCX package: {}", e)))?;
        let main_part = locate_main_part(&mut archive)?;
        log::debug!("DOCX main document part: {}", main_part);
        Ok(Self { archive, main_part })
    }

    /// Name of the main document part inside the package.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Parse the main document part.
    pub fn read_document(&mut self) -> Result<XmlTree> {
        let data = read_entry(&mut self.archive, &self.main_part)?
            .ok_or_else(|| Error::Docx(format!("Missing part: {}", self.main_part)))?;
        XmlTree::parse(&data)
    }

    /// Write a new package with `document` replacing the main part.
    pub fn save_with_document<W: Write + Seek>(
        &mut self,
        document: &XmlTree,
        writer: W,
    ) -> Result<W> {
        let document_bytes = document.to_bytes()?;
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(i)?;
            if entry.name() == self.main_part {
                let name = entry.name().to_string();
                drop(entry);
                zip.start_file(name, deflated)?;
                zip.write_all(&document_bytes)?;
            } else {
                zip.raw_copy_file(entry)?;
            }
        }

        Ok(zip.finish()?)
    }

    /// Write a new package to a file path.
    pub fn save_to_path<P: AsRef<Path>>(&mut self, document: &XmlTree, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut file = self.save_with_document(document, file)?;
        file.flush()?;
        Ok(())
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Find the main document part through the package relationships.
fn locate_main_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    if let Some(rels) = read_entry(archive, PACKAGE_RELS)? {
        let tree = XmlTree::parse(&rels)?;
        if let Some(root) = tree.root() {
            let target = tree
                .children_named(root, "Relationship")
                .filter_map(|id| tree.element(id))
                .find(|rel| {
                    rel.attribute("Type")
                        .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL))
                })
                .and_then(|rel| rel.attribute("Target"));
            if let Some(target) = target {
                let part = target.trim_start_matches('/').to_string();
                if archive.index_for_name(&part).is_some() {
                    return Ok(part);
                }
                log::warn!("officeDocument target {} not found in package", part);
            }
        }
    }

    if archive.index_for_name(DEFAULT_MAIN_PART).is_some() {
        Ok(DEFAULT_MAIN_PART.to_string())
    } else {
        Err(Error::Docx(format!("Missing part: {}", DEFAULT_MAIN_PART)))
    }
}
