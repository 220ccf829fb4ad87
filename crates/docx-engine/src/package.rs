//! In-memory .docx package
//!
//! A .docx file is a zip archive of XML parts. The package is read fully
//! into memory, parts are patched in place, and the archive is written back
//! out without touching the filesystem.

use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::renderer::RenderError;

pub const MAIN_DOCUMENT: &str = "word/document.xml";

/// A part stored in the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePart {
    /// Zip entry name, e.g. `word/document.xml`
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    /// Parts in archive order
    parts: Vec<PackagePart>,
}

impl DocxPackage {
    /// Read every entry of a .docx archive
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            parts.push(PackagePart {
                name: entry.name().to_string(),
                data,
            });
        }

        Self::from_parts(parts)
    }

    pub fn from_parts(parts: Vec<PackagePart>) -> Result<Self, RenderError> {
        let package = Self { parts };
        if package.part(MAIN_DOCUMENT).is_none() {
            return Err(RenderError::Package(format!(
                "missing main document part '{}'",
                MAIN_DOCUMENT
            )));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Parts that may carry template tags: the body, headers and footers
    pub fn template_parts(&self) -> impl Iterator<Item = &PackagePart> {
        self.parts.iter().filter(|p| is_template_part(&p.name))
    }

    /// Replace the content of an existing part
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> Result<(), RenderError> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RenderError::Package(format!("no part named '{}'", name)))?;
        part.data = data;
        Ok(())
    }

    /// Write the package back out as a .docx archive
    pub fn to_bytes(&self) -> Result<Vec<u8>, RenderError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

fn is_template_part(name: &str) -> bool {
    if name == MAIN_DOCUMENT {
        return true;
    }
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    (file.starts_with("header") || file.starts_with("footer"))
        && file.ends_with(".xml")
        && !file.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_parts() -> Vec<PackagePart> {
        vec![
            PackagePart {
                name: "[Content_Types].xml".to_string(),
                data: b"<Types/>".to_vec(),
            },
            PackagePart {
                name: MAIN_DOCUMENT.to_string(),
                data: b"<w:document/>".to_vec(),
            },
            PackagePart {
                name: "word/header1.xml".to_string(),
                data: b"<w:hdr/>".to_vec(),
            },
            PackagePart {
                name: "word/_rels/document.xml.rels".to_string(),
                data: b"<Relationships/>".to_vec(),
            },
        ]
    }

    #[test]
    fn test_archive_keeps_parts_and_order() {
        let package = DocxPackage::from_parts(sample_parts()).unwrap();
        let bytes = package.to_bytes().unwrap();

        let reread = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(
            reread.part_names().collect::<Vec<_>>(),
            vec![
                "[Content_Types].xml",
                "word/document.xml",
                "word/header1.xml",
                "word/_rels/document.xml.rels"
            ]
        );
        assert_eq!(reread.part(MAIN_DOCUMENT), Some(&b"<w:document/>"[..]));
    }

    #[test]
    fn test_template_parts_are_body_headers_and_footers() {
        let package = DocxPackage::from_parts(sample_parts()).unwrap();
        let names: Vec<_> = package.template_parts().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["word/document.xml", "word/header1.xml"]);
    }

    #[test]
    fn test_missing_main_document_is_rejected() {
        let result = DocxPackage::from_parts(vec![PackagePart {
            name: "[Content_Types].xml".to_string(),
            data: Vec::new(),
        }]);
        assert!(matches!(result, Err(RenderError::Package(_))));
    }

    #[test]
    fn test_garbage_is_not_a_package() {
        let result = DocxPackage::from_bytes(b"definitely not a zip archive");
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_unknown_part_fails() {
        let mut package = DocxPackage::from_parts(sample_parts()).unwrap();
        assert!(package.replace_part("word/footer9.xml", Vec::new()).is_err());
        assert!(package
            .replace_part(MAIN_DOCUMENT, b"<w:document>x</w:document>".to_vec())
            .is_ok());
    }
}
