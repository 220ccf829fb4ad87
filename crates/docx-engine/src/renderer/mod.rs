//! Filling .docx templates with a submission record

pub mod errors;
pub mod output;
pub mod tags;

use std::collections::BTreeSet;

use shared_types::SubmissionRecord;
use tracing::debug;

use crate::package::DocxPackage;
use crate::templates::TemplateStore;

pub use errors::{ErrorKind, RenderError};
pub use output::RenderedDocument;
pub use tags::TemplatePart;

/// A parsed template: the package plus the tag tree of each template part
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    name: String,
    package: DocxPackage,
    parts: Vec<(String, TemplatePart)>,
}

impl DocxTemplate {
    /// Parse a .docx template. Syntax errors surface here, not at render time.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, RenderError> {
        let name = name.into();
        let package = DocxPackage::from_bytes(bytes)?;

        let mut parts = Vec::new();
        for part in package.template_parts() {
            let xml = std::str::from_utf8(&part.data).map_err(|e| {
                RenderError::Package(format!("part '{}' is not UTF-8: {}", part.name, e))
            })?;
            let parsed = TemplatePart::parse(xml).map_err(|e| match e {
                RenderError::Syntax(msg) => {
                    RenderError::Syntax(format!("{} in {}: {}", name, part.name, msg))
                }
                other => other,
            })?;
            parts.push((part.name.clone(), parsed));
        }

        debug!(template = %name, parts = parts.len(), "Parsed template");
        Ok(Self {
            name,
            package,
            parts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys the template prints or tests anywhere, in any branch
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        self.parts
            .iter()
            .flat_map(|(_, part)| part.referenced_keys())
            .collect()
    }

    pub fn render(&self, record: &SubmissionRecord) -> Result<RenderedDocument, RenderError> {
        let mut package = self.package.clone();
        for (part_name, part) in &self.parts {
            let xml = part.render(record)?;
            package.replace_part(part_name, xml.into_bytes())?;
        }

        let bytes = package.to_bytes()?;
        debug!(template = %self.name, size = bytes.len(), "Rendered template");
        Ok(RenderedDocument::docx(bytes))
    }
}

/// Fill a bundled template, addressed by `docx://templates/<name>`
pub fn render(
    template_ref: &str,
    record: &SubmissionRecord,
) -> Result<RenderedDocument, RenderError> {
    TemplateStore::embedded().load(template_ref)?.render(record)
}
