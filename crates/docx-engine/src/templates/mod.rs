//! Template references, bundled templates and the template store

pub mod embedded;
pub mod registry;

pub use registry::{list_templates, TemplateInfo, TemplateStore};

use std::path::PathBuf;

pub const TEMPLATE_URI_PREFIX: &str = "docx://templates/";

/// Where a template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    /// `docx://templates/<name>`
    Embedded(String),
    /// Anything else is a path to a .docx file
    Path(PathBuf),
}

impl TemplateRef {
    pub fn parse(reference: &str) -> Self {
        match reference.strip_prefix(TEMPLATE_URI_PREFIX) {
            Some(name) => TemplateRef::Embedded(name.to_string()),
            None => TemplateRef::Path(PathBuf::from(reference)),
        }
    }

    /// Name shown in logs and errors
    pub fn display_name(&self) -> String {
        match self {
            TemplateRef::Embedded(name) => name.clone(),
            TemplateRef::Path(path) => path.display().to_string(),
        }
    }
}
