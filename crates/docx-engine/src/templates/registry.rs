//! Template registry and loading

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{embedded, TemplateRef, TEMPLATE_URI_PREFIX};
use crate::renderer::{DocxTemplate, RenderError};

/// Information about a bundled template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    /// Template name (used in URIs)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Full URI for this template
    pub uri: String,
}

/// List all bundled templates
pub fn list_templates() -> Vec<TemplateInfo> {
    [
        ("modelo_tr", "Termo de Referência padrão (bens ou serviços)"),
        ("modelo_tr_servicos", "Termo de Referência para serviços com vistoria"),
        ("modelo_tr_bens", "Termo de Referência para bens com amostra"),
    ]
    .into_iter()
    .map(|(name, description)| TemplateInfo {
        name: name.to_string(),
        description: description.to_string(),
        uri: format!("{}{}", TEMPLATE_URI_PREFIX, name),
    })
    .collect()
}

/// Resolves template references to parsed templates
///
/// With a template directory, `<dir>/<name>.docx` takes precedence over the
/// bundled template of the same name, and relative paths resolve against it.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    template_dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Only bundled templates and absolute paths
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: Some(dir.into()),
        }
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    pub fn load(&self, reference: &str) -> Result<DocxTemplate, RenderError> {
        let reference = TemplateRef::parse(reference);
        debug!("Loading template {}", reference.display_name());
        match reference {
            TemplateRef::Embedded(name) => self.load_named(&name),
            TemplateRef::Path(path) => {
                let path = match &self.template_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                };
                let bytes = read_template_file(&path)?;
                DocxTemplate::from_bytes(path.display().to_string(), &bytes)
            }
        }
    }

    fn load_named(&self, name: &str) -> Result<DocxTemplate, RenderError> {
        if let Some(dir) = &self.template_dir {
            let path = dir.join(format!("{}.docx", name));
            if path.is_file() {
                info!("Using template override {}", path.display());
                let bytes = read_template_file(&path)?;
                return DocxTemplate::from_bytes(name, &bytes);
            }
        }

        let document = embedded::get_embedded_template(name)
            .ok_or_else(|| RenderError::TemplateNotFound(format!("{}{}", TEMPLATE_URI_PREFIX, name)))?;
        debug!("Packaging bundled template {}", name);
        DocxTemplate::from_bytes(name, &embedded::package(document)?)
    }
}

fn read_template_file(path: &Path) -> Result<Vec<u8>, RenderError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => RenderError::TemplateNotFound(path.display().to_string()),
        _ => RenderError::IoError(e),
    })
}
