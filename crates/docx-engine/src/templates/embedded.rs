//! Bundled templates
//!
//! Templates ship as their `word/document.xml` part. The package
//! boilerplate is shared and the archive is assembled on demand.

use crate::package::{DocxPackage, PackagePart, MAIN_DOCUMENT};
use crate::renderer::RenderError;

const CONTENT_TYPES: &str = include_str!("../../templates/common/[Content_Types].xml");

const PACKAGE_RELS: &str = include_str!("../../templates/common/_rels/.rels");

/// Standard TR - loaded from templates/modelo_tr/document.xml
const MODELO_TR: &str = include_str!("../../templates/modelo_tr/document.xml");

/// Services TR - loaded from templates/modelo_tr_servicos/document.xml
const MODELO_TR_SERVICOS: &str = include_str!("../../templates/modelo_tr_servicos/document.xml");

/// Goods TR - loaded from templates/modelo_tr_bens/document.xml
const MODELO_TR_BENS: &str = include_str!("../../templates/modelo_tr_bens/document.xml");

/// Get the main document part of a bundled template
pub fn get_embedded_template(name: &str) -> Option<&'static str> {
    match name {
        "modelo_tr" => Some(MODELO_TR),
        "modelo_tr_servicos" => Some(MODELO_TR_SERVICOS),
        "modelo_tr_bens" => Some(MODELO_TR_BENS),
        _ => None,
    }
}

pub fn list_embedded_templates() -> Vec<&'static str> {
    vec!["modelo_tr", "modelo_tr_servicos", "modelo_tr_bens"]
}

/// Assemble a minimal .docx around a main document part
pub fn package(document_xml: &str) -> Result<Vec<u8>, RenderError> {
    let parts = vec![
        PackagePart {
            name: "[Content_Types].xml".to_string(),
            data: CONTENT_TYPES.as_bytes().to_vec(),
        },
        PackagePart {
            name: "_rels/.rels".to_string(),
            data: PACKAGE_RELS.as_bytes().to_vec(),
        },
        PackagePart {
            name: MAIN_DOCUMENT.to_string(),
            data: document_xml.as_bytes().to_vec(),
        },
    ];
    DocxPackage::from_parts(parts)?.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_template_exists() {
        for name in list_embedded_templates() {
            let document = get_embedded_template(name);
            assert!(document.is_some(), "{} is not bundled", name);
            assert!(document.unwrap().contains("<w:body>"));
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(get_embedded_template("modelo_obras").is_none());
    }

    #[test]
    fn test_services_template_has_inspection_clause() {
        let document = get_embedded_template("modelo_tr_servicos").unwrap();
        assert!(document.contains("{{ texto_vistoria }}"));
        assert!(!document.contains("quantidade_estimada"));
    }

    #[test]
    fn test_goods_template_has_sample_clause() {
        let document = get_embedded_template("modelo_tr_bens").unwrap();
        assert!(document.contains("{{ texto_amostra }}"));
    }

    #[test]
    fn test_package_is_a_readable_docx() {
        let bytes = package(MODELO_TR).unwrap();
        let package = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(package.part(MAIN_DOCUMENT), Some(MODELO_TR.as_bytes()));
        assert!(package.part("_rels/.rels").is_some());
    }
}
