//! Rendered output

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A filled document, ready to be downloaded
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl RenderedDocument {
    pub fn docx(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: DOCX_MIME_TYPE,
        }
    }
}
