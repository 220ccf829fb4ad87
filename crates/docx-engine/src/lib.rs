//! Word document templating engine
//!
//! This crate fills `.docx` templates with the values of a
//! [`shared_types::SubmissionRecord`], including:
//! - In-memory package handling (read, patch, re-zip)
//! - A docxtpl-compatible tag subset (`{{ key }}`, `{% if %}`, `{%p if %}`)
//! - Embedded TR templates and an optional on-disk override directory
//!
//! Rendering is all-or-nothing: any error aborts before bytes are produced.

pub mod package;
pub mod renderer;
pub mod templates;

pub use renderer::{render, DocxTemplate, ErrorKind, RenderError, RenderedDocument};
pub use templates::{list_templates, TemplateInfo, TemplateRef, TemplateStore};
