//! API handlers for the TR server
//!
//! Provides REST endpoints for:
//! - Variant listing (the form surface)
//! - Record preview
//! - Document generation

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use shared_types::SubmissionRecord;
use tracing::{debug, info, warn};

use tr_binder::{Clock, FieldValue, FormBinder, VariantConfig};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "tr-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Variant list response
#[derive(Serialize)]
pub struct VariantListResponse {
    pub success: bool,
    pub variants: Vec<VariantConfig>,
    pub count: usize,
}

/// Handler: GET /api/variants
pub async fn handle_list_variants(State(state): State<AppState>) -> Json<VariantListResponse> {
    let variants = state.catalog.variants().to_vec();
    let count = variants.len();

    Json(VariantListResponse {
        success: true,
        variants,
        count,
    })
}

/// Form submission body shared by preview and generate
#[derive(Debug, Clone, Deserialize)]
pub struct FormRequest {
    /// Variant id, e.g. "padrao"
    pub variant: String,

    /// Raw input values keyed by field; omitted fields keep their defaults
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Preview response
#[derive(Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub variant: String,
    /// The record as it stands, placeholders included
    pub record: SubmissionRecord,
    pub file_name: String,
    /// Expected keys the record does not carry yet
    pub missing_keys: Vec<String>,
}

/// Feed request values through the input boundary into a fresh binder
fn bind<'a>(
    variant: &'a VariantConfig,
    clock: &'a dyn Clock,
    fields: &BTreeMap<String, FieldValue>,
) -> Result<FormBinder<'a>, ServerError> {
    let mut binder = FormBinder::new(variant, clock);
    for (key, value) in fields {
        binder.set_input(key, value.clone()).map_err(|e| {
            warn!("Rejected input for {}: {}", variant.id, e);
            ServerError::from(e)
        })?;
    }
    Ok(binder)
}

/// Handler: POST /api/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<FormRequest>,
) -> Result<Json<PreviewResponse>, ServerError> {
    debug!("Preview request: variant={}", req.variant);

    let variant = state.catalog.get(&req.variant)?;
    let binder = bind(variant, state.clock.as_ref(), &req.fields)?;

    let record = binder.record();
    let missing_keys = record.missing_keys(binder.expected_keys().iter().map(String::as_str));

    Ok(Json(PreviewResponse {
        success: true,
        variant: variant.id.clone(),
        file_name: binder.output_file_name(),
        record,
        missing_keys,
    }))
}

/// Handler: POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<FormRequest>,
) -> Result<Response, ServerError> {
    info!(
        "Generate request: variant={}, fields={}",
        req.variant,
        req.fields.len()
    );

    let timeout_ms = state.timeout_ms;
    let result = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || generate_document(&state, &req)),
    )
    .await;

    let (file_name, document) = match result {
        Ok(Ok(generated)) => generated?,
        Ok(Err(join_error)) => {
            return Err(ServerError::Internal(format!(
                "Generation task panicked: {}",
                join_error
            )));
        }
        Err(_timeout) => return Err(ServerError::Timeout(timeout_ms)),
    };

    info!("Generated {} ({} bytes)", file_name, document.bytes.len());

    let disposition = content_disposition(&file_name)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(document.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// Characters left unescaped in an RFC 5987 `filename*` value
const FILENAME_ATTR: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// `attachment` disposition with an ASCII `filename` fallback and the exact
/// UTF-8 name in `filename*`
pub fn content_disposition(file_name: &str) -> Result<HeaderValue, ServerError> {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, FILENAME_ATTR);

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    ))
    .map_err(|e| ServerError::Internal(format!("Invalid file name header: {}", e)))
}

/// Bind, check against the template's keys, and render
fn generate_document(
    state: &AppState,
    req: &FormRequest,
) -> Result<(String, docx_engine::RenderedDocument), ServerError> {
    let variant = state.catalog.get(&req.variant)?;
    let binder = bind(variant, state.clock.as_ref(), &req.fields)?;

    let template = state.templates.load(&variant.template)?;
    let binder = binder.with_expected_keys(template.referenced_keys());

    let record = binder.finalize()?;
    let document = template.render(&record)?;
    Ok((binder.output_file_name(), document))
}
