//! Error types for the TR server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docx_engine::{ErrorKind, RenderError};
use serde::Serialize;
use thiserror::Error;
use tr_binder::{BindError, CatalogError, InputError};

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Render timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ServerError::VariantNotFound(_) => (StatusCode::NOT_FOUND, "VARIANT_NOT_FOUND"),
            ServerError::TemplateNotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
            ServerError::MissingFields(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELDS"),
            ServerError::RenderError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "RENDER_ERROR"),
            ServerError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = self.to_string();
        let (field, missing) = match self {
            ServerError::InvalidInput { field, .. } => (Some(field), Vec::new()),
            ServerError::MissingFields(keys) => (None, keys),
            _ => (None, Vec::new()),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
            field,
            missing,
        };

        (status, Json(body)).into_response()
    }
}

impl From<InputError> for ServerError {
    fn from(err: InputError) -> Self {
        ServerError::InvalidInput {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownVariant(id) => ServerError::VariantNotFound(id),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<BindError> for ServerError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::MissingRequiredField(keys) => ServerError::MissingFields(keys),
        }
    }
}

impl From<RenderError> for ServerError {
    fn from(err: RenderError) -> Self {
        match (err.kind(), err) {
            (ErrorKind::MissingResource, RenderError::TemplateNotFound(name)) => {
                ServerError::TemplateNotFound(name)
            }
            (_, RenderError::IoError(e)) => ServerError::Internal(e.to_string()),
            (_, other) => ServerError::RenderError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_keeps_field() {
        let err = ServerError::from(InputError::OutOfRange {
            field: "percentual_garantia".to_string(),
            min: 1,
            max: 5,
            value: 7,
        });
        assert!(matches!(
            &err,
            ServerError::InvalidInput { field, .. } if field == "percentual_garantia"
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_render_errors_map_by_kind() {
        let missing = ServerError::from(RenderError::TemplateNotFound("modelo_tr".into()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let undefined = ServerError::from(RenderError::UndefinedKey("nome_fiscal".into()));
        assert_eq!(
            undefined.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_unknown_variant_is_not_found() {
        let err = ServerError::from(CatalogError::UnknownVariant("obras".into()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
