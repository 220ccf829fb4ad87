//! Property-based and HTTP tests for the TR server API
//!
//! Test categories:
//! - Download names and header safety
//! - Input boundary over HTTP
//! - End-to-end generation against the bundled templates
//! - Template key scanning and render failures

use std::sync::Arc;

use chrono::NaiveDate;
use docx_engine::TemplateStore;
use tr_binder::{FixedClock, VariantCatalog};

use crate::AppState;

fn fixed_state(catalog: VariantCatalog, templates: TemplateStore) -> AppState {
    AppState {
        catalog: Arc::new(catalog),
        templates: Arc::new(templates),
        clock: Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())),
        timeout_ms: 10000,
    }
}

fn default_state() -> AppState {
    fixed_state(VariantCatalog::builtin(), TemplateStore::embedded())
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use tr_binder::{output_file_name, FieldValue, VariantCatalog};

    use super::default_state;
    use crate::api::{content_disposition, handle_preview, FormRequest};

    fn variant_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("padrao".to_string()),
            Just("servicos".to_string()),
            Just("bens".to_string()),
        ]
    }

    proptest! {
        /// Property: download names never contain whitespace and keep the TR_ prefix
        #[test]
        fn file_names_have_no_whitespace(item in "[A-Za-zÀ-ú0-9 \t]{0,40}") {
            let name = output_file_name(&item);
            prop_assert!(name.starts_with("TR_"));
            prop_assert!(name.ends_with(".docx"));
            prop_assert!(!name.chars().any(char::is_whitespace));
        }

        /// Property: any item name yields a visible-ASCII Content-Disposition
        #[test]
        fn file_names_fit_in_a_header(item in ".{0,40}") {
            let header = content_disposition(&output_file_name(&item));
            prop_assert!(header.is_ok());
            let header = header.unwrap();
            prop_assert!(header.to_str().is_ok());
            prop_assert_eq!(header.to_str().unwrap().matches('"').count(), 2);
        }

        /// Property: every built-in variant previews with defaults only
        #[test]
        fn defaults_always_preview(id in variant_id()) {
            let state = default_state();
            let req = FormRequest { variant: id.clone(), fields: Default::default() };

            let response = tokio_test::block_on(handle_preview(
                axum::extract::State(state),
                axum::Json(req),
            ));
            prop_assert!(response.is_ok());
            let preview = response.unwrap();
            prop_assert_eq!(&preview.variant, &id);
            prop_assert!(preview.missing_keys.is_empty());
            prop_assert_eq!(preview.record.text("objeto_completo"), Some("..."));
        }

        /// Property: unknown fields are rejected, never silently dropped
        #[test]
        fn unknown_fields_rejected(id in variant_id(), key in "zz_[a-z]{3,10}") {
            let catalog = VariantCatalog::builtin();
            let variant = catalog.get(&id).unwrap();
            prop_assert!(variant.accept(&key, FieldValue::from("x")).is_err());
        }
    }
}

#[cfg(test)]
mod http_endpoint_tests {
    //! HTTP endpoint integration tests using axum-test

    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use docx_engine::package::{DocxPackage, MAIN_DOCUMENT};
    use serde_json::json;

    use super::default_state;
    use crate::build_router;

    /// Create a test server with the full router
    fn create_test_server() -> TestServer {
        TestServer::new(build_router(default_state())).unwrap()
    }

    fn document_text(bytes: &[u8]) -> String {
        let package = DocxPackage::from_bytes(bytes).unwrap();
        String::from_utf8(package.part(MAIN_DOCUMENT).unwrap().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let server = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "tr-server");
    }

    #[tokio::test]
    async fn test_variants_lists_the_three_forms() {
        let server = create_test_server();
        let response = server.get("/api/variants").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["count"], 3);

        let ids: Vec<&str> = json["variants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["padrao", "servicos", "bens"]);
    }

    #[tokio::test]
    async fn test_preview_derives_clauses() {
        let server = create_test_server();
        let response = server
            .post("/api/preview")
            .json(&json!({
                "variant": "padrao",
                "fields": {
                    "tipo_contratacao": "Prestação de Serviço",
                    "item_nome": "Limpeza Predial",
                    "local_entrega": "Sede",
                    "prazo_entrega_dias": 30,
                    "tem_garantia": true,
                    "percentual_garantia": 5
                }
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["file_name"], "TR_Limpeza_Predial.docx");
        assert_eq!(
            json["record"]["objeto_completo"],
            "Contratação de empresa para prestação de serviços de Limpeza Predial, conforme \
             condições, quantidades e exigências estabelecidas neste instrumento."
        );
        assert_eq!(
            json["record"]["texto_garantia"],
            "Será exigida garantia contratual de 5% sobre o valor total."
        );
        assert_eq!(
            json["record"]["local_data"],
            "Rio de Janeiro, 5 de março de 2024."
        );
        assert_eq!(json["record"]["tem_garantia"], true);
    }

    #[tokio::test]
    async fn test_preview_rejects_out_of_range_guarantee() {
        let server = create_test_server();
        let response = server
            .post("/api/preview")
            .json(&json!({
                "variant": "padrao",
                "fields": { "percentual_garantia": 9 }
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["field"], "percentual_garantia");
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_preview_rejects_zero_day_deadline() {
        let server = create_test_server();
        let response = server
            .post("/api/preview")
            .json(&json!({
                "variant": "bens",
                "fields": { "prazo_entrega_dias": 0 }
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_variant_is_404() {
        let server = create_test_server();
        let response = server
            .post("/api/generate")
            .json(&json!({ "variant": "obras" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "VARIANT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_generate_returns_docx_attachment() {
        let server = create_test_server();
        let response = server
            .post("/api/generate")
            .json(&json!({
                "variant": "padrao",
                "fields": {
                    "item_nome": "Cadeira Ergonômica",
                    "prazo_entrega_dias": 15,
                    "tem_vistoria": true
                }
            }))
            .await;
        response.assert_status_ok();

        assert_eq!(
            response.header(header::CONTENT_TYPE),
            docx_engine::renderer::output::DOCX_MIME_TYPE
        );
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"TR_Cadeira_Ergon_mica.docx\"; \
             filename*=UTF-8''TR_Cadeira_Ergon%C3%B4mica.docx"
        );

        let text = document_text(response.as_bytes());
        assert!(text.contains("Aquisição de Cadeira Ergonômica, conforme condições"));
        assert!(text.contains("no prazo máximo de 15 dias"));
        assert!(text.contains("DA VISTORIA TÉCNICA"));
        assert!(!text.contains("DA AMOSTRA"));
        assert!(text.contains("Rio de Janeiro, 5 de março de 2024."));
    }

    #[tokio::test]
    async fn test_generate_services_variant_with_mandatory_inspection() {
        let server = create_test_server();
        let response = server
            .post("/api/generate")
            .json(&json!({
                "variant": "servicos",
                "fields": {
                    "item_nome": "Manutenção Predial",
                    "tem_vistoria": true,
                    "vistoria_obrigatoria": true,
                    "tem_garantia": false
                }
            }))
            .await;
        response.assert_status_ok();

        let text = document_text(response.as_bytes());
        assert!(text.contains("Contratação de empresa para prestação de serviços de Manutenção Predial"));
        assert!(text.contains(
            "é obrigatória, sob pena de inabilitação do licitante que não a realizar."
        ));
        assert!(text.contains("O atestado de vistoria deverá acompanhar a proposta."));
        assert!(!text.contains("desclassificação"));
        assert!(text.contains("Não haverá exigência de garantia contratual."));
    }

    #[tokio::test]
    async fn test_generate_goods_variant_with_sample() {
        let server = create_test_server();
        let response = server
            .post("/api/generate")
            .json(&json!({
                "variant": "bens",
                "fields": {
                    "item_nome": "Notebooks",
                    "tem_amostra": true,
                    "prazo_amostra_dias": 7
                }
            }))
            .await;
        response.assert_status_ok();

        let text = document_text(response.as_bytes());
        assert!(text.contains("amostra/prova de conceito no prazo de 7 dias corridos"));
    }
}

#[cfg(test)]
mod regression_tests {
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum_test::TestServer;
    use docx_engine::templates::embedded;
    use serde_json::json;
    use tower::ServiceExt;
    use tr_binder::VariantCatalog;

    use super::{default_state, fixed_state};
    use crate::build_router;

    fn override_dir(tag: &str, document_xml: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tr-server-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("modelo_tr.docx"),
            embedded::package(document_xml).unwrap(),
        )
        .unwrap();
        dir
    }

    /// Regression: a template key the binder never produces is caught before rendering
    #[tokio::test]
    async fn template_key_outside_record_is_reported() {
        let dir = override_dir(
            "missing-key",
            "<w:document><w:body><w:p><w:r><w:t>{{ nome_fiscal }} {{ objeto_completo }}</w:t></w:r></w:p></w:body></w:document>",
        );
        let state = fixed_state(VariantCatalog::builtin(), docx_engine::TemplateStore::with_dir(&dir));
        let server = TestServer::new(build_router(state)).unwrap();

        let response = server
            .post("/api/generate")
            .json(&json!({ "variant": "padrao" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "MISSING_FIELDS");
        assert_eq!(json["missing"], json!(["nome_fiscal"]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    /// Regression: a broken template is a render error, not a crash
    #[tokio::test]
    async fn unbalanced_template_is_render_error() {
        let dir = override_dir(
            "syntax",
            "<w:document><w:body><w:p><w:r><w:t>{% if tem_garantia %}</w:t></w:r></w:p></w:body></w:document>",
        );
        let state = fixed_state(VariantCatalog::builtin(), docx_engine::TemplateStore::with_dir(&dir));
        let server = TestServer::new(build_router(state)).unwrap();

        let response = server
            .post("/api/generate")
            .json(&json!({ "variant": "padrao" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<serde_json::Value>()["code"], "RENDER_ERROR");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    /// Regression: a variant pointing at a template that does not exist
    #[tokio::test]
    async fn missing_template_is_404() {
        let mut variants = VariantCatalog::builtin().variants().to_vec();
        variants[0].template = "docx://templates/modelo_obras".to_string();
        let catalog = VariantCatalog::new(variants).unwrap();

        let state = fixed_state(catalog, docx_engine::TemplateStore::embedded());
        let server = TestServer::new(build_router(state)).unwrap();

        let response = server
            .post("/api/generate")
            .json(&json!({ "variant": "padrao" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<serde_json::Value>()["code"],
            "TEMPLATE_NOT_FOUND"
        );
    }

    /// Regression: quotes in the item name stay inside the filename parameter
    #[tokio::test]
    async fn quoted_item_name_keeps_header_well_formed() {
        let server = TestServer::new(build_router(default_state())).unwrap();
        let response = server
            .post("/api/generate")
            .json(&json!({
                "variant": "padrao",
                "fields": { "item_nome": "Cabo 2\" x" }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"TR_Cabo_2__x.docx\"; filename*=UTF-8''TR_Cabo_2__x.docx"
        );
    }

    /// Regression: a control character in the item name is not a server error
    #[tokio::test]
    async fn control_character_in_item_name_generates() {
        let server = TestServer::new(build_router(default_state())).unwrap();
        let response = server
            .post("/api/generate")
            .json(&json!({
                "variant": "padrao",
                "fields": { "item_nome": "Cabo\u{7f}x" }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"TR_Cabox.docx\"; filename*=UTF-8''TR_Cabox.docx"
        );
    }

    /// Regression: malformed JSON never reaches the binder
    #[tokio::test]
    async fn malformed_body_is_rejected_by_the_extractor() {
        let app = build_router(default_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/preview")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"variant": "padrao", "fields": {"prazo_entrega_dias": 1.5}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
