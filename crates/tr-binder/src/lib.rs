//! Form binding for Termo de Referência (TR) documents
//!
//! This crate turns the values a user types into a TR form into the flat
//! [`SubmissionRecord`] consumed by the document renderer:
//! - Input surface declarations and boundary checks (`fields`)
//! - Derived clause text (`derive`) and optional sections (`section`)
//! - pt-BR date labels with an injectable clock (`locale`)
//! - The three form variants and their fallback copy (`variant`)
//! - The per-session [`FormBinder`] (`binder`)

pub mod binder;
pub mod derive;
pub mod error;
pub mod fields;
pub mod keys;
pub mod locale;
pub mod section;
pub mod variant;

pub use binder::{output_file_name, FormBinder};
pub use error::{BindError, CatalogError, InputError};
pub use fields::{ContractType, DeadlineDays, FieldKind, FieldSpec, FieldValue, GuaranteePercent};
pub use locale::{today_label, Clock, FixedClock, SystemClock};
pub use section::{GuaranteeTerms, InspectionTerms, SampleTerms, Section};
pub use variant::{ClauseCopy, OptionalClause, VariantCatalog, VariantConfig};

pub use shared_types::{RecordValue, SubmissionRecord};
