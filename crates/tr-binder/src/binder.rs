//! Per-session form binder
//!
//! A [`FormBinder`] is created empty when a form session starts, receives
//! raw values as the user edits inputs, and produces the submission record
//! by recomputing every derived field from the current raw state. It is
//! owned by a single session and is dropped once the record is rendered.

use std::collections::{BTreeMap, BTreeSet};

use shared_types::SubmissionRecord;
use tracing::{debug, info, warn};

use crate::derive;
use crate::error::{BindError, InputError};
use crate::fields::{ContractType, DeadlineDays, FieldValue, GuaranteePercent};
use crate::keys;
use crate::locale::{today_label, Clock};
use crate::section::{GuaranteeTerms, InspectionTerms, SampleTerms, Section};
use crate::variant::{OptionalClause, VariantConfig};

pub struct FormBinder<'a> {
    variant: &'a VariantConfig,
    clock: &'a dyn Clock,
    raw: BTreeMap<String, FieldValue>,
    expected_keys: BTreeSet<String>,
}

impl<'a> FormBinder<'a> {
    pub fn new(variant: &'a VariantConfig, clock: &'a dyn Clock) -> Self {
        Self {
            variant,
            clock,
            raw: BTreeMap::new(),
            expected_keys: variant.expected_keys(),
        }
    }

    /// Add keys the document template references to the completeness check
    pub fn with_expected_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn variant(&self) -> &VariantConfig {
        self.variant
    }

    pub fn expected_keys(&self) -> &BTreeSet<String> {
        &self.expected_keys
    }

    /// Store a raw value as-is
    pub fn set_raw(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        debug!("set_raw {} = {:?}", key, value);
        self.raw.insert(key, value);
    }

    /// Check `value` against the variant's declaration, then store it
    pub fn set_input(&mut self, key: &str, value: FieldValue) -> Result<(), InputError> {
        let accepted = self.variant.accept(key, value)?;
        self.set_raw(key, accepted);
        Ok(())
    }

    /// Current value of an input: what the user entered, else its default
    ///
    /// A stored value the field's declaration would not accept as-is (a
    /// mistyped or out-of-range `set_raw`) reads as the default, so the echo
    /// and the derived clauses always see the same value.
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        let Some(field) = self.variant.field(key) else {
            return self.raw.get(key);
        };
        match self.raw.get(key) {
            Some(raw) if matches!(field.accept(raw.clone()), Ok(ref accepted) if accepted == raw) => {
                Some(raw)
            }
            Some(raw) => {
                warn!("Ignoring invalid stored value for {}: {:?}", key, raw);
                Some(&field.default)
            }
            None => Some(&field.default),
        }
    }

    fn text(&self, key: &str) -> &str {
        self.value(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    fn flag(&self, key: &str) -> bool {
        self.value(key).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    fn bounded<T>(&self, key: &str, check: impl Fn(i64) -> Option<T>) -> Option<T> {
        self.value(key).and_then(FieldValue::as_integer).and_then(check)
    }

    pub fn contract_type(&self) -> ContractType {
        self.text(keys::TIPO_CONTRATACAO).parse().unwrap_or_default()
    }

    pub fn item_name(&self) -> &str {
        self.text(keys::ITEM_NOME)
    }

    pub fn deadline(&self) -> DeadlineDays {
        self.bounded(keys::PRAZO_ENTREGA_DIAS, DeadlineDays::new)
            .unwrap_or(DeadlineDays::MIN)
    }

    pub fn guarantee(&self) -> Section<GuaranteeTerms> {
        Section::from_flag(self.flag(keys::TEM_GARANTIA), || GuaranteeTerms {
            percent: self
                .bounded(keys::PERCENTUAL_GARANTIA, GuaranteePercent::new)
                .unwrap_or_default(),
        })
    }

    pub fn inspection(&self) -> Section<InspectionTerms> {
        Section::from_flag(self.flag(keys::TEM_VISTORIA), || InspectionTerms {
            mandatory: self.flag(keys::VISTORIA_OBRIGATORIA),
        })
    }

    pub fn sample(&self) -> Section<SampleTerms> {
        Section::from_flag(self.flag(keys::TEM_AMOSTRA), || SampleTerms {
            deadline: self
                .bounded(keys::PRAZO_AMOSTRA_DIAS, DeadlineDays::new)
                .unwrap_or(DeadlineDays::MIN),
        })
    }

    pub fn derive_object_description(&self) -> String {
        derive::object_description(
            self.contract_type(),
            self.item_name(),
            &self.variant.copy.placeholder,
        )
    }

    pub fn derive_delivery_clause(&self) -> String {
        let location = match self.text(keys::LOCAL_ENTREGA) {
            "" => self.variant.copy.placeholder.as_str(),
            location => location,
        };
        derive::delivery_clause(location, self.deadline())
    }

    pub fn derive_guarantee_clause(&self) -> String {
        derive::guarantee_clause(&self.guarantee(), &self.variant.copy.guarantee_absent)
    }

    pub fn derive_inspection_clause(&self) -> String {
        derive::inspection_clause(&self.inspection(), &self.variant.copy.inspection_absent)
    }

    pub fn derive_sample_clause(&self) -> String {
        derive::sample_clause(&self.sample(), &self.variant.copy.sample_absent)
    }

    pub fn compute_today_label(&self) -> String {
        today_label(self.clock.today(), &self.variant.city)
    }

    /// Recompute the whole record from the current raw state
    ///
    /// Every declared input is echoed from [`FormBinder::value`] (integers as
    /// decimal text, toggles as flags), followed by the derived clauses and
    /// the automatic date line.
    pub fn record(&self) -> SubmissionRecord {
        let mut record = SubmissionRecord::new();

        for field in &self.variant.fields {
            match self.value(&field.key) {
                Some(FieldValue::Text(text)) => record.insert_text(&field.key, text.clone()),
                Some(FieldValue::Integer(n)) => record.insert_text(&field.key, n.to_string()),
                Some(FieldValue::Bool(flag)) => record.insert_flag(&field.key, *flag),
                None => {}
            }
        }

        record.insert_text(keys::OBJETO_COMPLETO, self.derive_object_description());
        record.insert_text(keys::LOCAL_PRAZO_ENTREGA, self.derive_delivery_clause());

        for clause in &self.variant.optional_clauses {
            let text = match clause {
                OptionalClause::Inspection => self.derive_inspection_clause(),
                OptionalClause::Sample => self.derive_sample_clause(),
                OptionalClause::Guarantee => self.derive_guarantee_clause(),
            };
            record.insert_text(clause.record_key(), text);
        }

        record.insert_text(keys::LOCAL_DATA, self.compute_today_label());
        record
    }

    /// The record, checked for every key the template expects
    pub fn finalize(&self) -> Result<SubmissionRecord, BindError> {
        let record = self.record();
        let missing = record.missing_keys(self.expected_keys.iter().map(String::as_str));
        if !missing.is_empty() {
            warn!(
                "Record for variant {} is missing {} key(s)",
                self.variant.id,
                missing.len()
            );
            return Err(BindError::MissingRequiredField(missing));
        }

        info!(
            "Finalized {} record with {} fields",
            self.variant.id,
            record.len()
        );
        Ok(record)
    }

    /// Download name for the generated document
    pub fn output_file_name(&self) -> String {
        output_file_name(self.item_name())
    }
}

/// `TR_<item name>.docx`, whitespace replaced by underscores
///
/// Control characters are dropped; quotes, backslashes and slashes become
/// underscores as well.
pub fn output_file_name(item_name: &str) -> String {
    let stem: String = item_name
        .chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("TR_{}.docx", stem)
}
