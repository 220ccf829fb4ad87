//! Input surface declarations
//!
//! Every raw field of a form variant is declared as a [`FieldSpec`]: its
//! widget kind, constraints and default. [`FieldSpec::accept`] is the input
//! boundary: out-of-range numbers, unknown options and mistyped values are
//! rejected there and never reach the binder.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A raw value as submitted by the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Bool(flag)
    }
}

/// Widget kind and constraints of a declared input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    ShortText,
    LongText,
    Integer {
        min: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Choice {
        options: Vec<String>,
    },
    Toggle,
    /// Bounded slider, both ends inclusive
    Slider {
        min: i64,
        max: i64,
    },
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::ShortText | FieldKind::LongText => "text",
            FieldKind::Integer { .. } | FieldKind::Slider { .. } => "an integer",
            FieldKind::Choice { .. } => "one of the listed options",
            FieldKind::Toggle => "a boolean",
        }
    }
}

/// Declaration of one raw input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Record key the value is stored under
    pub key: String,
    /// Label shown next to the widget
    pub label: String,
    pub kind: FieldKind,
    pub default: FieldValue,
    /// Toggle key gating this input, for fields of optional sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Hint text shown in empty inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn short_text(key: &str, label: &str, default: &str) -> Self {
        Self::new(key, label, FieldKind::ShortText, FieldValue::from(default))
    }

    pub fn long_text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::LongText, FieldValue::from(""))
    }

    pub fn integer(key: &str, label: &str, min: i64, default: i64) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Integer { min, max: None },
            FieldValue::Integer(default),
        )
    }

    /// Single-choice input; the first option is the default
    pub fn choice(key: &str, label: &str, options: &[&str]) -> Self {
        let default = options.first().copied().unwrap_or_default();
        Self::new(
            key,
            label,
            FieldKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            FieldValue::from(default),
        )
    }

    pub fn toggle(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Toggle, FieldValue::Bool(false))
    }

    pub fn slider(key: &str, label: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Slider { min, max },
            FieldValue::Integer(default),
        )
    }

    fn new(key: &str, label: &str, kind: FieldKind, default: FieldValue) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            default,
            group: None,
            placeholder: None,
        }
    }

    /// Gate this input behind a toggle
    pub fn in_group(mut self, toggle_key: &str) -> Self {
        self.group = Some(toggle_key.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = default.into();
        self
    }

    /// Check a submitted value against this field's kind and constraints
    ///
    /// Integers sent as text (as HTML forms do) are parsed first. Nothing is
    /// clamped: a value outside the declared bounds is rejected.
    pub fn accept(&self, value: FieldValue) -> Result<FieldValue, InputError> {
        match (&self.kind, value) {
            (FieldKind::ShortText | FieldKind::LongText, FieldValue::Text(text)) => {
                Ok(FieldValue::Text(text))
            }
            (FieldKind::Integer { min, max }, value) => {
                let n = self.integer_of(value)?;
                if n < *min {
                    return Err(InputError::BelowMinimum {
                        field: self.key.clone(),
                        min: *min,
                        value: n,
                    });
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(InputError::OutOfRange {
                            field: self.key.clone(),
                            min: *min,
                            max: *max,
                            value: n,
                        });
                    }
                }
                Ok(FieldValue::Integer(n))
            }
            (FieldKind::Slider { min, max }, value) => {
                let n = self.integer_of(value)?;
                if !(*min..=*max).contains(&n) {
                    return Err(InputError::OutOfRange {
                        field: self.key.clone(),
                        min: *min,
                        max: *max,
                        value: n,
                    });
                }
                Ok(FieldValue::Integer(n))
            }
            (FieldKind::Choice { options }, FieldValue::Text(choice)) => {
                if options.iter().any(|o| *o == choice) {
                    Ok(FieldValue::Text(choice))
                } else {
                    Err(InputError::NotAnOption {
                        field: self.key.clone(),
                        value: choice,
                    })
                }
            }
            (FieldKind::Toggle, FieldValue::Bool(flag)) => Ok(FieldValue::Bool(flag)),
            (kind, _) => Err(self.mismatch(kind)),
        }
    }

    fn integer_of(&self, value: FieldValue) -> Result<i64, InputError> {
        match value {
            FieldValue::Integer(n) => Ok(n),
            FieldValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| self.mismatch(&self.kind)),
            FieldValue::Bool(_) => Err(self.mismatch(&self.kind)),
        }
    }

    fn mismatch(&self, kind: &FieldKind) -> InputError {
        InputError::TypeMismatch {
            field: self.key.clone(),
            expected: kind.expected(),
        }
    }
}

/// The two kinds of procurement a TR can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[default]
    Acquisition,
    Service,
}

impl ContractType {
    pub const ACQUISITION_LABEL: &'static str = "Aquisição de Bem";
    pub const SERVICE_LABEL: &'static str = "Prestação de Serviço";

    /// Option label offered by the form
    pub fn label(&self) -> &'static str {
        match self {
            ContractType::Acquisition => Self::ACQUISITION_LABEL,
            ContractType::Service => Self::SERVICE_LABEL,
        }
    }

    /// Verb phrase that opens the object sentence
    pub fn verb_prefix(&self) -> &'static str {
        match self {
            ContractType::Acquisition => "Aquisição de",
            ContractType::Service => "Contratação de empresa para prestação de serviços de",
        }
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ContractType {
    type Err = String;

    /// Accepts the form labels as well as the snake_case ids
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            Self::ACQUISITION_LABEL | "acquisition" => Ok(ContractType::Acquisition),
            Self::SERVICE_LABEL | "service" => Ok(ContractType::Service),
            other => Err(format!("Unknown contract type: {}", other)),
        }
    }
}

/// Delivery or presentation deadline in calendar days, at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeadlineDays(u32);

impl DeadlineDays {
    pub const MIN: DeadlineDays = DeadlineDays(1);

    pub fn new(days: i64) -> Option<Self> {
        u32::try_from(days).ok().filter(|d| *d >= 1).map(DeadlineDays)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DeadlineDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract guarantee as a percentage of the total value, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuaranteePercent(u8);

impl GuaranteePercent {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(percent: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&percent) {
            Some(GuaranteePercent(percent as u8))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for GuaranteePercent {
    fn default() -> Self {
        GuaranteePercent(Self::MAX as u8)
    }
}

impl std::fmt::Display for GuaranteePercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
