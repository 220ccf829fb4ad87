//! Optional TR sections
//!
//! A gated section is either absent or present with all of its fields, so
//! a flag can never be on while its inputs are unset.

use serde::{Deserialize, Serialize};

use crate::fields::{DeadlineDays, GuaranteePercent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "terms", rename_all = "snake_case")]
pub enum Section<T> {
    Absent,
    Present(T),
}

impl<T> Section<T> {
    /// Build from a gating flag; `terms` only runs when the flag is on
    pub fn from_flag(enabled: bool, terms: impl FnOnce() -> T) -> Self {
        if enabled {
            Section::Present(terms())
        } else {
            Section::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Section::Present(_))
    }

    pub fn terms(&self) -> Option<&T> {
        match self {
            Section::Absent => None,
            Section::Present(terms) => Some(terms),
        }
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Absent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeTerms {
    pub percent: GuaranteePercent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionTerms {
    /// Bidders that skip a mandatory inspection are disqualified
    pub mandatory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTerms {
    pub deadline: DeadlineDays,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag_skips_terms_when_off() {
        let section: Section<InspectionTerms> =
            Section::from_flag(false, || panic!("terms must not be built"));
        assert_eq!(section, Section::Absent);
        assert!(section.terms().is_none());
    }

    #[test]
    fn test_present_section_carries_terms() {
        let section = Section::from_flag(true, || InspectionTerms { mandatory: true });
        assert!(section.is_present());
        assert_eq!(section.terms().map(|t| t.mandatory), Some(true));
    }

    #[test]
    fn test_serialized_shape() {
        let section = Section::Present(GuaranteeTerms {
            percent: GuaranteePercent::default(),
        });
        let json = serde_json::to_value(section).unwrap();
        assert_eq!(json["status"], "present");
        assert_eq!(json["terms"]["percent"], 5);

        let absent: Section<GuaranteeTerms> = Section::Absent;
        assert_eq!(serde_json::to_value(absent).unwrap()["status"], "absent");
    }
}
