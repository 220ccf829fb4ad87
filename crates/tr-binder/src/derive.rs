//! Derived clause text
//!
//! Pure functions that assemble TR sentences from raw inputs. Fallback
//! wording for absent sections is passed in by the caller, since it is
//! part of each variant's configuration.

use crate::fields::{ContractType, DeadlineDays};
use crate::section::{GuaranteeTerms, InspectionTerms, SampleTerms, Section};

/// Placeholder for derived text whose inputs are still empty
pub const PLACEHOLDER: &str = "...";

/// Closing clause of the object sentence
pub const OBJECT_SUFFIX: &str =
    "conforme condições, quantidades e exigências estabelecidas neste instrumento.";

pub const INSPECTION_OPTIONAL: &str = "A vistoria técnica ao local de execução é facultativa, \
     podendo ser agendada pelos licitantes até o dia útil anterior à abertura da sessão.";

pub const INSPECTION_MANDATORY: &str = "A vistoria técnica ao local de execução é obrigatória, \
     sob pena de inabilitação do licitante que não a realizar.";

/// Full object sentence, or `placeholder` while the item name is empty
pub fn object_description(
    contract_type: ContractType,
    item_name: &str,
    placeholder: &str,
) -> String {
    if item_name.is_empty() {
        return placeholder.to_string();
    }
    format!(
        "{} {}, {}",
        contract_type.verb_prefix(),
        item_name,
        OBJECT_SUFFIX
    )
}

pub fn delivery_clause(location: &str, deadline: DeadlineDays) -> String {
    format!(
        "O objeto deverá ser entregue/executado no endereço {}, no prazo máximo de {} dias \
         corridos após o recebimento da Ordem de Compra/Serviço.",
        location, deadline
    )
}

pub fn guarantee_clause(section: &Section<GuaranteeTerms>, absent: &str) -> String {
    match section {
        Section::Absent => absent.to_string(),
        Section::Present(terms) => format!(
            "Será exigida garantia contratual de {}% sobre o valor total.",
            terms.percent
        ),
    }
}

pub fn inspection_clause(section: &Section<InspectionTerms>, absent: &str) -> String {
    match section {
        Section::Absent => absent.to_string(),
        Section::Present(InspectionTerms { mandatory: true }) => INSPECTION_MANDATORY.to_string(),
        Section::Present(InspectionTerms { mandatory: false }) => INSPECTION_OPTIONAL.to_string(),
    }
}

pub fn sample_clause(section: &Section<SampleTerms>, absent: &str) -> String {
    match section {
        Section::Absent => absent.to_string(),
        Section::Present(terms) => format!(
            "O licitante provisoriamente classificado em primeiro lugar deverá apresentar \
             amostra/prova de conceito no prazo de {} dias corridos, contados da convocação, \
             sob pena de desclassificação.",
            terms.deadline
        ),
    }
}
