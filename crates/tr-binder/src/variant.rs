//! Form variants
//!
//! Three near-identical TR forms exist. They differ in which inputs are
//! offered, which optional sections are unlocked by their gating flags and
//! in the wording used when a section is left out. All of that is data:
//! the built-in catalogue below can be replaced by a JSON file.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::derive::PLACEHOLDER;
use crate::error::{CatalogError, InputError};
use crate::fields::{ContractType, FieldKind, FieldSpec, FieldValue, GuaranteePercent};
use crate::keys;
use crate::locale::DEFAULT_CITY;

/// Optional sections a variant can unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalClause {
    Inspection,
    Sample,
    Guarantee,
}

impl OptionalClause {
    /// Toggle that gates the section
    pub fn flag_key(&self) -> &'static str {
        match self {
            OptionalClause::Inspection => keys::TEM_VISTORIA,
            OptionalClause::Sample => keys::TEM_AMOSTRA,
            OptionalClause::Guarantee => keys::TEM_GARANTIA,
        }
    }

    /// Record key of the derived clause
    pub fn record_key(&self) -> &'static str {
        match self {
            OptionalClause::Inspection => keys::TEXTO_VISTORIA,
            OptionalClause::Sample => keys::TEXTO_AMOSTRA,
            OptionalClause::Guarantee => keys::TEXTO_GARANTIA,
        }
    }
}

/// Fallback wording, per variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseCopy {
    /// Stands in for derived text while its inputs are empty
    pub placeholder: String,
    pub guarantee_absent: String,
    pub inspection_absent: String,
    pub sample_absent: String,
}

impl Default for ClauseCopy {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER.to_string(),
            guarantee_absent: "Não será exigida garantia contratual.".to_string(),
            inspection_absent: "Não será exigida vistoria técnica.".to_string(),
            sample_absent: "Não será exigida apresentação de amostra.".to_string(),
        }
    }
}

/// One form variant: its inputs, unlocked sections, copy and template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Template reference handed to the renderer
    pub template: String,
    /// City printed in the place-and-date line
    #[serde(default = "default_city")]
    pub city: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub optional_clauses: BTreeSet<OptionalClause>,
    #[serde(default)]
    pub copy: ClauseCopy,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl VariantConfig {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_clause(&self, clause: OptionalClause) -> bool {
        self.optional_clauses.contains(&clause)
    }

    /// Input boundary for this variant: unknown keys are rejected as well
    pub fn accept(&self, key: &str, value: FieldValue) -> Result<FieldValue, InputError> {
        self.field(key)
            .ok_or_else(|| InputError::UnknownField(key.to_string()))?
            .accept(value)
    }

    /// Every key a record of this variant carries
    pub fn expected_keys(&self) -> BTreeSet<String> {
        let mut expected: BTreeSet<String> = self.fields.iter().map(|f| f.key.clone()).collect();
        expected.insert(keys::OBJETO_COMPLETO.to_string());
        expected.insert(keys::LOCAL_PRAZO_ENTREGA.to_string());
        expected.extend(
            self.optional_clauses
                .iter()
                .map(|clause| clause.record_key().to_string()),
        );
        expected.insert(keys::LOCAL_DATA.to_string());
        expected
    }

    /// Check internal consistency of the declaration
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(CatalogError::DuplicateField {
                    variant: self.id.clone(),
                    field: field.key.clone(),
                });
            }
            field
                .accept(field.default.clone())
                .map_err(|source| CatalogError::InvalidDefault {
                    variant: self.id.clone(),
                    field: field.key.clone(),
                    source,
                })?;
        }

        for core in keys::CORE_INPUTS {
            if self.field(core).is_none() {
                return Err(CatalogError::MissingCoreField {
                    variant: self.id.clone(),
                    field: core.to_string(),
                });
            }
        }

        let gated = self
            .fields
            .iter()
            .filter_map(|f| f.group.as_deref().map(|group| (f.key.as_str(), group)));
        let clause_flags = self.optional_clauses.iter().map(|c| (c.flag_key(), c.flag_key()));

        for (field, group) in gated.chain(clause_flags) {
            let is_toggle = self
                .field(group)
                .is_some_and(|g| g.kind == FieldKind::Toggle);
            if !is_toggle {
                return Err(CatalogError::UndeclaredGroup {
                    variant: self.id.clone(),
                    field: field.to_string(),
                    group: group.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// The set of variants a deployment offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantCatalog {
    variants: Vec<VariantConfig>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<VariantConfig>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for variant in &variants {
            if !ids.insert(variant.id.as_str()) {
                return Err(CatalogError::DuplicateVariant(variant.id.clone()));
            }
            variant.validate()?;
        }
        Ok(Self { variants })
    }

    /// The three stock TR forms
    pub fn builtin() -> Self {
        Self {
            variants: vec![padrao(), servicos(), bens()],
        }
    }

    /// Load a catalogue from a JSON array of variants
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            "Loaded {} form variants from {}",
            catalog.variants.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let variants: Vec<VariantConfig> = serde_json::from_str(json)?;
        debug!("Parsed {} variant declarations", variants.len());
        Self::new(variants)
    }

    pub fn get(&self, id: &str) -> Result<&VariantConfig, CatalogError> {
        self.variants
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| CatalogError::UnknownVariant(id.to_string()))
    }

    pub fn variants(&self) -> &[VariantConfig] {
        &self.variants
    }

    pub fn ids(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.id.as_str()).collect()
    }

    /// Print `city` in the place-and-date line of every variant
    pub fn with_city(mut self, city: &str) -> Self {
        for variant in &mut self.variants {
            variant.city = city.to_string();
        }
        self
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const UNIDADES: &[&str] = &[
    "Departamento de TI",
    "Departamento de RH",
    "Departamento de Compras",
    "Operações",
    "Jurídico",
];

const CONTRACT_TYPES: &[&str] = &[ContractType::ACQUISITION_LABEL, ContractType::SERVICE_LABEL];

const LOCAL_PADRAO: &str = "Sede da Finep - Praia do Flamengo, 200";

fn common_head() -> Vec<FieldSpec> {
    vec![
        FieldSpec::choice(keys::UNIDADE_DEMANDANTE, "Unidade Demandante", UNIDADES),
        FieldSpec::choice(keys::TIPO_CONTRATACAO, "Tipo de Contratação", CONTRACT_TYPES),
        FieldSpec::short_text(keys::ITEM_NOME, "Nome curto do Item/Serviço", "")
            .with_placeholder("Ex: Notebooks de alto desempenho"),
    ]
}

fn justification_and_technical_details() -> Vec<FieldSpec> {
    vec![
        FieldSpec::long_text(keys::JUSTIFICATIVA, "2. Justificativa (Objetivo)")
            .with_placeholder("Descreva a necessidade da contratação..."),
        FieldSpec::long_text(keys::ESPECIFICACAO_TECNICA, "3. Especificação Técnica Detalhada")
            .with_placeholder(
                "Cole aqui a descrição técnica, requisitos mínimos, voltagem, cor, dimensões, etc.",
            ),
    ]
}

fn delivery() -> Vec<FieldSpec> {
    vec![
        FieldSpec::integer(
            keys::PRAZO_ENTREGA_DIAS,
            "Prazo de Entrega/Execução (dias)",
            1,
            30,
        ),
        FieldSpec::short_text(keys::LOCAL_ENTREGA, "Local de Entrega/Execução", LOCAL_PADRAO),
    ]
}

fn guarantee_group() -> Vec<FieldSpec> {
    vec![
        FieldSpec::toggle(keys::TEM_GARANTIA, "Exigir Garantia Contratual?"),
        FieldSpec::slider(
            keys::PERCENTUAL_GARANTIA,
            "Percentual da Garantia",
            GuaranteePercent::MIN,
            GuaranteePercent::MAX,
            GuaranteePercent::MAX,
        )
        .in_group(keys::TEM_GARANTIA),
    ]
}

/// Standard TR: inspection and sample flags only toggle document sections
fn padrao() -> VariantConfig {
    let mut fields = common_head();
    fields.push(FieldSpec::integer(keys::QUANTIDADE_ESTIMADA, "Qtd. Estimada", 1, 1));
    fields.extend(justification_and_technical_details());
    fields.extend(delivery());
    fields.push(FieldSpec::choice(
        keys::VIGENCIA_TEXTO,
        "Vigência do Contrato",
        &[
            "12 meses",
            "24 meses",
            "36 meses",
            "Vigência atrelada à garantia",
        ],
    ));
    fields.push(FieldSpec::toggle(keys::TEM_VISTORIA, "Exigir Vistoria Técnica?"));
    fields.push(FieldSpec::toggle(keys::TEM_AMOSTRA, "Exigir Amostra/PoC?"));
    fields.extend(guarantee_group());

    VariantConfig {
        id: "padrao".to_string(),
        title: "Termo de Referência".to_string(),
        description: "Modelo padrão para aquisição de bens ou contratação de serviços".to_string(),
        template: "docx://templates/modelo_tr".to_string(),
        city: default_city(),
        fields,
        optional_clauses: BTreeSet::from([OptionalClause::Guarantee]),
        copy: ClauseCopy::default(),
    }
}

/// Services TR: inspection can be made mandatory, no samples or quantities
fn servicos() -> VariantConfig {
    let mut fields = common_head();
    fields[1] = fields[1]
        .clone()
        .with_default(ContractType::SERVICE_LABEL);
    fields.extend(justification_and_technical_details());
    fields.extend(delivery());
    fields.push(FieldSpec::choice(
        keys::VIGENCIA_TEXTO,
        "Vigência do Contrato",
        &["12 meses", "24 meses", "36 meses", "48 meses", "60 meses"],
    ));
    fields.push(FieldSpec::toggle(keys::TEM_VISTORIA, "Exigir Vistoria Técnica?"));
    fields.push(
        FieldSpec::toggle(keys::VISTORIA_OBRIGATORIA, "Vistoria obrigatória?")
            .in_group(keys::TEM_VISTORIA),
    );
    fields.extend(guarantee_group());

    VariantConfig {
        id: "servicos".to_string(),
        title: "Termo de Referência - Serviços".to_string(),
        description: "Contratação de serviços continuados com vistoria técnica".to_string(),
        template: "docx://templates/modelo_tr_servicos".to_string(),
        city: default_city(),
        fields,
        optional_clauses: BTreeSet::from([OptionalClause::Inspection, OptionalClause::Guarantee]),
        copy: ClauseCopy {
            guarantee_absent: "Não haverá exigência de garantia contratual.".to_string(),
            inspection_absent: "Não será exigida vistoria técnica prévia.".to_string(),
            ..ClauseCopy::default()
        },
    }
}

/// Goods TR: samples with their own presentation deadline
fn bens() -> VariantConfig {
    let mut fields = common_head();
    fields.push(FieldSpec::integer(keys::QUANTIDADE_ESTIMADA, "Qtd. Estimada", 1, 1));
    fields.extend(justification_and_technical_details());
    fields.extend(delivery());
    fields.push(FieldSpec::choice(
        keys::VIGENCIA_TEXTO,
        "Vigência do Contrato",
        &["12 meses", "Vigência atrelada à garantia"],
    ));
    fields.push(FieldSpec::toggle(keys::TEM_VISTORIA, "Exigir Vistoria Técnica?"));
    fields.push(FieldSpec::toggle(keys::TEM_AMOSTRA, "Exigir Amostra/PoC?"));
    fields.push(
        FieldSpec::integer(
            keys::PRAZO_AMOSTRA_DIAS,
            "Prazo para apresentação da amostra (dias)",
            1,
            5,
        )
        .in_group(keys::TEM_AMOSTRA),
    );
    fields.extend(guarantee_group());

    VariantConfig {
        id: "bens".to_string(),
        title: "Termo de Referência - Bens".to_string(),
        description: "Aquisição de bens com exigência opcional de amostra".to_string(),
        template: "docx://templates/modelo_tr_bens".to_string(),
        city: default_city(),
        fields,
        optional_clauses: BTreeSet::from([OptionalClause::Sample, OptionalClause::Guarantee]),
        copy: ClauseCopy {
            guarantee_absent: "Não será exigida garantia contratual para este fornecimento."
                .to_string(),
            ..ClauseCopy::default()
        },
    }
}
