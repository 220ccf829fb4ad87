//! Record and input keys shared by the variants and the templates

// Raw inputs
pub const UNIDADE_DEMANDANTE: &str = "unidade_demandante";
pub const TIPO_CONTRATACAO: &str = "tipo_contratacao";
pub const ITEM_NOME: &str = "item_nome";
pub const QUANTIDADE_ESTIMADA: &str = "quantidade_estimada";
pub const JUSTIFICATIVA: &str = "justificativa";
pub const ESPECIFICACAO_TECNICA: &str = "especificacao_tecnica";
pub const PRAZO_ENTREGA_DIAS: &str = "prazo_entrega_dias";
pub const LOCAL_ENTREGA: &str = "local_entrega";
pub const VIGENCIA_TEXTO: &str = "vigencia_texto";

// Gating flags and their input groups
pub const TEM_VISTORIA: &str = "tem_vistoria";
pub const VISTORIA_OBRIGATORIA: &str = "vistoria_obrigatoria";
pub const TEM_AMOSTRA: &str = "tem_amostra";
pub const PRAZO_AMOSTRA_DIAS: &str = "prazo_amostra_dias";
pub const TEM_GARANTIA: &str = "tem_garantia";
pub const PERCENTUAL_GARANTIA: &str = "percentual_garantia";

// Derived text
pub const OBJETO_COMPLETO: &str = "objeto_completo";
pub const LOCAL_PRAZO_ENTREGA: &str = "local_prazo_entrega";
pub const TEXTO_VISTORIA: &str = "texto_vistoria";
pub const TEXTO_AMOSTRA: &str = "texto_amostra";
pub const TEXTO_GARANTIA: &str = "texto_garantia";

// Automatic
pub const LOCAL_DATA: &str = "local_data";

/// Inputs every variant must declare for the core clauses to be derivable
pub const CORE_INPUTS: &[&str] = &[TIPO_CONTRATACAO, ITEM_NOME, PRAZO_ENTREGA_DIAS, LOCAL_ENTREGA];
