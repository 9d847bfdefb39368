use serde::{Deserialize, Serialize};

// ============ Canonical Record ============

/// Unified company registration record produced from any upstream shape.
///
/// Every field is optional because upstream completeness varies; the only
/// defaults are `capital_social` (0), the `S`/`N` tax-regime flags and an
/// empty phone list, which mirror how the lookup UI consumes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    // Identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razao_social: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_fantasia: Option<String>,

    // Registration status
    #[serde(default)]
    pub situacao_cadastral: SituacaoCadastral,

    // Legal nature & size
    #[serde(default)]
    pub natureza_juridica: NaturezaJuridica,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub porte: Option<String>,

    #[serde(default)]
    pub capital_social: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio_atividade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matriz_filial: Option<String>,

    // Activity codes (CNAE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnae_principal: Option<Atividade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnaes_secundarios: Option<Vec<Atividade>>,

    // Address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_ibge: Option<String>,

    // Contacts
    #[serde(default)]
    pub telefones: Vec<Telefone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    // Tax regime (Simples Nacional / MEI)
    #[serde(default)]
    pub opcao_simples: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_opcao_simples: Option<String>,
    #[serde(default)]
    pub opcao_mei: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_opcao_mei: Option<String>,

    // Ownership (QSA)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quadro_societario: Option<Vec<Socio>>,

    /// Provenance, only attached by the multi-source resolver.
    #[serde(rename = "_api_info", skip_serializing_if = "Option::is_none")]
    pub api_info: Option<ApiInfo>,
}

/// Registration status block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SituacaoCadastral {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situacao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_situacao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situacao_especial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_situacao_especial: Option<String>,
}

/// Legal nature; upstreams send either a bare description or `{id, descricao}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaturezaJuridica {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}

/// A CNAE activity code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atividade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}

/// Phone entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telefone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(default)]
    pub is_fax: bool,
}

/// Individual (PF) or legal entity (PJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonType {
    #[serde(rename = "PF")]
    PessoaFisica,
    #[serde(rename = "PJ")]
    PessoaJuridica,
}

/// A partner from the ownership table (QSA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Raw, unmasked CPF/CNPJ as sent by the upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documento: Option<String>,
    /// Absent when an upstream `QSA` entry does not state it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<PersonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualificacao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_entrada: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faixa_etaria: Option<String>,
}

// ============ Provenance ============

/// Which upstream answered a multi-source lookup, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Adapter name.
    pub fonte: String,
    /// Exact URL that was queried.
    pub url: String,
    /// RFC 3339 UTC timestamp with milliseconds.
    pub timestamp: String,
}

// ============ API Request Models ============

/// Query string accepted by both lookup endpoints.
#[derive(Debug, Deserialize)]
pub struct CnpjQuery {
    pub cnpj: Option<String>,
}
