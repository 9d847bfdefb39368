//! Priority-ordered resolution table for the text fields of the canonical record.
//!
//! Each rule lists where a field may live in an upstream payload. Flat
//! (top-level) locations come first, then the `estabelecimento`-nested
//! equivalent. The first source holding a present value wins; values are never
//! merged.

use super::lookup::{at, text, Path};
use serde_json::Value;

/// Key of the nested establishment block.
pub(crate) const EST: &str = "estabelecimento";

/// Where a field value can come from.
pub enum Source {
    /// Text at a key path.
    Path(Path),
    /// Value computed from the whole payload.
    Derived(fn(&Value) -> Option<String>),
}

/// Ordered candidate sources for one canonical field.
pub struct FieldRule {
    pub field: &'static str,
    pub sources: &'static [Source],
}

impl FieldRule {
    pub fn resolve(&self, raw: &Value) -> Option<String> {
        self.sources.iter().find_map(|source| match source {
            Source::Path(path) => text(raw, path),
            Source::Derived(extract) => extract(raw),
        })
    }
}

/// `tipo_logradouro` + `logradouro` from the establishment block.
fn establishment_street(raw: &Value) -> Option<String> {
    let street = text(raw, &[EST, "logradouro"]);
    match (text(raw, &[EST, "tipo_logradouro"]), street) {
        (Some(kind), Some(street)) => Some(format!("{} {}", kind, street)),
        (_, street) => street,
    }
}

// Identity

pub const CNPJ: FieldRule = FieldRule {
    field: "cnpj",
    sources: &[Source::Path(&["cnpj"]), Source::Path(&[EST, "cnpj"])],
};

pub const RAZAO_SOCIAL: FieldRule = FieldRule {
    field: "razao_social",
    sources: &[Source::Path(&["razao_social"])],
};

pub const NOME_FANTASIA: FieldRule = FieldRule {
    field: "nome_fantasia",
    sources: &[
        Source::Path(&["nome_fantasia"]),
        Source::Path(&[EST, "nome_fantasia"]),
    ],
};

// Registration status

pub const SITUACAO: FieldRule = FieldRule {
    field: "situacao_cadastral.situacao",
    sources: &[
        Source::Path(&["situacao_cadastral"]),
        Source::Path(&[EST, "situacao_cadastral"]),
    ],
};

pub const DATA_SITUACAO: FieldRule = FieldRule {
    field: "situacao_cadastral.data_situacao",
    sources: &[
        Source::Path(&["data_situacao_cadastral"]),
        Source::Path(&[EST, "data_situacao_cadastral"]),
    ],
};

pub const MOTIVO_SITUACAO: FieldRule = FieldRule {
    field: "situacao_cadastral.motivo",
    sources: &[
        Source::Path(&["motivo_situacao_cadastral"]),
        Source::Path(&[EST, "motivo_situacao_cadastral"]),
    ],
};

pub const SITUACAO_ESPECIAL: FieldRule = FieldRule {
    field: "situacao_cadastral.situacao_especial",
    sources: &[
        Source::Path(&["situacao_especial"]),
        Source::Path(&[EST, "situacao_especial"]),
    ],
};

pub const DATA_SITUACAO_ESPECIAL: FieldRule = FieldRule {
    field: "situacao_cadastral.data_situacao_especial",
    sources: &[
        Source::Path(&["data_situacao_especial"]),
        Source::Path(&[EST, "data_situacao_especial"]),
    ],
};

// Legal nature & size

pub const NATUREZA_JURIDICA_CODIGO: FieldRule = FieldRule {
    field: "natureza_juridica.codigo",
    sources: &[
        Source::Path(&["natureza_juridica", "id"]),
        Source::Path(&["natureza_juridica", "codigo"]),
    ],
};

/// A bare string is the description itself; an object unwraps `descricao`.
pub const NATUREZA_JURIDICA_DESCRICAO: FieldRule = FieldRule {
    field: "natureza_juridica.descricao",
    sources: &[Source::Path(&["natureza_juridica"])],
};

pub const PORTE: FieldRule = FieldRule {
    field: "porte",
    sources: &[
        Source::Path(&["porte", "descricao"]),
        Source::Path(&["porte_empresa"]),
        Source::Path(&["porte"]),
    ],
};

pub const DATA_INICIO_ATIVIDADE: FieldRule = FieldRule {
    field: "data_inicio_atividade",
    sources: &[
        Source::Path(&["data_inicio_atividade"]),
        Source::Path(&[EST, "data_inicio_atividade"]),
    ],
};

pub const MATRIZ_FILIAL: FieldRule = FieldRule {
    field: "matriz_filial",
    sources: &[Source::Path(&["matriz_filial"]), Source::Path(&[EST, "tipo"])],
};

// Address

pub const LOGRADOURO: FieldRule = FieldRule {
    field: "logradouro",
    sources: &[
        Source::Path(&["logradouro"]),
        Source::Derived(establishment_street),
    ],
};

pub const NUMERO: FieldRule = FieldRule {
    field: "numero",
    sources: &[Source::Path(&["numero"]), Source::Path(&[EST, "numero"])],
};

pub const COMPLEMENTO: FieldRule = FieldRule {
    field: "complemento",
    sources: &[
        Source::Path(&["complemento"]),
        Source::Path(&[EST, "complemento"]),
    ],
};

pub const BAIRRO: FieldRule = FieldRule {
    field: "bairro",
    sources: &[Source::Path(&["bairro"]), Source::Path(&[EST, "bairro"])],
};

pub const MUNICIPIO: FieldRule = FieldRule {
    field: "municipio",
    sources: &[
        Source::Path(&["municipio"]),
        Source::Path(&[EST, "cidade", "nome"]),
    ],
};

pub const UF: FieldRule = FieldRule {
    field: "uf",
    sources: &[Source::Path(&["uf"]), Source::Path(&[EST, "estado", "sigla"])],
};

pub const CEP: FieldRule = FieldRule {
    field: "cep",
    sources: &[Source::Path(&["cep"]), Source::Path(&[EST, "cep"])],
};

pub const CODIGO_IBGE: FieldRule = FieldRule {
    field: "codigo_ibge",
    sources: &[Source::Path(&[EST, "cidade", "ibge_id"])],
};

// Contacts

pub const EMAIL: FieldRule = FieldRule {
    field: "email",
    sources: &[Source::Path(&["email"]), Source::Path(&[EST, "email"])],
};

// Tax regime dates

pub const DATA_OPCAO_SIMPLES: FieldRule = FieldRule {
    field: "data_opcao_simples",
    sources: &[
        Source::Path(&["data_opcao_simples"]),
        Source::Path(&["simples", "data_opcao_simples"]),
    ],
};

pub const DATA_OPCAO_MEI: FieldRule = FieldRule {
    field: "data_opcao_mei",
    sources: &[
        Source::Path(&["data_opcao_mei"]),
        Source::Path(&["simples", "data_opcao_mei"]),
    ],
};

/// Every text rule, in canonical field order.
pub const TEXT_RULES: &[&FieldRule] = &[
    &CNPJ,
    &RAZAO_SOCIAL,
    &NOME_FANTASIA,
    &SITUACAO,
    &DATA_SITUACAO,
    &MOTIVO_SITUACAO,
    &SITUACAO_ESPECIAL,
    &DATA_SITUACAO_ESPECIAL,
    &NATUREZA_JURIDICA_CODIGO,
    &NATUREZA_JURIDICA_DESCRICAO,
    &PORTE,
    &DATA_INICIO_ATIVIDADE,
    &MATRIZ_FILIAL,
    &LOGRADOURO,
    &NUMERO,
    &COMPLEMENTO,
    &BAIRRO,
    &MUNICIPIO,
    &UF,
    &CEP,
    &CODIGO_IBGE,
    &EMAIL,
    &DATA_OPCAO_SIMPLES,
    &DATA_OPCAO_MEI,
];

/// Whether the payload carries the nested establishment shape.
pub fn is_nested_shape(raw: &Value) -> bool {
    at(raw, &[EST]).map_or(false, Value::is_object)
}
