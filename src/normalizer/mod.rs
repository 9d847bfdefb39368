//! Maps any supported upstream payload into a [`CanonicalRecord`].
//!
//! Two payload families are understood: the flat shape (fields at the top level)
//! and the nested shape where establishment data lives under `estabelecimento`.
//! Text fields are resolved through the table in [`rules`]; fields with
//! type-specific handling (capital, activity codes, phones, tax flags and
//! partners) have dedicated extractors below.

pub mod lookup;
pub mod rules;

use crate::models::{
    Atividade, CanonicalRecord, NaturezaJuridica, PersonType, SituacaoCadastral, Socio, Telefone,
};
use lookup::{as_text, at, first_array, present, text};
use rules::EST;
use serde_json::Value;

/// Markers some upstreams use for a partner's person type.
const PESSOA_FISICA: &str = "Pessoa Física";
const PESSOA_JURIDICA: &str = "Pessoa Jurídica";

/// Normalizes a raw upstream payload. Pure; never fails.
pub fn normalize(raw: &Value) -> CanonicalRecord {
    CanonicalRecord {
        cnpj: rules::CNPJ.resolve(raw),
        razao_social: rules::RAZAO_SOCIAL.resolve(raw),
        nome_fantasia: rules::NOME_FANTASIA.resolve(raw),
        situacao_cadastral: SituacaoCadastral {
            situacao: rules::SITUACAO.resolve(raw),
            data_situacao: rules::DATA_SITUACAO.resolve(raw),
            motivo: rules::MOTIVO_SITUACAO.resolve(raw),
            situacao_especial: rules::SITUACAO_ESPECIAL.resolve(raw),
            data_situacao_especial: rules::DATA_SITUACAO_ESPECIAL.resolve(raw),
        },
        natureza_juridica: NaturezaJuridica {
            codigo: rules::NATUREZA_JURIDICA_CODIGO.resolve(raw),
            descricao: rules::NATUREZA_JURIDICA_DESCRICAO.resolve(raw),
        },
        porte: rules::PORTE.resolve(raw),
        capital_social: capital_social(raw),
        data_inicio_atividade: rules::DATA_INICIO_ATIVIDADE.resolve(raw),
        matriz_filial: rules::MATRIZ_FILIAL.resolve(raw),
        cnae_principal: cnae_principal(raw),
        cnaes_secundarios: cnaes_secundarios(raw),
        logradouro: rules::LOGRADOURO.resolve(raw),
        numero: rules::NUMERO.resolve(raw),
        complemento: rules::COMPLEMENTO.resolve(raw),
        bairro: rules::BAIRRO.resolve(raw),
        municipio: rules::MUNICIPIO.resolve(raw),
        uf: rules::UF.resolve(raw),
        cep: rules::CEP.resolve(raw),
        codigo_ibge: rules::CODIGO_IBGE.resolve(raw),
        telefones: telefones(raw),
        email: rules::EMAIL.resolve(raw),
        opcao_simples: regime_flag(raw, "opcao_simples", "simples"),
        data_opcao_simples: rules::DATA_OPCAO_SIMPLES.resolve(raw),
        opcao_mei: regime_flag(raw, "opcao_mei", "mei"),
        data_opcao_mei: rules::DATA_OPCAO_MEI.resolve(raw),
        quadro_societario: quadro_societario(raw),
        api_info: None,
    }
}

/// Share capital as a number; 0 when absent or unreadable.
pub fn capital_social(raw: &Value) -> f64 {
    match present(raw, &["capital_social"]) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_capital(s),
        _ => 0.0,
    }
}

/// Parses a capital figure sent as text.
///
/// A comma marks the decimal separator (`"1.500,50"`), in which case dots are
/// thousands separators. Without a comma the text is read as a plain decimal.
pub fn parse_capital(s: &str) -> f64 {
    let trimmed = s.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Primary CNAE: explicit `cnae_principal` first, then the nested main activity.
fn cnae_principal(raw: &Value) -> Option<Atividade> {
    if let Some(explicit) = present(raw, &["cnae_principal"]) {
        // Some upstreams send the bare code instead of an object.
        let codigo = text(explicit, &["codigo"]).or_else(|| match explicit {
            Value::Object(_) => None,
            scalar => as_text(scalar),
        });
        let descricao = text(explicit, &["descricao"])
            .or_else(|| text(raw, &[EST, "atividade_principal", "descricao"]));
        return Some(Atividade { codigo, descricao });
    }

    present(raw, &[EST, "atividade_principal"]).map(|main| Atividade {
        codigo: text(main, &["subclasse"]),
        descricao: text(main, &["descricao"]),
    })
}

fn cnaes_secundarios(raw: &Value) -> Option<Vec<Atividade>> {
    first_array(
        raw,
        &[&["cnaes_secundarios"], &[EST, "atividades_secundarias"]],
    )
    .map(|entries| {
        entries
            .iter()
            .filter(|entry| entry.is_object())
            .map(|entry| Atividade {
                codigo: text(entry, &["codigo"]).or_else(|| text(entry, &["subclasse"])),
                descricao: text(entry, &["descricao"]),
            })
            .collect()
    })
}

/// Phone list: the upstream list when given, else up to two entries built from
/// the `ddd1/telefone1` and `ddd2/telefone2` pairs. Incomplete pairs are dropped.
fn telefones(raw: &Value) -> Vec<Telefone> {
    if let Some(list) = present(raw, &["telefones"]).and_then(Value::as_array) {
        return list
            .iter()
            .filter(|entry| entry.is_object())
            .map(|entry| Telefone {
                ddd: text(entry, &["ddd"]),
                numero: text(entry, &["numero"]),
                is_fax: at(entry, &["is_fax"])
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
            .collect();
    }

    [("ddd1", "telefone1"), ("ddd2", "telefone2")]
        .into_iter()
        .filter_map(|(ddd_key, number_key)| {
            let ddd = text(raw, &[ddd_key]).or_else(|| text(raw, &[EST, ddd_key]))?;
            let numero = text(raw, &[number_key]).or_else(|| text(raw, &[EST, number_key]))?;
            Some(Telefone {
                ddd: Some(ddd),
                numero: Some(numero),
                is_fax: false,
            })
        })
        .collect()
}

/// Simples Nacional / MEI opt-in flag.
///
/// A present flat value passes through untouched; only when it is absent (or
/// falsy, e.g. `""`) is `S`/`N` derived from `simples.<nested_key> == "Sim"`.
fn regime_flag(raw: &Value, flat_key: &str, nested_key: &str) -> String {
    let flat = present(raw, &[flat_key]).and_then(|value| match value {
        Value::Bool(true) => Some("S".to_string()),
        other => as_text(other),
    });
    if let Some(flag) = flat {
        return flag;
    }

    let opted_in = at(raw, &["simples", nested_key]).and_then(Value::as_str) == Some("Sim");
    let flag = if opted_in { "S" } else { "N" };
    flag.to_string()
}

/// Ownership table from either `QSA` or `socios`.
///
/// `QSA` entries keep whatever person type they already declare and stay
/// untyped otherwise. `socios` entries are always classified, PF or else PJ.
fn quadro_societario(raw: &Value) -> Option<Vec<Socio>> {
    if let Some(entries) = first_array(raw, &[&["QSA"]]) {
        return Some(partners(entries, declared_person_type));
    }

    first_array(raw, &[&["socios"]]).map(|entries| {
        partners(entries, |entry| Some(classified_person_type(entry)))
    })
}

fn partners(entries: &[Value], tipo: impl Fn(&Value) -> Option<PersonType>) -> Vec<Socio> {
    entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| socio(entry, tipo(entry)))
        .collect()
}

fn socio(entry: &Value, tipo: Option<PersonType>) -> Socio {
    Socio {
        nome: text(entry, &["nome"]).or_else(|| text(entry, &["nome_socio"])),
        documento: text(entry, &["cpf_cnpj_socio"]).or_else(|| text(entry, &["documento"])),
        tipo,
        qualificacao: text(entry, &["qualificacao_socio", "descricao"])
            .or_else(|| text(entry, &["qualificacao_socio"]))
            .or_else(|| text(entry, &["qualificacao"]))
            .or_else(|| text(entry, &["qual"])),
        data_entrada: text(entry, &["data_entrada_sociedade"])
            .or_else(|| text(entry, &["data_entrada"])),
        faixa_etaria: text(entry, &["faixa_etaria"]),
    }
}

/// Person type stated by the entry itself, if any.
fn declared_person_type(entry: &Value) -> Option<PersonType> {
    ["tipo", "identificador_socio"]
        .into_iter()
        .filter_map(|key| at(entry, &[key]).and_then(Value::as_str))
        .find_map(|marker| match marker {
            "PF" | PESSOA_FISICA => Some(PersonType::PessoaFisica),
            "PJ" | PESSOA_JURIDICA => Some(PersonType::PessoaJuridica),
            _ => None,
        })
}

fn classified_person_type(entry: &Value) -> PersonType {
    match declared_person_type(entry) {
        Some(PersonType::PessoaFisica) => PersonType::PessoaFisica,
        _ => PersonType::PessoaJuridica,
    }
}
