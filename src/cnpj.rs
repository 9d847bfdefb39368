//! CNPJ identifier parsing and display helpers.

use crate::errors::AppError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Number of digits in a CNPJ.
pub const CNPJ_LEN: usize = 14;

static CPF_MASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{3})(\d{3})(\d{3})(\d{2})$").expect("valid CPF mask pattern")
});

static CNPJ_MASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})(\d{3})(\d{3})(\d{4})(\d{2})$").expect("valid CNPJ mask pattern")
});

/// A validated CNPJ: exactly 14 ASCII digits, no punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cnpj(String);

impl Cnpj {
    /// Parses raw user input, dropping every non-digit character.
    ///
    /// `"12.345.678/0001-90"` and `"12345678000190"` both yield the same value.
    /// Anything that does not leave exactly 14 digits is rejected.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != CNPJ_LEN {
            return Err(AppError::InvalidIdentifier(
                "CNPJ inválido. Deve conter 14 dígitos.".to_string(),
            ));
        }

        Ok(Self(digits))
    }

    /// Parses an optional query parameter; absent or blank input is its own error.
    pub fn from_query(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => Self::parse(value),
            _ => Err(AppError::InvalidIdentifier(
                "CNPJ não fornecido".to_string(),
            )),
        }
    }

    /// The raw 14 digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the conventional `XX.XXX.XXX/XXXX-XX` mask.
    pub fn formatted(&self) -> String {
        mask_document(&self.0)
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Masks a partner or company document for display.
///
/// 11 digits are treated as a CPF, 14 as a CNPJ; anything else (including
/// upstream-redacted values like `***123456**`) is returned unchanged.
pub fn mask_document(doc: &str) -> String {
    if CNPJ_MASK.is_match(doc) {
        CNPJ_MASK.replace(doc, "$1.$2.$3/$4-$5").into_owned()
    } else if CPF_MASK.is_match(doc) {
        CPF_MASK.replace(doc, "$1.$2.$3-$4").into_owned()
    } else {
        doc.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_punctuation() {
        let cnpj = Cnpj::parse("12.345.678/0001-90").unwrap();
        assert_eq!(cnpj.as_str(), "12345678000190");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            Cnpj::parse("1234567800019"),
            Err(AppError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            Cnpj::parse("123456780001901"),
            Err(AppError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            Cnpj::parse("abc"),
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_from_query_missing() {
        let err = Cnpj::from_query(None).unwrap_err();
        assert_eq!(err.to_string(), "CNPJ não fornecido");

        let err = Cnpj::from_query(Some("   ")).unwrap_err();
        assert_eq!(err.to_string(), "CNPJ não fornecido");
    }

    #[test]
    fn test_formatted() {
        let cnpj = Cnpj::parse("12345678000190").unwrap();
        assert_eq!(cnpj.formatted(), "12.345.678/0001-90");
    }

    #[test]
    fn test_mask_document() {
        assert_eq!(mask_document("12345678901"), "123.456.789-01");
        assert_eq!(mask_document("12345678000190"), "12.345.678/0001-90");
        assert_eq!(mask_document("***456789**"), "***456789**");
        assert_eq!(mask_document(""), "");
    }
}
