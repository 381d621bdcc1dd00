use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FactoryError;

/// Locales the realistic-value provider can produce data for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocaleKey {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "pt_BR")]
    PtBr,
}

impl LocaleKey {
    pub const ALL: &'static [LocaleKey] = &[LocaleKey::EnUs, LocaleKey::PtBr];

    /// Every spelling [`LocaleKey::parse`] accepts.
    pub const SPELLINGS: &'static [&'static str] =
        &["en_US", "en-US", "en", "pt_BR", "pt-BR", "pt"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_US" | "en-US" | "en" => Some(Self::EnUs),
            "pt_BR" | "pt-BR" | "pt" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleKey {
    type Err = FactoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| FactoryError::InvalidArgument(format!("unsupported locale '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_rejects_unknown() {
        assert_eq!(LocaleKey::parse("pt-BR"), Some(LocaleKey::PtBr));
        assert_eq!("en_US".parse::<LocaleKey>().ok(), Some(LocaleKey::EnUs));
        assert!("fr_FR".parse::<LocaleKey>().is_err());
    }

    #[test]
    fn every_spelling_parses() {
        for spelling in LocaleKey::SPELLINGS {
            assert!(LocaleKey::parse(spelling).is_some(), "{spelling}");
        }
        for locale in LocaleKey::ALL {
            assert_eq!(LocaleKey::parse(locale.as_str()), Some(*locale));
        }
    }
}
