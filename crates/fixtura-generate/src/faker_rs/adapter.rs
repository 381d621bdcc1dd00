use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use fake::Fake;
use fake::faker::{address, chrono as fake_chrono, color, company, filesystem, internet, job};
use fake::faker::{lorem, name, phone_number};
use fake::locales::{EN, PT_BR};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use fixtura_core::Value;

use crate::errors::FactoryError;
use crate::faker_rs::catalog::FakeOp;
use crate::faker_rs::locales::LocaleKey;

/// Source of realistic values for named operations.
///
/// Implementations must draw all randomness from `rng` so that seeded
/// models stay reproducible.
pub trait FakeProvider: Send + Sync {
    fn produce(
        &self,
        op: FakeOp,
        locale: LocaleKey,
        rng: &mut dyn RngCore,
    ) -> Result<Value, FactoryError>;
}

/// Default provider backed by the `fake` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeRsAdapter;

const RANDOM_STRING_LEN: usize = 20;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOCALE_CODES: &[&str] = &[
    "en_US", "en_GB", "pt_BR", "pt_PT", "es_ES", "fr_FR", "de_DE", "it_IT", "ja_JP", "zh_CN",
];

macro_rules! localized {
    ($locale:expr, $rng:expr, $faker:path $(, $arg:expr)*) => {
        match $locale {
            LocaleKey::EnUs => {
                let value: String = $faker(EN $(, $arg)*).fake_with_rng($rng);
                value
            }
            LocaleKey::PtBr => {
                let value: String = $faker(PT_BR $(, $arg)*).fake_with_rng($rng);
                value
            }
        }
    };
}

impl FakeRsAdapter {
    pub fn list_ids() -> &'static [&'static str] {
        FakeOp::ALL_IDS
    }
}

impl FakeProvider for FakeRsAdapter {
    fn produce(
        &self,
        op: FakeOp,
        locale: LocaleKey,
        rng: &mut dyn RngCore,
    ) -> Result<Value, FactoryError> {
        let value = match op {
            FakeOp::Uuid4 => Value::Uuid(random_uuid(rng)),
            FakeOp::IntId => Value::Int(rng.random_range(1..=9999)),
            FakeOp::FirstName => Value::Text(localized!(locale, rng, name::raw::FirstName)),
            FakeOp::LastName => Value::Text(localized!(locale, rng, name::raw::LastName)),
            FakeOp::FullName => Value::Text(localized!(locale, rng, name::raw::Name)),
            FakeOp::Username => Value::Text(localized!(locale, rng, internet::raw::Username)),
            FakeOp::JobTitle => Value::Text(localized!(locale, rng, job::raw::Title)),
            FakeOp::Email => Value::Text(localized!(locale, rng, internet::raw::SafeEmail)),
            FakeOp::PhoneNumber => {
                Value::Text(localized!(locale, rng, phone_number::raw::PhoneNumber))
            }
            FakeOp::StreetAddress => {
                let number = localized!(locale, rng, address::raw::BuildingNumber);
                let street = localized!(locale, rng, address::raw::StreetName);
                Value::Text(format!("{number} {street}"))
            }
            FakeOp::City => Value::Text(localized!(locale, rng, address::raw::CityName)),
            FakeOp::State => Value::Text(localized!(locale, rng, address::raw::StateName)),
            FakeOp::Country => Value::Text(localized!(locale, rng, address::raw::CountryName)),
            FakeOp::CountryCode => {
                Value::Text(localized!(locale, rng, address::raw::CountryCode))
            }
            FakeOp::Postcode => Value::Text(localized!(locale, rng, address::raw::PostCode)),
            FakeOp::CompanyName => {
                Value::Text(localized!(locale, rng, company::raw::CompanyName))
            }
            FakeOp::Word => Value::Text(localized!(locale, rng, lorem::raw::Word)),
            FakeOp::Sentence => {
                Value::Text(localized!(locale, rng, lorem::raw::Sentence, 4..10))
            }
            FakeOp::Title => Value::Text(localized!(locale, rng, lorem::raw::Sentence, 4..5)),
            FakeOp::Paragraph => {
                Value::Text(localized!(locale, rng, lorem::raw::Paragraph, 3..6))
            }
            FakeOp::Slug => {
                let words: Vec<String> = lorem::raw::Words(EN, 3..4).fake_with_rng(rng);
                Value::Text(words.join("-").to_lowercase())
            }
            FakeOp::RandomString => Value::Text(random_letters(rng, RANDOM_STRING_LEN)),
            FakeOp::Url => {
                let word: String = lorem::raw::Word(EN).fake_with_rng(rng);
                let suffix: String = internet::raw::DomainSuffix(EN).fake_with_rng(rng);
                Value::Text(format!("https://www.{}.{suffix}/", word.to_lowercase()))
            }
            FakeOp::Ipv4 => Value::Text(localized!(locale, rng, internet::raw::IPv4)),
            FakeOp::Ipv6 => Value::Text(localized!(locale, rng, internet::raw::IPv6)),
            FakeOp::MacAddress => {
                Value::Text(localized!(locale, rng, internet::raw::MACAddress))
            }
            FakeOp::UserAgent => Value::Text(localized!(locale, rng, internet::raw::UserAgent)),
            FakeOp::Port => Value::Int(rng.random_range(0..=65535)),
            FakeOp::Password => {
                Value::Text(localized!(locale, rng, internet::raw::Password, 10..17))
            }
            FakeOp::Sha256 => {
                let mut seed = [0_u8; 32];
                rng.fill_bytes(&mut seed);
                Value::Text(hex::encode(Sha256::digest(seed)))
            }
            FakeOp::FileName => Value::Text(localized!(locale, rng, filesystem::raw::FileName)),
            FakeOp::FilePath => Value::Text(localized!(locale, rng, filesystem::raw::FilePath)),
            FakeOp::MimeType => Value::Text(localized!(locale, rng, filesystem::raw::MimeType)),
            FakeOp::TimeZone => Value::Text(localized!(locale, rng, address::raw::TimeZone)),
            FakeOp::LocaleCode => {
                let code = LOCALE_CODES.choose(rng).ok_or_else(|| {
                    FactoryError::Provider("no locale codes to choose from".into())
                })?;
                Value::Text((*code).to_string())
            }
            FakeOp::HexColor => Value::Text(localized!(locale, rng, color::raw::HexColor)),
            FakeOp::DateOfBirth => Value::Date(date_of_birth(rng)),
            FakeOp::Date => {
                let value: NaiveDate = fake_chrono::raw::Date(EN).fake_with_rng(rng);
                Value::Date(value)
            }
            FakeOp::DateTime => {
                let value: chrono::DateTime<Utc> =
                    fake_chrono::raw::DateTime(EN).fake_with_rng(rng);
                Value::Timestamp(value.naive_utc())
            }
            FakeOp::Time => {
                let value: NaiveTime = fake_chrono::raw::Time(EN).fake_with_rng(rng);
                Value::Time(value)
            }
            FakeOp::Age => Value::Int(rng.random_range(0..=120)),
            FakeOp::Count => Value::Int(rng.random_range(0..=1000)),
            FakeOp::Int => Value::Int(rng.random_range(0..=9999)),
            FakeOp::Float => Value::Float(rng.random_range(-10_000.0..=10_000.0)),
            FakeOp::Decimal => {
                Value::Decimal(Decimal::new(rng.random_range(-999_999_i64..=999_999), 2))
            }
            FakeOp::Boolean => Value::Bool(rng.random_bool(0.5)),
            FakeOp::Bytes => {
                let mut bytes = vec![0_u8; 16];
                rng.fill_bytes(&mut bytes);
                Value::Bytes(bytes)
            }
        };
        Ok(value)
    }
}

/// Random RFC 4122 version 4 UUID drawn from `rng`.
pub fn random_uuid(rng: &mut dyn RngCore) -> uuid::Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

fn random_letters(rng: &mut dyn RngCore, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

// Birth dates fall in a fixed window so seeded output does not drift with the clock.
fn date_of_birth(rng: &mut dyn RngCore) -> NaiveDate {
    let oldest = NaiveDate::from_ymd_opt(1910, 1, 1).unwrap_or_default();
    let youngest = NaiveDate::from_ymd_opt(2007, 12, 31).unwrap_or_default();
    let span = (youngest - oldest).num_days();
    oldest + Duration::days(rng.random_range(0..=span))
}
