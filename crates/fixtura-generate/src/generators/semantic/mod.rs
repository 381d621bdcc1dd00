//! Name and type driven inference for fields without a declaration.

use fixtura_core::ScalarType::{Date as D, DateTime as Dt, Int as I, String as S, Uuid as U};
use fixtura_core::{FieldMap, FieldType, ScalarType, Value};

use crate::errors::FactoryError;
use crate::faker_rs::FakeOp;
use crate::generators::{Descriptor, Field, ResolveContext};

/// What an undeclared field resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inferred {
    Provider(FakeOp),
    EmptyList,
    EmptyMap,
    Null,
}

struct NameRule {
    names: &'static [&'static str],
    scalar: ScalarType,
    op: FakeOp,
}

const fn rule(names: &'static [&'static str], scalar: ScalarType, op: FakeOp) -> NameRule {
    NameRule { names, scalar, op }
}

const IDENTITY: &[NameRule] = &[
    rule(&["id", "uuid", "pk", "uid"], U, FakeOp::Uuid4),
    rule(&["id", "pk"], I, FakeOp::IntId),
];

const PERSON: &[NameRule] = &[
    rule(&["firstname", "fname"], S, FakeOp::FirstName),
    rule(&["lastname", "lname", "surname", "familyname"], S, FakeOp::LastName),
    rule(&["fullname", "name", "displayname"], S, FakeOp::FullName),
    rule(&["username", "login"], S, FakeOp::Username),
    rule(&["jobtitle", "position", "role", "occupation"], S, FakeOp::JobTitle),
];

const CONTACT: &[NameRule] = &[
    rule(&["email", "emailaddress"], S, FakeOp::Email),
    rule(&["phone", "phonenumber", "mobile"], S, FakeOp::PhoneNumber),
];

const ADDRESS: &[NameRule] = &[
    rule(&["street", "streetaddress", "address"], S, FakeOp::StreetAddress),
    rule(&["city", "town"], S, FakeOp::City),
    rule(&["state", "region", "province"], S, FakeOp::State),
    rule(&["country", "countryname"], S, FakeOp::Country),
    rule(&["countrycode"], S, FakeOp::CountryCode),
    rule(&["zipcode", "postalcode", "postcode"], S, FakeOp::Postcode),
];

const COMPANY: &[NameRule] = &[rule(
    &["companyname", "company", "organization", "org"],
    S,
    FakeOp::CompanyName,
)];

const TEXT: &[NameRule] = &[
    rule(
        &["description", "desc", "bio", "summary", "note", "notes"],
        S,
        FakeOp::Sentence,
    ),
    rule(&["title", "heading"], S, FakeOp::Title),
    rule(&["slug"], S, FakeOp::Slug),
];

const WEB: &[NameRule] = &[
    rule(&["url", "website", "homepage"], S, FakeOp::Url),
    rule(&["ipaddress", "ip", "ipv4"], S, FakeOp::Ipv4),
    rule(&["ipv6"], S, FakeOp::Ipv6),
    rule(&["macaddress", "mac"], S, FakeOp::MacAddress),
    rule(&["useragent", "ua"], S, FakeOp::UserAgent),
];

const SECURITY: &[NameRule] = &[
    rule(&["password", "passwd", "secret"], S, FakeOp::Password),
    rule(&["token", "accesstoken", "apikey"], S, FakeOp::Sha256),
];

const FILES: &[NameRule] = &[
    rule(&["filename"], S, FakeOp::FileName),
    rule(&["filepath", "path"], S, FakeOp::FilePath),
    rule(&["mimetype", "contenttype"], S, FakeOp::MimeType),
];

const DISPLAY: &[NameRule] = &[
    rule(&["timezone", "tz"], S, FakeOp::TimeZone),
    rule(&["locale", "lang", "language"], S, FakeOp::LocaleCode),
    rule(&["color", "colour", "hexcolor"], S, FakeOp::HexColor),
];

const TEMPORAL_DATE: &[NameRule] = &[
    rule(&["birthdate", "dob", "dateofbirth"], D, FakeOp::DateOfBirth),
    rule(&["startdate", "fromdate"], D, FakeOp::Date),
    rule(&["enddate", "todate", "expirydate", "expiresat"], D, FakeOp::Date),
];

const TEMPORAL_DATETIME: &[NameRule] = &[
    rule(
        &["createdat", "updatedat", "deletedat", "timestamp"],
        Dt,
        FakeOp::DateTime,
    ),
    rule(&["publishedat", "postedat", "sentat"], Dt, FakeOp::DateTime),
];

const NUMERIC: &[NameRule] = &[
    rule(&["age"], I, FakeOp::Age),
    rule(&["count", "quantity", "qty", "total"], I, FakeOp::Count),
    rule(&["port"], I, FakeOp::Port),
];

/// Rule groups in match priority order.
const NAME_RULES: &[&[NameRule]] = &[
    IDENTITY,
    PERSON,
    CONTACT,
    ADDRESS,
    COMPANY,
    TEXT,
    WEB,
    SECURITY,
    FILES,
    DISPLAY,
    TEMPORAL_DATE,
    TEMPORAL_DATETIME,
    NUMERIC,
];

const TYPE_DEFAULTS: &[(ScalarType, FakeOp)] = &[
    (ScalarType::String, FakeOp::RandomString),
    (ScalarType::Int, FakeOp::Int),
    (ScalarType::Float, FakeOp::Float),
    (ScalarType::Bool, FakeOp::Boolean),
    (ScalarType::DateTime, FakeOp::DateTime),
    (ScalarType::Date, FakeOp::Date),
    (ScalarType::Time, FakeOp::Time),
    (ScalarType::Decimal, FakeOp::Decimal),
    (ScalarType::Uuid, FakeOp::Uuid4),
    (ScalarType::Bytes, FakeOp::Bytes),
];

/// Picks a value source for an undeclared field from its name and type.
///
/// One `Optional` layer is ignored. Names are compared lowercased with
/// underscores removed; the first rule whose name and type both match wins.
pub fn infer(name: &str, field_type: &FieldType) -> Inferred {
    let field_type = field_type.unwrap_optional();
    let normalized = normalize(name);

    if let Some(scalar) = field_type.scalar() {
        let matched = NAME_RULES
            .iter()
            .flat_map(|group| group.iter())
            .find(|rule| rule.scalar == scalar && rule.names.contains(&normalized.as_str()));
        if let Some(rule) = matched {
            return Inferred::Provider(rule.op);
        }

        if let Some((_, op)) = TYPE_DEFAULTS.iter().find(|(ty, _)| *ty == scalar) {
            return Inferred::Provider(*op);
        }
    }

    match field_type {
        FieldType::List(_) => Inferred::EmptyList,
        FieldType::Map(_) => Inferred::EmptyMap,
        _ => Inferred::Null,
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Descriptor synthesized for record fields that have no declaration.
pub fn auto(name: impl Into<String>, field_type: FieldType) -> Field {
    Field::new(AutoDescriptor {
        name: name.into(),
        field_type,
    })
}

struct AutoDescriptor {
    name: String,
    field_type: FieldType,
}

impl Descriptor for AutoDescriptor {
    fn label(&self) -> String {
        format!("auto({}: {})", self.name, self.field_type)
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        match infer(&self.name, &self.field_type) {
            Inferred::Provider(op) => ctx.produce(op),
            Inferred::EmptyList => Ok(Value::List(Vec::new())),
            Inferred::EmptyMap => Ok(Value::Map(FieldMap::new())),
            Inferred::Null => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_type_must_both_match() {
        assert_eq!(
            infer("email", &FieldType::STRING),
            Inferred::Provider(FakeOp::Email)
        );
        assert_eq!(
            infer("email", &FieldType::INT),
            Inferred::Provider(FakeOp::Int)
        );
    }

    #[test]
    fn normalizes_case_and_underscores() {
        assert_eq!(
            infer("First_Name", &FieldType::STRING),
            Inferred::Provider(FakeOp::FirstName)
        );
        assert_eq!(
            infer("created_at", &FieldType::DATETIME.optional()),
            Inferred::Provider(FakeOp::DateTime)
        );
    }

    #[test]
    fn identity_rules_depend_on_type() {
        assert_eq!(infer("id", &FieldType::UUID), Inferred::Provider(FakeOp::Uuid4));
        assert_eq!(infer("id", &FieldType::INT), Inferred::Provider(FakeOp::IntId));
    }

    #[test]
    fn containers_and_unknown_types_fall_back() {
        assert_eq!(
            infer("tags", &FieldType::list_of(FieldType::STRING)),
            Inferred::EmptyList
        );
        assert_eq!(
            infer("attrs", &FieldType::map_of(FieldType::INT)),
            Inferred::EmptyMap
        );
        assert_eq!(infer("owner", &FieldType::record("User")), Inferred::Null);
        assert_eq!(infer("blob", &FieldType::Any), Inferred::Null);
        assert_eq!(
            infer("nested", &FieldType::STRING.optional().optional()),
            Inferred::Null
        );
    }
}
