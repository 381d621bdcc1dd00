use std::fmt;
use std::str::FromStr;

use crate::errors::FactoryError;

macro_rules! fake_ops {
    ($($variant:ident => $id:literal,)*) => {
        /// Named operation of the realistic-value provider.
        ///
        /// Every operation has a stable dotted id used by declaration
        /// documents and the CLI catalog.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum FakeOp {
            $($variant,)*
        }

        impl FakeOp {
            pub const ALL: &'static [FakeOp] = &[$(FakeOp::$variant,)*];
            pub const ALL_IDS: &'static [&'static str] = &[$($id,)*];

            pub fn id(self) -> &'static str {
                match self {
                    $(FakeOp::$variant => $id,)*
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some(FakeOp::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

fake_ops! {
    Uuid4 => "identity.uuid4",
    IntId => "identity.int_id",
    FirstName => "person.first_name",
    LastName => "person.last_name",
    FullName => "person.name",
    Username => "person.username",
    JobTitle => "person.job_title",
    Email => "contact.email",
    PhoneNumber => "contact.phone_number",
    StreetAddress => "address.street",
    City => "address.city",
    State => "address.state",
    Country => "address.country",
    CountryCode => "address.country_code",
    Postcode => "address.postcode",
    CompanyName => "company.name",
    Word => "text.word",
    Sentence => "text.sentence",
    Title => "text.title",
    Paragraph => "text.paragraph",
    Slug => "text.slug",
    RandomString => "text.random",
    Url => "web.url",
    Ipv4 => "web.ipv4",
    Ipv6 => "web.ipv6",
    MacAddress => "web.mac_address",
    UserAgent => "web.user_agent",
    Port => "web.port",
    Password => "security.password",
    Sha256 => "security.sha256",
    FileName => "file.name",
    FilePath => "file.path",
    MimeType => "file.mime_type",
    TimeZone => "display.timezone",
    LocaleCode => "display.locale",
    HexColor => "display.hex_color",
    DateOfBirth => "date.birth",
    Date => "date.date",
    DateTime => "date.datetime",
    Time => "date.time",
    Age => "number.age",
    Count => "number.count",
    Int => "number.int",
    Float => "number.float",
    Decimal => "number.decimal",
    Boolean => "number.boolean",
    Bytes => "bytes.random",
}

impl fmt::Display for FakeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FakeOp {
    type Err = FactoryError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::from_id(id).ok_or_else(|| FactoryError::UnknownGenerator(id.to_string()))
    }
}
