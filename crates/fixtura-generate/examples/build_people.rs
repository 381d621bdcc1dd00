use std::env;

use fixtura_core::{FieldMap, FieldMapExt, FieldType, FromFields, RecordShape, Shaped, TargetShape};
use fixtura_generate::{
    BuildStrategy, FakeOp, Factory, ModelSpec, OutputFormat, email_from, fake, random, seq,
    sub_list, template, write_records,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Person {
    id: i64,
    first_name: String,
    last_name: String,
    display_name: String,
    email: String,
    age: i64,
}

impl Shaped for Person {
    fn target_shape() -> TargetShape {
        TargetShape::Record(
            RecordShape::new("Person")
                .field("id", FieldType::INT)
                .field("first_name", FieldType::STRING)
                .field("last_name", FieldType::STRING)
                .field("display_name", FieldType::STRING)
                .field("email", FieldType::STRING)
                .field("age", FieldType::INT),
        )
    }
}

impl FromFields for Person {
    fn from_fields(mut fields: FieldMap) -> fixtura_core::Result<Self> {
        Ok(Self {
            id: fields.take_field("id")?,
            first_name: fields.take_field("first_name")?,
            last_name: fields.take_field("last_name")?,
            display_name: fields.take_field("display_name")?,
            email: fields.take_field("email")?,
            age: fields.take_field("age")?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let count = match env::args().nth(1) {
        Some(raw) => raw.parse()?,
        None => 3,
    };

    let person = ModelSpec::new("Person")
        .shape::<Person>()
        .field("id", seq())
        .field("first_name", fake(FakeOp::FirstName))
        .field("last_name", fake(FakeOp::LastName))
        .field("display_name", template("{first_name} {last_name}")?)
        .field(
            "email",
            email_from(
                vec!["first_name".to_string(), "last_name".to_string()],
                "example.com",
            )?,
        )
        .field("age", random::int(18, 90))
        .seed(7)
        .define()?;

    let factory = Factory::new(person.clone(), BuildStrategy::<Person>::construct());
    for built in factory.build_batch(count, &FieldMap::new())? {
        println!(
            "#{} {} <{}> aged {} ({} {})",
            built.id, built.display_name, built.email, built.age, built.first_name, built.last_name
        );
    }

    let team = ModelSpec::new("Team")
        .field("name", fake(FakeOp::CompanyName))
        .field("members", sub_list(&person, 2, FieldMap::new()))
        .seed(7)
        .define()?;
    let teams = team.build_batch(2, &FieldMap::new())?;
    write_records(std::io::stdout().lock(), &teams, OutputFormat::Jsonl)?;
    Ok(())
}
