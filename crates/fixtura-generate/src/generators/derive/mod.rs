//! Deferred descriptors: resolved after every other field and override.

use fixtura_core::Value;

use crate::errors::FactoryError;
use crate::generators::{Descriptor, DescriptorKind, Field, PartialRecord, ResolveContext};

type DeferredFn = dyn Fn(PartialRecord<'_>) -> Result<Value, FactoryError> + Send + Sync;

/// Computes a value from the rest of the record.
///
/// Skipped entirely when the field is overridden.
pub fn lazy<F, V>(func: F) -> Field
where
    F: Fn(PartialRecord<'_>) -> Result<V, FactoryError> + Send + Sync + 'static,
    V: Into<Value>,
{
    Field::new(DeferredDescriptor {
        func: Box::new(move |record: PartialRecord<'_>| func(record).map(Into::into)),
    })
}

/// Interpolates sibling fields into `template`, e.g. `"{first} {last}"`.
///
/// `{{` and `}}` produce literal braces.
pub fn template(template: &str) -> Result<Field, FactoryError> {
    let parts = parse_template(template)?;
    Ok(Field::new(TemplateDescriptor {
        source: template.to_string(),
        parts,
    }))
}

/// Builds an email address from sibling fields, joined with dots.
pub fn email_from(fields: Vec<String>, domain: impl Into<String>) -> Result<Field, FactoryError> {
    if fields.is_empty() {
        return Err(FactoryError::invalid("email_from requires at least one field"));
    }
    Ok(Field::new(EmailFromDescriptor {
        fields,
        domain: domain.into(),
    }))
}

struct DeferredDescriptor {
    func: Box<DeferredFn>,
}

impl Descriptor for DeferredDescriptor {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Deferred
    }

    fn label(&self) -> String {
        "lazy".to_string()
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        (self.func)(ctx.record())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field(String),
}

struct TemplateDescriptor {
    source: String,
    parts: Vec<Part>,
}

impl Descriptor for TemplateDescriptor {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Deferred
    }

    fn label(&self) -> String {
        format!("template({})", self.source)
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        let record = ctx.record();
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field(name) => out.push_str(&record.get(name)?.to_display_string()),
            }
        }
        Ok(Value::Text(out))
    }
}

struct EmailFromDescriptor {
    fields: Vec<String>,
    domain: String,
}

impl Descriptor for EmailFromDescriptor {
    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Deferred
    }

    fn label(&self) -> String {
        format!("email_from({})", self.fields.join(","))
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        let record = ctx.record();
        let mut parts = Vec::new();
        for field in &self.fields {
            let value = sanitize_identifier(&record.get(field)?.to_display_string());
            if !value.is_empty() {
                parts.push(value);
            }
        }
        let local = if parts.is_empty() {
            "user".to_string()
        } else {
            parts.join(".")
        };
        Ok(Value::Text(format!("{local}@{}", self.domain)))
    }
}

fn parse_template(template: &str) -> Result<Vec<Part>, FactoryError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => {
                            return Err(FactoryError::invalid(format!(
                                "unterminated placeholder in template '{template}'"
                            )));
                        }
                    }
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(FactoryError::invalid(format!(
                        "empty placeholder in template '{template}'"
                    )));
                }
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Field(name.to_string()));
            }
            '}' => {
                return Err(FactoryError::invalid(format!(
                    "single '}}' in template '{template}'"
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn sanitize_identifier(value: &str) -> String {
    let mut out = String::new();
    let mut last_dot = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dot = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_' || ch == '.') && !last_dot {
            out.push('.');
            last_dot = true;
        }
    }
    out.trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_and_escapes() {
        let parts = parse_template("{{{first}}} {last}!").expect("template");
        assert_eq!(
            parts,
            vec![
                Part::Literal("{".to_string()),
                Part::Field("first".to_string()),
                Part::Literal("} ".to_string()),
                Part::Field("last".to_string()),
                Part::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_empty_placeholders() {
        assert!(parse_template("{}").is_err());
        assert!(parse_template("{name").is_err());
    }

    #[test]
    fn sanitizes_names_for_emails() {
        assert_eq!(sanitize_identifier("Ada  Lovelace-Byron"), "ada.lovelace.byron");
        assert_eq!(sanitize_identifier("__x__"), "x");
    }
}
