use std::sync::{Arc, Mutex};

use fixtura_core::Value;

use crate::errors::FactoryError;
use crate::generators::{Descriptor, Field, PartialRecord, ResolveContext};

type SequenceFn = dyn Fn(PartialRecord<'_>, i64) -> Result<Value, FactoryError> + Send + Sync;

/// Counter starting at 1.
pub fn seq() -> Field {
    Sequence::starting_at(1).into_field()
}

/// Counter starting at `start`.
pub fn seq_from(start: i64) -> Field {
    Sequence::starting_at(start).into_field()
}

/// Counter starting at 1 rendered through `template` (e.g. `"user-{:03}"`).
pub fn seq_format(template: &str) -> Result<Field, FactoryError> {
    Ok(Sequence::starting_at(1).format(template)?.into_field())
}

/// Counter starting at 1 passed, with the partial record, to `func`.
pub fn seq_with<F, V>(func: F) -> Field
where
    F: Fn(PartialRecord<'_>, i64) -> V + Send + Sync + 'static,
    V: Into<Value>,
{
    Sequence::starting_at(1)
        .with(move |record, n| Ok(func(record, n).into()))
        .into_field()
}

/// Builder for sequence fields.
pub struct Sequence {
    start: i64,
    formatter: Formatter,
}

enum Formatter {
    Plain,
    Template(Vec<Segment>),
    Func(Arc<SequenceFn>),
}

impl Sequence {
    pub fn starting_at(start: i64) -> Self {
        Self {
            start,
            formatter: Formatter::Plain,
        }
    }

    pub fn format(mut self, template: &str) -> Result<Self, FactoryError> {
        self.formatter = Formatter::Template(parse_template(template)?);
        Ok(self)
    }

    pub fn with<F>(mut self, func: F) -> Self
    where
        F: Fn(PartialRecord<'_>, i64) -> Result<Value, FactoryError> + Send + Sync + 'static,
    {
        self.formatter = Formatter::Func(Arc::new(func));
        self
    }

    pub fn into_field(self) -> Field {
        Field::new(SequenceDescriptor {
            start: self.start,
            next: Mutex::new(Some(self.start)),
            formatter: self.formatter,
        })
    }
}

struct SequenceDescriptor {
    start: i64,
    // `None` once the counter has handed out `i64::MAX`.
    next: Mutex<Option<i64>>,
    formatter: Formatter,
}

impl SequenceDescriptor {
    fn advance(&self) -> Result<i64, FactoryError> {
        let mut next = self
            .next
            .lock()
            .map_err(|_| FactoryError::Poisoned("sequence counter"))?;
        let n = next.ok_or_else(|| {
            FactoryError::invalid(format!(
                "sequence starting at {} is exhausted past {}",
                self.start,
                i64::MAX
            ))
        })?;
        *next = n.checked_add(1);
        Ok(n)
    }
}

impl Descriptor for SequenceDescriptor {
    fn label(&self) -> String {
        format!("seq(start={})", self.start)
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        let n = self.advance()?;
        match &self.formatter {
            Formatter::Plain => Ok(Value::Int(n)),
            Formatter::Template(segments) => Ok(Value::Text(render(segments, n))),
            Formatter::Func(func) => func(ctx.record(), n),
        }
    }

    fn reset(&self) {
        if let Ok(mut next) = self.next.lock() {
            *next = Some(self.start);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Number { width: usize, align: Align },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Right,
    Left,
    ZeroPad,
}

fn parse_template(template: &str) -> Result<Vec<Segment>, FactoryError> {
    let mut segments = Vec::new();
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
                let mut spec = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => spec.push(inner),
                        None => {
                            return Err(FactoryError::invalid(format!(
                                "unterminated placeholder in sequence format '{template}'"
                            )));
                        }
                    }
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(parse_spec(template, &spec)?);
            }
            '}' => {
                return Err(FactoryError::invalid(format!(
                    "single '}}' in sequence format '{template}'"
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_spec(template: &str, spec: &str) -> Result<Segment, FactoryError> {
    let invalid = || {
        FactoryError::invalid(format!(
            "unsupported placeholder '{{{spec}}}' in sequence format '{template}'"
        ))
    };
    let Some(spec) = spec.strip_prefix(':') else {
        return if spec.is_empty() || spec == "0" {
            Ok(Segment::Number {
                width: 0,
                align: Align::Right,
            })
        } else {
            Err(invalid())
        };
    };

    let (align, digits) = if let Some(rest) = spec.strip_prefix('>') {
        (Align::Right, rest)
    } else if let Some(rest) = spec.strip_prefix('<') {
        (Align::Left, rest)
    } else if spec.len() > 1 && spec.starts_with('0') {
        (Align::ZeroPad, &spec[1..])
    } else {
        (Align::Right, spec)
    };

    let width = if digits.is_empty() {
        0
    } else {
        digits.parse::<usize>().map_err(|_| invalid())?
    };
    Ok(Segment::Number { width, align })
}

fn render(segments: &[Segment], n: i64) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Number { width, align } => {
                let width = *width;
                let rendered = match align {
                    Align::Right => format!("{n:>width$}"),
                    Align::Left => format!("{n:<width$}"),
                    Align::ZeroPad => format!("{n:0width$}"),
                };
                out.push_str(&rendered);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtura_core::FieldMap;

    use crate::declarations::ModelSpec;

    fn format(template: &str, n: i64) -> String {
        render(&parse_template(template).expect("template"), n)
    }

    #[test]
    fn renders_padding_variants() {
        assert_eq!(format("user-{}", 7), "user-7");
        assert_eq!(format("user-{:03}", 7), "user-007");
        assert_eq!(format("[{:>4}]", 7), "[   7]");
        assert_eq!(format("[{:<4}]", 7), "[7   ]");
        assert_eq!(format("{{{}}}", 2), "{2}");
        assert_eq!(format("static", 2), "static");
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(parse_template("user-{").is_err());
        assert!(parse_template("user-}").is_err());
        assert!(parse_template("user-{name}").is_err());
        assert!(parse_template("user-{:x}").is_err());
    }

    #[test]
    fn counters_stop_at_the_integer_limit() {
        let model = ModelSpec::new("Edge")
            .field("id", seq_from(i64::MAX - 1))
            .define()
            .expect("define");
        let ids: Vec<Value> = model
            .build_batch(2, &FieldMap::new())
            .expect("last two ids")
            .into_iter()
            .map(|mut record| record.shift_remove("id").expect("id"))
            .collect();
        assert_eq!(ids, vec![Value::Int(i64::MAX - 1), Value::Int(i64::MAX)]);

        assert!(matches!(
            model.build(&FieldMap::new()),
            Err(FactoryError::InvalidArgument(_))
        ));
        model.reset_sequences();
        assert_eq!(
            model.build(&FieldMap::new()).expect("after reset")["id"],
            Value::Int(i64::MAX - 1)
        );
    }
}
