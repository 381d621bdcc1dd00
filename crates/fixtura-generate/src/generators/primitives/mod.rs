//! Random-value facade.
//!
//! Every function returns a [`Field`] that draws from the owning model's
//! random source at resolve time. Argument checks that do not depend on the
//! draw fire here, at construction.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distr::{Distribution, Uniform};
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use fixtura_core::Value;

use crate::errors::FactoryError;
use crate::faker_rs::random_uuid;
use crate::generators::{Descriptor, Field, ResolveContext};

const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DEFAULT_MAX_REPEAT: u32 = 32;

type DrawFn = dyn Fn(&mut dyn RngCore) -> Result<Value, FactoryError> + Send + Sync;

struct RandomDescriptor {
    id: &'static str,
    draw: Box<DrawFn>,
}

impl Descriptor for RandomDescriptor {
    fn label(&self) -> String {
        self.id.to_string()
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value, FactoryError> {
        ctx.with_rng(|rng| (self.draw)(rng))?
    }
}

fn random<F>(id: &'static str, draw: F) -> Field
where
    F: Fn(&mut dyn RngCore) -> Result<Value, FactoryError> + Send + Sync + 'static,
{
    Field::new(RandomDescriptor {
        id,
        draw: Box::new(draw),
    })
}

/// Uniform integer in `min..=max`.
pub fn int(min: i64, max: i64) -> Field {
    random("random.int", move |rng| {
        if min > max {
            return Err(FactoryError::invalid(format!(
                "int: min ({min}) must be <= max ({max})"
            )));
        }
        Ok(Value::Int(rng.random_range(min..=max)))
    })
}

/// Uniform float in `min..=max`.
pub fn float(min: f64, max: f64) -> Field {
    random("random.float", move |rng| {
        Ok(Value::Float(draw_float("float", min, max, rng)?))
    })
}

/// Uniform decimal in `min..=max`, rounded half away from zero to `places` digits.
pub fn decimal(min: f64, max: f64, places: u32) -> Field {
    random("random.decimal", move |rng| {
        let raw = draw_float("decimal", min, max, rng)?;
        let value = Decimal::from_f64(raw)
            .ok_or_else(|| FactoryError::invalid(format!("decimal: {raw} is not representable")))?;
        Ok(Value::Decimal(
            value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero),
        ))
    })
}

/// [`decimal`] with two places.
pub fn decimal2(min: f64, max: f64) -> Field {
    decimal(min, max, 2)
}

/// Gaussian draw with the given mean and standard deviation.
pub fn normal(mean: f64, stdev: f64) -> Result<Field, FactoryError> {
    if stdev.is_nan() || stdev < 0.0 {
        return Err(FactoryError::invalid("stdev must be >= 0."));
    }
    if !mean.is_finite() || !stdev.is_finite() {
        return Err(FactoryError::invalid("mean and stdev must be finite."));
    }
    Ok(random("random.normal", move |rng| {
        // Box-Muller; u1 is kept away from zero so ln stays finite.
        let u1 = 1.0 - rng.random::<f64>();
        let u2 = rng.random::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        Ok(Value::Float(mean + stdev * z))
    }))
}

/// `length` characters drawn uniformly from `alphabet`.
pub fn string(length: i64, alphabet: &str) -> Result<Field, FactoryError> {
    if length < 0 {
        return Err(FactoryError::invalid("length must be >= 0."));
    }
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() && length > 0 {
        return Err(FactoryError::invalid(
            "alphabet cannot be empty when length > 0.",
        ));
    }
    let length = length as usize;
    Ok(random("random.string", move |rng| {
        let value: String = (0..length)
            .map(|_| chars[rng.random_range(0..chars.len())])
            .collect();
        Ok(Value::Text(value))
    }))
}

/// [`string`] over ASCII letters and digits.
pub fn alphanumeric(length: i64) -> Result<Field, FactoryError> {
    string(length, ALPHANUMERIC)
}

/// `n` random bytes.
pub fn bytes(n: i64) -> Result<Field, FactoryError> {
    if n < 0 {
        return Err(FactoryError::invalid("n must be >= 0."));
    }
    let n = n as usize;
    Ok(random("random.bytes", move |rng| {
        let mut buf = vec![0_u8; n];
        rng.fill_bytes(&mut buf);
        Ok(Value::Bytes(buf))
    }))
}

/// Fair coin.
pub fn bool() -> Field {
    random("random.bool", |rng| Ok(Value::Bool(rng.random_bool(0.5))))
}

/// One element of `items`.
pub fn choice<I, V>(items: I) -> Field
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let items: Vec<Value> = items.into_iter().map(Into::into).collect();
    random("random.choice", move |rng| {
        items
            .choose(rng)
            .cloned()
            .ok_or_else(|| FactoryError::invalid("cannot choose from an empty sequence"))
    })
}

/// `k` elements from distinct positions of `items`, without replacement.
pub fn sample<I, V>(items: I, k: usize) -> Field
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let items: Vec<Value> = items.into_iter().map(Into::into).collect();
    random("random.sample", move |rng| {
        if k > items.len() {
            return Err(FactoryError::invalid(format!(
                "sample larger than population ({k} > {})",
                items.len()
            )));
        }
        let picked = rand::seq::index::sample(rng, items.len(), k)
            .into_iter()
            .map(|idx| items[idx].clone())
            .collect();
        Ok(Value::List(picked))
    })
}

/// `k` elements of `items` with replacement, optionally weighted.
pub fn choices<I, V>(items: I, k: usize, weights: Option<Vec<f64>>) -> Field
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let items: Vec<Value> = items.into_iter().map(Into::into).collect();
    random("random.choices", move |rng| {
        if items.is_empty() {
            return if k == 0 {
                Ok(Value::List(Vec::new()))
            } else {
                Err(FactoryError::invalid("cannot choose from an empty sequence"))
            };
        }
        let picked = match &weights {
            None => (0..k)
                .map(|_| items[rng.random_range(0..items.len())].clone())
                .collect(),
            Some(weights) => {
                if weights.len() != items.len() {
                    return Err(FactoryError::invalid(format!(
                        "the number of weights ({}) does not match the population ({})",
                        weights.len(),
                        items.len()
                    )));
                }
                let dist = WeightedIndex::new(weights)
                    .map_err(|err| FactoryError::invalid(format!("invalid weights: {err}")))?;
                (0..k).map(|_| items[dist.sample(rng)].clone()).collect()
            }
        };
        Ok(Value::List(picked))
    })
}

/// Random version 4 UUID.
pub fn uuid4() -> Field {
    random("random.uuid4", |rng| Ok(Value::Uuid(random_uuid(rng))))
}

/// String matching `pattern`.
pub fn pattern(pattern: &str) -> Result<Field, FactoryError> {
    pattern_with_repeat(pattern, DEFAULT_MAX_REPEAT)
}

/// String matching `pattern`, capping unbounded repetitions at `max_repeat`.
pub fn pattern_with_repeat(pattern: &str, max_repeat: u32) -> Result<Field, FactoryError> {
    let regex = RandRegex::compile(pattern, max_repeat).map_err(|err| {
        FactoryError::invalid(format!("invalid regex pattern '{pattern}': {err}"))
    })?;
    Ok(random("random.pattern", move |rng| {
        let value: String = regex.sample(rng);
        Ok(Value::Text(value))
    }))
}

/// Uniform date in `min..=max`.
pub fn date_between(min: NaiveDate, max: NaiveDate) -> Field {
    random("random.date", move |rng| {
        if min > max {
            return Err(FactoryError::invalid(format!(
                "date: min ({min}) must be <= max ({max})"
            )));
        }
        let span = (max - min).num_days();
        Ok(Value::Date(min + Duration::days(rng.random_range(0..=span))))
    })
}

/// Uniform timestamp in `min..=max`, at second resolution.
pub fn datetime_between(min: NaiveDateTime, max: NaiveDateTime) -> Field {
    random("random.datetime", move |rng| {
        if min > max {
            return Err(FactoryError::invalid(format!(
                "datetime: min ({min}) must be <= max ({max})"
            )));
        }
        let span = (max - min).num_seconds();
        Ok(Value::Timestamp(
            min + Duration::seconds(rng.random_range(0..=span)),
        ))
    })
}

fn draw_float(
    ctx: &'static str,
    min: f64,
    max: f64,
    rng: &mut dyn RngCore,
) -> Result<f64, FactoryError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(FactoryError::invalid(format!(
            "{ctx}: bounds must be finite"
        )));
    }
    if min > max {
        return Err(FactoryError::invalid(format!(
            "{ctx}: min ({min}) must be <= max ({max})"
        )));
    }
    let range = Uniform::new_inclusive(min, max).map_err(|err| {
        FactoryError::invalid(format!("{ctx}: range {min}..={max} is not samplable: {err}"))
    })?;
    Ok(range.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtura_core::FieldMap;

    use crate::declarations::ModelSpec;

    fn draw_one(field: Field) -> Result<Value, FactoryError> {
        let model = ModelSpec::new("Draw")
            .field("value", field)
            .seed(99)
            .define()
            .expect("define");
        let mut record = model.build(&FieldMap::new())?;
        Ok(record.shift_remove("value").expect("value present"))
    }

    #[test]
    fn draws_respect_bounds() {
        for _ in 0..20 {
            let value = draw_one(int(3, 5)).expect("int");
            assert!((3..=5).contains(&value.as_i64().expect("int value")));
        }
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).expect("date");
        assert_eq!(draw_one(date_between(day, day)).expect("date"), Value::Date(day));
        assert_eq!(draw_one(int(7, 7)).expect("int"), Value::Int(7));
    }

    #[test]
    fn decimals_are_quantized() {
        let Value::Decimal(value) = draw_one(decimal(1.0, 2.0, 3)).expect("decimal") else {
            panic!("expected a decimal");
        };
        assert!(value.scale() <= 3);
    }

    #[test]
    fn resolve_time_errors() {
        assert!(matches!(
            draw_one(int(5, 1)),
            Err(FactoryError::InvalidArgument(_))
        ));
        assert!(matches!(
            draw_one(choice(Vec::<Value>::new())),
            Err(FactoryError::InvalidArgument(_))
        ));
        assert!(matches!(
            draw_one(sample(["a", "b"], 3)),
            Err(FactoryError::InvalidArgument(_))
        ));
        assert!(matches!(
            draw_one(choices(["a", "b"], 2, Some(vec![1.0]))),
            Err(FactoryError::InvalidArgument(_))
        ));
        assert!(matches!(
            draw_one(choices(["a", "b"], 2, Some(vec![0.0, 0.0]))),
            Err(FactoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn overflowing_float_span_is_a_range_error() {
        assert!(matches!(
            draw_one(float(f64::MIN, f64::MAX)),
            Err(FactoryError::InvalidArgument(_))
        ));
        assert!(matches!(
            draw_one(decimal(-f64::MAX, f64::MAX, 2)),
            Err(FactoryError::InvalidArgument(_))
        ));

        let model = ModelSpec::new("Wide")
            .field("x", float(f64::MIN, f64::MAX))
            .field("y", int(1, 2))
            .seed(1)
            .define()
            .expect("define");
        assert!(model.build(&FieldMap::new()).is_err());
        let record = model
            .build(&FieldMap::from_iter([("x".to_string(), Value::Float(0.5))]))
            .expect("random source still usable");
        assert_eq!(record.get("x"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn sample_picks_distinct_positions() {
        let value = draw_one(sample([1, 2, 3, 4], 4)).expect("sample");
        let mut picked: Vec<i64> = value
            .as_list()
            .expect("list")
            .iter()
            .filter_map(Value::as_i64)
            .collect();
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3, 4]);
    }

    #[test]
    fn zero_stdev_returns_the_mean() {
        assert_eq!(
            draw_one(normal(4.5, 0.0).expect("normal")).expect("draw"),
            Value::Float(4.5)
        );
    }

    #[test]
    fn patterns_match_their_regex() {
        let value = draw_one(pattern("[A-Z]{3}-[0-9]{2}").expect("pattern")).expect("draw");
        let text = value.as_str().expect("text");
        assert!(regex::Regex::new("^[A-Z]{3}-[0-9]{2}$").expect("regex").is_match(text));
    }

    #[test]
    fn construction_errors_fire_eagerly() {
        let err = string(-1, "abc").expect_err("negative length");
        assert_eq!(err.to_string(), "invalid argument: length must be >= 0.");
        let err = string(1, "").expect_err("empty alphabet");
        assert_eq!(
            err.to_string(),
            "invalid argument: alphabet cannot be empty when length > 0."
        );
        assert!(string(0, "").is_ok());
        assert!(bytes(-1).is_err());
        assert!(normal(0.0, -0.5).is_err());
        assert!(pattern("[a-").is_err());
    }
}
