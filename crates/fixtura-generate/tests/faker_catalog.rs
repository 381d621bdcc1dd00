use std::collections::HashSet;
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fixtura_core::{FieldMap, FieldType, Value};
use fixtura_generate::{
    FactoryError, FakeOp, FakeProvider, FakeRsAdapter, GENERATOR_IDS, Inferred, LocaleKey,
    ModelSpec, fake, infer,
};

struct OfflineProvider;

impl FakeProvider for OfflineProvider {
    fn produce(
        &self,
        op: FakeOp,
        _locale: LocaleKey,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, FactoryError> {
        Err(FactoryError::Provider(format!("{} is unavailable offline", op.id())))
    }
}

#[test]
fn catalog_ids_are_unique_and_parse_back() {
    let mut seen = HashSet::new();
    for op in FakeOp::ALL {
        assert!(seen.insert(op.id()), "duplicate id {}", op.id());
        assert_eq!(FakeOp::from_id(op.id()), Some(*op));
    }
    assert_eq!(seen.len(), FakeOp::ALL_IDS.len());
    assert!(FakeOp::from_id("person.unknown").is_none());
}

#[test]
fn facade_ids_do_not_collide_with_provider_ids() {
    for id in GENERATOR_IDS {
        assert!(FakeOp::from_id(id).is_none(), "{id} is also a provider id");
    }
}

#[test]
fn every_operation_produces_in_every_locale() {
    let adapter = FakeRsAdapter;
    for locale in LocaleKey::ALL {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for op in FakeOp::ALL {
            adapter
                .produce(*op, *locale, &mut rng)
                .unwrap_or_else(|err| panic!("{} failed for {locale}: {err}", op.id()));
        }
    }
}

#[test]
fn provider_is_reproducible_per_seed() {
    let adapter = FakeRsAdapter;
    let draw = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        FakeOp::ALL
            .iter()
            .map(|op| adapter.produce(*op, LocaleKey::PtBr, &mut rng).expect("value"))
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(5), draw(5));
}

#[test]
fn inference_matches_name_and_type_together() {
    assert_eq!(
        infer("e_mail", &FieldType::STRING),
        Inferred::Provider(FakeOp::Email)
    );
    assert_ne!(
        infer("email", &FieldType::INT),
        Inferred::Provider(FakeOp::Email)
    );
    assert_eq!(infer("notes", &FieldType::list_of(FieldType::STRING)), Inferred::EmptyList);
}

#[test]
fn provider_failures_reach_the_caller_and_are_inherited() {
    let base = ModelSpec::new("Contact")
        .field("email", fake(FakeOp::Email))
        .provider(Arc::new(OfflineProvider));
    let child = ModelSpec::new("Lead")
        .extends(&base)
        .field("score", 10);

    for spec in [base, child] {
        let model = spec.define().expect("define");
        let err = model.build(&FieldMap::new()).expect_err("provider refuses");
        assert!(matches!(err, FactoryError::Provider(ref message) if message.contains("email")));
    }
}
