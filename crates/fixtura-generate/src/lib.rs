//! Declarative fixture factories for Fixtura.
//!
//! Models are declared with [`ModelSpec`], merged once into a
//! [`ModelDefinition`], and resolved into ordered records. Fields come from
//! descriptors: constants, sequences, the [`random`] facade, realistic
//! provider values, nested models, and deferred values computed from the
//! rest of the record. Plan documents compile into the same definitions.

pub mod declarations;
pub mod engine;
pub mod errors;
pub mod factory;
pub mod faker_rs;
pub mod generators;
pub mod model;
pub mod output;
pub mod params;
pub mod plan;

pub use declarations::{Declarations, ModelSpec};
pub use engine::{ModelDefinition, ResolutionPhase};
pub use errors::FactoryError;
pub use factory::{BuildStrategy, Factory, InMemoryPersist, Persist, RejectingPersist};
pub use faker_rs::{FakeOp, FakeProvider, FakeRsAdapter, LocaleKey};
pub use generators::basic::{call, call_with, constant, exclude};
pub use generators::derive::{email_from, lazy, template};
pub use generators::faker_rs::{fake, fake_id};
pub use generators::nested::{ModelRef, sub, sub_lazy, sub_list};
pub use generators::primitives as random;
pub use generators::semantic::{Inferred, auto, infer};
pub use generators::sequence::{Sequence, seq, seq_format, seq_from, seq_with};
pub use generators::{Descriptor, DescriptorKind, Field, PartialRecord, ResolveContext};
pub use model::{BuildReport, FactoryConfig, configure, default_config};
pub use output::{OutputFormat, write_records};
pub use plan::{CompileOptions, GENERATOR_IDS, PlanRegistry, vocabulary};
