pub mod adapter;
pub mod catalog;
pub mod locales;

pub use adapter::{FakeProvider, FakeRsAdapter, random_uuid};
pub use catalog::FakeOp;
pub use locales::LocaleKey;
