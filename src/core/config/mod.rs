pub mod diff;
pub mod env;
pub mod redact;
pub mod service;
pub mod store;
pub mod validation;

pub use diff::{compare_settings, DifferenceKind, SettingsDifference, ABSENT_PLACEHOLDER};
pub use env::{DatabaseEnv, ServerEnv};
pub use redact::Redact;
pub use service::ConfigService;
pub use store::ConfigStore;
