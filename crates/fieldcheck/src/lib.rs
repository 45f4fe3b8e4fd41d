//! # fieldcheck
//!
//! Declarative field validation. An input object is checked against per-field
//! rule lists such as `["required", "isEmail", "unique:User,email,_id"]`, and
//! failures are collected into a per-field, de-duplicated, localized
//! [`ErrorMap`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use fieldcheck::prelude::*;
//! use serde_json::json;
//!
//! let ctx = ValidationContext::builder()
//!     .locale(Locale::parse("en")?)
//!     .records(MemoryStore::new())
//!     .build();
//!
//! let specs = [
//!     FieldSpec::new("email", ["required", "isEmail", "unique:User,email"]),
//!     FieldSpec::new("profile.website", ["optional", "link"]),
//! ];
//!
//! let report = fieldcheck::validate(&json!({ "email": "" }), &specs, &ctx).await?;
//! assert!(report.has_errors);
//! ```
//!
//! ## Rules
//!
//! - `required` - value must be truthy (not absent, `null`, `""`, `0` or `false`)
//! - `optional` - value must not be absent; `""` and `0` are accepted
//! - `isNumeric` - numeric string
//! - `isEmail` - email address
//! - `only:a,b,c` - one of the listed values (see [`ValidatorConfig::enforce_only`])
//! - `unique:table,column[,ignoreField]` - no other record holds the value
//! - `link` - URL
//!
//! Any rule other than `optional` is replaced by `required` when the field has
//! no truthy value.

pub mod config;
mod context;
mod error;
mod evaluator;
mod i18n;
mod key;
mod memory;
mod orchestrator;
pub mod rules;
mod spec;
pub mod value;


pub use config::{ErrorKeyStyle, ValidatorConfig};
pub use context::{RecordLookup, ValidationContext, ValidationContextBuilder};
pub use error::{ErrorMap, LookupError, ValidateError};
pub use evaluator::{EvaluationInput, RuleEvaluator, RuleOutcome};
pub use i18n::{
    CatalogError, FailureKind, Locale, LocaleError, MessageCatalog, MessageKey, MessageTemplate,
    Translator, FIELD_PLACEHOLDER,
};
pub use key::{IdentityKeyTransformer, KeyTransformer, SnakeKeyTransformer};
pub use memory::MemoryStore;
pub use orchestrator::{validate, FieldOrchestrator, ValidationReport};
pub use spec::{FieldSpec, Rule, RuleDescriptor, RuleParseError, UniqueParams};
pub use value::FieldValue;

/// Prelude module for validation
pub mod prelude {
    pub use crate::config::{ErrorKeyStyle, ValidatorConfig};
    pub use crate::context::{RecordLookup, ValidationContext, ValidationContextBuilder};
    pub use crate::error::{ErrorMap, LookupError, ValidateError};
    pub use crate::i18n::{Locale, MessageCatalog, MessageKey, Translator};
    pub use crate::key::{KeyTransformer, SnakeKeyTransformer};
    pub use crate::memory::MemoryStore;
    pub use crate::orchestrator::{validate, FieldOrchestrator, ValidationReport};
    pub use crate::spec::{FieldSpec, Rule, RuleDescriptor};
}
