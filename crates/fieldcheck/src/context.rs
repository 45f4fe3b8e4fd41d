//! Validation context: locale, acting entity and the external collaborators.

use crate::config::ValidatorConfig;
use crate::error::LookupError;
use crate::i18n::{Locale, MessageCatalog, Translator};
use crate::key::{KeyTransformer, SnakeKeyTransformer};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trait for persistent record lookups used by the `unique` rule.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Find one record of `collection` whose `field` equals `value`.
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, LookupError>;
}

#[async_trait]
impl<T: RecordLookup + ?Sized> RecordLookup for Arc<T> {
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, LookupError> {
        (**self).find_one(collection, field, value).await
    }
}

/// Context for one or more validation runs.
///
/// ## Example
///
/// ```rust,ignore
/// use fieldcheck::prelude::*;
///
/// let ctx = ValidationContext::builder()
///     .locale(Locale::parse("vi")?)
///     .actor(current_user)
///     .records(my_store)
///     .build();
///
/// let report = fieldcheck::validate(&input, &specs, &ctx).await?;
/// ```
pub struct ValidationContext {
    locale: Locale,
    actor: Option<Value>,
    translator: Arc<dyn Translator>,
    records: Option<Arc<dyn RecordLookup>>,
    keys: Arc<dyn KeyTransformer>,
    config: ValidatorConfig,
}

impl Default for ValidationContext {
    fn default() -> Self {
        ValidationContextBuilder::new().build()
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ValidationContextBuilder {
        ValidationContextBuilder::new()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The entity on whose behalf validation runs.
    pub fn actor(&self) -> Option<&Value> {
        self.actor.as_ref()
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// The record lookup, if configured.
    pub fn records(&self) -> Option<&Arc<dyn RecordLookup>> {
        self.records.as_ref()
    }

    pub fn keys(&self) -> &dyn KeyTransformer {
        self.keys.as_ref()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("locale", &self.locale)
            .field("has_actor", &self.actor.is_some())
            .field("has_records", &self.records.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for constructing a `ValidationContext`.
#[derive(Default)]
pub struct ValidationContextBuilder {
    locale: Option<Locale>,
    actor: Option<Value>,
    translator: Option<Arc<dyn Translator>>,
    records: Option<Arc<dyn RecordLookup>>,
    keys: Option<Arc<dyn KeyTransformer>>,
    config: ValidatorConfig,
}

impl ValidationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the locale. Defaults to the configuration's `default_locale`.
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn actor(mut self, actor: Value) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the translator. Defaults to [`MessageCatalog::builtin`].
    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    pub fn translator_arc(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn records(mut self, records: impl RecordLookup + 'static) -> Self {
        self.records = Some(Arc::new(records));
        self
    }

    pub fn records_arc(mut self, records: Arc<dyn RecordLookup>) -> Self {
        self.records = Some(records);
        self
    }

    /// Set the key transformer. Defaults to [`SnakeKeyTransformer`].
    pub fn key_transformer(mut self, keys: impl KeyTransformer + 'static) -> Self {
        self.keys = Some(Arc::new(keys));
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ValidationContext {
        ValidationContext {
            locale: self
                .locale
                .unwrap_or_else(|| self.config.default_locale.clone()),
            actor: self.actor,
            translator: self
                .translator
                .unwrap_or_else(|| Arc::new(MessageCatalog::builtin()) as Arc<dyn Translator>),
            records: self.records,
            keys: self
                .keys
                .unwrap_or_else(|| Arc::new(SnakeKeyTransformer) as Arc<dyn KeyTransformer>),
            config: self.config,
        }
    }
}
