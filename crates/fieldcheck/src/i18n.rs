//! Localized messages.
//!
//! The engine never formats user-facing text itself: it asks a [`Translator`]
//! for the phrase behind a [`MessageKey`] and for a field's display name.
//! [`MessageCatalog`] is the in-memory translator shipped with the crate.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();

fn locale_regex() -> &'static Regex {
    LOCALE_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,8})*$").unwrap())
}

/// Invalid locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale identifier `{0}`")]
pub struct LocaleError(pub String);

/// A message-catalog selector such as `en` or `pt-BR`.
///
/// The language part is lowercased and `_` separators become `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and normalize a locale identifier.
    pub fn parse(s: &str) -> Result<Self, LocaleError> {
        let s = s.trim();
        if !locale_regex().is_match(s) {
            return Err(LocaleError(s.to_string()));
        }

        let normalized = s.replace('_', "-");
        let (language, region) = normalized
            .split_once('-')
            .map_or((normalized.as_str(), None), |(l, r)| (l, Some(r)));

        let mut locale = language.to_ascii_lowercase();
        if let Some(region) = region {
            locale.push('-');
            locale.push_str(region);
        }
        Ok(Self(locale))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare language, `pt` for `pt-BR`.
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingValue,
    FormatMismatch,
    NotInAllowedSet,
    DuplicateConflict,
    UndefinedUnderOptional,
}

/// Catalog phrase attached to a rule failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    IsRequired,
    IsNotNumberic,
    IsNotEmailFormat,
    IsNotExist,
    IsUndefined,
    IsExists,
    IsNotFormatted,
}

impl MessageKey {
    pub const ALL: [MessageKey; 7] = [
        MessageKey::IsRequired,
        MessageKey::IsNotNumberic,
        MessageKey::IsNotEmailFormat,
        MessageKey::IsNotExist,
        MessageKey::IsUndefined,
        MessageKey::IsExists,
        MessageKey::IsNotFormatted,
    ];

    /// The phrase looked up in the catalog.
    pub fn phrase(&self) -> &'static str {
        match self {
            MessageKey::IsRequired => "is_required",
            MessageKey::IsNotNumberic => "is_not_numberic",
            MessageKey::IsNotEmailFormat => "is_not_email_format",
            MessageKey::IsNotExist => "is_not_exist",
            MessageKey::IsUndefined => "is_undefined",
            MessageKey::IsExists => "is_exists",
            MessageKey::IsNotFormatted => "is_not_formatted",
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            MessageKey::IsRequired => FailureKind::MissingValue,
            MessageKey::IsNotNumberic
            | MessageKey::IsNotEmailFormat
            | MessageKey::IsNotFormatted => FailureKind::FormatMismatch,
            MessageKey::IsNotExist => FailureKind::NotInAllowedSet,
            MessageKey::IsExists => FailureKind::DuplicateConflict,
            MessageKey::IsUndefined => FailureKind::UndefinedUnderOptional,
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Placeholder standing for the field's display name in message templates.
pub const FIELD_PLACEHOLDER: &str = ":field";

/// A failure message whose subject is the field being validated.
///
/// Its text form is `":field <phrase>"`. [`MessageTemplate::render`] fills the
/// subject slot only, so a phrase that itself contains `:field` is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub key: MessageKey,
    /// Localized phrase following the subject
    pub phrase: String,
}

impl MessageTemplate {
    pub fn new(key: MessageKey, phrase: impl Into<String>) -> Self {
        Self {
            key,
            phrase: phrase.into(),
        }
    }

    /// Substitute the field's display name for the subject.
    pub fn render(&self, field_name: &str) -> String {
        format!("{} {}", field_name, self.phrase)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", FIELD_PLACEHOLDER, self.phrase)
    }
}

/// Message catalog lookup.
pub trait Translator: Send + Sync {
    /// Localized text for a message phrase such as `is_required`.
    fn message(&self, phrase: &str, locale: &Locale) -> String;

    /// Localized display name for a field identifier.
    fn field_name(&self, field: &str, locale: &Locale) -> String;
}

/// Error loading a catalog from JSON.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse catalog for locale `{locale}`: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },
}

/// Catalog file layout: `{"message": {...}, "fieldname": {...}}`.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    message: HashMap<String, String>,
    #[serde(default)]
    fieldname: HashMap<String, String>,
}

/// In-memory [`Translator`].
///
/// Lookups try the requested locale, then its bare language, then the
/// fallback locale, and finally return the phrase or field unchanged.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    fallback: Locale,
    messages: HashMap<Locale, HashMap<String, String>>,
    field_names: HashMap<Locale, HashMap<String, String>>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageCatalog {
    /// An empty catalog; every lookup falls through to the key itself.
    pub fn empty() -> Self {
        Self {
            fallback: Locale::default(),
            messages: HashMap::new(),
            field_names: HashMap::new(),
        }
    }

    /// Catalog with the built-in English and Vietnamese phrases.
    pub fn builtin() -> Self {
        let en = Locale("en".to_string());
        let vi = Locale("vi".to_string());

        let mut catalog = Self::empty();
        for key in MessageKey::ALL {
            let (english, vietnamese) = match key {
                MessageKey::IsRequired => ("is required", "là bắt buộc"),
                MessageKey::IsNotNumberic => ("must be a number", "phải là số"),
                MessageKey::IsNotEmailFormat => {
                    ("is not a valid email address", "không đúng định dạng email")
                }
                MessageKey::IsNotExist => ("is not an allowed value", "không tồn tại"),
                MessageKey::IsUndefined => ("is undefined", "chưa được xác định"),
                MessageKey::IsExists => ("already exists", "đã tồn tại"),
                MessageKey::IsNotFormatted => {
                    ("is not correctly formatted", "không đúng định dạng")
                }
            };
            catalog = catalog
                .with_message(en.clone(), key.phrase(), english)
                .with_message(vi.clone(), key.phrase(), vietnamese);
        }
        catalog
    }

    /// Set the locale consulted when the requested one has no entry.
    pub fn with_fallback(mut self, locale: Locale) -> Self {
        self.fallback = locale;
        self
    }

    pub fn with_message(
        mut self,
        locale: Locale,
        phrase: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.messages
            .entry(locale)
            .or_default()
            .insert(phrase.into(), text.into());
        self
    }

    pub fn with_field_name(
        mut self,
        locale: Locale,
        field: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.field_names
            .entry(locale)
            .or_default()
            .insert(field.into(), name.into());
        self
    }

    /// Merge a JSON catalog for `locale` into this one.
    ///
    /// Existing entries are overwritten by the file's entries.
    pub fn load_json(mut self, locale: Locale, json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            locale: locale.clone(),
            source,
        })?;

        tracing::debug!(
            locale = %locale,
            messages = file.message.len(),
            field_names = file.fieldname.len(),
            "Loaded message catalog"
        );

        self.messages
            .entry(locale.clone())
            .or_default()
            .extend(file.message);
        self.field_names
            .entry(locale)
            .or_default()
            .extend(file.fieldname);
        Ok(self)
    }

    fn lookup<'a>(
        &'a self,
        table: &'a HashMap<Locale, HashMap<String, String>>,
        key: &str,
        locale: &Locale,
    ) -> Option<&'a String> {
        let language = Locale(locale.language().to_string());
        let found = [locale, &language, &self.fallback]
            .into_iter()
            .find_map(|l| table.get(l).and_then(|entries| entries.get(key)));
        found
    }
}

impl Translator for MessageCatalog {
    fn message(&self, phrase: &str, locale: &Locale) -> String {
        self.lookup(&self.messages, phrase, locale)
            .cloned()
            .unwrap_or_else(|| phrase.to_string())
    }

    fn field_name(&self, field: &str, locale: &Locale) -> String {
        self.lookup(&self.field_names, field, locale)
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }
}
