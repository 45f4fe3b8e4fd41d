//! Engine configuration with environment variable support.
//!
//! # Example
//!
//! ```ignore
//! use fieldcheck::config::{load_dotenv, ValidatorConfig};
//!
//! load_dotenv();
//! // FIELDCHECK_DEFAULT_LOCALE=vi FIELDCHECK_STRICT_RULES=true
//! let config = ValidatorConfig::from_env()?;
//! ```

use crate::i18n::Locale;
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read by [`ValidatorConfig::from_env`].
pub const ENV_PREFIX: &str = "FIELDCHECK_";

/// Error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
}

/// Which key a failure is recorded under in the error map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKeyStyle {
    /// Declared-rule failures under the raw field path, forced `required`
    /// failures under the display key.
    #[default]
    Mixed,
    /// Always the raw field path.
    FieldPath,
    /// Always the display key.
    DisplayKey,
}

impl ErrorKeyStyle {
    /// Pick the error-map key for a failure.
    pub fn select(&self, path: &str, display_key: &str, forced_required: bool) -> String {
        let use_path = match self {
            ErrorKeyStyle::Mixed => !forced_required,
            ErrorKeyStyle::FieldPath => true,
            ErrorKeyStyle::DisplayKey => false,
        };
        if use_path {
            path.to_string()
        } else {
            display_key.to_string()
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Locale used when the context does not set one
    pub default_locale: Locale,
    /// Reject specs naming rules outside the vocabulary instead of skipping them
    pub strict_rules: bool,
    /// Apply the `only` rule's result (it is computed but discarded otherwise)
    pub enforce_only: bool,
    pub error_key_style: ErrorKeyStyle,
    /// Identity field compared as a normalized string by `unique`
    pub identity_field: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::default(),
            strict_rules: false,
            enforce_only: false,
            error_key_style: ErrorKeyStyle::default(),
            identity_field: "_id".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Load from `FIELDCHECK_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of `FIELDCHECK_*` variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        tracing::debug!(
            default_locale = %config.default_locale,
            strict_rules = config.strict_rules,
            enforce_only = config.enforce_only,
            error_key_style = ?config.error_key_style,
            "Loaded validator configuration"
        );
        Ok(config)
    }
}

/// Load environment variables from a `.env` file, if present.
///
/// Existing variables take precedence over the file's values.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load environment variables from a specific file path.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}
