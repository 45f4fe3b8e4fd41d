//! Field specs and rule descriptors.
//!
//! A rule descriptor is `name` or `name:param1,param2,...`. The name selects a
//! [`Rule`] from a fixed vocabulary; names outside the vocabulary parse to
//! [`Rule::Unknown`] and evaluate as a no-op. A known name with unusable
//! parameters parses to [`Rule::Malformed`], which also evaluates as a no-op
//! unless `strict_rules` rejects it.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Rules for one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Dotted/bracketed path into the input
    pub field: String,
    /// Rule descriptors, in declaration order
    pub rules: Vec<String>,
}

impl FieldSpec {
    /// Create a field spec.
    pub fn new<I, S>(field: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            rules: rules.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse every rule descriptor of this spec.
    pub fn parse_rules(&self) -> Vec<RuleDescriptor> {
        self.rules.iter().map(RuleDescriptor::new).collect()
    }
}

/// Why a descriptor naming a known rule has unusable parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RuleParseError {
    #[error("rule `{rule}` requires parameter `{param}`")]
    MissingParam { rule: String, param: String },
}

impl RuleParseError {
    fn missing(rule: &str, param: &str) -> Self {
        RuleParseError::MissingParam {
            rule: rule.to_string(),
            param: param.to_string(),
        }
    }
}

/// Parameters of the `unique` rule: `table,column[,ignoreField]`.
///
/// Parameters are split on `,` and kept verbatim, surrounding spaces included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueParams {
    /// Collection searched for a conflicting record
    pub table: String,
    /// Column compared with the field value
    pub column: String,
    /// Field that identifies the acting entity's own record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_field: Option<String>,
}

impl UniqueParams {
    fn parse(params: &str) -> Result<Self, RuleParseError> {
        let mut parts = params.split(',');
        let table =
            non_empty(parts.next()).ok_or_else(|| RuleParseError::missing("unique", "table"))?;
        let column =
            non_empty(parts.next()).ok_or_else(|| RuleParseError::missing("unique", "column"))?;
        let ignore_field = non_empty(parts.next());

        Ok(Self {
            table,
            column,
            ignore_field,
        })
    }
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|p| !p.is_empty()).map(str::to_string)
}

/// A rule from the fixed vocabulary, with its parsed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Value must be truthy
    Required,
    /// Value must not be absent; `""` and `0` are accepted
    Optional,
    /// Value must be a numeric string
    IsNumeric,
    /// Value must be an email address
    IsEmail,
    /// Value must be one of the allowed strings
    Only { allowed: Vec<String> },
    /// No other record may hold the value
    Unique(UniqueParams),
    /// Value must be a URL
    Link,
    /// Name outside the vocabulary
    Unknown { name: String },
    /// Known name whose parameters could not be parsed
    Malformed { name: String, reason: RuleParseError },
}

impl Rule {
    /// Build a rule from its name and raw parameter string.
    pub fn from_parts(name: &str, params: &str) -> Self {
        match name {
            "required" => Rule::Required,
            "optional" => Rule::Optional,
            "isNumeric" => Rule::IsNumeric,
            "isEmail" => Rule::IsEmail,
            "only" => Rule::Only {
                allowed: params.split(',').map(str::to_string).collect(),
            },
            "unique" => match UniqueParams::parse(params) {
                Ok(params) => Rule::Unique(params),
                Err(reason) => Rule::Malformed {
                    name: name.to_string(),
                    reason,
                },
            },
            "link" => Rule::Link,
            other => Rule::Unknown {
                name: other.to_string(),
            },
        }
    }

    /// The descriptor name of this rule.
    pub fn name(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Optional => "optional",
            Rule::IsNumeric => "isNumeric",
            Rule::IsEmail => "isEmail",
            Rule::Only { .. } => "only",
            Rule::Unique(_) => "unique",
            Rule::Link => "link",
            Rule::Unknown { name } | Rule::Malformed { name, .. } => name.as_str(),
        }
    }

    /// Whether evaluating this rule may suspend on a record lookup.
    pub fn needs_lookup(&self) -> bool {
        matches!(self, Rule::Unique(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Rule::Unknown { .. })
    }

    /// The parameter error of a malformed rule.
    pub fn parse_error(&self) -> Option<&RuleParseError> {
        match self {
            Rule::Malformed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A parsed rule descriptor.
///
/// The raw text is kept: dispatch compares the whole descriptor, not only the
/// name, against `required` and `optional`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RuleDescriptor {
    raw: String,
    rule: Rule,
}

impl RuleDescriptor {
    /// Parse a descriptor. Parsing never fails; see [`Rule::Malformed`].
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let rule = {
            let (name, params) = raw.split_once(':').unwrap_or((raw.as_str(), ""));
            Rule::from_parts(name, params)
        };
        Self { raw, rule }
    }

    /// The descriptor exactly as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The typed rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The part before the first `:`.
    pub fn name(&self) -> &str {
        self.raw.split_once(':').map_or(self.raw.as_str(), |(name, _)| name)
    }

    /// The part after the first `:`, or `""`.
    pub fn params(&self) -> &str {
        self.raw.split_once(':').map_or("", |(_, params)| params)
    }
}

impl FromStr for RuleDescriptor {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(raw))
    }
}

impl From<String> for RuleDescriptor {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<RuleDescriptor> for String {
    fn from(descriptor: RuleDescriptor) -> Self {
        descriptor.raw
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
