//! Single-rule evaluation.

use crate::context::ValidationContext;
use crate::error::ValidateError;
use crate::i18n::{Locale, MessageKey, MessageTemplate};
use crate::rules::{has_conflict, is_email, is_numeric, is_one_of, is_url};
use crate::spec::Rule;
use crate::value::FieldValue;
use serde_json::Value;

/// What one evaluation looks at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Display key of the field
    pub key: &'a str,
    pub value: FieldValue<'a>,
    pub locale: &'a Locale,
    pub actor: Option<&'a Value>,
}

/// Result of one rule evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub failed: bool,
    /// Set when `failed` is true
    pub message: Option<MessageTemplate>,
}

/// Evaluates exactly one rule against one value.
///
/// An evaluator is built per (field, rule) pair and discarded once its
/// outcome has been read.
#[derive(Debug)]
pub struct RuleEvaluator<'a> {
    input: EvaluationInput<'a>,
    outcome: RuleOutcome,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(input: EvaluationInput<'a>) -> Self {
        Self {
            input,
            outcome: RuleOutcome::default(),
        }
    }

    /// Evaluate `rule`, recording a failure in this evaluator's outcome.
    ///
    /// Errors are infrastructure failures (record lookup), never rule failures.
    pub async fn check(
        &mut self,
        rule: &Rule,
        ctx: &ValidationContext,
    ) -> Result<(), ValidateError> {
        let value = self.input.value;

        match rule {
            Rule::Required => {
                if !value.is_truthy() {
                    self.fail(MessageKey::IsRequired, ctx);
                }
            }
            Rule::Optional => {
                if value.is_absent() {
                    self.fail(MessageKey::IsUndefined, ctx);
                }
            }
            Rule::IsNumeric => {
                if !value.as_text().is_some_and(|text| is_numeric(&text)) {
                    self.fail(MessageKey::IsNotNumberic, ctx);
                }
            }
            Rule::IsEmail => {
                if !value.as_text().is_some_and(|text| is_email(&text)) {
                    self.fail(MessageKey::IsNotEmailFormat, ctx);
                }
            }
            Rule::Only { allowed } => {
                let outcome = self.only(allowed, ctx);
                if ctx.config().enforce_only {
                    self.outcome = outcome;
                } else if outcome.failed {
                    tracing::trace!(field = self.input.key, "Discarding `only` rule failure");
                }
            }
            Rule::Unique(params) => {
                if let Some(found) = value.as_value() {
                    if has_conflict(params, found, self.input.actor, ctx).await? {
                        self.fail(MessageKey::IsExists, ctx);
                    }
                }
            }
            Rule::Link => {
                if !value.as_text().is_some_and(|text| is_url(&text)) {
                    self.fail(MessageKey::IsNotFormatted, ctx);
                }
            }
            Rule::Unknown { .. } | Rule::Malformed { .. } => {}
        }

        Ok(())
    }

    /// The outcome of the last check.
    pub fn result(&self) -> RuleOutcome {
        self.outcome.clone()
    }

    /// Compute the `only` outcome without recording it.
    ///
    /// Only JSON strings can match the allow-list.
    fn only(&self, allowed: &[String], ctx: &ValidationContext) -> RuleOutcome {
        let listed = match self.input.value {
            FieldValue::Present(Value::String(s)) => is_one_of(s, allowed),
            _ => false,
        };
        if listed {
            RuleOutcome::default()
        } else {
            RuleOutcome {
                failed: true,
                message: Some(self.template(MessageKey::IsNotExist, ctx)),
            }
        }
    }

    fn fail(&mut self, key: MessageKey, ctx: &ValidationContext) {
        self.outcome = RuleOutcome {
            failed: true,
            message: Some(self.template(key, ctx)),
        };
    }

    fn template(&self, key: MessageKey, ctx: &ValidationContext) -> MessageTemplate {
        MessageTemplate::new(key, ctx.translator().message(key.phrase(), self.input.locale))
    }
}
