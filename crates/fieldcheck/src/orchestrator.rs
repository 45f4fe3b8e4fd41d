//! Field-level orchestration: value resolution, conditional dispatch and error
//! aggregation.

use crate::context::ValidationContext;
use crate::error::{ErrorMap, ValidateError};
use crate::evaluator::{EvaluationInput, RuleEvaluator, RuleOutcome};
use crate::spec::{FieldSpec, Rule, RuleDescriptor};
use crate::value::{resolve, FieldValue};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a complete validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: ErrorMap,
    pub has_errors: bool,
}

impl ValidationReport {
    /// `Ok` when no field failed.
    pub fn into_result(self) -> Result<(), ErrorMap> {
        self.errors.into_result()
    }
}

/// One (field, rule) evaluation, decided before anything runs.
#[derive(Debug)]
struct Planned<'a> {
    display_key: String,
    error_key: String,
    value: FieldValue<'a>,
    rule: Rule,
}

/// What a finished evaluation hands back to the reducer.
#[derive(Debug)]
struct Evaluated {
    error_key: String,
    outcome: RuleOutcome,
}

/// Runs every rule of every field spec and collects the failures.
///
/// An orchestrator and its [`ErrorMap`] belong to a single run.
#[derive(Debug)]
pub struct FieldOrchestrator<'a> {
    input: &'a Value,
    ctx: &'a ValidationContext,
    errors: ErrorMap,
}

impl<'a> FieldOrchestrator<'a> {
    pub fn new(input: &'a Value, ctx: &'a ValidationContext) -> Self {
        Self {
            input,
            ctx,
            errors: ErrorMap::new(),
        }
    }

    /// Validate the input against `specs`.
    ///
    /// All (field, rule) pairs are evaluated concurrently; their outcomes are
    /// applied to the error map one at a time, in completion order. A record
    /// lookup failure aborts the run and drops the evaluations still pending.
    pub async fn validate(&mut self, specs: &[FieldSpec]) -> Result<(), ValidateError> {
        let plan = self.plan(specs)?;
        let ctx = self.ctx;

        tracing::debug!(
            fields = specs.len(),
            evaluations = plan.len(),
            lookups = plan.iter().filter(|planned| planned.rule.needs_lookup()).count(),
            locale = %ctx.locale(),
            "Starting validation"
        );

        let mut pending: FuturesUnordered<_> = plan
            .into_iter()
            .map(|planned| evaluate(planned, ctx))
            .collect();

        while let Some(evaluated) = pending.next().await {
            let Evaluated { error_key, outcome } = evaluated?;
            if let (true, Some(template)) = (outcome.failed, outcome.message) {
                let field_name = ctx.translator().field_name(&error_key, ctx.locale());
                self.errors.insert(error_key, template.render(&field_name));
            }
        }

        tracing::debug!(
            failed_fields = self.errors.field_names().count(),
            messages = self.errors.len(),
            "Validation finished"
        );

        Ok(())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }

    pub fn into_report(self) -> ValidationReport {
        ValidationReport {
            has_errors: self.has_errors(),
            errors: self.errors,
        }
    }

    fn plan(&self, specs: &[FieldSpec]) -> Result<Vec<Planned<'a>>, ValidateError> {
        let config = self.ctx.config();
        let mut plan = Vec::new();

        for spec in specs {
            let value = resolve(self.input, &spec.field);
            let display_key = self.ctx.keys().to_display_key(&spec.field);

            for raw in &spec.rules {
                let descriptor = RuleDescriptor::new(raw.as_str());

                if let Some(reason) = descriptor.rule().parse_error() {
                    if config.strict_rules {
                        return Err(ValidateError::InvalidRule {
                            field: spec.field.clone(),
                            descriptor: raw.clone(),
                            source: reason.clone(),
                        });
                    }
                    tracing::warn!(
                        field = %spec.field,
                        descriptor = raw.as_str(),
                        error = %reason,
                        "Malformed rule, skipping"
                    );
                } else if descriptor.rule().is_unknown() {
                    if config.strict_rules {
                        return Err(ValidateError::UnknownRule {
                            field: spec.field.clone(),
                            name: descriptor.name().to_string(),
                        });
                    }
                    tracing::warn!(
                        field = %spec.field,
                        rule = descriptor.name(),
                        "Unknown rule, skipping"
                    );
                }

                let declared = (descriptor.raw() != "required" && value.is_truthy())
                    || descriptor.raw() == "optional";
                let rule = if declared {
                    descriptor.rule().clone()
                } else {
                    Rule::Required
                };

                tracing::trace!(
                    field = %spec.field,
                    descriptor = descriptor.raw(),
                    forced_required = !declared,
                    "Dispatching rule"
                );

                plan.push(Planned {
                    error_key: config
                        .error_key_style
                        .select(&spec.field, &display_key, !declared),
                    display_key: display_key.clone(),
                    value,
                    rule,
                });
            }
        }

        Ok(plan)
    }
}

async fn evaluate(
    planned: Planned<'_>,
    ctx: &ValidationContext,
) -> Result<Evaluated, ValidateError> {
    let mut evaluator = RuleEvaluator::new(EvaluationInput {
        key: &planned.display_key,
        value: planned.value,
        locale: ctx.locale(),
        actor: ctx.actor(),
    });
    evaluator.check(&planned.rule, ctx).await?;
    let outcome = evaluator.result();

    Ok(Evaluated {
        error_key: planned.error_key,
        outcome,
    })
}

/// Validate `input` against `specs` in one call.
///
/// ## Example
///
/// ```rust,ignore
/// use fieldcheck::prelude::*;
/// use serde_json::json;
///
/// let specs = [FieldSpec::new("email", ["required", "isEmail", "unique:User,email,_id"])];
/// let report = fieldcheck::validate(&json!({ "email": "" }), &specs, &ctx).await?;
/// assert!(report.has_errors);
/// ```
pub async fn validate(
    input: &Value,
    specs: &[FieldSpec],
    ctx: &ValidationContext,
) -> Result<ValidationReport, ValidateError> {
    let mut orchestrator = FieldOrchestrator::new(input, ctx);
    orchestrator.validate(specs).await?;
    Ok(orchestrator.into_report())
}
