//! Asynchronous rules.
//!
//! These rules suspend on the context's [`RecordLookup`](crate::RecordLookup).

use crate::context::ValidationContext;
use crate::error::ValidateError;
use crate::spec::UniqueParams;
use crate::value::scalar_text;
use serde_json::Value;
use std::borrow::Cow;

/// Whether `value` collides with an existing record.
///
/// With an ignore field, a found record only conflicts when the actor's value
/// at that field differs from the record's. The identity field is compared as
/// normalized strings, other fields as JSON values with scalars compared by
/// their text form.
pub async fn has_conflict(
    params: &UniqueParams,
    value: &Value,
    actor: Option<&Value>,
    ctx: &ValidationContext,
) -> Result<bool, ValidateError> {
    let records = ctx.records().ok_or_else(|| ValidateError::NoRecordLookup {
        table: params.table.clone(),
        column: params.column.clone(),
    })?;

    let found = records
        .find_one(&params.table, &params.column, value)
        .await
        .map_err(|source| {
            tracing::warn!(
                table = %params.table,
                column = %params.column,
                error = %source,
                "Record lookup failed"
            );
            ValidateError::Lookup {
                table: params.table.clone(),
                column: params.column.clone(),
                source,
            }
        })?;

    let Some(record) = found else {
        return Ok(false);
    };

    let Some(ignore_field) = params.ignore_field.as_deref() else {
        return Ok(true);
    };

    let record_value = field_of(&record, ignore_field);
    let actor_value = actor.and_then(|actor| field_of(actor, ignore_field));

    let same = if ignore_field == ctx.config().identity_field {
        identity_text(actor_value) == identity_text(record_value)
    } else {
        loosely_equal(actor_value, record_value)
    };

    tracing::trace!(
        table = %params.table,
        ignore_field,
        same_entity = same,
        "Record found for unique rule"
    );

    Ok(!same)
}

fn field_of<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

/// String form of an identity value.
///
/// Extended-JSON object ids (`{"$oid": "..."}`) normalize to their hex string.
fn identity_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    let value = value?;
    if let Some(oid) = value.get("$oid").and_then(Value::as_str) {
        return Some(Cow::Borrowed(oid));
    }
    scalar_text(value).or_else(|| Some(Cow::Owned(value.to_string())))
}

fn loosely_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) if l == r => true,
        (Some(l), Some(r)) => match (scalar_text(l), scalar_text(r)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordLookup;
    use crate::error::LookupError;
    use async_trait::async_trait;
    use serde_json::json;

    struct OneRecord(Value);

    #[async_trait]
    impl RecordLookup for OneRecord {
        async fn find_one(
            &self,
            _collection: &str,
            field: &str,
            value: &Value,
        ) -> Result<Option<Value>, LookupError> {
            Ok((self.0.get(field) == Some(value)).then(|| self.0.clone()))
        }
    }

    struct Broken;

    #[async_trait]
    impl RecordLookup for Broken {
        async fn find_one(
            &self,
            _collection: &str,
            _field: &str,
            _value: &Value,
        ) -> Result<Option<Value>, LookupError> {
            Err(LookupError::new("database offline"))
        }
    }

    fn params(ignore: Option<&str>) -> UniqueParams {
        UniqueParams {
            table: "User".into(),
            column: "email".into(),
            ignore_field: ignore.map(str::to_string),
        }
    }

    fn ctx_with(record: Value) -> ValidationContext {
        ValidationContext::builder().records(OneRecord(record)).build()
    }

    #[tokio::test]
    async fn no_record_no_conflict() {
        let ctx = ctx_with(json!({ "_id": "1", "email": "taken@example.com" }));
        let conflict = has_conflict(&params(None), &json!("free@example.com"), None, &ctx)
            .await
            .unwrap();
        assert!(!conflict);
    }

    #[tokio::test]
    async fn found_record_conflicts_without_ignore_field() {
        let ctx = ctx_with(json!({ "_id": "1", "email": "taken@example.com" }));
        let actor = json!({ "_id": "1" });
        let conflict = has_conflict(&params(None), &json!("taken@example.com"), Some(&actor), &ctx)
            .await
            .unwrap();
        assert!(conflict);
    }

    #[tokio::test]
    async fn identity_field_normalizes_object_ids() {
        let ctx = ctx_with(json!({
            "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f6" },
            "email": "me@example.com",
        }));
        let me = json!({ "_id": "65a1f0c2e4b0a1b2c3d4e5f6" });
        let other = json!({ "_id": "65a1f0c2e4b0a1b2c3d4e5f7" });
        let value = json!("me@example.com");

        assert!(!has_conflict(&params(Some("_id")), &value, Some(&me), &ctx).await.unwrap());
        assert!(has_conflict(&params(Some("_id")), &value, Some(&other), &ctx).await.unwrap());
        assert!(has_conflict(&params(Some("_id")), &value, None, &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn identity_field_compares_numbers_as_text() {
        let ctx = ctx_with(json!({ "_id": 7, "email": "me@example.com" }));
        let me = json!({ "_id": "7" });
        assert!(!has_conflict(&params(Some("_id")), &json!("me@example.com"), Some(&me), &ctx)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn other_ignore_fields_compare_loosely() {
        let ctx = ctx_with(json!({ "username": "neo", "email": "neo@example.com" }));
        let value = json!("neo@example.com");
        let same = json!({ "username": "neo" });
        let different = json!({ "username": "trinity" });

        assert!(!has_conflict(&params(Some("username")), &value, Some(&same), &ctx).await.unwrap());
        assert!(has_conflict(&params(Some("username")), &value, Some(&different), &ctx)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn missing_on_both_sides_is_same() {
        let ctx = ctx_with(json!({ "email": "x@example.com" }));
        let conflict = has_conflict(&params(Some("tenant")), &json!("x@example.com"), None, &ctx)
            .await
            .unwrap();
        assert!(!conflict);
    }

    #[tokio::test]
    async fn lookup_errors_propagate() {
        let ctx = ValidationContext::builder().records(Broken).build();
        let err = has_conflict(&params(None), &json!("a@b.co"), None, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidateError::Lookup { .. }));
    }

    #[tokio::test]
    async fn missing_lookup_is_an_error() {
        let ctx = ValidationContext::new();
        let err = has_conflict(&params(None), &json!("a@b.co"), None, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidateError::NoRecordLookup { .. }));
    }
}
