//! Field path resolution over JSON input.
//!
//! Paths use the dotted/bracketed notation: `user.name`, `items[0].sku`,
//! `meta["content-type"]`. A key that literally exists on the root object
//! (for example `"a.b"`) wins over its dotted interpretation.

use serde_json::Value;
use std::borrow::Cow;

/// A single step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index (also accepted as an object key)
    Index(usize),
}

impl PathSegment {
    fn from_raw(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(raw.to_string()),
        }
    }

    /// The segment as it would appear in a flat key.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(key) => Cow::Borrowed(key),
            PathSegment::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

/// Split a field path into segments.
///
/// Empty segments (`a..b`, a leading `.`) are skipped. Bracket contents may be
/// quoted with `'` or `"`; quoted contents are always treated as keys.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut buffer = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut buffer, &mut segments),
            '[' => {
                flush(&mut buffer, &mut segments);
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                let inner = inner.trim();
                let quoted = inner.len() >= 2
                    && ((inner.starts_with('"') && inner.ends_with('"'))
                        || (inner.starts_with('\'') && inner.ends_with('\'')));
                if quoted {
                    segments.push(PathSegment::Key(inner[1..inner.len() - 1].to_string()));
                } else if !inner.is_empty() {
                    segments.push(PathSegment::from_raw(inner));
                }
            }
            _ => buffer.push(c),
        }
    }
    flush(&mut buffer, &mut segments);

    segments
}

fn flush(buffer: &mut String, segments: &mut Vec<PathSegment>) {
    if !buffer.is_empty() {
        segments.push(PathSegment::from_raw(buffer));
        buffer.clear();
    }
}

/// The value found at a field path.
///
/// JSON `null` resolves to [`FieldValue::Absent`], the same as a missing path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Present(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// Whether the value is missing (no path, or `null`).
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Whether the value counts as "given".
    ///
    /// Absent, `null`, `false`, `0`, `NaN` and `""` are not truthy; every other
    /// value, including empty arrays and objects, is.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Absent => false,
            FieldValue::Present(value) => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }

    /// The underlying JSON value, if any.
    pub fn as_value(&self) -> Option<&'a Value> {
        match *self {
            FieldValue::Absent => None,
            FieldValue::Present(value) => Some(value),
        }
    }

    /// The value as text for format predicates.
    ///
    /// Strings are used as-is, numbers and booleans through their JSON text.
    /// Arrays and objects have no text form.
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        self.as_value().and_then(scalar_text)
    }
}

/// Text form of a scalar JSON value.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Resolve `path` against `input`.
pub fn resolve<'a>(input: &'a Value, path: &str) -> FieldValue<'a> {
    if let Some(direct) = input.as_object().and_then(|map| map.get(path)) {
        return present(direct);
    }

    let mut current = input;
    for segment in parse_path(path) {
        let next = match (&segment, current) {
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return FieldValue::Absent,
        }
    }

    present(current)
}

fn present(value: &Value) -> FieldValue<'_> {
    if value.is_null() {
        FieldValue::Absent
    } else {
        FieldValue::Present(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_dotted_and_bracketed() {
        assert_eq!(
            parse_path("user.addresses[0].street"),
            vec![
                PathSegment::Key("user".into()),
                PathSegment::Key("addresses".into()),
                PathSegment::Index(0),
                PathSegment::Key("street".into()),
            ]
        );
        assert_eq!(
            parse_path("meta[\"content-type\"]"),
            vec![
                PathSegment::Key("meta".into()),
                PathSegment::Key("content-type".into()),
            ]
        );
        assert_eq!(parse_path("a..b"), parse_path("a.b"));
    }

    #[test]
    fn resolve_nested() {
        let input = json!({
            "user": { "emails": ["a@b.co", "c@d.co"], "age": 0 },
        });
        assert_eq!(
            resolve(&input, "user.emails[1]"),
            FieldValue::Present(&json!("c@d.co"))
        );
        assert_eq!(resolve(&input, "user.age"), FieldValue::Present(&json!(0)));
        assert!(resolve(&input, "user.phone").is_absent());
        assert!(resolve(&input, "user.emails[5]").is_absent());
        assert!(resolve(&input, "user.age.value").is_absent());
    }

    #[test]
    fn literal_key_wins() {
        let input = json!({ "a.b": "literal", "a": { "b": "nested" } });
        assert_eq!(resolve(&input, "a.b"), FieldValue::Present(&json!("literal")));
    }

    #[test]
    fn null_is_absent() {
        let input = json!({ "name": null });
        assert!(resolve(&input, "name").is_absent());
    }

    #[test]
    fn truthiness() {
        let falsy = [json!(""), json!(0), json!(0.0), json!(false)];
        for value in &falsy {
            assert!(!FieldValue::Present(value).is_truthy(), "{value} should be falsy");
        }
        let truthy = [json!("0"), json!(1), json!(true), json!([]), json!({})];
        for value in &truthy {
            assert!(FieldValue::Present(value).is_truthy(), "{value} should be truthy");
        }
        assert!(!FieldValue::Absent.is_truthy());
    }

    #[test]
    fn text_form() {
        assert_eq!(FieldValue::Present(&json!(42)).as_text().as_deref(), Some("42"));
        assert_eq!(FieldValue::Present(&json!("x")).as_text().as_deref(), Some("x"));
        assert_eq!(FieldValue::Present(&json!(["x"])).as_text(), None);
    }
}
