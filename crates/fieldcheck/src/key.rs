//! Field path to display key transformation.

use crate::value::parse_path;

/// Turns a dotted/bracketed field path into a flat key.
///
/// The key identifies the field in the error map (for missing values) and is
/// the lookup key for the field's localized display name.
pub trait KeyTransformer: Send + Sync {
    fn to_display_key(&self, path: &str) -> String;
}

/// Joins path segments with `_`: `user.addresses[0].street` becomes
/// `user_addresses_0_street`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeKeyTransformer;

impl KeyTransformer for SnakeKeyTransformer {
    fn to_display_key(&self, path: &str) -> String {
        parse_path(path)
            .iter()
            .map(|segment| segment.as_text())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Uses the path unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKeyTransformer;

impl KeyTransformer for IdentityKeyTransformer {
    fn to_display_key(&self, path: &str) -> String {
        path.to_string()
    }
}

impl<F> KeyTransformer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn to_display_key(&self, path: &str) -> String {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_keys() {
        let keys = SnakeKeyTransformer;
        assert_eq!(keys.to_display_key("email"), "email");
        assert_eq!(
            keys.to_display_key("user.addresses[0].street"),
            "user_addresses_0_street"
        );
        assert_eq!(keys.to_display_key("meta['x-id']"), "meta_x-id");
    }

    #[test]
    fn closures_are_transformers() {
        let upper = |path: &str| path.to_uppercase();
        assert_eq!(upper.to_display_key("email"), "EMAIL");
        assert_eq!(IdentityKeyTransformer.to_display_key("a.b"), "a.b");
    }
}
