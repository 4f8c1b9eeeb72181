//! Key/value fields attached to records.

use serde_json::{Map, Value};

/// A set of fields decorating one record (or every record, when used as
/// initial fields). Key order carries no meaning.
pub type Fields = Map<String, Value>;

/// Copy `extra` over `base`; keys present in both take the value from `extra`.
pub fn merge(base: &mut Fields, extra: &Fields) {
    for (key, value) in extra {
        base.insert(key.clone(), value.clone());
    }
}

/// Build a [`Fields`] map from `key => value` pairs.
///
/// Usage:
/// ```
/// use logo::fields;
/// let fields = fields! {
///     "request_id" => "abc123",
///     "attempt" => 2
/// };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fields = $crate::Fields::new();
        $(
            fields.insert($key.to_string(), $crate::__serde_json::Value::from($value));
        )*
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_macro() {
        let fields = crate::fields! {
            "user" => "alice",
            "attempt" => 3,
            "retry" => true,
        };

        assert_eq!(fields.get("user"), Some(&json!("alice")));
        assert_eq!(fields.get("attempt"), Some(&json!(3)));
        assert_eq!(fields.get("retry"), Some(&json!(true)));
        assert!(crate::fields! {}.is_empty());
    }

    #[test]
    fn test_merge_overrides_base() {
        let mut base = crate::fields! { "service" => "api", "region" => "eu" };
        let extra = crate::fields! { "region" => "us", "shard" => 7 };

        merge(&mut base, &extra);

        assert_eq!(base.get("service"), Some(&json!("api")));
        assert_eq!(base.get("region"), Some(&json!("us")));
        assert_eq!(base.get("shard"), Some(&json!(7)));
        assert_eq!(extra.len(), 2);
    }
}
