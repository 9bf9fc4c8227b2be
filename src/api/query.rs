//! Encoding of `key=value` filters into a request query suffix

use crate::error::BattlefieldsError;

/// Encodes `key=value` filters into a query suffix such as `&a=1&b=2`
///
/// Each entry is split on its first `=`. Key and value are percent-encoded
/// separately and entries keep their input order, so the result can be used
/// directly as part of a cache key. An empty slice encodes to an empty string.
///
/// # Errors
/// * `BattlefieldsError::MalformedQuery` if an entry contains no `=`
pub fn encode_queries<S: AsRef<str>>(queries: &[S]) -> Result<String, BattlefieldsError> {
    let mut suffix = String::new();
    for query in queries {
        let query = query.as_ref();
        let (key, value) = query
            .split_once('=')
            .ok_or_else(|| BattlefieldsError::MalformedQuery(query.to_string()))?;
        suffix.push('&');
        suffix.push_str(&urlencoding::encode(key));
        suffix.push('=');
        suffix.push_str(&urlencoding::encode(value));
    }
    Ok(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_two_queries() {
        assert_eq!(encode_queries(&["a=1", "b=2"]).unwrap(), "&a=1&b=2");
    }

    #[test]
    fn test_encode_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_queries(&empty).unwrap(), "");
    }

    #[test]
    fn test_entry_without_equals_is_rejected() {
        let err = encode_queries(&["bad"]).unwrap_err();
        assert!(matches!(err, BattlefieldsError::MalformedQuery(ref q) if q == "bad"));
    }

    #[test]
    fn test_only_first_equals_splits() {
        assert_eq!(encode_queries(&["expr=a=b"]).unwrap(), "&expr=a%3Db");
    }

    #[test]
    fn test_key_and_value_are_escaped() {
        assert_eq!(
            encode_queries(&["user name=Steve & Alex"]).unwrap(),
            "&user%20name=Steve%20%26%20Alex"
        );
    }

    #[test]
    fn test_empty_value_is_allowed() {
        assert_eq!(encode_queries(&["uuid="]).unwrap(), "&uuid=");
    }

    #[test]
    fn test_order_is_preserved() {
        let forward = encode_queries(&["a=1", "b=2"]).unwrap();
        let reverse = encode_queries(&["b=2", "a=1"]).unwrap();
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_owned_strings_are_accepted() {
        let queries = vec!["uuid=abc".to_string()];
        assert_eq!(encode_queries(&queries).unwrap(), "&uuid=abc");
    }
}
