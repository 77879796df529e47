use std::collections::HashMap;

use urlencoding::decode;

pub(crate) type Params = HashMap<String, String>;

/// Parses a query string or form-encoded body into a parameter map.
/// Later duplicates win; a pair without `=` maps to the empty string.
pub(crate) fn parse_query(query: &str) -> Params {
    let mut params = Params::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        params.insert(decode_component(key), decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    // '+' must become a space before percent-decoding so that an encoded
    // plus (%2B) survives as a literal plus.
    let plus_decoded = raw.replace('+', " ");
    match decode(&plus_decoded) {
        Ok(text) => text.into_owned(),
        Err(_) => plus_decoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_parse_query_should_split_pairs() {
        let params = parse_query("folder=notes&search=all");
        assert_eq!(params.get("folder"), Some(&"notes".to_string()));
        assert_eq!(params.get("search"), Some(&"all".to_string()));
    }

    #[test]
    fn when_parse_query_should_percent_decode() {
        let params = parse_query("data=hello%20world&folder=a%2Fb");
        assert_eq!(params.get("data"), Some(&"hello world".to_string()));
        assert_eq!(params.get("folder"), Some(&"a/b".to_string()));
    }

    #[test]
    fn when_parse_query_should_decode_plus_as_space() {
        let params = parse_query("data=one+two%2Bthree");
        assert_eq!(params.get("data"), Some(&"one two+three".to_string()));
    }

    #[test]
    fn when_parse_query_empty_should_be_empty() {
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn when_parse_query_bare_key_should_map_to_empty() {
        let params = parse_query("flag&data=x");
        assert_eq!(params.get("flag"), Some(&"".to_string()));
    }

    #[test]
    fn when_parse_query_duplicate_should_keep_last() {
        let params = parse_query("data=a&data=b");
        assert_eq!(params.get("data"), Some(&"b".to_string()));
    }
}
