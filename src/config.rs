use std::fmt;
use std::fs;
use std::path::Path;

use linked_hash_map::LinkedHashMap;
use log::error;

/// Config values keep the raw text unless the whole value parses as a number.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ConfigValue {
    Int(i64),
    Text(String),
}

impl ConfigValue {
    pub(crate) fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(n) => Some(*n),
            ConfigValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigValue::Int(n) => write!(f, "{}", n),
            ConfigValue::Text(s) => write!(f, "{}", s),
        }
    }
}

pub(crate) type Config = LinkedHashMap<String, ConfigValue>;

/// Splits text into lines regardless of the line endings, dropping only
/// blank lines at the end. Interior blank lines are preserved.
pub(crate) fn split_lines(data: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = data
        .split("\r\n")
        .flat_map(|chunk| chunk.split(|c| c == '\r' || c == '\n'))
        .collect();
    while lines.last().map_or(false, |line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Loads `<name>.txt` from the server root as `key=value` records.
/// A missing or unreadable file is logged and yields an empty config;
/// callers validate required keys themselves.
pub(crate) fn load_config(root: &Path, name: &str) -> Config {
    let file = root.join(format!("{}.txt", name));
    match fs::read_to_string(&file) {
        Ok(data) => parse_config(&data),
        Err(e) => {
            error!("Error: {}", e);
            Config::new()
        }
    }
}

fn parse_config(data: &str) -> Config {
    let mut config = Config::new();
    for line in split_lines(data) {
        let pair: Vec<&str> = line.split('=').collect();
        if pair.len() != 2 {
            continue;
        }
        config.insert(pair[0].to_string(), coerce(pair[1]));
    }
    config
}

fn coerce(value: &str) -> ConfigValue {
    match value.parse::<i64>() {
        Ok(n) => ConfigValue::Int(n),
        Err(_) => ConfigValue::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_split_lines_should_handle_mixed_endings() {
        let lines = split_lines("one\r\ntwo\rthree\nfour");
        assert_eq!(lines, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn when_split_lines_should_strip_trailing_blanks_only() {
        let lines = split_lines("one\n\ntwo\n\n\n");
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn when_parse_config_should_coerce_numbers() {
        let config = parse_config("port=8080\nproject=Notes\n");
        assert_eq!(config.get("port"), Some(&ConfigValue::Int(8080)));
        assert_eq!(
            config.get("project"),
            Some(&ConfigValue::Text("Notes".to_string()))
        );
    }

    #[test]
    fn when_parse_config_should_skip_malformed_records() {
        let config = parse_config("width=800\nbroken\na=b=c\n");
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("width"), Some(&ConfigValue::Int(800)));
    }

    #[test]
    fn when_load_config_missing_file_should_return_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), "Config");
        assert!(config.is_empty());
    }
}
