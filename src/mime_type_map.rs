use std::fs;
use std::io;
use std::path::{Path, MAIN_SEPARATOR};

use fancy_regex::Regex;
use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use phf::{phf_map, Map};

use crate::config::split_lines;

pub(crate) const TEXT_PLAIN: &'static str = "text/plain";
pub(crate) const TEXT_HTML: &'static str = "text/html";
const JPEG: &'static str = "image/jpeg";

/// Compiled-in defaults, used only when the MIME table file cannot be read.
static FALLBACK_MIME_TYPES: Map<&'static str, (&'static str, bool)> = phf_map! {
    "css" => ("text/css", false),
    "gif" => ("image/gif", true),
    "htm" => (TEXT_HTML, false),
    "html" => (TEXT_HTML, false),
    "ico" => ("image/x-icon", true),
    "jpeg" => (JPEG, true),
    "jpg" => (JPEG, true),
    "js" => ("application/javascript", false),
    "json" => ("application/json", false),
    "png" => ("image/png", true),
    "svg" => ("image/svg+xml", false),
    "txt" => (TEXT_PLAIN, false),
};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MimeTypeProperties {
    pub(crate) content_type: String,
    pub(crate) binary: bool,
}

impl MimeTypeProperties {
    pub(crate) fn new(content_type: &str, binary: bool) -> MimeTypeProperties {
        MimeTypeProperties {
            content_type: content_type.to_string(),
            binary,
        }
    }
}

pub(crate) type MimeTable = LinkedHashMap<String, MimeTypeProperties>;

/// Reads `<name>.txt` from the server root as `ext=contentType,isBinary`
/// records. Malformed records are skipped, later duplicates win. An
/// unreadable file propagates the error to the caller.
pub(crate) fn load_mime_table(root: &Path, name: &str) -> io::Result<MimeTable> {
    let data = fs::read_to_string(root.join(format!("{}.txt", name)))?;
    Ok(parse_mime_table(&data))
}

fn parse_mime_table(data: &str) -> MimeTable {
    let mut table = MimeTable::new();
    for line in split_lines(data) {
        let record: Vec<&str> = line.split('=').collect();
        if record.len() != 2 {
            continue;
        }
        let info: Vec<&str> = record[1].split(',').collect();
        if info.len() != 2 {
            continue;
        }
        table.insert(
            record[0].to_string(),
            MimeTypeProperties::new(info[0], info[1] == "true"),
        );
    }
    table
}

pub(crate) fn fallback_mime_table() -> MimeTable {
    FALLBACK_MIME_TYPES
        .entries()
        .map(|(ext, &(content_type, binary))| {
            (ext.to_string(), MimeTypeProperties::new(content_type, binary))
        })
        .collect()
}

lazy_static! {
    static ref EXTENSION_PREFIX: Regex =
        Regex::new(r"^\w+\.").expect("Extension prefix regex is not correct");
}

/// Takes the last path segment and strips one leading `word.` group, so
/// `notes/Home.html` yields `html` and `archive.tar.gz` yields `tar.gz`.
pub(crate) fn extract_extension(file: &str) -> String {
    let name = file.rsplit(MAIN_SEPARATOR).next().unwrap_or(file);
    EXTENSION_PREFIX.replace(name, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_extract_extension_should_find_png() {
        test_extension("flower.png", "png");
    }

    #[test]
    fn when_extract_extension_should_use_last_segment() {
        let nested = format!("images{}flower.jpg", MAIN_SEPARATOR);
        test_extension(&nested, "jpg");
    }

    #[test]
    fn when_extract_extension_should_keep_compound_suffix() {
        test_extension("archive.tar.gz", "tar.gz");
    }

    #[test]
    fn when_parse_mime_table_should_read_binary_flag() {
        let table = parse_mime_table("txt=text/plain,false\npng=image/png,true\n");
        assert_eq!(
            table.get("txt"),
            Some(&MimeTypeProperties::new("text/plain", false))
        );
        assert_eq!(
            table.get("png"),
            Some(&MimeTypeProperties::new("image/png", true))
        );
    }

    #[test]
    fn when_parse_mime_table_should_skip_malformed_records() {
        let table = parse_mime_table("txt=text/plain,false\nbroken\ncss=text/css\n");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn when_parse_mime_table_duplicate_should_overwrite() {
        let table = parse_mime_table("txt=text/plain,false\ntxt=text/x-log,false\n");
        assert_eq!(table.get("txt").unwrap().content_type, "text/x-log");
    }

    #[test]
    fn when_load_mime_table_missing_file_should_err() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_mime_table(dir.path(), "Mime").is_err());
    }

    #[test]
    fn when_fallback_table_should_contain_html() {
        let table = fallback_mime_table();
        assert_eq!(table.get("html").unwrap().content_type, TEXT_HTML);
        assert!(table.get("png").unwrap().binary);
    }

    fn test_extension(file_name: &str, expected: &str) {
        assert_eq!(extract_extension(file_name), expected.to_string());
    }
}
