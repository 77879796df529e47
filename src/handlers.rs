use std::fs;
use std::io;
use std::path::{Path, MAIN_SEPARATOR};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use fancy_regex::Regex;
use lazy_static::lazy_static;

use crate::http_struct::{Response, STATUS_NOT_FOUND, STATUS_OK, STATUS_UNAUTHORIZED};
use crate::mime_type_map::{extract_extension, MimeTable};
use crate::path_operations::{escape_path, resolve_local_path, strip_trailing_separator};
use crate::query_params::Params;

/// Reads a file from the server tree. The extension must be present in the
/// MIME table or the filesystem is never touched.
pub(crate) fn read_file(file: &str, mime: &MimeTable, root: &str) -> Response {
    let ext = extract_extension(file);
    let entry = match mime.get(&ext) {
        Some(entry) => entry,
        None => {
            return Response::plain(
                STATUS_NOT_FOUND,
                format!("Read Error: File type {} is not defined.", ext),
            )
        }
    };
    let dest = resolve_local_path(root, file);
    if entry.binary {
        match fs::read(&dest) {
            Ok(bytes) => Response::binary(&entry.content_type, bytes),
            Err(e) => Response::plain(STATUS_NOT_FOUND, format!("Read Error: {}", e)),
        }
    } else {
        match fs::read_to_string(&dest) {
            Ok(text) => Response::text(STATUS_OK, &entry.content_type, text),
            Err(e) => Response::plain(STATUS_NOT_FOUND, format!("Read Error: {}", e)),
        }
    }
}

/// Writes the `data` parameter to a file in the server tree. Binary types
/// take the payload as base64.
pub(crate) fn write_file(file: &str, params: &Params, mime: &MimeTable, root: &str) -> Response {
    let ext = extract_extension(file);
    let entry = match mime.get(&ext) {
        Some(entry) => entry,
        None => {
            return Response::plain(
                STATUS_UNAUTHORIZED,
                format!("Write Error: File type {} is not defined.", ext),
            )
        }
    };
    let data = match params.get("data") {
        Some(data) => data,
        None => {
            return Response::plain(
                STATUS_UNAUTHORIZED,
                format!("Write Error: Data parameter missing for {}.", file),
            )
        }
    };
    if data.is_empty() {
        return Response::plain(
            STATUS_NOT_FOUND,
            format!("Write Error: Cannot create empty file {}.", file),
        );
    }
    let dest = resolve_local_path(root, file);
    let result = if entry.binary {
        STANDARD
            .decode(data.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            .and_then(|bytes| fs::write(&dest, bytes))
    } else {
        fs::write(&dest, data)
    };
    match result {
        Ok(()) => Response::plain(STATUS_OK, format!("Wrote {}.", file)),
        Err(e) => Response::plain(STATUS_NOT_FOUND, format!("Write Error: {}", e)),
    }
}

/// Creates a folder under the server root, succeeding if it already exists.
pub(crate) fn create_folder(params: &Params, root: &str) -> Response {
    let folder = escape_path(params.get("folder").map(String::as_str).unwrap_or(""));
    // Path::join would replace the root with an absolute folder; a leading
    // separator on the parameter still means "beneath the server root".
    let dest = Path::new(root).join(folder.trim_start_matches(MAIN_SEPARATOR));
    match fs::create_dir_all(&dest) {
        Ok(()) => Response::plain(STATUS_OK, format!("Created folder: {}", folder)),
        Err(e) => Response::plain(STATUS_NOT_FOUND, format!("Folder Error: {}", e)),
    }
}

/// Lists the immediate entries of a folder, filtered by the `search`
/// mini-language.
pub(crate) fn query_files(params: &Params, root: &str) -> Response {
    let folder = escape_path(params.get("folder").map(String::as_str).unwrap_or(""));
    let search = params.get("search").map(String::as_str).unwrap_or("");
    let folder = strip_trailing_separator(&folder);
    let dest = resolve_local_path(root, folder);
    match list_files(&dest, search) {
        Ok(names) => Response::plain(STATUS_OK, names.join("\n")),
        Err(e) => Response::plain(STATUS_NOT_FOUND, format!("Could not read files: {}", e)),
    }
}

fn list_files(dest: &str, search: &str) -> io::Result<Vec<String>> {
    let filter = build_filter(search).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut matched = Vec::new();
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let stats = fs::symlink_metadata(entry.path())?;
        let included = if stats.is_dir() {
            filter.matches_folder(&name)
        } else {
            filter.matches_file(&name)
        };
        if included {
            matched.push(name);
        }
    }
    Ok(matched)
}

lazy_static! {
    static ref EXTENSION_SEARCH: Regex =
        Regex::new(r"^\*\w+$").expect("Extension search regex is not correct");
    static ref PATTERN_SEARCH: Regex =
        Regex::new(r"^\*\w+\.\w+$").expect("Pattern search regex is not correct");
    static ref SUBSTRING_SEARCH: Regex =
        Regex::new(r"^@\w+$").expect("Substring search regex is not correct");
}

enum SearchFilter {
    All,
    Pattern(Regex),
    Substring(String),
    Folders,
    Nothing,
}

/// Resolves the `search` parameter into one matcher. The precedence order
/// is fixed: all, comma list, star extension, star pattern, at substring.
fn build_filter(search: &str) -> Result<SearchFilter, fancy_regex::Error> {
    if search == "all" {
        Ok(SearchFilter::All)
    } else if search.contains(',') {
        let list = search.replace(',', "|");
        Regex::new(&format!(r"\.({})$", list)).map(SearchFilter::Pattern)
    } else if EXTENSION_SEARCH.is_match(search)? {
        Regex::new(&format!(r"\w+\.{}$", &search[1..])).map(SearchFilter::Pattern)
    } else if PATTERN_SEARCH.is_match(search)? {
        Regex::new(&format!("{}$", &search[1..])).map(SearchFilter::Pattern)
    } else if SUBSTRING_SEARCH.is_match(search)? {
        Ok(SearchFilter::Substring(search[1..].to_string()))
    } else if search == "folders" {
        Ok(SearchFilter::Folders)
    } else {
        Ok(SearchFilter::Nothing)
    }
}

impl SearchFilter {
    fn matches_file(&self, name: &str) -> bool {
        match self {
            SearchFilter::All => true,
            SearchFilter::Pattern(pattern) => pattern.is_match(name).unwrap_or(false),
            SearchFilter::Substring(needle) => name.contains(needle.as_str()),
            SearchFilter::Folders | SearchFilter::Nothing => false,
        }
    }

    fn matches_folder(&self, name: &str) -> bool {
        // The dot check also drops the . and .. pseudo-entries some
        // platforms report in listings.
        matches!(self, SearchFilter::Folders) && !name.contains('.')
    }
}
