use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::net::{TcpListener, TcpStream};

use fancy_regex::Regex;
use lazy_static::lazy_static;
use log::{error, info, warn};

use crate::args::ServerArgs;
use crate::config::{load_config, Config, ConfigValue};
use crate::generate_headers::write_response;
use crate::handlers::{create_folder, query_files, read_file, write_file};
use crate::http_parser::{content_length, message_header, request_line, Header, Method};
use crate::http_struct::{Response, STATUS_UNAUTHORIZED};
use crate::mime_type_map::{fallback_mime_table, load_mime_table, MimeTable};
use crate::path_operations::escape_path;
use crate::query_params::parse_query;

pub(crate) const DEFAULT_DOCUMENT: &'static str = "Home.html";
pub(crate) const DEFAULT_PORT: i64 = 8080;

lazy_static! {
    static ref FILE_PATTERN: Regex =
        Regex::new(r"\w+\.\w+$").expect("File pattern regex is not correct");
}

/// The server owns the listening socket and the two tables loaded at
/// startup; handlers only ever borrow them.
pub(crate) struct Server {
    listener: TcpListener,
    root: String,
    mime: MimeTable,
    config: Config,
}

impl Server {
    /// Loads the MIME table and config, then binds the listener. Table
    /// load failures are logged and the server starts anyway; only a bind
    /// failure (or a missing root directory) is returned to the caller.
    pub(crate) fn init(args: &ServerArgs) -> io::Result<Server> {
        let root = fs::canonicalize(&args.root)?.to_string_lossy().into_owned();
        let mime = match load_mime_table(root.as_ref(), &args.mime) {
            Ok(table) => table,
            Err(e) => {
                error!("Error: {}", e);
                fallback_mime_table()
            }
        };
        let config = load_config(root.as_ref(), &args.config);
        let port = match config.get("port").and_then(ConfigValue::as_int) {
            Some(port) => port,
            None => {
                warn!("No port set, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };
        let listener = TcpListener::bind(format!("{}:{}", args.host, port))?;
        info!("Server started on {}:{}", args.host, port);
        Ok(Server {
            listener,
            root,
            mime,
            config,
        })
    }

    /// Invokes `on_ready` once the socket is accepting connections, then
    /// serves requests forever on the calling thread.
    pub(crate) fn run<F: FnOnce(&Config)>(&self, on_ready: F) {
        on_ready(&self.config);
        for stream in self.listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    if let Err(e) = self.handle_connection(&mut stream) {
                        error!("Connection error: {}", e);
                    }
                }
                Err(e) => error!("Error accepting connection: {}", e),
            }
        }
    }

    fn handle_connection(&self, stream: &mut TcpStream) -> io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut first_line = String::new();
        if reader.read_line(&mut first_line)? == 0 {
            // Client connected and went away without sending anything.
            return Ok(());
        }
        let line = match request_line(first_line.trim_end().as_bytes()) {
            Ok((_, Some(line))) => line,
            _ => {
                warn!("Malformed request line: {:?}", first_line.trim_end());
                return Ok(());
            }
        };
        info!("Request: {} {}", line.method, line.uri);
        let headers = read_headers(&mut reader)?;
        let response = match line.method {
            Method::Get => self.handle_get(&line.uri),
            Method::Post => {
                let body = read_body(&mut reader, content_length(&headers))?;
                self.handle_post(&line.uri, &body)
            }
            Method::Custom(name) => {
                warn!("Unsupported method: {}", name);
                return Ok(());
            }
        };
        write_response(stream, &response)
    }

    pub(crate) fn handle_get(&self, url: &str) -> Response {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let file = escape_path(path.strip_prefix('/').unwrap_or(path));
        let params = parse_query(query);
        if FILE_PATTERN.is_match(&file).unwrap_or(false) {
            read_file(&file, &self.mime, &self.root)
        } else if file == "create-folder" {
            create_folder(&params, &self.root)
        } else if file == "query-files" {
            query_files(&params, &self.root)
        } else {
            read_file(DEFAULT_DOCUMENT, &self.mime, &self.root)
        }
    }

    pub(crate) fn handle_post(&self, url: &str, body: &str) -> Response {
        let params = parse_query(body);
        let path = url.split_once('?').map(|(path, _)| path).unwrap_or(url);
        let file = escape_path(path.strip_prefix('/').unwrap_or(path));
        if FILE_PATTERN.is_match(&file).unwrap_or(false) {
            write_file(&file, &params, &self.mime, &self.root)
        } else {
            Response::plain(
                STATUS_UNAUTHORIZED,
                "You cannot write to a non file type.".to_string(),
            )
        }
    }
}

fn read_headers<R: BufRead>(reader: &mut R) -> io::Result<Vec<Header>> {
    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if trimmed.is_empty() {
            break;
        }
        if let Ok((_, header)) = message_header(trimmed.as_bytes()) {
            headers.push(header);
        }
    }
    Ok(headers)
}

/// Buffers the whole request body before the caller dispatches it. With a
/// Content-Length the read is exact; without one it runs to end of stream.
fn read_body<R: BufRead>(reader: &mut R, length: Option<usize>) -> io::Result<String> {
    let mut raw = Vec::new();
    match length {
        Some(length) => {
            raw.resize(length, 0);
            reader.read_exact(&mut raw)?;
        }
        None => {
            reader.read_to_end(&mut raw)?;
        }
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
