use std::io::{self, Write};

use chrono::Utc;

use crate::http_struct::Response;

const SERVER_NAME: &'static str = "FileServer/0.1";

pub(crate) fn generate_status_headers(
    status_line: &str,
    length: usize,
    mime_type: &str,
) -> (String, String, String) {
    let status_line = format!("{status_line}\r\n");
    let content_length = format!("Content-Length: {length}\r\n");
    let content_type = format!("Content-Type: {mime_type}\r\n");
    (status_line, content_length, content_type)
}

fn generate_common_headers() -> (String, String) {
    let server = format!("Server: {SERVER_NAME}\r\n");
    let date = format!("Date: {}\r\n", Utc::now().format("%a, %d %b %Y %H:%M:%S GMT"));
    (server, date)
}

pub(crate) fn write_response<W: Write>(stream: &mut W, response: &Response) -> io::Result<()> {
    let (status_line, content_length, content_type) =
        generate_status_headers(response.status, response.body.len(), &response.content_type);
    let (server, date) = generate_common_headers();
    let header = format!("{status_line}{content_length}{content_type}{server}{date}\r\n");
    stream.write_all(header.as_bytes())?;
    stream.write_all(response.body.as_bytes())?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_struct::{STATUS_NOT_FOUND, STATUS_OK};

    #[test]
    fn when_generate_status_headers_should_include_length_and_type() {
        let (status_line, content_length, content_type) =
            generate_status_headers(STATUS_OK, 12, "text/html");
        assert_eq!(status_line, "HTTP/1.1 200 OK\r\n");
        assert_eq!(content_length, "Content-Length: 12\r\n");
        assert_eq!(content_type, "Content-Type: text/html\r\n");
    }

    #[test]
    fn when_write_response_should_flush_header_and_body() {
        let response = Response::plain(STATUS_NOT_FOUND, "Read Error: gone".to_string());
        let mut sink: Vec<u8> = Vec::new();
        write_response(&mut sink, &response).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 16\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Server: "));
        assert!(text.contains("Date: "));
        assert!(text.ends_with("\r\n\r\nRead Error: gone"));
    }

    #[test]
    fn when_write_response_binary_should_append_raw_bytes() {
        let response = Response::binary("image/png", vec![0x89, 0x50, 0x4e, 0x47]);
        let mut sink: Vec<u8> = Vec::new();
        write_response(&mut sink, &response).unwrap();
        assert!(sink.ends_with(&[0x89, 0x50, 0x4e, 0x47]));
    }
}
