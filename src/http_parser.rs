use std::{fmt, str};

use nom::bytes::complete::take_while as take_while_complete;
use nom::bytes::streaming::{tag, take_while};
use nom::character::streaming::one_of;
use nom::character::{is_alphanumeric, is_space};
use nom::sequence::tuple;
use nom::IResult;

// Primitives

fn is_token_char(i: u8) -> bool {
    is_alphanumeric(i) || b"!#$%&'*+-.^_`|~=".contains(&i)
}

pub(crate) fn token(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_token_char)(i)
}

fn space(i: &[u8]) -> IResult<&[u8], char> {
    nom::character::streaming::char(' ')(i)
}

fn is_vchar(i: u8) -> bool {
    i > 32 && i < 126
}

fn vchar_i(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_vchar)(i)
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Method {
    Get,
    Post,
    Custom(String),
}

impl Method {
    pub fn new(s: &[u8]) -> Method {
        if compare_no_case(s, b"GET") {
            Method::Get
        } else if compare_no_case(s, b"POST") {
            Method::Post
        } else {
            Method::Custom(String::from_utf8_lossy(s).to_string())
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Custom(s) => write!(f, "{}", s),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Version {
    V10,
    V11,
}

pub fn compare_no_case(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).all(|(a, b)| match (*a, *b) {
        (0..=64, 0..=64) | (91..=96, 91..=96) | (123..=255, 123..=255) => a == b,
        (65..=90, 65..=90) | (97..=122, 97..=122) | (65..=90, 97..=122) | (97..=122, 65..=90) => {
            *a | 0b00_10_00_00 == *b | 0b00_10_00_00
        }
        _ => false,
    })
}

#[derive(PartialEq, Eq, Debug)]
pub struct RawRequestLine<'a> {
    pub method: &'a [u8],
    pub uri: &'a [u8],
    pub version: Version,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct RequestLine {
    pub method: Method,
    pub uri: String,
    pub version: Version,
}

impl RequestLine {
    pub fn from_raw_request(r: RawRequestLine) -> Option<RequestLine> {
        if let Ok(uri) = str::from_utf8(r.uri) {
            Some(RequestLine {
                method: Method::new(r.method),
                uri: String::from(uri),
                version: r.version,
            })
        } else {
            None
        }
    }
}

fn http_version(i: &[u8]) -> IResult<&[u8], Version> {
    let (i, _) = tag("HTTP/1.")(i)?;
    let (i, minor) = one_of("01")(i)?;
    Ok((i, if minor == '0' { Version::V10 } else { Version::V11 }))
}

/// Parse the first request line into a RequestLine.
pub fn request_line(i: &[u8]) -> IResult<&[u8], Option<RequestLine>> {
    let (i, method) = token(i)?;
    let (i, _) = space(i)?;
    let (i, uri) = vchar_i(i)?;
    let (i, _) = space(i)?;
    let (i, version) = http_version(i)?;

    let raw_request_line = RawRequestLine { method, uri, version };

    Ok((i, RequestLine::from_raw_request(raw_request_line)))
}

#[derive(PartialEq, Eq, Debug)]
pub(crate) struct Header {
    pub(crate) name: Vec<u8>,
    pub(crate) value: Vec<u8>,
}

fn is_header_value_char(i: u8) -> bool {
    i == 9 || (i >= 32 && i <= 126) || i >= 160
}

/// Parse one header line (without the trailing CRLF) into a Header.
pub(crate) fn message_header(i: &[u8]) -> IResult<&[u8], Header> {
    let (i, (name, _, _, value)) = tuple((
        token,
        tag(":"),
        take_while_complete(is_space),
        take_while_complete(is_header_value_char),
    ))(i)?;

    Ok((
        i,
        Header {
            name: name.to_owned(),
            value: value.to_owned(),
        },
    ))
}

pub(crate) fn content_length(headers: &[Header]) -> Option<usize> {
    headers
        .iter()
        .find(|header| compare_no_case(&header.name, b"Content-Length"))
        .and_then(|header| str::from_utf8(&header.value).ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_request_line_should_parse_get() {
        let line = "GET /notes/Home.html?x=1 HTTP/1.1";
        let (_, option) = request_line(line.as_bytes()).unwrap();
        let parsed = option.unwrap();
        assert_eq!(parsed.method, Method::Get);
        assert_eq!(parsed.uri, "/notes/Home.html?x=1");
        assert_eq!(parsed.version, Version::V11);
    }

    #[test]
    fn when_request_line_should_parse_post() {
        let line = "POST /note.txt HTTP/1.0";
        let (_, option) = request_line(line.as_bytes()).unwrap();
        let parsed = option.unwrap();
        assert_eq!(parsed.method, Method::Post);
        assert_eq!(parsed.version, Version::V10);
    }

    #[test]
    fn when_request_line_unknown_method_should_be_custom() {
        let line = "DELETE /note.txt HTTP/1.1";
        let (_, option) = request_line(line.as_bytes()).unwrap();
        assert_eq!(option.unwrap().method, Method::Custom("DELETE".to_string()));
    }

    #[test]
    fn when_message_header_should_produce_header() {
        let header = "Content-Type: application/x-www-form-urlencoded";
        let (_, parsed) = message_header(header.as_bytes()).unwrap();
        assert_eq!(parsed.name, b"Content-Type".to_vec());
        assert_eq!(
            parsed.value,
            b"application/x-www-form-urlencoded".to_vec()
        );
    }

    #[test]
    fn when_content_length_should_extract_case_insensitive() {
        let headers = vec![
            Header {
                name: b"Host".to_vec(),
                value: b"localhost".to_vec(),
            },
            Header {
                name: b"content-length".to_vec(),
                value: b"42".to_vec(),
            },
        ];
        assert_eq!(content_length(&headers), Some(42));
    }

    #[test]
    fn when_content_length_missing_should_be_none() {
        let headers = vec![Header {
            name: b"Host".to_vec(),
            value: b"localhost".to_vec(),
        }];
        assert_eq!(content_length(&headers), None);
    }
}
