use crate::mime_type_map::TEXT_PLAIN;

pub(crate) const STATUS_OK: &'static str = "HTTP/1.1 200 OK";
pub(crate) const STATUS_UNAUTHORIZED: &'static str = "HTTP/1.1 401 Unauthorized";
pub(crate) const STATUS_NOT_FOUND: &'static str = "HTTP/1.1 404 Not Found";

#[derive(Debug, PartialEq)]
pub(crate) enum Body {
    Text(String),
    Binary(Vec<u8>),
}

impl Body {
    pub(crate) fn len(&self) -> usize {
        match self {
            Body::Text(text) => text.len(),
            Body::Binary(bytes) => bytes.len(),
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct Response {
    pub(crate) status: &'static str,
    pub(crate) content_type: String,
    pub(crate) body: Body,
}

impl Response {
    pub(crate) fn text(status: &'static str, content_type: &str, body: String) -> Response {
        Response {
            status,
            content_type: content_type.to_string(),
            body: Body::Text(body),
        }
    }

    pub(crate) fn binary(content_type: &str, bytes: Vec<u8>) -> Response {
        Response {
            status: STATUS_OK,
            content_type: content_type.to_string(),
            body: Body::Binary(bytes),
        }
    }

    /// Plain-text response, used by every handler error path.
    pub(crate) fn plain(status: &'static str, message: String) -> Response {
        Response::text(status, TEXT_PLAIN, message)
    }
}
