use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};

/// The parts of the inbound request negotiation looks at.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    /// Raw `Accept` header, `None` when the client sent none.
    pub accept: Option<String>,
}

impl RequestInfo {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            accept: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// Mutable response state shared by the engine and converters.
///
/// Converters may set `content_type` to steer the next text negotiation
/// pass; the dispatcher writes the final status, content type and
/// `Content-Length`.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    pub status: Option<StatusCode>,
    pub content_type: Option<String>,
    /// Charset advertised for character text.
    pub charset: Option<String>,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn with_charset(charset: impl Into<String>) -> Self {
        Self {
            charset: Some(charset.into()),
            ..Self::default()
        }
    }

    pub fn status_or_ok(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn set_content_length(&mut self, len: usize) {
        self.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    pub fn clear_content_length(&mut self) {
        self.headers.remove(header::CONTENT_LENGTH);
    }

    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}
