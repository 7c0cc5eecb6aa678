use std::any::Any;
use std::fmt;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::registry::ValueKind;

/// Lazily read response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// What a handler hands to the negotiation engine.
pub enum Value {
    Empty,
    /// Character text, encoded as UTF-8 on the wire.
    Text(String),
    /// Raw byte text.
    Bytes(Bytes),
    Stream(ByteStream),
    Typed(TypedValue),
    Error(HttpError),
    /// A response built by the surrounding framework, sent untouched.
    Response(HttpResponse),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn json(data: serde_json::Value) -> Self {
        Value::Typed(TypedValue::json(data))
    }

    pub fn typed<T: Any + Send>(kind: ValueKind, data: T) -> Self {
        Value::Typed(TypedValue::new(kind, data))
    }

    pub fn stream(stream: ByteStream) -> Self {
        Value::Stream(stream)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.is_empty(),
            Value::Bytes(bytes) => bytes.is_empty(),
            Value::Typed(typed) => typed.is_empty(),
            Value::Stream(_) | Value::Error(_) | Value::Response(_) => false,
        }
    }

    /// Tag the value once so the dispatcher never probes it again.
    pub fn classify(self) -> Classified {
        if self.is_empty() {
            return Classified::Empty;
        }

        match self {
            Value::Empty => Classified::Empty,
            Value::Error(err) => Classified::ErrorLike(err),
            Value::Response(response) => Classified::Response(response),
            Value::Stream(stream) => Classified::Stream(stream),
            Value::Text(text) => Classified::Text(TextPayload::Chars(text)),
            Value::Bytes(bytes) => Classified::Text(TextPayload::Bytes(bytes)),
            Value::Typed(typed) => Classified::Typed(typed),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("Empty"),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Value::Stream(_) => f.write_str("Stream(..)"),
            Value::Typed(typed) => f.debug_tuple("Typed").field(typed).finish(),
            Value::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Value::Response(response) => f.debug_tuple("Response").field(response).finish(),
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(bytes))
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Value::json(data)
    }
}

impl From<HttpError> for Value {
    fn from(err: HttpError) -> Self {
        Value::Error(err)
    }
}

impl From<HttpResponse> for Value {
    fn from(response: HttpResponse) -> Self {
        Value::Response(response)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Empty)
    }
}

/// Handler outcomes: failures enter the pipeline as error-like values.
impl<T: Into<Value>> From<Result<T, HttpError>> for Value {
    fn from(result: Result<T, HttpError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(err) => Value::Error(err),
        }
    }
}

/// Explicit classification computed at the start of every pass.
pub enum Classified {
    Empty,
    ErrorLike(HttpError),
    Response(HttpResponse),
    Stream(ByteStream),
    Text(TextPayload),
    Typed(TypedValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPayload {
    Chars(String),
    Bytes(Bytes),
}

impl TextPayload {
    pub fn is_chars(&self) -> bool {
        matches!(self, TextPayload::Chars(_))
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            TextPayload::Chars(text) => Bytes::from(text),
            TextPayload::Bytes(bytes) => bytes,
        }
    }
}

/// Application data tagged with the kind it was produced as.
pub struct TypedValue {
    kind: ValueKind,
    data: Box<dyn Any + Send>,
    empty: bool,
}

impl TypedValue {
    pub fn new<T: Any + Send>(kind: ValueKind, data: T) -> Self {
        Self {
            kind,
            data: Box::new(data),
            empty: false,
        }
    }

    /// Structured data; null, `""`, `[]` and `{}` count as empty.
    pub fn json(data: serde_json::Value) -> Self {
        let empty = match &data {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(fields) => fields.is_empty(),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
        };

        Self {
            kind: ValueKind::OBJECT,
            data: Box::new(data),
            empty,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Take the data out, or get the value back if `T` is the wrong type.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { kind, data, empty } = self;
        match data.downcast::<T>() {
            Ok(data) => Ok(*data),
            Err(data) => Err(Self { kind, data, empty }),
        }
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("kind", &self.kind)
            .field("empty", &self.empty)
            .finish_non_exhaustive()
    }
}

/// Error signal produced by a handler or by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_acceptable(request_path: &str) -> Self {
        Self::new(
            StatusCode::NOT_ACCEPTABLE,
            format!(
                "The requested URI '{}' exists, but not in a format preferred by the client.",
                request_path
            ),
        )
    }

    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Error")
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.reason(), self.message)
    }
}

/// Fully formed response (redirects and the like).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Redirect to `location`. Falls back to `303 See Other` for non-3xx codes.
    pub fn redirect(location: &str, status: StatusCode) -> Self {
        let status = if status.is_redirection() {
            status
        } else {
            StatusCode::SEE_OTHER
        };

        let mut response = Self::new(status);
        if let Ok(value) = HeaderValue::from_str(location) {
            response.headers.insert(header::LOCATION, value);
        }
        response
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}
