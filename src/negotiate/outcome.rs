use std::fmt;

use bytes::Bytes;

use super::value::{ByteStream, HttpError, HttpResponse};
use crate::mediatype::parse_media_type;

pub enum Payload {
    Full(Bytes),
    Stream(ByteStream),
}

impl Payload {
    /// Length when known up front.
    pub fn len(&self) -> Option<usize> {
        match self {
            Payload::Full(bytes) => Some(bytes.len()),
            Payload::Stream(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Full(bytes) => Some(bytes),
            Payload::Stream(_) => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Full(bytes) => f.debug_tuple("Full").field(bytes).finish(),
            Payload::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// The body the engine settled on.
#[derive(Debug)]
pub struct Representation {
    pub content_type: Option<String>,
    pub charset: Option<String>,
    pub payload: Payload,
}

impl Representation {
    pub fn new(content_type: Option<String>, payload: Payload) -> Self {
        let charset = content_type.as_deref().and_then(charset_of);
        Self {
            content_type,
            charset,
            payload,
        }
    }
}

/// Values the engine hands back to the framework untouched.
#[derive(Debug)]
pub enum Passthrough {
    Error(HttpError),
    Response(HttpResponse),
}

/// Terminal result of one dispatch.
#[derive(Debug)]
pub enum NegotiatedOutcome {
    NoContent,
    Representation(Representation),
    NotAcceptable {
        request_path: String,
        body: Option<Representation>,
    },
    Passthrough(Passthrough),
}

impl NegotiatedOutcome {
    /// Wrap whatever the rejection rendered into into a `NotAcceptable`.
    pub(crate) fn into_not_acceptable(self, request_path: String) -> Self {
        match self {
            NegotiatedOutcome::Representation(body) => NegotiatedOutcome::NotAcceptable {
                request_path,
                body: Some(body),
            },
            NegotiatedOutcome::NotAcceptable { .. } => self,
            NegotiatedOutcome::NoContent | NegotiatedOutcome::Passthrough(_) => {
                NegotiatedOutcome::NotAcceptable {
                    request_path,
                    body: None,
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NegotiatedOutcome::NoContent => "no_content",
            NegotiatedOutcome::Representation(_) => "representation",
            NegotiatedOutcome::NotAcceptable { .. } => "not_acceptable",
            NegotiatedOutcome::Passthrough(_) => "passthrough",
        }
    }
}

/// `charset` parameter of a content type, if any, spelled as in the header.
pub fn charset_of(content_type: &str) -> Option<String> {
    let parsed = parse_media_type(content_type).ok()?;
    parsed.param("charset").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_of() {
        assert_eq!(
            charset_of("text/plain; charset=UTF-8").as_deref(),
            Some("UTF-8")
        );
        assert_eq!(charset_of("text/html"), None);
        assert_eq!(charset_of("not a type"), None);
    }

    #[test]
    fn test_charset_of_keeps_header_spelling() {
        assert_eq!(
            charset_of("text/html; Charset=\"UTF-8\"").as_deref(),
            Some("UTF-8")
        );
        assert_eq!(
            charset_of("text/plain;charset=iso-8859-1").as_deref(),
            Some("iso-8859-1")
        );

        let representation = Representation::new(
            Some("text/plain; charset=UTF-8".to_string()),
            Payload::Full(Bytes::new()),
        );
        assert_eq!(representation.charset.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_wrap_not_acceptable() {
        let body = Representation::new(
            Some("text/html; charset=UTF-8".to_string()),
            Payload::Full(Bytes::from_static(b"<p>nope</p>")),
        );
        assert_eq!(body.charset.as_deref(), Some("UTF-8"));

        match NegotiatedOutcome::Representation(body).into_not_acceptable("/x".to_string()) {
            NegotiatedOutcome::NotAcceptable { request_path, body } => {
                assert_eq!(request_path, "/x");
                assert_eq!(body.unwrap().payload.len(), Some(11));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let wrapped = NegotiatedOutcome::NoContent.into_not_acceptable("/y".to_string());
        assert!(matches!(
            wrapped,
            NegotiatedOutcome::NotAcceptable { body: None, .. }
        ));
    }
}
