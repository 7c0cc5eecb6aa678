//! Content negotiation engine
//!
//! Takes the value a handler produced and, using the request's `Accept`
//! header and the [`ConverterRegistry`](crate::registry::ConverterRegistry),
//! settles on exactly one [`NegotiatedOutcome`].
//!
//! ## Flow
//!
//! 1. The value is classified once (`Empty | ErrorLike | Stream | Text | Typed`)
//! 2. Typed values are converted by the most specific registered converter
//!    for the best media type; converter output is classified again
//! 3. Text is matched against `application/octet-stream`,
//!    `text/plain; charset=..` and any content type a converter set
//! 4. Nothing acceptable means `406`, whose error body is negotiated the
//!    same way as any other error
//!
//! ## Example
//!
//! ```rust
//! use mediacork::negotiate::{Dispatcher, NegotiatedOutcome, RequestInfo, Value};
//! use mediacork::registry::ConverterRegistry;
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new(ConverterRegistry::with_defaults());
//! let request = RequestInfo::get("/items/1").with_accept("application/json");
//! let mut head = dispatcher.response_head();
//!
//! let outcome = dispatcher.dispatch(&request, &mut head, Value::json(json!({"id": 1})))?;
//! assert!(matches!(outcome, NegotiatedOutcome::Representation(_)));
//! assert_eq!(head.content_type.as_deref(), Some("application/json"));
//! # Ok::<(), mediacork::negotiate::NegotiationError>(())
//! ```

mod context;
mod dispatcher;
mod outcome;
mod value;

pub use context::{RequestInfo, ResponseHead};
pub use dispatcher::Dispatcher;
pub use outcome::{NegotiatedOutcome, Passthrough, Payload, Representation, charset_of};
pub use value::{
    ByteStream, Classified, HttpError, HttpResponse, TextPayload, TypedValue, Value,
};

use thiserror::Error;

use crate::mediatype::MediaTypeError;
use crate::registry::ValueKind;

/// Failures that abort negotiation for one request.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    MalformedMediaType(#[from] MediaTypeError),

    #[error("converter chain revisited kind '{kind}' as '{media_type}'")]
    Cycle { kind: ValueKind, media_type: String },

    #[error("no converter for kind '{kind}' as '{media_type}'")]
    MissingConverter { kind: ValueKind, media_type: String },
}
