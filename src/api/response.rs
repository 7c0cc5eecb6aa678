use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::negotiate::{NegotiatedOutcome, Passthrough, Payload, ResponseHead};

/// Turn a negotiated outcome and its response head into an HTTP response.
pub fn into_response(head: ResponseHead, outcome: NegotiatedOutcome) -> Response {
    let body = match outcome {
        NegotiatedOutcome::NoContent => Body::empty(),
        NegotiatedOutcome::Representation(representation) => body_of(representation.payload),
        NegotiatedOutcome::NotAcceptable { body, .. } => match body {
            Some(representation) => body_of(representation.payload),
            None => Body::empty(),
        },
        NegotiatedOutcome::Passthrough(Passthrough::Error(err)) => {
            return (err.status, err.message).into_response();
        }
        NegotiatedOutcome::Passthrough(Passthrough::Response(passthrough)) => {
            let mut response = Response::new(Body::from(passthrough.body));
            *response.status_mut() = passthrough.status;
            *response.headers_mut() = passthrough.headers;
            return response;
        }
    };

    let status = head.status_or_ok();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = head.headers;

    if let Some(content_type) = head.content_type {
        match HeaderValue::from_str(&content_type) {
            Ok(value) => {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            Err(err) => {
                tracing::warn!(%content_type, error = %err, "Dropping invalid content type");
            }
        }
    }

    if status == StatusCode::NO_CONTENT {
        response.headers_mut().remove(axum::http::header::CONTENT_LENGTH);
    }

    response
}

fn body_of(payload: Payload) -> Body {
    match payload {
        Payload::Full(bytes) => Body::from(bytes),
        Payload::Stream(stream) => Body::from_stream(stream),
    }
}
