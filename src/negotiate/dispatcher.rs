use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::{Arc, RwLock};

use axum::http::{Method, StatusCode};
use tracing::{debug, warn};

use super::NegotiationError;
use super::context::{RequestInfo, ResponseHead};
use super::outcome::{NegotiatedOutcome, Passthrough, Payload, Representation};
use super::value::{ByteStream, Classified, HttpError, TextPayload, TypedValue, Value};
use crate::config::NegotiationConfig;
use crate::mediatype::{AcceptHeader, all_best_matches, best_match, parse_accept_header};
use crate::registry::{ConverterRegistry, ValueKind};

const ANY_MEDIA_TYPE: &str = "*/*";

/// Resolves handler results into negotiated representations.
///
/// Owns the converter registry as an immutable snapshot; a replacement
/// registry is swapped in whole so running negotiations keep the snapshot
/// they started with.
#[derive(Debug)]
pub struct Dispatcher {
    registry: RwLock<Arc<ConverterRegistry>>,
    default_accept: String,
    charset: String,
}

impl Dispatcher {
    pub fn new(registry: ConverterRegistry) -> Self {
        Self::from_config(registry, &NegotiationConfig::default())
    }

    pub fn from_config(registry: ConverterRegistry, config: &NegotiationConfig) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            default_accept: config.default_accept.clone(),
            charset: config.charset.clone(),
        }
    }

    pub fn registry(&self) -> Arc<ConverterRegistry> {
        match self.registry.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace_registry(&self, registry: ConverterRegistry) {
        let registry = Arc::new(registry);
        match self.registry.write() {
            Ok(mut guard) => *guard = registry,
            Err(poisoned) => *poisoned.into_inner() = registry,
        }
    }

    /// Fresh response head carrying the configured charset.
    pub fn response_head(&self) -> ResponseHead {
        ResponseHead::with_charset(self.charset.clone())
    }

    /// Negotiate `value` for `request`, updating `head` along the way.
    ///
    /// Fails only on a malformed `Accept` header or a converter cycle.
    pub fn dispatch(
        &self,
        request: &RequestInfo,
        head: &mut ResponseHead,
        value: Value,
    ) -> Result<NegotiatedOutcome, NegotiationError> {
        let registry = self.registry();
        let accept = self.parse_accept(request)?;

        let mut negotiation = Negotiation {
            registry: &registry,
            accept: &accept,
            request,
            head,
            charset: &self.charset,
            visited: HashSet::new(),
            rejected: None,
            rendering_error: false,
        };

        negotiation.run(value)
    }

    fn parse_accept(&self, request: &RequestInfo) -> Result<AcceptHeader, NegotiationError> {
        let header = request
            .accept
            .as_deref()
            .map(str::trim)
            .filter(|header| !header.is_empty())
            .unwrap_or(&self.default_accept);

        let accept = parse_accept_header(header)?;
        if accept.is_empty() {
            return Ok(AcceptHeader::any());
        }
        Ok(accept)
    }
}

enum State {
    Classify(Value),
    TypedMatch {
        kind: ValueKind,
        value: Value,
        lenient: bool,
    },
    TextMatch(TextPayload),
    Reject,
}

type Step = ControlFlow<NegotiatedOutcome, State>;

/// State of one dispatch call.
struct Negotiation<'a> {
    registry: &'a ConverterRegistry,
    accept: &'a AcceptHeader,
    request: &'a RequestInfo,
    head: &'a mut ResponseHead,
    charset: &'a str,
    /// `(kind, media type)` pairs already converted in this call.
    visited: HashSet<(ValueKind, String)>,
    /// Request path once the engine has rejected the request.
    rejected: Option<String>,
    rendering_error: bool,
}

impl Negotiation<'_> {
    fn run(&mut self, value: Value) -> Result<NegotiatedOutcome, NegotiationError> {
        let mut state = State::Classify(value);

        loop {
            let step = match state {
                State::Classify(value) => self.classify(value),
                State::TypedMatch {
                    kind,
                    value,
                    lenient,
                } => self.typed_match(kind, value, lenient)?,
                State::TextMatch(payload) => self.text_match(payload),
                State::Reject => self.reject(),
            };

            match step {
                ControlFlow::Continue(next) => state = next,
                ControlFlow::Break(outcome) => return Ok(self.finish(outcome)),
            }
        }
    }

    fn finish(&mut self, outcome: NegotiatedOutcome) -> NegotiatedOutcome {
        match self.rejected.take() {
            Some(request_path) => outcome.into_not_acceptable(request_path),
            None => outcome,
        }
    }

    fn classify(&mut self, value: Value) -> Step {
        match value.classify() {
            Classified::Empty => ControlFlow::Break(self.no_content()),
            Classified::Response(response) => {
                debug!(status = %response.status, "Passing framework response through");
                ControlFlow::Break(NegotiatedOutcome::Passthrough(Passthrough::Response(
                    response,
                )))
            }
            Classified::ErrorLike(err) => self.error_like(err),
            Classified::Stream(stream) => ControlFlow::Break(self.stream(stream)),
            Classified::Typed(typed) => self.typed(typed),
            Classified::Text(payload) => ControlFlow::Continue(State::TextMatch(payload)),
        }
    }

    fn no_content(&mut self) -> NegotiatedOutcome {
        self.head.content_type = None;
        self.head.set_content_length(0);
        if self.head.status.is_none() && self.request.method != Method::HEAD {
            self.head.status = Some(StatusCode::NO_CONTENT);
        }
        NegotiatedOutcome::NoContent
    }

    fn error_like(&mut self, err: HttpError) -> Step {
        self.head.status = Some(err.status);
        self.head.content_type = None;
        self.rendering_error = true;

        if self.registry.has_candidates(ValueKind::ERROR) {
            return ControlFlow::Continue(State::TypedMatch {
                kind: ValueKind::ERROR,
                value: Value::Error(err),
                lenient: true,
            });
        }

        debug!(status = %err.status, "No error converters, passing error through");
        ControlFlow::Break(NegotiatedOutcome::Passthrough(Passthrough::Error(err)))
    }

    fn stream(&mut self, stream: ByteStream) -> NegotiatedOutcome {
        if self.head.content_type.is_none() {
            let candidates = [mime::APPLICATION_OCTET_STREAM.essence_str()];
            if let Some(content_type) = best_match(&candidates, self.accept)
                .filter(|content_type| *content_type != ANY_MEDIA_TYPE)
            {
                self.head.content_type = Some(content_type.to_string());
            }
        }

        self.head.clear_content_length();
        NegotiatedOutcome::Representation(Representation::new(
            self.head.content_type.clone(),
            Payload::Stream(stream),
        ))
    }

    fn typed(&mut self, typed: TypedValue) -> Step {
        let kind = typed.kind();
        if self.registry.has_candidates(kind) {
            ControlFlow::Continue(State::TypedMatch {
                kind,
                value: Value::Typed(typed),
                lenient: false,
            })
        } else {
            debug!(value_kind = %kind, "No converters registered for kind");
            ControlFlow::Continue(State::Reject)
        }
    }

    /// Pick a media type among the registered converters and run the most
    /// specific one. `lenient` renders the last candidate media type when
    /// nothing is acceptable instead of rejecting.
    fn typed_match(
        &mut self,
        kind: ValueKind,
        value: Value,
        lenient: bool,
    ) -> Result<Step, NegotiationError> {
        let candidates = self.registry.candidate_media_types_for(kind);
        let matches = all_best_matches(&candidates, self.accept);

        if matches.len() > 1 {
            debug!(value_kind = %kind, tied = ?matches, "Several media types tie, using the last listed");
        }

        let media_type = match matches.last() {
            Some(media_type) => media_type.to_string(),
            None if lenient => match candidates.last() {
                Some(fallback) => fallback.clone(),
                None => return Ok(ControlFlow::Continue(State::Reject)),
            },
            None => return Ok(ControlFlow::Continue(State::Reject)),
        };

        let resolved = self
            .registry
            .resolve_specificity(kind, &media_type)
            .ok_or_else(|| NegotiationError::MissingConverter {
                kind,
                media_type: media_type.clone(),
            })?;

        if !self.visited.insert((resolved, media_type.clone())) {
            return Err(NegotiationError::Cycle {
                kind: resolved,
                media_type,
            });
        }

        let converter = self
            .registry
            .converter(resolved, &media_type)
            .ok_or_else(|| NegotiationError::MissingConverter {
                kind: resolved,
                media_type: media_type.clone(),
            })?;

        debug!(value_kind = %kind, converter_kind = %resolved, %media_type, "Converting value");
        let output = converter.convert(value, self.head);
        Ok(ControlFlow::Continue(State::Classify(output)))
    }

    fn text_match(&mut self, payload: TextPayload) -> Step {
        let charset = self
            .head
            .charset
            .clone()
            .unwrap_or_else(|| self.charset.to_string());
        let plain = format!("{}; charset={}", mime::TEXT_PLAIN, charset);

        let mut candidates = vec![mime::APPLICATION_OCTET_STREAM.essence_str().to_string()];
        if payload.is_chars() {
            candidates.push(plain.clone());
        }
        if let Some(content_type) = &self.head.content_type {
            candidates.push(content_type.clone());
        }

        let content_type = best_match(&candidates, self.accept)
            .map(str::to_string)
            .or_else(|| self.head.content_type.clone())
            .unwrap_or(plain);

        let body = payload.into_bytes();
        self.head.content_type = Some(content_type.clone());
        self.head.set_content_length(body.len());

        ControlFlow::Break(NegotiatedOutcome::Representation(Representation::new(
            Some(content_type),
            Payload::Full(body),
        )))
    }

    fn reject(&mut self) -> Step {
        let request_path = self.request.path.clone();

        if self.rendering_error {
            warn!(path = %request_path, "Error value has no acceptable representation");
            self.head.status = Some(StatusCode::NOT_ACCEPTABLE);
            self.head.content_type = None;
            self.head.clear_content_length();
            return ControlFlow::Break(NegotiatedOutcome::NotAcceptable {
                request_path,
                body: None,
            });
        }

        debug!(path = %request_path, "No acceptable representation, rejecting");
        let err = HttpError::not_acceptable(&request_path);
        self.rejected = Some(request_path);
        ControlFlow::Continue(State::Classify(Value::Error(err)))
    }
}
