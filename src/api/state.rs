use std::sync::Arc;

use axum::response::Response;

use super::error::ApiError;
use super::response::into_response;
use crate::config::Config;
use crate::negotiate::{Dispatcher, RequestInfo, ResponseHead, Value};
use crate::observability::Metrics;
use crate::registry::ConverterRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, registry: ConverterRegistry) -> Self {
        let dispatcher = Dispatcher::from_config(registry, &config.negotiation);
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Negotiate a handler result into a response.
    pub fn negotiate(
        &self,
        request: &RequestInfo,
        value: impl Into<Value>,
    ) -> Result<Response, ApiError> {
        self.negotiate_with(request, self.dispatcher.response_head(), value)
    }

    /// Like [`negotiate`](Self::negotiate), starting from a head the handler
    /// has already filled in (status, content type, headers).
    pub fn negotiate_with(
        &self,
        request: &RequestInfo,
        mut head: ResponseHead,
        value: impl Into<Value>,
    ) -> Result<Response, ApiError> {
        match self.dispatcher.dispatch(request, &mut head, value.into()) {
            Ok(outcome) => {
                self.metrics.record(&outcome);
                Ok(into_response(head, outcome))
            }
            Err(err) => {
                self.metrics.failure();
                tracing::error!(path = %request.path, error = %err, "Negotiation failed");
                Err(err.into())
            }
        }
    }
}
