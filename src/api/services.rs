//! Demo routes, one per kind of handler result.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::stream;

use super::{
    error::ApiError,
    models::{Article, HealthResponse},
    state::AppState,
};
use crate::config::NegotiationConfig;
use crate::negotiate::{ByteStream, HttpError, HttpResponse, RequestInfo, ResponseHead, Value};
use crate::registry::{ConverterRegistry, RegistryError, ValueKind, convert_with, escape_html};

pub const ARTICLE: ValueKind = ValueKind::new("article");
/// Declared without any converters.
pub const OPAQUE: ValueKind = ValueKind::new("opaque");

const DOWNLOAD_SIZE: usize = 256 * 1024;

/// Registry used by the demo server.
pub fn demo_registry(config: &NegotiationConfig) -> Result<ConverterRegistry, RegistryError> {
    let mut registry = ConverterRegistry::with_defaults();
    *registry.formats_mut() = config.format_aliases();

    registry.declare_kind(ARTICLE, &[ValueKind::OBJECT])?;
    registry.declare_kind(OPAQUE, &[])?;

    registry.register_formats(ARTICLE, &["json"], convert_with(article_to_json))?;
    registry.register_formats(ARTICLE, &["text"], convert_with(article_to_text))?;
    registry.register_formats(ARTICLE, &["html"], convert_with(article_to_html))?;

    Ok(registry)
}

fn article_to_json(value: Value, head: &mut ResponseHead) -> Value {
    with_article(value, |article| match serde_json::to_string(article) {
        Ok(body) => {
            head.content_type = Some(mime::APPLICATION_JSON.to_string());
            Value::Text(body)
        }
        Err(err) => Value::Error(HttpError::internal(err.to_string())),
    })
}

fn article_to_text(value: Value, _head: &mut ResponseHead) -> Value {
    with_article(value, |article| {
        Value::Text(format!("{}\n\n{}\n", article.title, article.body))
    })
}

fn article_to_html(value: Value, head: &mut ResponseHead) -> Value {
    with_article(value, |article| {
        let charset = head.charset.clone().unwrap_or_else(|| "UTF-8".to_string());
        head.content_type = Some(format!("{}; charset={}", mime::TEXT_HTML, charset));
        Value::Text(format!(
            "<article id=\"{}\"><h1>{}</h1><p>{}</p></article>",
            article.id,
            escape_html(&article.title),
            escape_html(&article.body)
        ))
    })
}

fn with_article(value: Value, render: impl FnOnce(&Article) -> Value) -> Value {
    match value {
        Value::Typed(typed) => match typed.downcast_ref::<Article>() {
            Some(article) => render(article),
            None => Value::Error(HttpError::internal(format!(
                "kind '{}' does not carry an article",
                typed.kind()
            ))),
        },
        other => other,
    }
}

fn find_article(id: u32) -> Result<Value, HttpError> {
    match id {
        1 => Ok(Value::typed(
            ARTICLE,
            Article::new(1, "Negotiation", "One handler, many representations."),
        )),
        2 => Ok(Value::typed(
            ARTICLE,
            Article::new(2, "Fallbacks", "Unmatched Accept headers end in 406."),
        )),
        3 => Ok(Value::typed(
            ARTICLE,
            Article::new(3, "Tags & <markup>", "Rendered as <em>text</em>, not markup."),
        )),
        _ => Err(HttpError::not_found(format!("no article with id {id}"))),
    }
}

/// Health check, not negotiated
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok",
        converters: state.dispatcher.registry().len(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(body))
}

pub async fn greeting(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    state.negotiate(&request, "Hello from mediacork")
}

pub async fn raw_bytes(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    state.negotiate(&request, Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
}

pub async fn empty(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    state.negotiate(&request, Value::Empty)
}

pub async fn stats(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    let value = serde_json::to_value(state.metrics.snapshot())
        .map(Value::json)
        .map_err(|err| HttpError::internal(err.to_string()));
    state.negotiate(&request, value)
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    state.negotiate(&request, find_article(id))
}

pub async fn download(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    let chunk_size = state.config.negotiation.stream_chunk_size.max(1);
    let data = Bytes::from(vec![b'x'; DOWNLOAD_SIZE]);

    let chunks: Vec<Result<Bytes, std::io::Error>> = (0..data.len())
        .step_by(chunk_size)
        .map(|start| Ok(data.slice(start..(start + chunk_size).min(data.len()))))
        .collect();
    let body: ByteStream = Box::pin(stream::iter(chunks));

    state.negotiate(&request, Value::stream(body))
}

pub async fn moved(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    let redirect = HttpResponse::redirect("/articles/1", StatusCode::MOVED_PERMANENTLY);
    state.negotiate(&request, redirect)
}

pub async fn opaque(
    State(state): State<AppState>,
    request: RequestInfo,
) -> Result<Response, ApiError> {
    state.negotiate(&request, Value::typed(OPAQUE, ()))
}
