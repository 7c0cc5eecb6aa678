use super::converters::convert_with;
use super::kinds::ValueKind;
use super::registry::ConverterRegistry;
use super::RegistryError;
use crate::negotiate::{HttpError, ResponseHead, Value};

const DEFAULT_CHARSET: &str = "UTF-8";

/// Stock converters: JSON for structured objects, HTML and plain text pages
/// for error-like values.
pub fn register_defaults(registry: &mut ConverterRegistry) -> Result<(), RegistryError> {
    registry.register(
        ValueKind::OBJECT,
        [mime::APPLICATION_JSON.essence_str()],
        convert_with(object_to_json),
    )?;
    // Plain text first: on a tie the later media type wins, so HTML is
    // the default error page.
    registry.register(
        ValueKind::ERROR,
        [mime::TEXT_PLAIN.essence_str()],
        convert_with(error_to_text),
    )?;
    registry.register(
        ValueKind::ERROR,
        [mime::TEXT_HTML.essence_str()],
        convert_with(error_to_html),
    )?;
    Ok(())
}

fn object_to_json(value: Value, head: &mut ResponseHead) -> Value {
    let Value::Typed(typed) = value else {
        return value;
    };

    let data = match typed.downcast::<serde_json::Value>() {
        Ok(data) => data,
        Err(typed) => {
            return Value::Error(HttpError::internal(format!(
                "kind '{}' does not carry JSON data",
                typed.kind()
            )));
        }
    };

    match serde_json::to_string(&data) {
        Ok(body) => {
            head.content_type = Some(mime::APPLICATION_JSON.to_string());
            Value::Text(body)
        }
        Err(err) => Value::Error(HttpError::internal(err.to_string())),
    }
}

fn error_to_html(value: Value, head: &mut ResponseHead) -> Value {
    let Value::Error(err) = value else {
        return value;
    };

    let charset = head.charset.as_deref().unwrap_or(DEFAULT_CHARSET);
    head.content_type = Some(format!("{}; charset={}", mime::TEXT_HTML, charset));

    let code = err.status.as_u16();
    let reason = escape_html(err.reason());
    Value::Text(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Error {code}: {reason}</title>\n</head>\n\
         <body>\n<h1>Error {code}: {reason}</h1>\n<pre>{message}</pre>\n</body>\n</html>\n",
        message = escape_html(&err.message),
    ))
}

fn error_to_text(value: Value, _head: &mut ResponseHead) -> Value {
    match value {
        Value::Error(err) => Value::Text(err.to_string()),
        other => other,
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_defaults_registered() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(
            registry.candidate_media_types_for(ValueKind::OBJECT),
            vec!["application/json"]
        );
        assert_eq!(
            registry.candidate_media_types_for(ValueKind::ERROR),
            vec!["text/plain", "text/html"]
        );
    }

    #[test]
    fn test_object_to_json() {
        let mut head = ResponseHead::default();
        let output = object_to_json(Value::json(json!({"id": 7})), &mut head);

        match output {
            Value::Text(body) => assert_eq!(body, r#"{"id":7}"#),
            other => panic!("unexpected output: {other:?}"),
        }
        assert_eq!(head.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_object_to_json_wrong_payload() {
        let mut head = ResponseHead::default();
        let output = object_to_json(Value::typed(ValueKind::OBJECT, 5u8), &mut head);
        assert!(matches!(output, Value::Error(err) if err.status == StatusCode::INTERNAL_SERVER_ERROR));
        assert!(head.content_type.is_none());
    }

    #[test]
    fn test_error_to_html_escapes() {
        let mut head = ResponseHead::with_charset("UTF-8");
        let output = error_to_html(
            Value::Error(HttpError::not_found("<script>")),
            &mut head,
        );

        let Value::Text(body) = output else {
            panic!("expected text");
        };
        assert!(body.contains("<title>Error 404: Not Found</title>"));
        assert!(body.contains("&lt;script&gt;"));
        assert_eq!(
            head.content_type.as_deref(),
            Some("text/html; charset=UTF-8")
        );
    }

    #[test]
    fn test_error_to_text() {
        let output = error_to_text(
            Value::Error(HttpError::internal("boom")),
            &mut ResponseHead::default(),
        );
        assert!(matches!(output, Value::Text(ref body) if body == "500 Internal Server Error: boom"));
    }
}
