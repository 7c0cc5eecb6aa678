use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT;
use axum::http::request::Parts;

use crate::negotiate::RequestInfo;

/// Multiple `Accept` headers are joined into one list.
impl<S> FromRequestParts<S> for RequestInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let values: Vec<&str> = parts
            .headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();

        let mut request = RequestInfo::new(parts.method.clone(), parts.uri.path());
        if !values.is_empty() {
            request.accept = Some(values.join(", "));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};

    #[tokio::test]
    async fn test_extract_joins_accept_headers() {
        let (mut parts, _) = Request::builder()
            .method(Method::HEAD)
            .uri("/articles/1?x=1")
            .header(ACCEPT, "text/html")
            .header(ACCEPT, "application/json;q=0.5")
            .body(())
            .unwrap()
            .into_parts();

        let request = RequestInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(request.method, Method::HEAD);
        assert_eq!(request.path, "/articles/1");
        assert_eq!(
            request.accept.as_deref(),
            Some("text/html, application/json;q=0.5")
        );
    }

    #[tokio::test]
    async fn test_extract_without_accept() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let request = RequestInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(request.accept.is_none());
    }
}
