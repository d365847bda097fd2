//! Request-scoped context threaded through every pipeline stage

use axum::body::{to_bytes, Bytes};
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Everything a stage may inspect about the inbound request.
///
/// A `Context` is built once at the request boundary and then moved from
/// stage to stage. It is never shared between requests.
#[derive(Debug)]
pub struct Context {
    head: Parts,
    params: HashMap<String, String>,
    body: Bytes,
}

impl Context {
    /// Create a bare context for `method` and `uri` with no parameters or body.
    pub fn new(method: Method, uri: Uri) -> Self {
        let (mut head, ()) = axum::http::Request::new(()).into_parts();
        head.method = method;
        head.uri = uri;

        Self {
            head,
            params: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a context from a live request, buffering its body.
    ///
    /// Fails with a ready-made response when the body cannot be read.
    pub async fn from_request(request: Request) -> Result<Self, Response> {
        let (mut head, body) = request.into_parts();

        let params = match RawPathParams::from_request_parts(&mut head, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => HashMap::new(),
        };

        // Size limits are enforced by the router's body limit layer.
        let body = to_bytes(body, usize::MAX).await.map_err(|err| {
            tracing::debug!(error = %err, "failed to buffer request body");
            StatusCode::BAD_REQUEST.into_response()
        })?;

        Ok(Self { head, params, body })
    }

    /// Attach a path parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach a header. Invalid header names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            self.head.headers.insert(name, value);
        }
        self
    }

    /// Replace the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace the request body with the JSON encoding of `value`.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_body(body))
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Request extensions, as populated by upstream middleware.
    pub fn extensions(&self) -> &axum::http::Extensions {
        &self.head.extensions
    }

    /// A matched path parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A header value as UTF-8, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the buffered body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Body {
        text: String,
    }

    #[test]
    fn test_builder_accessors() {
        let ctx = Context::new(Method::POST, Uri::from_static("/notes/7"))
            .with_param("id", "7")
            .with_header("x-account-id", "3")
            .with_body(r#"{"text":"hello"}"#);

        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.uri().path(), "/notes/7");
        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.header("x-account-id"), Some("3"));
        assert_eq!(
            ctx.json::<Body>().unwrap(),
            Body {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_empty_body_does_not_decode() {
        let ctx = Context::new(Method::POST, Uri::from_static("/notes"));
        assert!(ctx.json::<Body>().is_err());
    }

    #[tokio::test]
    async fn test_from_request_buffers_body() {
        let request = axum::http::Request::builder()
            .method("PATCH")
            .uri("/notes/1")
            .header("host", "example.test")
            .body(axum::body::Body::from("{\"text\":\"x\"}"))
            .unwrap();

        let ctx = Context::from_request(request).await.unwrap();
        assert_eq!(ctx.method(), Method::PATCH);
        assert_eq!(ctx.header("host"), Some("example.test"));
        assert_eq!(ctx.body().as_ref(), b"{\"text\":\"x\"}");
        // No router matched this request, so no parameters were recorded.
        assert_eq!(ctx.param("id"), None);
    }
}
