//! Request ID propagation.
//!
//! A caller-supplied `x-request-id` is kept when it is short visible ASCII;
//! anything else is replaced by a fresh UUID v4. The ID is stored in request
//! extensions for the logging span and error bodies, and echoed on the
//! response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

fn accepted_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    (!raw.is_empty() && raw.len() <= MAX_REQUEST_ID_LEN).then(|| raw.to_string())
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = accepted_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let header_value = HeaderValue::from_str(&id).ok();

    request.extensions_mut().insert(RequestId(id));
    let mut response = next.run(request).await;

    if let Some(value) = header_value {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

        let echoed = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (echoed, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_caller_id_is_propagated() {
        let (echoed, seen_by_handler) = call(Some("abc-123")).await;
        assert_eq!(echoed, "abc-123");
        assert_eq!(seen_by_handler, "abc-123");
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let (echoed, seen_by_handler) = call(None).await;
        assert!(Uuid::parse_str(&echoed).is_ok());
        assert_eq!(echoed, seen_by_handler);
    }

    #[tokio::test]
    async fn test_overlong_id_is_replaced() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let (echoed, _) = call(Some(&long)).await;
        assert!(Uuid::parse_str(&echoed).is_ok());
    }
}
