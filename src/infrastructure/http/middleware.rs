//! HTTP Middleware
//!
//! HTTP 状态码错误日志中间件与请求者身份提取

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::error::ApiError;

/// 请求者身份头
pub const REQUESTER_HEADER: &str = "x-user-id";

fn requester_of(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// 请求日志中间件
///
/// 4xx/5xx 响应按级别记录，附带请求者 ID；业务错误（errno != 0）由
/// ApiError::into_response() 记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    let requester = requester_of(request.headers()).unwrap_or("-").to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    match status {
        500..=599 => tracing::error!(%route, %requester, status, "Request failed"),
        400..=499 => tracing::warn!(%route, %requester, status, "Request rejected"),
        _ => {}
    }
    response
}

/// 请求者 ID（来自 `x-user-id` 头）
#[derive(Debug, Clone)]
pub struct Requester(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        requester_of(&parts.headers)
            .map(|id| Requester(id.to_string()))
            .ok_or_else(|| ApiError::Forbidden(format!("Missing {} header", REQUESTER_HEADER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn whoami(Requester(id): Requester) -> String {
        id
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/api/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/api/broken", get(|| async { StatusCode::BAD_GATEWAY }))
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    #[tokio::test]
    async fn test_middleware_passes_status_through() {
        for (uri, expected) in [
            ("/api/ping", StatusCode::OK),
            ("/api/missing", StatusCode::NOT_FOUND),
            ("/api/broken", StatusCode::BAD_GATEWAY),
        ] {
            let request = HttpRequest::builder()
                .uri(uri)
                .header(REQUESTER_HEADER, "user-1")
                .body(Body::empty())
                .unwrap();
            let response = create_test_router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_requester_extracted_from_header() {
        let app = create_test_router();
        let request = HttpRequest::builder()
            .uri("/whoami")
            .header(REQUESTER_HEADER, " user-7 ")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-7");
    }

    #[tokio::test]
    async fn test_missing_requester_is_forbidden() {
        let app = create_test_router();
        let request = HttpRequest::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errno"], 403);
    }
}
