use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    // 响应体是 SVG，只记录状态码和路径
    if response.status().is_server_error() {
        error!(
            "Server error occurred - Status: {}, Request: {} {}",
            response.status(),
            method,
            path
        );
    }

    response
}
