//! HTTP response building module
//!
//! JSON envelope and error-response builders, decoupled from handler logic.
//! Every response carries the same permissive CORS headers so browser
//! frontends can call the API from any origin.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Attach the uniform cross-origin headers
fn with_cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET,POST,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

/// Build a JSON response with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return with_cors(Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR))
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"error":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    with_cors(Response::builder().status(status))
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_u16(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Build a JSON error response `{"error": message}`
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Build 204 preflight response for OPTIONS requests
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(204))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(204, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(404))
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Not found")))
        .unwrap_or_else(|e| {
            log_build_error(404, &e);
            Response::new(Full::new(Bytes::from("Not found")))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_json_response_carries_cors_headers() {
        let resp = json_response(StatusCode::OK, &serde_json::json!({"ok": true}));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "Content-Type"), Some("application/json"));
        assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            header(&resp, "Access-Control-Allow-Methods"),
            Some("GET,POST,OPTIONS")
        );
        assert_eq!(
            header(&resp, "Access-Control-Allow-Headers"),
            Some("Content-Type")
        );
    }

    #[test]
    fn test_preflight_response() {
        let resp = build_preflight_response();
        assert_eq!(resp.status(), 204);
        assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("*"));
        assert!(header(&resp, "Content-Type").is_none());
    }

    #[test]
    fn test_not_found_is_plain_text_with_cors() {
        let resp = build_404_response();
        assert_eq!(resp.status(), 404);
        assert_eq!(header(&resp, "Content-Type"), Some("text/plain"));
        assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_error_response_shape() {
        let resp = error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
