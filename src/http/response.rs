//! Response construction.
//!
//! # Responsibilities
//! - Carry a dispatch outcome (status, body, content kind)
//! - Add the permissive CORS headers every response carries
//! - Decide whether the connection survives the response
//!
//! # Design Decisions
//! - Only a 200 keeps the connection; any other status closes it, html or not
//! - Bodies are built in full before the headers are written

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

use crate::error::ExplorerError;
use crate::render::Rendered;

pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Outcome of dispatching one request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub html: bool,
}

impl Reply {
    pub fn ok(rendered: Rendered) -> Self {
        Self {
            status: StatusCode::OK,
            body: rendered.body,
            html: rendered.html,
        }
    }

    pub fn not_found() -> Self {
        Self::empty(StatusCode::NOT_FOUND)
    }

    pub fn forbidden() -> Self {
        Self::empty(StatusCode::FORBIDDEN)
    }

    pub fn internal_error(e: &ExplorerError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: format!("Internal error: {}", e),
            html: false,
        }
    }

    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
            html: false,
        }
    }

    pub fn keep_alive(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Build the wire response. Non-keep-alive replies carry
    /// `Connection: close`, so the transport shuts the stream after writing.
    pub fn into_response(self) -> Response<Body> {
        let keep_alive = self.keep_alive();
        let content_type = if self.html { CONTENT_TYPE_HTML } else { CONTENT_TYPE_JSON };

        let len = self.body.len();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        if !keep_alive {
            headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_keeps_connection() {
        let reply = Reply::ok(Rendered {
            body: "<p>".into(),
            html: true,
        });
        assert!(reply.keep_alive());

        let res = reply.into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(res.headers()[header::CONTENT_LENGTH], "3");
        assert!(res.headers().get(header::CONNECTION).is_none());
    }

    #[test]
    fn errors_close_connection() {
        for reply in [
            Reply::not_found(),
            Reply::forbidden(),
            Reply::internal_error(&ExplorerError::validation("id missing")),
        ] {
            assert!(!reply.keep_alive());
            let res = reply.into_response();
            assert_eq!(res.headers()[header::CONNECTION], "close");
            assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        }
    }

    #[test]
    fn internal_error_carries_message() {
        let reply = Reply::internal_error(&ExplorerError::RecursionLimit);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body, "Internal error: recursion too deep");
    }
}
