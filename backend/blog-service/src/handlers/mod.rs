/// HTTP request handlers for blog-service
///
/// Handlers take the shared [`AppState`](crate::state::AppState) and the
/// request's [`Actor`](crate::middleware::Actor), call into the services and
/// answer with a rendered page or a redirect.
pub mod about;
pub mod auth;
pub mod errors;
pub mod health;
pub mod posts;
pub mod profile;

use actix_web::{http::header, http::StatusCode, HttpResponse, HttpResponseBuilder};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub(crate) fn html(body: String) -> HttpResponse {
    html_with_status(StatusCode::OK, body)
}

pub(crate) fn html_with_status(status: StatusCode, body: String) -> HttpResponse {
    HttpResponseBuilder::new(status)
        .content_type(HTML_CONTENT_TYPE)
        .body(body)
}

pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Only same-site absolute paths are followed after login.
pub(crate) fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}
