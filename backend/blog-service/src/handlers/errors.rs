/// 404 and 500 pages.
///
/// [`error_handlers`] swaps the plain body of any 404/500 response for the
/// rendered page, so errors raised by extractors (a post id that overflows
/// `i64`, say) look the same as errors raised by handlers.
use super::{html_with_status, HTML_CONTENT_TYPE};
use crate::middleware::Actor;
use crate::templates::misc;
use actix_web::{
    dev::ServiceResponse,
    http::{header, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    HttpRequest, HttpResponse,
};

pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, render_not_found)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_server_error)
}

/// Fallback for unmatched paths.
pub async fn not_found(req: HttpRequest, actor: Actor) -> HttpResponse {
    tracing::debug!(path = %req.path(), "No route matched");
    html_with_status(
        StatusCode::NOT_FOUND,
        misc::not_found(actor.user(), req.path()),
    )
}

fn render_not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if is_html(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    let path = res.request().path().to_string();
    Ok(replace_body(res, misc::not_found(None, &path)))
}

fn render_server_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if is_html(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    Ok(replace_body(res, misc::server_error()))
}

fn is_html<B>(res: &ServiceResponse<B>) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

fn replace_body<B>(res: ServiceResponse<B>, html: String) -> ErrorHandlerResponse<B> {
    let (req, res) = res.into_parts();
    let mut res = res.set_body(html);
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(HTML_CONTENT_TYPE),
    );

    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    ErrorHandlerResponse::Response(res)
}
