//! HTML error pages.
//!
//! Installed through `ErrorHandlers` on the full application. Responses under
//! `/api/` keep their JSON bodies.

use crate::error::{Error, ErrorResponse};
use crate::middleware::ClientCtx;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderValue, CONTENT_TYPE};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpMessage, Result};
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub client: ClientCtx,
    pub status: u16,
    pub title: &'static str,
    pub detail: Option<String>,
    pub messages: Vec<String>,
}

pub fn render_400<B: MessageBody + 'static>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Bad request")
}

pub fn render_401<B: MessageBody + 'static>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Please log in")
}

pub fn render_403<B: MessageBody + 'static>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Forbidden")
}

pub fn render_404<B: MessageBody + 'static>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Page not found")
}

pub fn render_500<B: MessageBody + 'static>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Something went wrong")
}

fn render_error<B: MessageBody + 'static>(
    res: ServiceResponse<B>,
    title: &'static str,
) -> Result<ErrorHandlerResponse<B>> {
    if res.request().path().starts_with("/api/") {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let (detail, messages) = match res.response().error() {
        Some(err) => match err.as_error::<Error>() {
            Some(e) => (Some(ErrorResponse::from(e).detail), e.field_messages()),
            None => (Some(err.to_string()), Vec::new()),
        },
        None => (None, Vec::new()),
    };

    let client = ClientCtx::get_or_default_from_extensions(&mut res.request().extensions_mut());
    let template = ErrorTemplate {
        client,
        status: res.status().as_u16(),
        title,
        detail,
        messages,
    };
    let html = match template.render() {
        Ok(html) => html,
        Err(e) => {
            log::error!("render_error: {}", e);
            title.to_owned()
        }
    };

    let (req, res) = res.into_parts();
    let mut res = res.set_body(html);
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
