pub mod account;
pub mod actors;
pub mod api;
pub mod comments;
pub mod directors;
pub mod error;
pub mod genres;
pub mod index;
pub mod lists;
pub mod messages;
pub mod movies;
pub mod search;

use actix_web::HttpResponse;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    api::configure(conf);
    account::configure(conf);
    actors::configure(conf);
    comments::configure(conf);
    directors::configure(conf);
    genres::configure(conf);
    lists::configure(conf);
    messages::configure(conf);
    movies::configure(conf);
    search::configure(conf);
}

/// 302 to `location`, the answer to every successful form post.
pub(crate) fn redirect<S: AsRef<str>>(location: S) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", location.as_ref()))
        .finish()
}
