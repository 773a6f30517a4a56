//! Prefix search over movie titles and actor and director names.

use crate::catalog::{actors, directors, movies};
use crate::forms::SearchForm;
use crate::middleware::ClientCtx;
use crate::orm::movies as movie;
use crate::rating::{ActorRating, DirectorRating};
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_search).service(post_search);
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub client: ClientCtx,
    pub pattern: String,
    pub results: Option<SearchResults>,
}

pub struct SearchResults {
    pub movies: Vec<movie::Model>,
    pub actors: Vec<ActorRating>,
    pub directors: Vec<DirectorRating>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.actors.is_empty() && self.directors.is_empty()
    }
}

async fn search(db: &DatabaseConnection, pattern: &str) -> Result<SearchResults, Error> {
    Ok(SearchResults {
        movies: movies::search_prefix(db, pattern).await?,
        actors: actors::search_prefix(db, pattern).await?,
        directors: directors::search_prefix(db, pattern).await?,
    })
}

async fn render(
    client: ClientCtx,
    db: &DatabaseConnection,
    form: SearchForm,
) -> Result<SearchTemplate, Error> {
    // The bare page shows only the form.
    let (pattern, results) = match form.pattern {
        Some(pattern) => {
            let pattern = pattern.trim().to_owned();
            log::debug!("search: {:?}", pattern);
            let results = search(db, &pattern).await?;
            (pattern, Some(results))
        }
        None => (String::new(), None),
    };

    Ok(SearchTemplate {
        client,
        pattern,
        results,
    })
}

#[get("/search")]
pub async fn view_search(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<SearchForm>,
) -> Result<impl Responder, Error> {
    Ok(render(client, db.get_ref(), query.into_inner())
        .await?
        .to_response())
}

#[post("/search")]
pub async fn post_search(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<SearchForm>,
) -> Result<impl Responder, Error> {
    Ok(render(client, db.get_ref(), form.into_inner())
        .await?
        .to_response())
}
