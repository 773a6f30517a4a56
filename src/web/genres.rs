use crate::catalog::movies;
use crate::middleware::ClientCtx;
use crate::orm::{genres as genre, movies as movie};
use actix_web::{get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_genre);
}

#[derive(Template)]
#[template(path = "movie_by_genre.html")]
pub struct GenreTemplate {
    pub client: ClientCtx,
    pub genre: genre::Model,
    pub movies: Vec<movie::Model>,
}

#[get("/genres/{id}/")]
pub async fn view_genre(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let (genre, movies) = movies::by_genre(db.get_ref(), path.into_inner()).await?;
    Ok(GenreTemplate {
        client,
        genre,
        movies,
    }
    .to_response())
}
