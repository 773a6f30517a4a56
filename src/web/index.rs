use crate::app_config;
use crate::catalog::movies::{self, YearCount};
use crate::middleware::ClientCtx;
use crate::orm::movies as movie;
use crate::rating::{top_actors_by_sex, top_directors, ActorRating, DirectorRating};
use actix_web::{get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub client: ClientCtx,
    pub top_movies: Vec<movie::Model>,
    pub top_actors_male: Vec<ActorRating>,
    pub top_actors_female: Vec<ActorRating>,
    pub top_directors: Vec<DirectorRating>,
    pub all_movies: Vec<movie::Model>,
    pub all_years: Vec<YearCount>,
}

#[get("/")]
pub async fn view_index(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let top = app_config::limits().top_count as u64;

    let all_movies = movies::all_by_date(db).await?;
    let all_years = movies::release_years(&all_movies);

    Ok(IndexTemplate {
        client,
        top_movies: movies::top_rated(db, top).await?,
        top_actors_male: top_actors_by_sex(db, "M", top).await?,
        top_actors_female: top_actors_by_sex(db, "F", top).await?,
        top_directors: top_directors(db, top).await?,
        all_movies,
        all_years,
    }
    .to_response())
}
