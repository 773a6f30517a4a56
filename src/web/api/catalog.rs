use super::serializers::{
    ActorDetailSerializer, ActorSerializer, DirectorSerializer, MovieGraph, MovieSerializer,
    SinglePageActorSerializer, SinglePageMovieSerializer,
};
use super::{ApiPage, PageQuery, PageWindow};
use crate::app_config;
use crate::catalog::{actors, directors, movies};
use crate::error::Error as AppError;
use crate::filter::ActorNameFilter;
use crate::forms::DirectorForm;
use crate::middleware::ClientCtx;
use actix_web::{get, put, web, Error, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_directors)
        .service(update_director)
        .service(list_actors)
        .service(view_actor)
        .service(list_movies)
        .service(single_page_actors)
        .service(single_page_movies);
}

fn page_size() -> usize {
    app_config::limits().api_page_size as usize
}

#[get("/directors/")]
pub async fn list_directors(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let directors = directors::all(db.get_ref())
        .await?
        .into_iter()
        .map(DirectorSerializer::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiPage::from_vec(&req, query.page, directors)?))
}

#[put("/directors/{id}/")]
pub async fn update_director(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<DirectorForm>,
) -> Result<HttpResponse, Error> {
    client.require_staff()?;
    form.validate().map_err(AppError::Validation)?;

    let director = directors::update_director(
        db.get_ref(),
        path.into_inner(),
        directors::DirectorUpdate {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            sex: &form.sex,
            birth_date: form.birth_date,
        },
    )
    .await?;
    log::info!("Director {} updated by {:?}", director.id, client.get_id());

    Ok(HttpResponse::Ok().json(DirectorSerializer::from(director)))
}

#[derive(Debug, Deserialize)]
pub struct ActorListQuery {
    pub sex: Option<String>,
    pub page: Option<usize>,
}

#[get("/actors/")]
pub async fn list_actors(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ActorListQuery>,
) -> Result<HttpResponse, Error> {
    let sex = query.sex.as_deref().filter(|s| !s.is_empty());
    let actors = actors::by_sex_query(sex)
        .all(db.get_ref())
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(ActorSerializer::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiPage::from_vec(&req, query.page, actors)?))
}

#[get("/actors/{id}/")]
pub async fn view_actor(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let db = db.get_ref();
    let actor = actors::find(db, path.into_inner()).await?;
    let movies = actors::movies_of(db, &actor).await?;
    Ok(HttpResponse::Ok().json(ActorDetailSerializer::new(actor, movies)))
}

#[get("/movies/")]
pub async fn list_movies(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let db = db.get_ref();
    let movies = movies::all_by_title(db).await?;
    let window = PageWindow::new(query.page, page_size(), movies.len())?;

    let mut results = Vec::with_capacity(window.size);
    for movie in movies.into_iter().skip(window.offset()).take(window.size) {
        results.push(MovieSerializer::from(MovieGraph::load(db, movie).await?));
    }
    Ok(HttpResponse::Ok().json(ApiPage::new(&req, window, results)))
}

#[get("/single-page/actors/")]
pub async fn single_page_actors(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    page: web::Query<PageQuery>,
    filter: web::Query<ActorNameFilter>,
) -> Result<HttpResponse, Error> {
    let db = db.get_ref();
    let actors = actors::with_ratings(db, &filter).await?;
    let window = PageWindow::new(page.page, page_size(), actors.len())?;

    let mut results = Vec::with_capacity(window.size);
    for rating in actors.into_iter().skip(window.offset()).take(window.size) {
        let actor = actors::find(db, rating.id).await?;
        let movies = actors::movies_of(db, &actor)
            .await?
            .into_iter()
            .map(|(movie, _)| movie)
            .collect();
        results.push(SinglePageActorSerializer::new(rating, movies));
    }
    Ok(HttpResponse::Ok().json(ApiPage::new(&req, window, results)))
}

#[get("/single-page/movies/")]
pub async fn single_page_movies(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let db = db.get_ref();
    let movies = movies::all_by_title(db).await?;
    let window = PageWindow::new(query.page, page_size(), movies.len())?;

    let mut results = Vec::with_capacity(window.size);
    for movie in movies.into_iter().skip(window.offset()).take(window.size) {
        results.push(SinglePageMovieSerializer::from(
            MovieGraph::load(db, movie).await?,
        ));
    }
    Ok(HttpResponse::Ok().json(ApiPage::new(&req, window, results)))
}
