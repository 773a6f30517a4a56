//! The minimal typed API: flat JSON read models over the catalogue, served by
//! the `moviedb-api` binary.
//!
//! No sessions and no pagination. Errors use the shared
//! [`crate::error::Error`] bodies, e.g. `{"detail": "Movie not found"}`.

pub mod models;

use crate::catalog::{actors, directors, movies};
use crate::comments::{self, CommentTarget};
use crate::error::Error as AppError;
use crate::filter::{NameSearch, RatingRange};
use crate::rating;
use actix_web::{delete, get, patch, web, Error, HttpResponse};
use models::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub fn configure(conf: &mut web::ServiceConfig) {
    // `/movie/list/` and friends before `/movie/{pk}/`.
    conf.service(director_list)
        .service(movie_list)
        .service(actor_list)
        .service(actor_with_movie)
        .service(movie_with_director)
        .service(director_with_movie)
        .service(director_with_rating)
        .service(movie_comment)
        .service(movie_comment_short)
        .service(movie_filter_by_rating)
        .service(director_with_movie_filter)
        .service(movie_detail)
        .service(update_movie_title)
        .service(delete_director);
}

fn collect<T, U: From<T>>(rows: Vec<T>) -> Vec<U> {
    rows.into_iter().map(U::from).collect()
}

#[get("/director/list/")]
pub async fn director_list(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<Director> = collect(directors::all(db.get_ref()).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/list/")]
pub async fn movie_list(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<Movie> = collect(movies::all(db.get_ref()).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/{pk}/")]
pub async fn movie_detail(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let movie = movies::find_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Movie::from(movie)))
}

#[get("/actor/list/")]
pub async fn actor_list(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<Actor> = collect(actors::all(db.get_ref()).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/actor/with/movie/")]
pub async fn actor_with_movie(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<ActorWithMovie> = actors::with_movies(db.get_ref())
        .await?
        .into_iter()
        .map(|(actor, movies)| ActorWithMovie {
            first_name: actor.first_name,
            last_name: actor.last_name,
            movies: collect(movies),
        })
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/with/director/")]
pub async fn movie_with_director(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<MovieWithDirector> = collect(movies::with_directors(db.get_ref(), None).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/director/with/movie/")]
pub async fn director_with_movie(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<DirectorWithMovie> =
        collect(directors::with_movies(db.get_ref(), &NameSearch::default()).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/director/with/rating/")]
pub async fn director_with_rating(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<DirectorWithRating> = collect(rating::director_ratings(db.get_ref()).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/comment/")]
pub async fn movie_comment(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<MovieComment> =
        collect(comments::all_comments(db.get_ref(), CommentTarget::Movie).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/comment/short/")]
pub async fn movie_comment_short(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let rows: Vec<MovieCommentRead> =
        collect(comments::all_comments(db.get_ref(), CommentTarget::Movie).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movie/filter/by/rating/")]
pub async fn movie_filter_by_rating(
    db: web::Data<DatabaseConnection>,
    query: web::Query<RatingRange>,
) -> Result<HttpResponse, Error> {
    let rows: Vec<MovieWithDirector> =
        collect(movies::with_directors(db.get_ref(), Some(&query)).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/director/with/movie/filter/")]
pub async fn director_with_movie_filter(
    db: web::Data<DatabaseConnection>,
    query: web::Query<NameSearch>,
) -> Result<HttpResponse, Error> {
    let rows: Vec<DirectorWithMovie> = collect(directors::with_movies(db.get_ref(), &query).await?);
    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Debug, Deserialize)]
pub struct TitleUpdate {
    pub new_title: String,
}

#[patch("/movie/title/update/{pk}/")]
pub async fn update_movie_title(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    query: web::Query<TitleUpdate>,
) -> Result<HttpResponse, Error> {
    let title = query.new_title.trim();
    if title.is_empty() {
        return Err(
            AppError::invalid_field("new_title", "required", "This field is required.").into(),
        );
    }

    let movie = movies::update_title(db.get_ref(), path.into_inner(), title).await?;
    Ok(HttpResponse::Ok().json(Movie::from(movie)))
}

#[delete("/delete/director/{pk}/")]
pub async fn delete_director(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    directors::delete_director(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Deleted {
        message: "Director is deleted",
    }))
}
