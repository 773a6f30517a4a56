//! Aggregate ratings.
//!
//! Directors and actors are scored by the catalogue `movies.rating` of the
//! movies they are attached to; movies are scored by the values users gave
//! them. Every aggregate is an outer join with `COALESCE(AVG(..), 0.0)`, so
//! a row with nothing to average reports `0.0` and a count of zero.

use crate::error::{Error, Result};
use crate::orm::{actors, directors, movie_actors, movies, user_movie_ratings};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, FromQueryResult, JoinType};
use serde::Serialize;

const AVG_MOVIE_RATING: &str = r#"COALESCE(AVG("movies"."rating"), 0.0)"#;
const COUNT_MOVIES: &str = r#"COUNT("movies"."id")"#;
const AVG_USER_RATING: &str = r#"COALESCE(AVG("user_movie_ratings"."value"), 0.0)"#;
const COUNT_USER_RATINGS: &str = r#"COUNT("user_movie_ratings"."user_id")"#;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

#[derive(Clone, Debug, FromQueryResult, Serialize)]
pub struct DirectorRating {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub avg_rating: f64,
    pub num_movies: i64,
}

impl DirectorRating {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, FromQueryResult, Serialize)]
pub struct ActorRating {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: chrono::NaiveDate,
    pub avg_rating: f64,
    pub num_movies: i64,
}

impl ActorRating {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Community score of a movie.
#[derive(Clone, Debug, FromQueryResult, Serialize)]
pub struct MovieRating {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub avg_rating: f64,
    pub num_ratings: i64,
}

fn director_ratings_select() -> Select<directors::Entity> {
    directors::Entity::find()
        .select_only()
        .column(directors::Column::Id)
        .column(directors::Column::FirstName)
        .column(directors::Column::LastName)
        .column_as(Expr::cust(AVG_MOVIE_RATING), "avg_rating")
        .column_as(Expr::cust(COUNT_MOVIES), "num_movies")
        .join(JoinType::LeftJoin, directors::Relation::Movies.def())
        .group_by(directors::Column::Id)
        .group_by(directors::Column::FirstName)
        .group_by(directors::Column::LastName)
}

/// Every director with `avg_rating` and `num_movies`, by last name.
pub fn director_ratings_query() -> Select<directors::Entity> {
    director_ratings_select()
        .order_by_asc(directors::Column::LastName)
        .order_by_asc(directors::Column::FirstName)
        .order_by_asc(directors::Column::Id)
}

pub async fn director_ratings<C: ConnectionTrait>(db: &C) -> Result<Vec<DirectorRating>> {
    Ok(director_ratings_query()
        .into_model::<DirectorRating>()
        .all(db)
        .await?)
}

pub async fn director_rating<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<DirectorRating>> {
    Ok(director_ratings_select()
        .filter(directors::Column::Id.eq(id))
        .into_model::<DirectorRating>()
        .one(db)
        .await?)
}

pub async fn top_directors<C: ConnectionTrait>(db: &C, limit: u64) -> Result<Vec<DirectorRating>> {
    Ok(director_ratings_select()
        .order_by_desc(Expr::cust("avg_rating"))
        .order_by_asc(directors::Column::LastName)
        .order_by_asc(directors::Column::Id)
        .limit(limit)
        .into_model::<DirectorRating>()
        .all(db)
        .await?)
}

fn actor_ratings_select() -> Select<actors::Entity> {
    actors::Entity::find()
        .select_only()
        .column(actors::Column::Id)
        .column(actors::Column::FirstName)
        .column(actors::Column::LastName)
        .column(actors::Column::Sex)
        .column(actors::Column::BirthDate)
        .column_as(Expr::cust(AVG_MOVIE_RATING), "avg_rating")
        .column_as(Expr::cust(COUNT_MOVIES), "num_movies")
        .join(JoinType::LeftJoin, actors::Relation::MovieActors.def())
        .join(JoinType::LeftJoin, movie_actors::Relation::Movie.def())
        .group_by(actors::Column::Id)
        .group_by(actors::Column::FirstName)
        .group_by(actors::Column::LastName)
        .group_by(actors::Column::Sex)
        .group_by(actors::Column::BirthDate)
}

/// Every actor with `avg_rating` and `num_movies`, by last name.
pub fn actor_ratings_query() -> Select<actors::Entity> {
    actor_ratings_select()
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
}

pub async fn actor_ratings<C: ConnectionTrait>(db: &C) -> Result<Vec<ActorRating>> {
    Ok(actor_ratings_query()
        .into_model::<ActorRating>()
        .all(db)
        .await?)
}

pub async fn actor_rating<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<ActorRating>> {
    Ok(actor_ratings_select()
        .filter(actors::Column::Id.eq(id))
        .into_model::<ActorRating>()
        .one(db)
        .await?)
}

/// Best rated actors of one sex, highest average first.
pub async fn top_actors_by_sex<C: ConnectionTrait>(
    db: &C,
    sex: &str,
    limit: u64,
) -> Result<Vec<ActorRating>> {
    Ok(actor_ratings_select()
        .filter(actors::Column::Sex.eq(sex))
        .order_by_desc(Expr::cust("avg_rating"))
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
        .limit(limit)
        .into_model::<ActorRating>()
        .all(db)
        .await?)
}

fn movie_ratings_select() -> Select<movies::Entity> {
    movies::Entity::find()
        .select_only()
        .column(movies::Column::Id)
        .column(movies::Column::Title)
        .column(movies::Column::Slug)
        .column_as(Expr::cust(AVG_USER_RATING), "avg_rating")
        .column_as(Expr::cust(COUNT_USER_RATINGS), "num_ratings")
        .join(JoinType::LeftJoin, movies::Relation::UserRatings.def())
        .group_by(movies::Column::Id)
        .group_by(movies::Column::Title)
        .group_by(movies::Column::Slug)
}

pub async fn movie_ratings<C: ConnectionTrait>(db: &C) -> Result<Vec<MovieRating>> {
    Ok(movie_ratings_select()
        .order_by_asc(movies::Column::Title)
        .order_by_asc(movies::Column::Id)
        .into_model::<MovieRating>()
        .all(db)
        .await?)
}

pub async fn movie_rating<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<MovieRating>> {
    Ok(movie_ratings_select()
        .filter(movies::Column::Id.eq(id))
        .into_model::<MovieRating>()
        .one(db)
        .await?)
}

/// Records a user's score for a movie, replacing any earlier one.
pub async fn rate_movie<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    movie_id: i32,
    value: f64,
) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(Error::invalid_field(
            "value",
            "range",
            "Rating must be between 0 and 10.",
        ));
    }

    if movies::Entity::find_by_id(movie_id).one(db).await?.is_none() {
        return Err(Error::NotFound("Movie"));
    }

    let now = Utc::now().naive_utc();
    match user_movie_ratings::Entity::find_by_id((user_id, movie_id))
        .one(db)
        .await?
    {
        Some(existing) => {
            let mut rating: user_movie_ratings::ActiveModel = existing.into();
            rating.value = Set(value);
            rating.created_at = Set(now);
            rating.update(db).await?;
        }
        None => {
            user_movie_ratings::Entity::insert(user_movie_ratings::ActiveModel {
                user_id: Set(user_id),
                movie_id: Set(movie_id),
                value: Set(value),
                created_at: Set(now),
            })
            .exec(db)
            .await?;
        }
    }

    log::debug!("User {} rated movie {}: {}", user_id, movie_id, value);
    Ok(())
}

/// The requester's own score for a movie, if they gave one.
pub async fn user_rating<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    movie_id: i32,
) -> Result<Option<f64>> {
    Ok(user_movie_ratings::Entity::find_by_id((user_id, movie_id))
        .one(db)
        .await?
        .map(|r| r.value))
}
