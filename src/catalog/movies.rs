use crate::error::{Error, Result};
use crate::filter::{text_match, MovieFilter, RatingRange, TextMatch};
use crate::orm::{actors, directors, genres, movie_genres, movies, user_movie_ratings, users, watchlist};
use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{entity::*, query::*, ConnectionTrait, Iterable, JoinType};
use std::collections::BTreeMap;

/// Number of movies released in one year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// A movie with everything its detail page and listings show about it.
#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movies::Model,
    pub director: Option<directors::Model>,
    pub actors: Vec<actors::Model>,
    pub genres: Vec<genres::Model>,
}

impl MovieDetail {
    /// The director as a string, as listings print it.
    pub fn director_name(&self) -> Option<String> {
        self.director.as_ref().map(|d| d.full_name())
    }
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

pub async fn all_by_title<C: ConnectionTrait>(db: &C) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .order_by_asc(movies::Column::Title)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

pub async fn all_by_date<C: ConnectionTrait>(db: &C) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .order_by_asc(movies::Column::Date)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<movies::Model> {
    movies::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Movie"))
}

pub async fn find_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<movies::Model> {
    movies::Entity::find()
        .filter(movies::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(Error::NotFound("Movie"))
}

/// Highest catalogue score first.
pub async fn top_rated<C: ConnectionTrait>(db: &C, limit: u64) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .order_by_desc(movies::Column::Rating)
        .order_by_asc(movies::Column::Title)
        .limit(limit)
        .all(db)
        .await?)
}

/// Release years with their movie counts, ascending.
pub fn release_years(movies: &[movies::Model]) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for movie in movies {
        *years.entry(movie.date.year()).or_default() += 1;
    }
    years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Movies released in `year`, by date. A year without movies is not found.
pub async fn year_archive<C: ConnectionTrait>(db: &C, year: i32) -> Result<Vec<movies::Model>> {
    let (first, last) = match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::NotFound("Year")),
    };

    let movies = movies::Entity::find()
        .filter(movies::Column::Date.between(first, last))
        .order_by_asc(movies::Column::Date)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?;

    if movies.is_empty() {
        return Err(Error::NotFound("Year"));
    }
    Ok(movies)
}

pub async fn by_genre<C: ConnectionTrait>(
    db: &C,
    genre_id: i32,
) -> Result<(genres::Model, Vec<movies::Model>)> {
    let genre = genres::Entity::find_by_id(genre_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Genre"))?;
    let movies = genre
        .find_related(movies::Entity)
        .order_by_asc(movies::Column::Title)
        .all(db)
        .await?;
    Ok((genre, movies))
}

pub async fn filter<C: ConnectionTrait>(db: &C, filter: &MovieFilter) -> Result<Vec<movies::Model>> {
    Ok(filter
        .apply(movies::Entity::find())
        .order_by_asc(movies::Column::Title)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

/// Movies by id with their directors, optionally limited to a rating range.
pub async fn with_directors<C: ConnectionTrait>(
    db: &C,
    range: Option<&RatingRange>,
) -> Result<Vec<(movies::Model, Option<directors::Model>)>> {
    let query = match range {
        Some(range) => range.apply(movies::Entity::find()),
        None => movies::Entity::find(),
    };
    Ok(query
        .find_also_related(directors::Entity)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

/// Title prefix search.
pub async fn search_prefix<C: ConnectionTrait>(db: &C, pattern: &str) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .filter(text_match::<movies::Entity>(
            &[movies::Column::Title],
            pattern,
            TextMatch::StartsWith,
        ))
        .order_by_asc(movies::Column::Title)
        .all(db)
        .await?)
}

/// Movies sharing at least one genre with `movie_id`, most shared genres
/// first.
pub async fn similar_movies<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    limit: u64,
) -> Result<Vec<movies::Model>> {
    let mut query = movies::Entity::find()
        .join(JoinType::InnerJoin, movies::Relation::MovieGenres.def())
        .filter(
            movie_genres::Column::GenreId.in_subquery(
                Query::select()
                    .column(movie_genres::Column::GenreId)
                    .from(movie_genres::Entity)
                    .and_where(movie_genres::Column::MovieId.eq(movie_id))
                    .to_owned(),
            ),
        )
        .filter(movies::Column::Id.ne(movie_id));
    for column in movies::Column::iter() {
        query = query.group_by(column);
    }

    Ok(query
        .order_by_desc(Expr::cust(r#"COUNT("movie_genres"."genre_id")"#))
        .order_by_asc(movies::Column::Title)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn director_of<C: ConnectionTrait>(
    db: &C,
    movie: &movies::Model,
) -> Result<Option<directors::Model>> {
    Ok(match movie.director_id {
        Some(id) => directors::Entity::find_by_id(id).one(db).await?,
        None => None,
    })
}

pub async fn actors_of<C: ConnectionTrait>(db: &C, movie: &movies::Model) -> Result<Vec<actors::Model>> {
    Ok(movie
        .find_related(actors::Entity)
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
        .all(db)
        .await?)
}

pub async fn genres_of<C: ConnectionTrait>(db: &C, movie: &movies::Model) -> Result<Vec<genres::Model>> {
    Ok(movie
        .find_related(genres::Entity)
        .order_by_asc(genres::Column::Name)
        .all(db)
        .await?)
}

/// Users who put the movie on their watchlist.
pub async fn watchers_of<C: ConnectionTrait>(db: &C, movie_id: i32) -> Result<Vec<users::Model>> {
    Ok(users::Entity::find()
        .join(JoinType::InnerJoin, watchlist::Relation::User.def().rev())
        .filter(watchlist::Column::MovieId.eq(movie_id))
        .order_by_asc(users::Column::Id)
        .all(db)
        .await?)
}

/// Users who rated the movie.
pub async fn raters_of<C: ConnectionTrait>(db: &C, movie_id: i32) -> Result<Vec<users::Model>> {
    Ok(users::Entity::find()
        .join(JoinType::InnerJoin, user_movie_ratings::Relation::User.def().rev())
        .filter(user_movie_ratings::Column::MovieId.eq(movie_id))
        .order_by_asc(users::Column::Id)
        .all(db)
        .await?)
}

pub async fn detail<C: ConnectionTrait>(db: &C, movie: movies::Model) -> Result<MovieDetail> {
    let director = director_of(db, &movie).await?;
    let actors = actors_of(db, &movie).await?;
    let genres = genres_of(db, &movie).await?;
    Ok(MovieDetail {
        movie,
        director,
        actors,
        genres,
    })
}

pub async fn update_title<C: ConnectionTrait>(db: &C, id: i32, title: &str) -> Result<movies::Model> {
    let mut movie: movies::ActiveModel = find_by_id(db, id).await?.into();
    movie.title = Set(title.to_owned());
    let movie = movie.update(db).await?;
    log::info!("Movie {} retitled to {:?}", movie.id, movie.title);
    Ok(movie)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32, year: i32) -> movies::Model {
        movies::Model {
            id,
            title: format!("Movie {}", id),
            rating: 5.0,
            date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            plot: String::new(),
            slug: format!("movie-{}", id),
            imdb_id: String::new(),
            director_id: None,
        }
    }

    #[test]
    fn test_release_years_are_counted_in_order() {
        let movies = vec![movie(1, 1999), movie(2, 1994), movie(3, 1999)];
        assert_eq!(
            release_years(&movies),
            vec![
                YearCount { year: 1994, count: 1 },
                YearCount { year: 1999, count: 2 },
            ]
        );
        assert!(release_years(&[]).is_empty());
    }

    #[test]
    fn test_display_name_and_url() {
        let m = movie(7, 1972);
        assert_eq!(m.display_name(), "Movie 7 (1972)");
        assert_eq!(m.get_absolute_url(), "/movies/movie-7/");
    }
}
