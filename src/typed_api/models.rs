//! Response shapes of the typed API.

use crate::catalog::directors::DirectorWithMovies;
use crate::comments::CommentDisplay;
use crate::orm::{actors, directors, movies};
use crate::rating::DirectorRating;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize)]
pub struct Director {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

impl From<directors::Model> for Director {
    fn from(d: directors::Model) -> Self {
        Self {
            id: d.id,
            first_name: d.first_name,
            last_name: d.last_name,
            birth_date: d.birth_date,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub rating: f64,
    pub director_id: Option<i32>,
    pub date: NaiveDate,
}

impl From<movies::Model> for Movie {
    fn from(m: movies::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            rating: m.rating,
            director_id: m.director_id,
            date: m.date,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Actor {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

impl From<actors::Model> for Actor {
    fn from(a: actors::Model) -> Self {
        Self {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
            birth_date: a.birth_date,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DirectorShort {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MovieShort {
    pub title: String,
    pub rating: f64,
}

impl From<movies::Model> for MovieShort {
    fn from(m: movies::Model) -> Self {
        Self {
            title: m.title,
            rating: m.rating,
        }
    }
}

/// `director` is null for movies whose director was deleted.
#[derive(Debug, PartialEq, Serialize)]
pub struct MovieWithDirector {
    pub title: String,
    pub rating: f64,
    pub director: Option<DirectorShort>,
}

impl From<(movies::Model, Option<directors::Model>)> for MovieWithDirector {
    fn from((movie, director): (movies::Model, Option<directors::Model>)) -> Self {
        Self {
            title: movie.title,
            rating: movie.rating,
            director: director.map(|d| DirectorShort {
                first_name: d.first_name,
                last_name: d.last_name,
            }),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DirectorWithMovie {
    pub first_name: String,
    pub last_name: String,
    pub movies: Vec<MovieShort>,
}

impl From<DirectorWithMovies> for DirectorWithMovie {
    fn from(d: DirectorWithMovies) -> Self {
        Self {
            first_name: d.director.first_name,
            last_name: d.director.last_name,
            movies: d.movies.into_iter().map(MovieShort::from).collect(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DirectorWithRating {
    pub first_name: String,
    pub last_name: String,
    pub avg_rating: f64,
    pub num_movies: i64,
}

impl From<DirectorRating> for DirectorWithRating {
    fn from(r: DirectorRating) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            avg_rating: r.avg_rating,
            num_movies: r.num_movies,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ActorWithMovie {
    pub first_name: String,
    pub last_name: String,
    pub movies: Vec<MovieShort>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MovieComment {
    pub id: i32,
    pub text: String,
    pub movie_id: i32,
    pub author_id: i32,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
}

impl From<CommentDisplay> for MovieComment {
    fn from(c: CommentDisplay) -> Self {
        Self {
            id: c.id,
            text: c.text,
            movie_id: c.target_id,
            author_id: c.author_id,
            created: c.created_at,
            updated: c.updated_at,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MovieCommentRead {
    pub id: i32,
    pub text: String,
    pub author: UserShort,
    pub created: NaiveDateTime,
}

impl From<CommentDisplay> for MovieCommentRead {
    fn from(c: CommentDisplay) -> Self {
        Self {
            id: c.id,
            text: c.text,
            author: UserShort {
                id: c.author_id,
                username: c.author_name,
            },
            created: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_without_director() {
        let movie = movies::Model {
            id: 3,
            title: "Orphan".to_owned(),
            rating: 6.0,
            date: NaiveDate::from_ymd_opt(2009, 7, 24).unwrap(),
            plot: String::new(),
            slug: "orphan".to_owned(),
            imdb_id: String::new(),
            director_id: None,
        };
        let json = serde_json::to_value(MovieWithDirector::from((movie, None))).unwrap();
        assert_eq!(json["title"], "Orphan");
        assert!(json["director"].is_null());
    }
}
