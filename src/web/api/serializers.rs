//! Wire shapes of the REST sub-API.
//!
//! Related rows are rendered the way the browsable pages name them: a
//! director or actor as "First Last", a movie as "Title (year)", a user by
//! username.

use crate::app_config;
use crate::catalog::movies as catalog_movies;
use crate::comments::CommentDisplay;
use crate::lists::ListWithMovies;
use crate::messages::MessageDisplay;
use crate::orm::{actors, directors, genres, movies, users};
use crate::rating::ActorRating;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::ConnectionTrait;
use serde::Serialize;

fn absolute_url(path: &str) -> String {
    format!(
        "{}{}",
        app_config::site().base_url.trim_end_matches('/'),
        path
    )
}

#[derive(Debug, Serialize)]
pub struct DirectorSerializer {
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: NaiveDate,
}

impl From<directors::Model> for DirectorSerializer {
    fn from(director: directors::Model) -> Self {
        Self {
            first_name: director.first_name,
            last_name: director.last_name,
            sex: director.sex,
            birth_date: director.birth_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorSerializer {
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: NaiveDate,
}

impl From<actors::Model> for ActorSerializer {
    fn from(actor: actors::Model) -> Self {
        Self {
            first_name: actor.first_name,
            last_name: actor.last_name,
            sex: actor.sex,
            birth_date: actor.birth_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieSmallSerializer {
    pub title: String,
    pub rating: f64,
    pub date: NaiveDate,
    pub director: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActorDetailSerializer {
    #[serde(flatten)]
    pub actor: ActorSerializer,
    pub movies: Vec<MovieSmallSerializer>,
}

impl ActorDetailSerializer {
    pub fn new(actor: actors::Model, movies: Vec<(movies::Model, Option<directors::Model>)>) -> Self {
        Self {
            actor: actor.into(),
            movies: movies
                .into_iter()
                .map(|(movie, director)| MovieSmallSerializer {
                    title: movie.title,
                    rating: movie.rating,
                    date: movie.date,
                    director: director.map(|d| d.full_name()),
                })
                .collect(),
        }
    }
}

/// `/api/movies/`: related users and genres as ids, actors by last name.
#[derive(Debug, Serialize)]
pub struct MovieSerializer {
    pub title: String,
    pub rating: f64,
    pub date: NaiveDate,
    pub plot: String,
    pub actors: Vec<String>,
    pub slug: String,
    pub director: Option<String>,
    pub users_to_watch: Vec<i32>,
    pub user_rated_this_movie: Vec<i32>,
    pub genres: Vec<i32>,
}

/// Movie with every relation loaded, shared by both movie serializers.
pub struct MovieGraph {
    pub movie: movies::Model,
    pub director: Option<directors::Model>,
    pub actors: Vec<actors::Model>,
    pub genres: Vec<genres::Model>,
    pub watchers: Vec<users::Model>,
    pub raters: Vec<users::Model>,
}

impl MovieGraph {
    pub async fn load<C: ConnectionTrait>(
        db: &C,
        movie: movies::Model,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            director: catalog_movies::director_of(db, &movie).await?,
            actors: catalog_movies::actors_of(db, &movie).await?,
            genres: catalog_movies::genres_of(db, &movie).await?,
            watchers: catalog_movies::watchers_of(db, movie.id).await?,
            raters: catalog_movies::raters_of(db, movie.id).await?,
            movie,
        })
    }
}

impl From<MovieGraph> for MovieSerializer {
    fn from(graph: MovieGraph) -> Self {
        Self {
            title: graph.movie.title,
            rating: graph.movie.rating,
            date: graph.movie.date,
            plot: graph.movie.plot,
            actors: graph.actors.into_iter().map(|a| a.last_name).collect(),
            slug: graph.movie.slug,
            director: graph.director.map(|d| d.full_name()),
            users_to_watch: graph.watchers.iter().map(|u| u.id).collect(),
            user_rated_this_movie: graph.raters.iter().map(|u| u.id).collect(),
            genres: graph.genres.iter().map(|g| g.id).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreSerializer {
    pub name: String,
}

/// `/api/single-page/movies/`: names instead of ids, genres nested.
#[derive(Debug, Serialize)]
pub struct SinglePageMovieSerializer {
    pub title: String,
    pub rating: f64,
    pub date: NaiveDate,
    pub plot: String,
    pub actors: Vec<String>,
    pub slug: String,
    pub director: Option<String>,
    pub users_to_watch: Vec<String>,
    pub user_rated_this_movie: Vec<String>,
    pub genres: Vec<GenreSerializer>,
}

impl From<MovieGraph> for SinglePageMovieSerializer {
    fn from(graph: MovieGraph) -> Self {
        Self {
            title: graph.movie.title,
            rating: graph.movie.rating,
            date: graph.movie.date,
            plot: graph.movie.plot,
            actors: graph.actors.iter().map(|a| a.full_name()).collect(),
            slug: graph.movie.slug,
            director: graph.director.map(|d| d.full_name()),
            users_to_watch: graph.watchers.into_iter().map(|u| u.last_name).collect(),
            user_rated_this_movie: graph.raters.into_iter().map(|u| u.username).collect(),
            genres: graph
                .genres
                .into_iter()
                .map(|g| GenreSerializer { name: g.name })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieLinkSerializer {
    #[serde(rename = "__str__")]
    pub display: String,
    pub url_detail: String,
    pub get_absolute_url: String,
}

impl From<movies::Model> for MovieLinkSerializer {
    fn from(movie: movies::Model) -> Self {
        let path = movie.get_absolute_url();
        Self {
            display: movie.display_name(),
            url_detail: absolute_url(&path),
            get_absolute_url: path,
        }
    }
}

/// `/api/single-page/actors/`
#[derive(Debug, Serialize)]
pub struct SinglePageActorSerializer {
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub birth_date: NaiveDate,
    pub movies: Vec<MovieLinkSerializer>,
    pub num_movies: i64,
    pub avg_rating: f64,
    pub url_detail: String,
}

impl SinglePageActorSerializer {
    pub fn new(actor: ActorRating, movies: Vec<movies::Model>) -> Self {
        Self {
            url_detail: absolute_url(&format!("/actors/{}/", actor.id)),
            first_name: actor.first_name,
            last_name: actor.last_name,
            sex: actor.sex,
            birth_date: actor.birth_date,
            movies: movies.into_iter().map(MovieLinkSerializer::from).collect(),
            num_movies: actor.num_movies,
            avg_rating: actor.avg_rating,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentSerializer {
    pub id: i32,
    pub text: String,
    pub movie: i32,
    pub author: i32,
}

impl From<CommentDisplay> for CommentSerializer {
    fn from(comment: CommentDisplay) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            movie: comment.target_id,
            author: comment.author_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageSerializer {
    pub id: i32,
    pub author: String,
    pub addressee: String,
    pub text: String,
    pub is_read: bool,
    pub created: NaiveDateTime,
}

impl From<MessageDisplay> for MessageSerializer {
    fn from(message: MessageDisplay) -> Self {
        Self {
            id: message.id,
            author: message.author_name,
            addressee: message.addressee_name,
            text: message.text,
            is_read: message.is_read,
            created: message.created_at,
        }
    }
}

/// Write-side echo of a message: what the client may set.
#[derive(Debug, Serialize)]
pub struct MessageWriteSerializer {
    pub id: i32,
    pub text: String,
    pub addressee: i32,
}

impl From<MessageDisplay> for MessageWriteSerializer {
    fn from(message: MessageDisplay) -> Self {
        Self {
            id: message.id,
            text: message.text,
            addressee: message.addressee_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonalMovieListSerializer {
    pub id: i32,
    pub name: String,
    pub user: String,
    pub movies: Vec<String>,
    pub created: NaiveDateTime,
}

impl From<ListWithMovies> for PersonalMovieListSerializer {
    fn from(list: ListWithMovies) -> Self {
        Self {
            id: list.list.id,
            name: list.list.name,
            user: list.owner,
            movies: list.movies.iter().map(|m| m.display_name()).collect(),
            created: list.list.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_movie_link_serializer() {
        let movie = movies::Model {
            id: 1,
            title: "Alien".to_owned(),
            rating: 8.5,
            date: NaiveDate::from_ymd_opt(1979, 5, 25).unwrap(),
            plot: String::new(),
            slug: "alien".to_owned(),
            imdb_id: "tt0078748".to_owned(),
            director_id: None,
        };
        let json = serde_json::to_value(MovieLinkSerializer::from(movie)).unwrap();
        assert_eq!(json["__str__"], "Alien (1979)");
        assert_eq!(json["get_absolute_url"], "/movies/alien/");
        assert!(json["url_detail"].as_str().unwrap().ends_with("/movies/alien/"));
    }
}
