//! SeaORM entities, one module per table.

pub mod actor_comments;
pub mod actors;
pub mod director_comments;
pub mod directors;
pub mod genres;
pub mod messages;
pub mod movie_actors;
pub mod movie_comments;
pub mod movie_genres;
pub mod movies;
pub mod personal_list_movies;
pub mod personal_lists;
pub mod user_movie_ratings;
pub mod users;
pub mod watchlist;
