use super::redirect;
use crate::app_config;
use crate::catalog::{directors, genres, movies};
use crate::comments::{self, CommentDisplay, CommentTarget};
use crate::error::Error as AppError;
use crate::filter::MovieFilter;
use crate::forms::{AddToListForm, CommentForm, RatingForm};
use crate::lists::{self, ListWithMovies};
use crate::middleware::ClientCtx;
use crate::orm::{directors as director, genres as genre, movies as movie};
use crate::rating::{self, MovieRating};
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_movies)
        .service(view_filter)
        .service(view_year_archive)
        .service(view_movie)
        .service(post_comment)
        .service(post_watchlist)
        .service(post_rating)
        .service(post_add_to_list);
}

#[get("/movies/")]
pub async fn view_movies(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, Error> {
    #[derive(Template)]
    #[template(path = "movie_list.html")]
    pub struct MovieListTemplate {
        pub client: ClientCtx,
        pub movies: Vec<movie::Model>,
    }

    Ok(MovieListTemplate {
        client,
        movies: movies::all_by_title(db.get_ref()).await?,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "filter_movie_list.html")]
pub struct MovieFilterTemplate {
    pub client: ClientCtx,
    pub movies: Vec<movie::Model>,
    pub directors: Vec<director::Model>,
    pub genres: Vec<genre::Model>,
    pub filter: MovieFilter,
    pub selected_genres: Vec<i32>,
}

impl MovieFilterTemplate {
    pub fn is_selected_director(&self, id: &i32) -> bool {
        self.filter.director == Some(*id)
    }

    pub fn is_selected_genre(&self, id: &i32) -> bool {
        self.selected_genres.contains(id)
    }

    pub fn rating_min_value(&self) -> String {
        self.filter.rating_min.map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn rating_max_value(&self) -> String {
        self.filter.rating_max.map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn genres_value(&self) -> String {
        join_ids(self.selected_genres.iter())
    }

    /// The current filter with genre `id` switched on or off.
    pub fn genre_toggle_url(&self, id: &i32) -> String {
        let genres = if self.is_selected_genre(id) {
            join_ids(self.selected_genres.iter().filter(|g| *g != id))
        } else {
            join_ids(self.selected_genres.iter().chain(std::iter::once(id)))
        };
        format!(
            "/movies/filter/?rating_min={}&rating_max={}&director={}&genres={}",
            self.rating_min_value(),
            self.rating_max_value(),
            self.filter.director.map(|d| d.to_string()).unwrap_or_default(),
            genres
        )
    }
}

fn join_ids<'a, I: Iterator<Item = &'a i32>>(ids: I) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

#[get("/movies/filter/")]
pub async fn view_filter(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<MovieFilter>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let filter = query.into_inner();

    Ok(MovieFilterTemplate {
        client,
        movies: movies::filter(db, &filter).await?,
        directors: directors::all(db).await?,
        genres: genres::all(db).await?,
        selected_genres: filter.genre_ids(),
        filter,
    }
    .to_response())
}

#[get("/movies/archive/{year}/")]
pub async fn view_year_archive(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    #[derive(Template)]
    #[template(path = "movie_archive_year.html")]
    pub struct YearArchiveTemplate {
        pub client: ClientCtx,
        pub year: i32,
        pub movies: Vec<movie::Model>,
    }

    let year = path.into_inner();
    Ok(YearArchiveTemplate {
        client,
        year,
        movies: movies::year_archive(db.get_ref(), year).await?,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "movie_detail.html")]
pub struct MovieDetailTemplate {
    pub client: ClientCtx,
    pub detail: movies::MovieDetail,
    pub movie_rating: MovieRating,
    pub comments: Vec<CommentDisplay>,
    pub similar_movies: Vec<movie::Model>,
    /// Requester-only context; empty for guests.
    pub user_rating: Option<f64>,
    pub on_watchlist: bool,
    pub count_in_lists: u64,
    pub count_in_my_lists: u64,
    pub my_lists: Vec<ListWithMovies>,
}

#[get("/movies/{slug}/")]
pub async fn view_movie(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let movie = movies::find_by_slug(db, &path.into_inner()).await?;
    let movie_id = movie.id;

    let movie_rating = rating::movie_rating(db, movie_id)
        .await?
        .ok_or(AppError::NotFound("Movie"))?;
    let comments = comments::list_comments(db, CommentTarget::Movie, movie_id).await?;
    let similar_movies =
        movies::similar_movies(db, movie_id, app_config::limits().similar_movies as u64).await?;
    let detail = movies::detail(db, movie).await?;

    let mut template = MovieDetailTemplate {
        client,
        detail,
        movie_rating,
        comments,
        similar_movies,
        user_rating: None,
        on_watchlist: false,
        count_in_lists: 0,
        count_in_my_lists: 0,
        my_lists: Vec::new(),
    };

    if let Some(user_id) = template.client.get_id() {
        template.user_rating = rating::user_rating(db, user_id, movie_id).await?;
        template.on_watchlist = lists::is_on_watchlist(db, movie_id, user_id).await?;
        template.count_in_lists = lists::count_lists_containing(db, movie_id, user_id).await?;
        template.count_in_my_lists =
            lists::count_user_lists_containing(db, movie_id, user_id).await?;
        template.my_lists = lists::user_lists(db, user_id).await?;
    }

    Ok(template.to_response())
}

#[post("/movies/{id}/comments")]
pub async fn post_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    let movie = movies::find_by_id(db, path.into_inner()).await?;
    comments::create_comment(db, CommentTarget::Movie, movie.id, user_id, &form.text).await?;
    Ok(redirect(movie.get_absolute_url()))
}

#[post("/movies/{id}/watchlist")]
pub async fn post_watchlist(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;

    let db = db.get_ref();
    let movie = movies::find_by_id(db, path.into_inner()).await?;
    lists::toggle_watchlist(db, movie.id, user_id).await?;
    Ok(redirect(movie.get_absolute_url()))
}

#[post("/movies/{id}/rate")]
pub async fn post_rating(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<RatingForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    let movie = movies::find_by_id(db, path.into_inner()).await?;
    rating::rate_movie(db, user_id, movie.id, form.value).await?;
    Ok(redirect(movie.get_absolute_url()))
}

#[post("/movies/{id}/lists")]
pub async fn post_add_to_list(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<AddToListForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;

    let db = db.get_ref();
    let movie = movies::find_by_id(db, path.into_inner()).await?;
    if form.list_id != 0 {
        lists::add_movie_to_list(db, form.list_id, movie.id, user_id).await?;
    }
    Ok(redirect(movie.get_absolute_url()))
}
