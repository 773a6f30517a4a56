use super::redirect;
use crate::error::Error as AppError;
use crate::forms::ListForm;
use crate::lists::{self, ListWithMovies};
use crate::middleware::ClientCtx;
use crate::orm::movies as movie;
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_lists)
        .service(create_list)
        .service(remove_from_list);
}

#[derive(Template)]
#[template(path = "user_movie_lists.html")]
pub struct ListsTemplate {
    pub client: ClientCtx,
    pub lists: Vec<ListWithMovies>,
    pub watchlist: Vec<movie::Model>,
}

#[get("/lists/")]
pub async fn view_lists(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let db = db.get_ref();

    Ok(ListsTemplate {
        client,
        lists: lists::user_lists(db, user_id).await?,
        watchlist: lists::watchlist_movies(db, user_id).await?,
    }
    .to_response())
}

#[post("/lists/")]
pub async fn create_list(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<ListForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    lists::create_list(db.get_ref(), user_id, &form.name).await?;
    Ok(redirect("/lists/"))
}

#[post("/lists/{list_id}/movies/{movie_id}/remove")]
pub async fn remove_from_list(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let (list_id, movie_id) = path.into_inner();

    lists::remove_movie_from_list(db.get_ref(), list_id, movie_id, user_id).await?;
    Ok(redirect("/lists/"))
}
