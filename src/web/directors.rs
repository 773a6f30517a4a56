use super::actors::PageQuery;
use super::redirect;
use crate::app_config;
use crate::catalog::{self, directors};
use crate::comments::{self, CommentDisplay, CommentTarget};
use crate::error::Error as AppError;
use crate::forms::CommentForm;
use crate::middleware::ClientCtx;
use crate::rating::DirectorRating;
use crate::template::Paginator;
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_directors)
        .service(view_director)
        .service(post_comment);
}

#[derive(Template)]
#[template(path = "director_list.html")]
pub struct DirectorListTemplate {
    pub client: ClientCtx,
    pub directors: Vec<DirectorRating>,
    pub paginator: Paginator,
}

#[get("/directors/")]
pub async fn view_directors(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let page = catalog::page_index(query.page);
    let per_page = app_config::limits().directors_per_page as usize;
    let (directors, page_count) = directors::paginated(db.get_ref(), page, per_page).await?;

    if page > 0 && page >= page_count {
        return Err(AppError::NotFound("Page").into());
    }

    Ok(DirectorListTemplate {
        client,
        directors,
        paginator: Paginator::new("/directors/", page + 1, page_count),
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "director_detail.html")]
pub struct DirectorDetailTemplate {
    pub client: ClientCtx,
    pub detail: directors::DirectorDetail,
    pub comments: Vec<CommentDisplay>,
}

#[get("/directors/{id}/")]
pub async fn view_director(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let id = path.into_inner();

    Ok(DirectorDetailTemplate {
        client,
        detail: directors::detail(db, id).await?,
        comments: comments::list_comments(db, CommentTarget::Director, id).await?,
    }
    .to_response())
}

#[post("/directors/{id}/comments")]
pub async fn post_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    let director = directors::find(db, path.into_inner()).await?;
    comments::create_comment(db, CommentTarget::Director, director.id, user_id, &form.text)
        .await?;
    Ok(redirect(director.get_url()))
}
