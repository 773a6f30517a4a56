//! Comments, messages and personal lists over JSON.

use super::serializers::{
    CommentSerializer, MessageSerializer, MessageWriteSerializer, PersonalMovieListSerializer,
};
use super::{ApiPage, PageQuery};
use crate::comments::{self, CommentTarget};
use crate::error::Error as AppError;
use crate::forms::{AdminCommentForm, ApiCommentForm, ApiListForm, ApiMessageForm};
use crate::lists;
use crate::messages;
use crate::middleware::ClientCtx;
use actix_web::{delete, get, post, put, web, Error, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_comment)
        .service(create_comment_as)
        .service(delete_comment)
        .service(list_messages)
        .service(create_message)
        .service(view_message)
        .service(update_message)
        .service(delete_message)
        .service(list_lists)
        .service(view_list)
        .service(update_list);
}

#[post("/comments/")]
pub async fn create_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Json<ApiCommentForm>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let comment =
        comments::create_comment(db.get_ref(), CommentTarget::Movie, form.movie, user_id, &form.text)
            .await?;
    Ok(HttpResponse::Created().json(CommentSerializer::from(comment)))
}

/// Staff may post on behalf of any user.
#[post("/admin/comments/")]
pub async fn create_comment_as(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Json<AdminCommentForm>,
) -> Result<HttpResponse, Error> {
    let staff_id = client.require_staff()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    if crate::user::Profile::get_by_id(db, form.author)
        .await?
        .is_none()
    {
        return Err(AppError::invalid_field("author", "does_not_exist", "Select a valid author.").into());
    }

    let comment =
        comments::create_comment(db, CommentTarget::Movie, form.movie, form.author, &form.text)
            .await?;
    log::info!(
        "Staff {} posted comment {} as user {}",
        staff_id,
        comment.id,
        form.author
    );
    Ok(HttpResponse::Created().json(CommentSerializer::from(comment)))
}

#[delete("/comments/{id}/")]
pub async fn delete_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    comments::delete_comment(db.get_ref(), CommentTarget::Movie, path.into_inner(), user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Staff see every message; everyone else sees what they sent or received.
#[get("/messages/")]
pub async fn list_messages(
    req: HttpRequest,
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let db = db.get_ref();

    let mut rows = if client.is_staff() {
        messages::all_messages(db).await?
    } else {
        let mut rows = messages::inbox(db, user_id).await?;
        rows.extend(messages::sent(db, user_id).await?);
        rows
    };
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let rows = rows.into_iter().map(MessageSerializer::from).collect();
    Ok(HttpResponse::Ok().json(ApiPage::from_vec(&req, query.page, rows)?))
}

#[post("/messages/")]
pub async fn create_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Json<ApiMessageForm>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let message = messages::send_message(db.get_ref(), user_id, form.addressee, &form.text).await?;
    Ok(HttpResponse::Created().json(MessageWriteSerializer::from(message)))
}

#[get("/messages/{id}/")]
pub async fn view_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let message = messages::find_message(db.get_ref(), path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(MessageWriteSerializer::from(message)))
}

#[put("/messages/{id}/")]
pub async fn update_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<ApiMessageForm>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let message = messages::update_message(
        db.get_ref(),
        path.into_inner(),
        user_id,
        form.addressee,
        &form.text,
    )
    .await?;
    Ok(HttpResponse::Ok().json(MessageWriteSerializer::from(message)))
}

#[delete("/messages/{id}/")]
pub async fn delete_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    messages::delete_message(db.get_ref(), path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/lists/")]
pub async fn list_lists(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let rows = lists::all_lists(db.get_ref())
        .await?
        .into_iter()
        .map(PersonalMovieListSerializer::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiPage::from_vec(&req, query.page, rows)?))
}

#[get("/lists/{id}/")]
pub async fn view_list(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let list = lists::find_list(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PersonalMovieListSerializer::from(list)))
}

#[put("/lists/{id}/")]
pub async fn update_list(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<ApiListForm>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    let list = lists::rename_list(db, path.into_inner(), user_id, &form.name).await?;
    let list = lists::find_list(db, list.id).await?;
    Ok(HttpResponse::Ok().json(PersonalMovieListSerializer::from(list)))
}
