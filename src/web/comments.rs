use super::redirect;
use crate::catalog::{actors, directors, movies};
use crate::comments::{self, CommentDisplay, CommentTarget};
use crate::error::Error as AppError;
use crate::forms::CommentForm;
use crate::middleware::ClientCtx;
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_edit_comment)
        .service(update_comment)
        .service(delete_comment);
}

/// Detail page of the thing a comment is attached to.
async fn target_url(
    db: &DatabaseConnection,
    target: CommentTarget,
    target_id: i32,
) -> Result<String, AppError> {
    Ok(match target {
        CommentTarget::Movie => movies::find_by_id(db, target_id).await?.get_absolute_url(),
        CommentTarget::Actor => actors::find(db, target_id).await?.get_url(),
        CommentTarget::Director => directors::find(db, target_id).await?.get_url(),
    })
}

#[derive(Template)]
#[template(path = "comment_edit.html")]
pub struct EditCommentTemplate {
    pub client: ClientCtx,
    pub target: CommentTarget,
    pub comment: CommentDisplay,
    pub back_url: String,
}

#[get("/comments/{kind}/{id}/edit")]
pub async fn view_edit_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(CommentTarget, i32)>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let (target, id) = path.into_inner();
    let db = db.get_ref();

    let comment = comments::find_comment(db, target, id).await?;
    if comment.author_id != user_id {
        return Err(AppError::permission_denied("You can only change your own comments.").into());
    }
    let back_url = target_url(db, target, comment.target_id).await?;

    Ok(EditCommentTemplate {
        client,
        target,
        comment,
        back_url,
    }
    .to_response())
}

#[post("/comments/{kind}/{id}/edit")]
pub async fn update_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(CommentTarget, i32)>,
    form: web::Form<CommentForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;
    let (target, id) = path.into_inner();
    let db = db.get_ref();

    let comment = comments::update_comment(db, target, id, user_id, &form.text).await?;
    Ok(redirect(target_url(db, target, comment.target_id).await?))
}

#[post("/comments/{kind}/{id}/delete")]
pub async fn delete_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(CommentTarget, i32)>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let (target, id) = path.into_inner();
    let db = db.get_ref();

    let comment = comments::delete_comment(db, target, id, user_id).await?;
    Ok(redirect(target_url(db, target, comment.target_id).await?))
}
