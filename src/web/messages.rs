use super::redirect;
use crate::error::Error as AppError;
use crate::forms::{MessageForm, ReplyForm};
use crate::messages::{self, MessageDisplay};
use crate::middleware::ClientCtx;
use crate::user::{self, Profile};
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_new_message)
        .service(send_message)
        .service(view_messages)
        .service(post_reply)
        .service(view_message);
}

#[derive(Deserialize)]
pub struct ComposeQuery {
    /// Pre-selected addressee.
    pub to: Option<i32>,
}

#[derive(Template)]
#[template(path = "message_new.html")]
pub struct NewMessageTemplate {
    pub client: ClientCtx,
    pub addressees: Vec<Profile>,
    pub selected: Option<i32>,
}

impl NewMessageTemplate {
    pub fn is_selected(&self, id: &i32) -> bool {
        self.selected == Some(*id)
    }
}

#[get("/messages/new")]
pub async fn view_new_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ComposeQuery>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let addressees = user::all_users(db.get_ref())
        .await?
        .into_iter()
        .filter(|u| u.id != user_id)
        .collect();

    Ok(NewMessageTemplate {
        client,
        addressees,
        selected: query.to,
    }
    .to_response())
}

#[post("/messages/new")]
pub async fn send_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<MessageForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    messages::send_message(db.get_ref(), user_id, form.addressee, &form.text).await?;
    Ok(redirect("/messages/"))
}

#[derive(Template)]
#[template(path = "message_list.html")]
pub struct MessageListTemplate {
    pub client: ClientCtx,
    pub inbox: Vec<MessageDisplay>,
    pub sent: Vec<MessageDisplay>,
}

#[get("/messages/")]
pub async fn view_messages(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let db = db.get_ref();

    Ok(MessageListTemplate {
        client,
        inbox: messages::inbox(db, user_id).await?,
        sent: messages::sent(db, user_id).await?,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "message_detail.html")]
pub struct MessageDetailTemplate {
    pub client: ClientCtx,
    pub message: MessageDisplay,
    pub quote: String,
}

#[get("/messages/{id}/")]
pub async fn view_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let message = messages::open_message(db.get_ref(), path.into_inner(), user_id).await?;
    let quote = messages::reply_quote(&message);

    Ok(MessageDetailTemplate {
        client,
        message,
        quote,
    }
    .to_response())
}

#[post("/messages/reply")]
pub async fn post_reply(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<ReplyForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    messages::reply_to(db.get_ref(), form.message_id, user_id, &form.text).await?;
    Ok(redirect("/messages/"))
}
