//! Login, logout, sign-up and user profiles.

use super::redirect;
use crate::error::Error as AppError;
use crate::forms::{AccountForm, LoginForm, ProfileForm};
use crate::middleware::ClientCtx;
use crate::session;
use crate::user::{self, NewUser, Profile, ProfileUpdate};
use actix_session::Session;
use actix_web::{get, post, web, Either, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_login)
        .service(post_login)
        .service(view_logout)
        .service(view_create_account)
        .service(post_create_account)
        .service(view_profile)
        .service(post_profile);
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub client: ClientCtx,
    pub username: String,
    pub error: Option<&'static str>,
}

#[get("/login")]
pub async fn view_login(client: ClientCtx) -> impl Responder {
    LoginTemplate {
        client,
        username: String::new(),
        error: None,
    }
    .to_response()
}

#[post("/login")]
pub async fn post_login(
    client: ClientCtx,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, Error> {
    form.validate().map_err(AppError::Validation)?;

    match user::authenticate(db.get_ref(), &form.username, &form.password).await? {
        Some(user_id) => {
            session::login(&cookies, user_id)?;
            log::info!("User {} logged in", user_id);
            Ok(Either::Left(redirect("/")))
        }
        None => {
            log::debug!("post_login: bad credentials for {:?}", form.username);
            Ok(Either::Right(
                LoginTemplate {
                    client,
                    username: form.into_inner().username,
                    error: Some("Incorrect username or password."),
                }
                .to_response(),
            ))
        }
    }
}

#[get("/logout")]
pub async fn view_logout(cookies: Session) -> impl Responder {
    session::logout(&cookies);
    redirect("/")
}

#[derive(Template)]
#[template(path = "create_account.html")]
pub struct CreateAccountTemplate {
    pub client: ClientCtx,
}

#[get("/account/new")]
pub async fn view_create_account(client: ClientCtx) -> impl Responder {
    CreateAccountTemplate { client }.to_response()
}

#[post("/account/new")]
pub async fn post_create_account(
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<AccountForm>,
) -> Result<impl Responder, Error> {
    form.validate().map_err(AppError::Validation)?;

    let profile = user::create_user(
        db.get_ref(),
        NewUser {
            username: form.username.trim(),
            password: &form.password1,
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: None,
        },
    )
    .await?;

    session::login(&cookies, profile.id)?;
    Ok(redirect(profile.get_url()))
}

#[derive(Template)]
#[template(path = "user_profile.html")]
pub struct ProfileTemplate {
    pub client: ClientCtx,
    pub profile: Profile,
}

impl ProfileTemplate {
    pub fn email_value(&self) -> &str {
        self.profile.email.as_deref().unwrap_or_default()
    }
}

#[get("/users/{id}/")]
pub async fn view_profile(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let profile = Profile::get_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(ProfileTemplate { client, profile }.to_response())
}

#[post("/users/{id}/")]
pub async fn post_profile(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<ProfileForm>,
) -> Result<impl Responder, Error> {
    let requester_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let profile = user::update_profile(
        db.get_ref(),
        path.into_inner(),
        requester_id,
        ProfileUpdate {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: Some(form.email.trim()),
        },
    )
    .await?;

    Ok(redirect(profile.get_url()))
}
