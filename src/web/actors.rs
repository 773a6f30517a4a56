use super::redirect;
use crate::app_config;
use crate::catalog::{self, actors, directors, movies};
use crate::comments::{self, CommentDisplay, CommentTarget};
use crate::error::Error as AppError;
use crate::filter::ActorFilter;
use crate::forms::{ActorForm, CommentForm};
use crate::middleware::ClientCtx;
use crate::orm::{actors as actor, directors as director, movies as movie};
use crate::rating::ActorRating;
use crate::template::Paginator;
use actix_web::{get, post, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Fixed paths before `/actors/{id}/`.
    conf.service(view_actors)
        .service(view_filter)
        .service(view_new_actor)
        .service(create_actor)
        .service(view_actor)
        .service(post_comment);
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Template)]
#[template(path = "actor_list.html")]
pub struct ActorListTemplate {
    pub client: ClientCtx,
    pub actors: Vec<ActorRating>,
    pub paginator: Paginator,
}

#[get("/actors/")]
pub async fn view_actors(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let page = catalog::page_index(query.page);
    let per_page = app_config::limits().actors_per_page as usize;
    let (actors, page_count) = actors::paginated(db.get_ref(), page, per_page).await?;

    // Past the end.
    if page > 0 && page >= page_count {
        return Err(AppError::NotFound("Page").into());
    }

    Ok(ActorListTemplate {
        client,
        actors,
        paginator: Paginator::new("/actors/", page + 1, page_count),
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "filter_actor_list.html")]
pub struct ActorFilterTemplate {
    pub client: ClientCtx,
    pub actors: Vec<actor::Model>,
    pub movies: Vec<movie::Model>,
    pub directors: Vec<director::Model>,
    pub filter: ActorFilter,
}

impl ActorFilterTemplate {
    pub fn first_name_value(&self) -> &str {
        self.filter.first_name.as_deref().unwrap_or_default()
    }

    pub fn birth_date_value(&self) -> &str {
        self.filter.birth_date.as_deref().unwrap_or_default()
    }

    pub fn is_selected_movie(&self, id: &i32) -> bool {
        self.filter.movie == Some(*id)
    }

    pub fn is_selected_director(&self, id: &i32) -> bool {
        self.filter.director == Some(*id)
    }
}

#[get("/actors/filter/")]
pub async fn view_filter(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ActorFilter>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let filter = query.into_inner();

    Ok(ActorFilterTemplate {
        client,
        actors: actors::filter(db, &filter).await?,
        movies: movies::all_by_title(db).await?,
        directors: directors::all(db).await?,
        filter,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "actor_new.html")]
pub struct NewActorTemplate {
    pub client: ClientCtx,
}

#[get("/actors/new")]
pub async fn view_new_actor(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    Ok(NewActorTemplate { client }.to_response())
}

#[post("/actors/new")]
pub async fn create_actor(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Form<ActorForm>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let actor = actors::create_actor(
        db.get_ref(),
        actors::NewActor {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            birth_date: form.birth_date,
            sex: &form.sex,
        },
    )
    .await?;

    Ok(redirect(actor.get_url()))
}

#[derive(Template)]
#[template(path = "actor_detail.html")]
pub struct ActorDetailTemplate {
    pub client: ClientCtx,
    pub detail: actors::ActorDetail,
    pub comments: Vec<CommentDisplay>,
}

#[get("/actors/{id}/")]
pub async fn view_actor(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = db.get_ref();
    let id = path.into_inner();

    Ok(ActorDetailTemplate {
        client,
        detail: actors::detail(db, id).await?,
        comments: comments::list_comments(db, CommentTarget::Actor, id).await?,
    }
    .to_response())
}

#[post("/actors/{id}/comments")]
pub async fn post_comment(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    form.validate().map_err(AppError::Validation)?;

    let db = db.get_ref();
    let actor = actors::find(db, path.into_inner()).await?;
    comments::create_comment(db, CommentTarget::Actor, actor.id, user_id, &form.text).await?;
    Ok(redirect(actor.get_url()))
}
