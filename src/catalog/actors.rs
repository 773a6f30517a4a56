use crate::error::{Error, Result};
use crate::filter::{text_match, ActorFilter, ActorNameFilter, TextMatch};
use crate::orm::{actors, directors, movies};
use crate::rating::{actor_rating, actor_ratings_query, ActorRating};
use chrono::NaiveDate;
use sea_orm::{entity::*, query::*, ConnectionTrait};

pub struct NewActor<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub birth_date: NaiveDate,
    pub sex: &'a str,
}

/// An actor's movies, each with its director.
#[derive(Clone, Debug)]
pub struct ActorDetail {
    pub actor: actors::Model,
    pub rating: ActorRating,
    pub movies: Vec<(movies::Model, Option<directors::Model>)>,
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<actors::Model> {
    actors::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Actor"))
}

/// One page of actors with their ratings, and the page count.
pub async fn paginated<C: ConnectionTrait>(
    db: &C,
    page: usize,
    per_page: usize,
) -> Result<(Vec<ActorRating>, usize)> {
    let paginator = actor_ratings_query()
        .into_model::<ActorRating>()
        .paginate(db, per_page);
    let pages = paginator.num_pages().await?;
    let actors = paginator.fetch_page(page).await?;
    Ok((actors, pages))
}

/// Movies newest first, with their directors.
pub async fn movies_of<C: ConnectionTrait>(
    db: &C,
    actor: &actors::Model,
) -> Result<Vec<(movies::Model, Option<directors::Model>)>> {
    Ok(actor
        .find_related(movies::Entity)
        .find_also_related(directors::Entity)
        .order_by_desc(movies::Column::Date)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

pub async fn detail<C: ConnectionTrait>(db: &C, id: i32) -> Result<ActorDetail> {
    let actor = find(db, id).await?;
    let rating = actor_rating(db, id)
        .await?
        .ok_or(Error::NotFound("Actor"))?;
    let movies = movies_of(db, &actor).await?;
    Ok(ActorDetail {
        actor,
        rating,
        movies,
    })
}

pub async fn create_actor<C: ConnectionTrait>(db: &C, new_actor: NewActor<'_>) -> Result<actors::Model> {
    let actor = actors::ActiveModel {
        first_name: Set(new_actor.first_name.to_owned()),
        last_name: Set(new_actor.last_name.to_owned()),
        birth_date: Set(new_actor.birth_date),
        sex: Set(new_actor.sex.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("Created actor {} ({})", actor.full_name(), actor.id);
    Ok(actor)
}

pub async fn filter<C: ConnectionTrait>(db: &C, filter: &ActorFilter) -> Result<Vec<actors::Model>> {
    Ok(filter
        .apply(actors::Entity::find())
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
        .all(db)
        .await?)
}

/// Actors of one sex, or everyone when `sex` is `None`, by last name.
pub fn by_sex_query(sex: Option<&str>) -> Select<actors::Entity> {
    let query = match sex {
        Some(sex) => actors::Entity::find().filter(actors::Column::Sex.eq(sex)),
        None => actors::Entity::find(),
    };
    query
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
}

/// Ratings of actors whose last name contains the pattern.
pub async fn with_ratings<C: ConnectionTrait>(
    db: &C,
    filter: &ActorNameFilter,
) -> Result<Vec<ActorRating>> {
    Ok(filter
        .apply(actor_ratings_query())
        .into_model::<ActorRating>()
        .all(db)
        .await?)
}

/// First or last name prefix search.
pub async fn search_prefix<C: ConnectionTrait>(db: &C, pattern: &str) -> Result<Vec<ActorRating>> {
    Ok(actor_ratings_query()
        .filter(text_match::<actors::Entity>(
            &[actors::Column::FirstName, actors::Column::LastName],
            pattern,
            TextMatch::StartsWith,
        ))
        .into_model::<ActorRating>()
        .all(db)
        .await?)
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<actors::Model>> {
    Ok(actors::Entity::find()
        .order_by_asc(actors::Column::LastName)
        .order_by_asc(actors::Column::Id)
        .all(db)
        .await?)
}

/// Every actor with their movies by id.
pub async fn with_movies<C: ConnectionTrait>(db: &C) -> Result<Vec<(actors::Model, Vec<movies::Model>)>> {
    let actors = all(db).await?;

    let mut result = Vec::with_capacity(actors.len());
    for actor in actors {
        let movies = actor
            .find_related(movies::Entity)
            .order_by_asc(movies::Column::Id)
            .all(db)
            .await?;
        result.push((actor, movies));
    }
    Ok(result)
}
