//! Watchlist and personal movie lists.
//!
//! Both are set-membership relations: adding a present movie or removing an
//! absent one changes nothing.

use crate::error::{Error, Result};
use crate::orm::{movies, personal_list_movies, personal_lists, users, watchlist};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, JoinType};

pub const MAX_LIST_NAME_LENGTH: usize = 60;

/// A personal list with its owner's username and its movies by title.
#[derive(Clone, Debug)]
pub struct ListWithMovies {
    pub list: personal_lists::Model,
    pub owner: String,
    pub movies: Vec<movies::Model>,
}

impl ListWithMovies {
    pub fn contains(&self, movie_id: &i32) -> bool {
        self.movies.iter().any(|m| m.id == *movie_id)
    }
}

fn validate_list_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_LIST_NAME_LENGTH {
        return Err(Error::invalid_field(
            "name",
            "length",
            "List names must be between 1 and 60 characters.",
        ));
    }
    Ok(name.to_owned())
}

async fn owned_list<C: ConnectionTrait>(
    db: &C,
    list_id: i32,
    user_id: i32,
) -> Result<personal_lists::Model> {
    let list = personal_lists::Entity::find_by_id(list_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("List"))?;

    if list.user_id != user_id {
        return Err(Error::permission_denied(
            "You can only change your own lists.",
        ));
    }
    Ok(list)
}

async fn require_movie<C: ConnectionTrait>(db: &C, movie_id: i32) -> Result<()> {
    match movies::Entity::find_by_id(movie_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound("Movie")),
    }
}

/// Adds the movie to the user's watchlist, or removes it if already there.
/// Returns whether the movie is on the watchlist afterwards.
pub async fn toggle_watchlist<C: ConnectionTrait>(db: &C, movie_id: i32, user_id: i32) -> Result<bool> {
    require_movie(db, movie_id).await?;

    match watchlist::Entity::find_by_id((movie_id, user_id)).one(db).await? {
        Some(_) => {
            watchlist::Entity::delete_many()
                .filter(watchlist::Column::MovieId.eq(movie_id))
                .filter(watchlist::Column::UserId.eq(user_id))
                .exec(db)
                .await?;
            Ok(false)
        }
        None => {
            watchlist::Entity::insert(watchlist::ActiveModel {
                movie_id: Set(movie_id),
                user_id: Set(user_id),
            })
            .exec(db)
            .await?;
            Ok(true)
        }
    }
}

pub async fn is_on_watchlist<C: ConnectionTrait>(db: &C, movie_id: i32, user_id: i32) -> Result<bool> {
    Ok(watchlist::Entity::find_by_id((movie_id, user_id))
        .one(db)
        .await?
        .is_some())
}

/// The user's watchlist by title.
pub async fn watchlist_movies<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<movies::Model>> {
    Ok(movies::Entity::find()
        .join(JoinType::InnerJoin, movies::Relation::Watchlist.def())
        .filter(watchlist::Column::UserId.eq(user_id))
        .order_by_asc(movies::Column::Title)
        .all(db)
        .await?)
}

pub async fn create_list<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<personal_lists::Model> {
    let name = validate_list_name(name)?;
    let list = personal_lists::ActiveModel {
        name: Set(name),
        user_id: Set(user_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::debug!("User {} created list {}", user_id, list.id);
    Ok(list)
}

pub async fn rename_list<C: ConnectionTrait>(
    db: &C,
    list_id: i32,
    user_id: i32,
    name: &str,
) -> Result<personal_lists::Model> {
    let name = validate_list_name(name)?;
    let mut list: personal_lists::ActiveModel = owned_list(db, list_id, user_id).await?.into();
    list.name = Set(name);
    Ok(list.update(db).await?)
}

/// Returns true when the movie was added, false when it already was there.
pub async fn add_movie_to_list<C: ConnectionTrait>(
    db: &C,
    list_id: i32,
    movie_id: i32,
    user_id: i32,
) -> Result<bool> {
    owned_list(db, list_id, user_id).await?;
    require_movie(db, movie_id).await?;

    if personal_list_movies::Entity::find_by_id((list_id, movie_id))
        .one(db)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    personal_list_movies::Entity::insert(personal_list_movies::ActiveModel {
        list_id: Set(list_id),
        movie_id: Set(movie_id),
    })
    .exec(db)
    .await?;
    Ok(true)
}

/// Returns true when the movie was removed, false when it was not listed.
pub async fn remove_movie_from_list<C: ConnectionTrait>(
    db: &C,
    list_id: i32,
    movie_id: i32,
    user_id: i32,
) -> Result<bool> {
    owned_list(db, list_id, user_id).await?;

    let res = personal_list_movies::Entity::delete_many()
        .filter(personal_list_movies::Column::ListId.eq(list_id))
        .filter(personal_list_movies::Column::MovieId.eq(movie_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

async fn with_movies<C: ConnectionTrait>(
    db: &C,
    list: personal_lists::Model,
    owner: String,
) -> Result<ListWithMovies> {
    let movies = list
        .find_related(movies::Entity)
        .order_by_asc(movies::Column::Title)
        .all(db)
        .await?;
    Ok(ListWithMovies {
        list,
        owner,
        movies,
    })
}

/// The user's lists, oldest first.
pub async fn user_lists<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<ListWithMovies>> {
    let owner = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("User"))?
        .username;

    let lists = personal_lists::Entity::find()
        .filter(personal_lists::Column::UserId.eq(user_id))
        .order_by_asc(personal_lists::Column::CreatedAt)
        .order_by_asc(personal_lists::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(lists.len());
    for list in lists {
        result.push(with_movies(db, list, owner.clone()).await?);
    }
    Ok(result)
}

pub async fn find_list<C: ConnectionTrait>(db: &C, list_id: i32) -> Result<ListWithMovies> {
    let (list, owner) = personal_lists::Entity::find_by_id(list_id)
        .find_also_related(users::Entity)
        .one(db)
        .await?
        .ok_or(Error::NotFound("List"))?;
    let owner = owner.map(|u| u.username).unwrap_or_default();
    with_movies(db, list, owner).await
}

/// Every list of every user.
pub async fn all_lists<C: ConnectionTrait>(db: &C) -> Result<Vec<ListWithMovies>> {
    let lists = personal_lists::Entity::find()
        .find_also_related(users::Entity)
        .order_by_asc(personal_lists::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(lists.len());
    for (list, owner) in lists {
        let owner = owner.map(|u| u.username).unwrap_or_default();
        result.push(with_movies(db, list, owner).await?);
    }
    Ok(result)
}

/// Number of other users' lists that contain the movie.
pub async fn count_lists_containing<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    exclude_user: i32,
) -> Result<u64> {
    Ok(personal_list_movies::Entity::find()
        .join(JoinType::InnerJoin, personal_list_movies::Relation::List.def())
        .filter(personal_list_movies::Column::MovieId.eq(movie_id))
        .filter(personal_lists::Column::UserId.ne(exclude_user))
        .count(db)
        .await? as u64)
}

/// Number of the user's own lists that contain the movie.
pub async fn count_user_lists_containing<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    user_id: i32,
) -> Result<u64> {
    Ok(personal_list_movies::Entity::find()
        .join(JoinType::InnerJoin, personal_list_movies::Relation::List.def())
        .filter(personal_list_movies::Column::MovieId.eq(movie_id))
        .filter(personal_lists::Column::UserId.eq(user_id))
        .count(db)
        .await? as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_name_bounds() {
        assert!(validate_list_name("").is_err());
        assert!(validate_list_name("   ").is_err());
        assert_eq!(validate_list_name(" Favourites ").unwrap(), "Favourites");
        assert!(validate_list_name(&"x".repeat(60)).is_ok());
        assert!(validate_list_name(&"x".repeat(61)).is_err());
    }
}
