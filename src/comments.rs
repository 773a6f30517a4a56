//! Comments on movies, actors and directors.
//!
//! The three comment tables share one shape; [`CommentTarget`] picks the
//! table. Only a comment's author may edit or delete it.

use crate::app_config;
use crate::error::{Error, Result};
use crate::orm::{actor_comments, actors, director_comments, directors, movie_comments, movies, users};
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, FromQueryResult, JoinType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentTarget {
    Movie,
    Actor,
    Director,
}

impl CommentTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentTarget::Movie => "movie",
            CommentTarget::Actor => "actor",
            CommentTarget::Director => "director",
        }
    }
}

impl fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment joined with its author's username.
#[derive(Clone, Debug, FromQueryResult, Serialize)]
pub struct CommentDisplay {
    pub id: i32,
    pub text: String,
    pub author_id: i32,
    pub author_name: String,
    pub target_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CommentDisplay {
    pub fn was_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Select of one comment table with the author's username and the target id
/// aliased to `target_id`.
macro_rules! comment_select {
    ($table:ident, $target:ident) => {
        $table::Entity::find()
            .select_only()
            .column($table::Column::Id)
            .column($table::Column::Text)
            .column($table::Column::AuthorId)
            .column_as(users::Column::Username, "author_name")
            .column_as($table::Column::$target, "target_id")
            .column($table::Column::CreatedAt)
            .column($table::Column::UpdatedAt)
            .join(JoinType::InnerJoin, $table::Relation::Author.def())
    };
}

pub fn validate_comment_text(text: &str) -> Result<()> {
    let max = app_config::limits().max_comment_length as usize;
    if text.trim().is_empty() {
        return Err(Error::invalid_field("text", "required", "This field is required."));
    }
    if text.chars().count() > max {
        return Err(Error::invalid_field("text", "length", "Comment is too long."));
    }
    Ok(())
}

async fn require_target<C: ConnectionTrait>(db: &C, target: CommentTarget, target_id: i32) -> Result<()> {
    let found = match target {
        CommentTarget::Movie => movies::Entity::find_by_id(target_id).one(db).await?.is_some(),
        CommentTarget::Actor => actors::Entity::find_by_id(target_id).one(db).await?.is_some(),
        CommentTarget::Director => directors::Entity::find_by_id(target_id)
            .one(db)
            .await?
            .is_some(),
    };
    if found {
        Ok(())
    } else {
        Err(Error::NotFound(match target {
            CommentTarget::Movie => "Movie",
            CommentTarget::Actor => "Actor",
            CommentTarget::Director => "Director",
        }))
    }
}

pub async fn create_comment<C: ConnectionTrait>(
    db: &C,
    target: CommentTarget,
    target_id: i32,
    author_id: i32,
    text: &str,
) -> Result<CommentDisplay> {
    validate_comment_text(text)?;
    require_target(db, target, target_id).await?;

    let now = Utc::now().naive_utc();
    let id = match target {
        CommentTarget::Movie => {
            movie_comments::ActiveModel {
                text: Set(text.to_owned()),
                author_id: Set(author_id),
                movie_id: Set(target_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
        CommentTarget::Actor => {
            actor_comments::ActiveModel {
                text: Set(text.to_owned()),
                author_id: Set(author_id),
                actor_id: Set(target_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
        CommentTarget::Director => {
            director_comments::ActiveModel {
                text: Set(text.to_owned()),
                author_id: Set(author_id),
                director_id: Set(target_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
            .id
        }
    };

    log::debug!("User {} commented on {} {}", author_id, target, target_id);
    find_comment(db, target, id).await
}

/// Comments on one target, newest first.
pub async fn list_comments<C: ConnectionTrait>(
    db: &C,
    target: CommentTarget,
    target_id: i32,
) -> Result<Vec<CommentDisplay>> {
    let comments = match target {
        CommentTarget::Movie => {
            comment_select!(movie_comments, MovieId)
                .filter(movie_comments::Column::MovieId.eq(target_id))
                .order_by_desc(movie_comments::Column::CreatedAt)
                .order_by_desc(movie_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
        CommentTarget::Actor => {
            comment_select!(actor_comments, ActorId)
                .filter(actor_comments::Column::ActorId.eq(target_id))
                .order_by_desc(actor_comments::Column::CreatedAt)
                .order_by_desc(actor_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
        CommentTarget::Director => {
            comment_select!(director_comments, DirectorId)
                .filter(director_comments::Column::DirectorId.eq(target_id))
                .order_by_desc(director_comments::Column::CreatedAt)
                .order_by_desc(director_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
    };
    Ok(comments)
}

/// Every comment of one kind, oldest first.
pub async fn all_comments<C: ConnectionTrait>(db: &C, target: CommentTarget) -> Result<Vec<CommentDisplay>> {
    let comments = match target {
        CommentTarget::Movie => {
            comment_select!(movie_comments, MovieId)
                .order_by_asc(movie_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
        CommentTarget::Actor => {
            comment_select!(actor_comments, ActorId)
                .order_by_asc(actor_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
        CommentTarget::Director => {
            comment_select!(director_comments, DirectorId)
                .order_by_asc(director_comments::Column::Id)
                .into_model::<CommentDisplay>()
                .all(db)
                .await?
        }
    };
    Ok(comments)
}

pub async fn find_comment<C: ConnectionTrait>(
    db: &C,
    target: CommentTarget,
    id: i32,
) -> Result<CommentDisplay> {
    let comment = match target {
        CommentTarget::Movie => {
            comment_select!(movie_comments, MovieId)
                .filter(movie_comments::Column::Id.eq(id))
                .into_model::<CommentDisplay>()
                .one(db)
                .await?
        }
        CommentTarget::Actor => {
            comment_select!(actor_comments, ActorId)
                .filter(actor_comments::Column::Id.eq(id))
                .into_model::<CommentDisplay>()
                .one(db)
                .await?
        }
        CommentTarget::Director => {
            comment_select!(director_comments, DirectorId)
                .filter(director_comments::Column::Id.eq(id))
                .into_model::<CommentDisplay>()
                .one(db)
                .await?
        }
    };
    comment.ok_or(Error::NotFound("Comment"))
}

fn require_author(comment: &CommentDisplay, requester_id: i32) -> Result<()> {
    if comment.author_id == requester_id {
        Ok(())
    } else {
        Err(Error::permission_denied(
            "You can only change your own comments.",
        ))
    }
}

pub async fn update_comment<C: ConnectionTrait>(
    db: &C,
    target: CommentTarget,
    id: i32,
    requester_id: i32,
    text: &str,
) -> Result<CommentDisplay> {
    validate_comment_text(text)?;
    let comment = find_comment(db, target, id).await?;
    require_author(&comment, requester_id)?;

    let now = Utc::now().naive_utc();
    match target {
        CommentTarget::Movie => {
            movie_comments::Entity::update_many()
                .col_expr(movie_comments::Column::Text, Expr::value(text))
                .col_expr(movie_comments::Column::UpdatedAt, Expr::value(now))
                .filter(movie_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
        CommentTarget::Actor => {
            actor_comments::Entity::update_many()
                .col_expr(actor_comments::Column::Text, Expr::value(text))
                .col_expr(actor_comments::Column::UpdatedAt, Expr::value(now))
                .filter(actor_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
        CommentTarget::Director => {
            director_comments::Entity::update_many()
                .col_expr(director_comments::Column::Text, Expr::value(text))
                .col_expr(director_comments::Column::UpdatedAt, Expr::value(now))
                .filter(director_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
    }

    find_comment(db, target, id).await
}

/// Deletes a comment. Anyone but the author gets a permission error and the
/// comment stays.
pub async fn delete_comment<C: ConnectionTrait>(
    db: &C,
    target: CommentTarget,
    id: i32,
    requester_id: i32,
) -> Result<CommentDisplay> {
    let comment = find_comment(db, target, id).await?;
    require_author(&comment, requester_id)?;

    match target {
        CommentTarget::Movie => {
            movie_comments::Entity::delete_many()
                .filter(movie_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
        CommentTarget::Actor => {
            actor_comments::Entity::delete_many()
                .filter(actor_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
        CommentTarget::Director => {
            director_comments::Entity::delete_many()
                .filter(director_comments::Column::Id.eq(id))
                .exec(db)
                .await?;
        }
    }

    log::info!("User {} deleted {} comment {}", requester_id, target, id);
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_path_segment() {
        let target: CommentTarget = serde_json::from_str("\"director\"").unwrap();
        assert_eq!(target, CommentTarget::Director);
        assert_eq!(CommentTarget::Movie.to_string(), "movie");
        assert!(serde_json::from_str::<CommentTarget>("\"genre\"").is_err());
    }

    #[test]
    fn test_blank_comment_is_rejected() {
        assert!(validate_comment_text("   ").is_err());
        assert!(validate_comment_text("Great film").is_ok());
    }
}
