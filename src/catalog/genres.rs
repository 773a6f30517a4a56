use crate::error::{Error, Result};
use crate::orm::genres;
use sea_orm::{entity::*, query::*, ConnectionTrait};

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<genres::Model>> {
    Ok(genres::Entity::find()
        .order_by_asc(genres::Column::Name)
        .all(db)
        .await?)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<genres::Model> {
    genres::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Genre"))
}
