//! SeaORM Entity for users table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id PHC string.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::personal_lists::Entity")]
    PersonalLists,
    #[sea_orm(has_many = "super::user_movie_ratings::Entity")]
    MovieRatings,
    #[sea_orm(has_many = "super::movie_comments::Entity")]
    MovieComments,
}

impl Related<super::personal_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonalLists.def()
    }
}

impl Related<super::user_movie_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieRatings.def()
    }
}

impl Related<super::movie_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieComments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
