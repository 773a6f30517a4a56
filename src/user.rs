use crate::error::{Error, Result};
use crate::orm::users;
use crate::session::{hash_password, verify_password};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, FromQueryResult};

/// Base URL fragment for resource.
pub static RESOURCE_URL: &str = "users";

/// Public view of a user. Never carries the password hash.
#[derive(Clone, Debug, FromQueryResult)]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for Profile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_staff: user.is_staff,
            created_at: user.created_at,
        }
    }
}

impl Profile {
    /// Returns a user profile by id.
    pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Self>> {
        Ok(users::Entity::find_by_id(id).one(db).await?.map(Self::from))
    }

    pub fn get_url(&self) -> String {
        format!("/{}/{}/", RESOURCE_URL, self.id)
    }
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
}

/// Creates an account. Usernames are unique.
pub async fn create_user<C: ConnectionTrait>(db: &C, new_user: NewUser<'_>) -> Result<Profile> {
    if find_by_username(db, new_user.username).await?.is_some() {
        return Err(Error::invalid_field(
            "username",
            "unique",
            "A user with that username already exists.",
        ));
    }

    let password = hash_password(new_user.password)
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

    let user = users::ActiveModel {
        username: Set(new_user.username.to_owned()),
        password: Set(password),
        first_name: Set(new_user.first_name.to_owned()),
        last_name: Set(new_user.last_name.to_owned()),
        email: Set(new_user.email.map(|e| e.to_owned())),
        is_staff: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("Created user {} ({})", user.username, user.id);
    Ok(user.into())
}

/// Username/password check. Returns the user id on success.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<i32>> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(user.and_then(|user| {
        if verify_password(password, &user.password) {
            Some(user.id)
        } else {
            None
        }
    }))
}

pub async fn find_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<Profile>> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
        .map(Profile::from))
}

/// Everyone, by username. Used for addressee choices.
pub async fn all_users<C: ConnectionTrait>(db: &C) -> Result<Vec<Profile>> {
    Ok(users::Entity::find()
        .order_by_asc(users::Column::Username)
        .all(db)
        .await?
        .into_iter()
        .map(Profile::from)
        .collect())
}

pub struct ProfileUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: Option<&'a str>,
}

/// Updates a user's own profile fields.
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    requester_id: i32,
    update: ProfileUpdate<'_>,
) -> Result<Profile> {
    if user_id != requester_id {
        return Err(Error::permission_denied(
            "You can only edit your own profile.",
        ));
    }

    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("User"))?;

    let mut user: users::ActiveModel = user.into();
    user.first_name = Set(update.first_name.to_owned());
    user.last_name = Set(update.last_name.to_owned());
    user.email = Set(update.email.filter(|e| !e.is_empty()).map(|e| e.to_owned()));

    Ok(user.update(db).await?.into())
}
