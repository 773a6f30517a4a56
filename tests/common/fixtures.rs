//! Test fixtures for creating catalogue and community data
#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use moviedb::orm::{actors, directors, genres, movie_actors, movie_genres, movies, users};
use moviedb::user::{self, NewUser, Profile};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

pub const TEST_PASSWORD: &str = "password123";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Create a user with `TEST_PASSWORD`.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Profile {
    user::create_user(
        db,
        NewUser {
            username,
            password: TEST_PASSWORD,
            first_name: "Test",
            last_name: username,
            email: None,
        },
    )
    .await
    .expect("Failed to create user")
}

pub async fn create_staff_user(db: &DatabaseConnection, username: &str) -> Profile {
    let profile = create_test_user(db, username).await;
    let mut user: users::ActiveModel = users::Entity::find_by_id(profile.id)
        .one(db)
        .await
        .expect("Failed to load user")
        .expect("user exists")
        .into();
    user.is_staff = Set(true);
    user.update(db).await.expect("Failed to promote user").into()
}

pub async fn create_director(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<directors::Model, DbErr> {
    directors::ActiveModel {
        first_name: Set(first_name.to_owned()),
        last_name: Set(last_name.to_owned()),
        birth_date: Set(date(1950, 1, 1)),
        sex: Set("M".to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_actor(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    sex: &str,
) -> Result<actors::Model, DbErr> {
    actors::ActiveModel {
        first_name: Set(first_name.to_owned()),
        last_name: Set(last_name.to_owned()),
        birth_date: Set(date(1970, 6, 15)),
        sex: Set(sex.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_genre(db: &DatabaseConnection, name: &str) -> Result<genres::Model, DbErr> {
    genres::ActiveModel {
        name: Set(name.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a movie. The slug is the lowercased title with dashes.
pub async fn create_movie(
    db: &DatabaseConnection,
    title: &str,
    rating: f64,
    released: NaiveDate,
    director: Option<&directors::Model>,
) -> Result<movies::Model, DbErr> {
    movies::ActiveModel {
        title: Set(title.to_owned()),
        rating: Set(rating),
        date: Set(released),
        plot: Set(format!("The plot of {}.", title)),
        slug: Set(title.to_lowercase().replace(' ', "-")),
        imdb_id: Set(String::new()),
        director_id: Set(director.map(|d| d.id)),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn cast(
    db: &DatabaseConnection,
    movie: &movies::Model,
    actor: &actors::Model,
) -> Result<(), DbErr> {
    movie_actors::Entity::insert(movie_actors::ActiveModel {
        movie_id: Set(movie.id),
        actor_id: Set(actor.id),
    })
    .exec(db)
    .await?;
    Ok(())
}

pub async fn tag(
    db: &DatabaseConnection,
    movie: &movies::Model,
    genre: &genres::Model,
) -> Result<(), DbErr> {
    movie_genres::Entity::insert(movie_genres::ActiveModel {
        movie_id: Set(movie.id),
        genre_id: Set(genre.id),
    })
    .exec(db)
    .await?;
    Ok(())
}

/// A small catalogue shared by most tests.
///
/// - Ridley Scott directed Alien (8.5, 1979) and Gladiator (8.0, 2000).
/// - Jaume Collet-Serra directed Orphan (6.0, 2009).
/// - Sigourney Weaver is in Alien; Russell Crowe is in Gladiator;
///   Vera Farmiga is in Orphan.
/// - Alien is Horror and Sci-Fi, Orphan is Horror, Gladiator is Drama.
pub struct Catalogue {
    pub scott: directors::Model,
    pub collet_serra: directors::Model,
    pub alien: movies::Model,
    pub gladiator: movies::Model,
    pub orphan: movies::Model,
    pub weaver: actors::Model,
    pub crowe: actors::Model,
    pub farmiga: actors::Model,
    pub horror: genres::Model,
    pub scifi: genres::Model,
    pub drama: genres::Model,
}

pub async fn create_catalogue(db: &DatabaseConnection) -> Result<Catalogue, DbErr> {
    let scott = create_director(db, "Ridley", "Scott").await?;
    let collet_serra = create_director(db, "Jaume", "Collet-Serra").await?;

    let alien = create_movie(db, "Alien", 8.5, date(1979, 5, 25), Some(&scott)).await?;
    let gladiator = create_movie(db, "Gladiator", 8.0, date(2000, 5, 5), Some(&scott)).await?;
    let orphan = create_movie(db, "Orphan", 6.0, date(2009, 7, 24), Some(&collet_serra)).await?;

    let weaver = create_actor(db, "Sigourney", "Weaver", "F").await?;
    let crowe = create_actor(db, "Russell", "Crowe", "M").await?;
    let farmiga = create_actor(db, "Vera", "Farmiga", "F").await?;
    cast(db, &alien, &weaver).await?;
    cast(db, &gladiator, &crowe).await?;
    cast(db, &orphan, &farmiga).await?;

    let horror = create_genre(db, "Horror").await?;
    let scifi = create_genre(db, "Sci-Fi").await?;
    let drama = create_genre(db, "Drama").await?;
    tag(db, &alien, &horror).await?;
    tag(db, &alien, &scifi).await?;
    tag(db, &orphan, &horror).await?;
    tag(db, &gladiator, &drama).await?;

    Ok(Catalogue {
        scott,
        collet_serra,
        alien,
        gladiator,
        orphan,
        weaver,
        crowe,
        farmiga,
        horror,
        scifi,
        drama,
    })
}
