//! Database connection and schema bootstrap.

use crate::orm::*;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

/// Opens a pooled connection to `url` (Postgres or SQLite).
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(16)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());
    Ok(db)
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Creates every table that does not exist yet, parents before children.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, directors::Entity).await?;
    create_table(db, actors::Entity).await?;
    create_table(db, genres::Entity).await?;
    create_table(db, movies::Entity).await?;
    create_table(db, movie_actors::Entity).await?;
    create_table(db, movie_genres::Entity).await?;
    create_table(db, watchlist::Entity).await?;
    create_table(db, user_movie_ratings::Entity).await?;
    create_table(db, movie_comments::Entity).await?;
    create_table(db, actor_comments::Entity).await?;
    create_table(db, director_comments::Entity).await?;
    create_table(db, personal_lists::Entity).await?;
    create_table(db, personal_list_movies::Entity).await?;
    create_table(db, messages::Entity).await?;

    log::debug!("Schema is up to date");
    Ok(())
}
