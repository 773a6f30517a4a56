use crate::error::{Error, Result};
use crate::filter::{text_match, NameSearch, TextMatch};
use crate::orm::{directors, movies};
use crate::rating::{director_rating, director_ratings_query, DirectorRating};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, TransactionTrait};

#[derive(Clone, Debug)]
pub struct DirectorDetail {
    pub director: directors::Model,
    pub rating: DirectorRating,
    /// Newest first.
    pub movies: Vec<movies::Model>,
}

/// A director with their movies, for nested listings.
#[derive(Clone, Debug)]
pub struct DirectorWithMovies {
    pub director: directors::Model,
    pub movies: Vec<movies::Model>,
}

pub struct DirectorUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub sex: &'a str,
    pub birth_date: NaiveDate,
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<directors::Model> {
    directors::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Director"))
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<directors::Model>> {
    Ok(all_query().all(db).await?)
}

/// Every director by last name.
pub fn all_query() -> Select<directors::Entity> {
    directors::Entity::find()
        .order_by_asc(directors::Column::LastName)
        .order_by_asc(directors::Column::FirstName)
        .order_by_asc(directors::Column::Id)
}

/// One page of directors with ratings and movie counts, and the page count.
pub async fn paginated<C: ConnectionTrait>(
    db: &C,
    page: usize,
    per_page: usize,
) -> Result<(Vec<DirectorRating>, usize)> {
    let paginator = director_ratings_query()
        .into_model::<DirectorRating>()
        .paginate(db, per_page);
    let pages = paginator.num_pages().await?;
    let directors = paginator.fetch_page(page).await?;
    Ok((directors, pages))
}

pub async fn movies_of<C: ConnectionTrait>(
    db: &C,
    director: &directors::Model,
) -> Result<Vec<movies::Model>> {
    Ok(director
        .find_related(movies::Entity)
        .order_by_desc(movies::Column::Date)
        .order_by_asc(movies::Column::Id)
        .all(db)
        .await?)
}

pub async fn detail<C: ConnectionTrait>(db: &C, id: i32) -> Result<DirectorDetail> {
    let director = find(db, id).await?;
    let rating = director_rating(db, id)
        .await?
        .ok_or(Error::NotFound("Director"))?;
    let movies = movies_of(db, &director).await?;
    Ok(DirectorDetail {
        director,
        rating,
        movies,
    })
}

/// Directors whose first or last name contains `search.q`, with their
/// movies. An empty query lists everyone.
pub async fn with_movies<C: ConnectionTrait>(
    db: &C,
    search: &NameSearch,
) -> Result<Vec<DirectorWithMovies>> {
    let directors = search.apply(all_query()).all(db).await?;

    let mut result = Vec::with_capacity(directors.len());
    for director in directors {
        let movies = director
            .find_related(movies::Entity)
            .order_by_asc(movies::Column::Id)
            .all(db)
            .await?;
        result.push(DirectorWithMovies { director, movies });
    }
    Ok(result)
}

/// First or last name prefix search.
pub async fn search_prefix<C: ConnectionTrait>(db: &C, pattern: &str) -> Result<Vec<DirectorRating>> {
    Ok(director_ratings_query()
        .filter(text_match::<directors::Entity>(
            &[directors::Column::FirstName, directors::Column::LastName],
            pattern,
            TextMatch::StartsWith,
        ))
        .into_model::<DirectorRating>()
        .all(db)
        .await?)
}

pub async fn update_director<C: ConnectionTrait>(
    db: &C,
    id: i32,
    update: DirectorUpdate<'_>,
) -> Result<directors::Model> {
    let mut director: directors::ActiveModel = find(db, id).await?.into();
    director.first_name = Set(update.first_name.to_owned());
    director.last_name = Set(update.last_name.to_owned());
    director.sex = Set(update.sex.to_owned());
    director.birth_date = Set(update.birth_date);
    Ok(director.update(db).await?)
}

/// Deletes a director. Their movies stay, with no director.
pub async fn delete_director<C>(db: &C, id: i32) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let director = find(db, id).await?;

    let txn = db.begin().await?;
    let orphaned = movies::Entity::update_many()
        .col_expr(movies::Column::DirectorId, Expr::value(Option::<i32>::None))
        .filter(movies::Column::DirectorId.eq(id))
        .exec(&txn)
        .await?;
    directors::Entity::delete_many()
        .filter(directors::Column::Id.eq(id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    log::info!(
        "Deleted director {} ({}); {} movies left without director",
        director.full_name(),
        id,
        orphaned.rows_affected
    );
    Ok(())
}
