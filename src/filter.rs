//! Query-string filters and case-insensitive free-text matching.
//!
//! Text predicates match the pattern as given, lowercased against
//! `LOWER(col)`, and uppercased against `UPPER(col)`, with wildcards escaped.
//! SQLite's `LIKE`, `LOWER` and `UPPER` only fold ASCII, so accented letters
//! match when they share a case with one of the three forms ("Émile",
//! "ÉMILE" and "émile" all find "Émile"). Postgres folds fully. An empty
//! pattern matches every row.

use crate::orm::{actors, directors, movie_actors, movie_genres, movies};
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityName, EntityTrait, IdenStatic, QueryFilter, Select};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    /// `icontains`
    Contains,
    /// `istartswith`
    StartsWith,
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn like_pattern(pattern: &str, mode: TextMatch) -> String {
    let escaped = escape_like(pattern);
    match mode {
        TextMatch::Contains => format!("%{}%", escaped),
        TextMatch::StartsWith => format!("{}%", escaped),
    }
}

/// Case-insensitive match of a single column.
pub fn text_predicate<E: EntityTrait>(column: E::Column, pattern: &str, mode: TextMatch) -> SimpleExpr {
    let col = format!(
        r#"CAST("{}"."{}" AS TEXT)"#,
        E::default().table_name(),
        column.as_str()
    );
    let sql = format!(
        r#"({col} LIKE ? ESCAPE '\' OR LOWER({col}) LIKE ? ESCAPE '\' OR UPPER({col}) LIKE ? ESCAPE '\')"#,
        col = col
    );
    Expr::cust_with_values(
        &sql,
        vec![
            like_pattern(pattern, mode),
            like_pattern(&pattern.to_lowercase(), mode),
            like_pattern(&pattern.to_uppercase(), mode),
        ],
    )
}

/// OR of [`text_predicate`] over `columns`.
pub fn text_match<E: EntityTrait>(columns: &[E::Column], pattern: &str, mode: TextMatch) -> Condition {
    columns.iter().fold(Condition::any(), |cond, column| {
        cond.add(text_predicate::<E>(*column, pattern, mode))
    })
}

/// Blank query values, as sent by an untouched form field, read as `None`.
pub fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parses a comma separated id list such as `genres=1,4`. Unparsable parts
/// are ignored.
pub fn parse_id_list(raw: Option<&str>) -> Vec<i32> {
    raw.map(|raw| {
        raw.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    })
    .unwrap_or_default()
}

/// Movie list filter: rating bounds, director, and genres (all required).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MovieFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rating_min: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rating_max: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub director: Option<i32>,
    /// Comma separated genre ids.
    pub genres: Option<String>,
}

impl MovieFilter {
    pub fn genre_ids(&self) -> Vec<i32> {
        parse_id_list(self.genres.as_deref())
    }

    pub fn apply(&self, mut query: Select<movies::Entity>) -> Select<movies::Entity> {
        if let Some(min) = self.rating_min {
            query = query.filter(movies::Column::Rating.gte(min));
        }
        if let Some(max) = self.rating_max {
            query = query.filter(movies::Column::Rating.lte(max));
        }
        if let Some(director) = self.director {
            query = query.filter(movies::Column::DirectorId.eq(director));
        }
        // Conjoined: one subquery per genre.
        for genre_id in self.genre_ids() {
            query = query.filter(
                movies::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_genres::Column::MovieId)
                        .from(movie_genres::Entity)
                        .and_where(movie_genres::Column::GenreId.eq(genre_id))
                        .to_owned(),
                ),
            );
        }
        query
    }
}

/// Actor filter page: name and birth date substrings, movie, director.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ActorFilter {
    pub first_name: Option<String>,
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub movie: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub director: Option<i32>,
}

impl ActorFilter {
    pub fn apply(&self, mut query: Select<actors::Entity>) -> Select<actors::Entity> {
        if let Some(first_name) = self.first_name.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(text_predicate::<actors::Entity>(
                actors::Column::FirstName,
                first_name,
                TextMatch::Contains,
            ));
        }
        if let Some(birth_date) = self.birth_date.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(text_predicate::<actors::Entity>(
                actors::Column::BirthDate,
                birth_date,
                TextMatch::Contains,
            ));
        }
        if let Some(movie) = self.movie {
            query = query.filter(
                actors::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_actors::Column::ActorId)
                        .from(movie_actors::Entity)
                        .and_where(movie_actors::Column::MovieId.eq(movie))
                        .to_owned(),
                ),
            );
        }
        if let Some(director) = self.director {
            query = query.filter(
                actors::Column::Id.in_subquery(
                    Query::select()
                        .column((movie_actors::Entity, movie_actors::Column::ActorId))
                        .from(movie_actors::Entity)
                        .inner_join(
                            movies::Entity,
                            Expr::tbl(movie_actors::Entity, movie_actors::Column::MovieId)
                                .equals(movies::Entity, movies::Column::Id),
                        )
                        .and_where(
                            Expr::tbl(movies::Entity, movies::Column::DirectorId).eq(director),
                        )
                        .to_owned(),
                ),
            );
        }
        query
    }
}

/// `?pattern=` on actor last names.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ActorNameFilter {
    pub pattern: Option<String>,
}

impl ActorNameFilter {
    pub fn apply(&self, query: Select<actors::Entity>) -> Select<actors::Entity> {
        match self.pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => query.filter(text_predicate::<actors::Entity>(
                actors::Column::LastName,
                pattern,
                TextMatch::Contains,
            )),
            _ => query,
        }
    }
}

/// `?q=` on director first or last names.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NameSearch {
    #[serde(default)]
    pub q: String,
}

impl NameSearch {
    pub fn apply(&self, query: Select<directors::Entity>) -> Select<directors::Entity> {
        query.filter(text_match::<directors::Entity>(
            &[directors::Column::FirstName, directors::Column::LastName],
            &self.q,
            TextMatch::Contains,
        ))
    }
}

fn default_max_rating() -> f64 {
    10.0
}

/// `?min_rating=&max_rating=`, inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingRange {
    #[serde(default)]
    pub min_rating: f64,
    #[serde(default = "default_max_rating")]
    pub max_rating: f64,
}

impl Default for RatingRange {
    fn default() -> Self {
        Self {
            min_rating: 0.0,
            max_rating: default_max_rating(),
        }
    }
}

impl RatingRange {
    pub fn apply(&self, query: Select<movies::Entity>) -> Select<movies::Entity> {
        query
            .filter(movies::Column::Rating.gte(self.min_rating))
            .filter(movies::Column::Rating.lte(self.max_rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_modes() {
        assert_eq!(like_pattern("Smi", TextMatch::StartsWith), "Smi%");
        assert_eq!(like_pattern("Émile", TextMatch::Contains), "%Émile%");
        assert_eq!(like_pattern("", TextMatch::Contains), "%%");
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(Some("1, 4,x,7")), vec![1, 4, 7]);
        assert!(parse_id_list(Some("")).is_empty());
        assert!(parse_id_list(None).is_empty());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let filter: MovieFilter =
            serde_json::from_str(r#"{"rating_min": "", "rating_max": "7.5", "director": " "}"#)
                .unwrap();
        assert_eq!(filter.rating_min, None);
        assert_eq!(filter.rating_max, Some(7.5));
        assert_eq!(filter.director, None);

        let filter: ActorFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.movie, None);
    }

    #[test]
    fn test_rating_range_defaults() {
        let range: RatingRange = serde_json::from_str("{}").unwrap();
        assert_eq!(range.min_rating, 0.0);
        assert_eq!(range.max_rating, 10.0);
    }
}
