//! Integration tests for catalogue queries: aggregates, filters, archives
//! and director deletion.

mod common;

use common::{database::*, fixtures::*};
use moviedb::catalog::{actors, directors, genres, movies};
use moviedb::error::Error;
use moviedb::filter::{ActorFilter, ActorNameFilter, MovieFilter, NameSearch, RatingRange};
use moviedb::rating;

#[actix_rt::test]
async fn test_director_ratings_average_catalogue_scores() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let c = create_catalogue(&db.conn).await.expect("Failed to create catalogue");
    create_director(&db.conn, "Alan", "Smithee").await.unwrap();

    let ratings = rating::director_ratings(&db.conn).await.unwrap();
    let names: Vec<&str> = ratings.iter().map(|r| r.last_name.as_str()).collect();
    assert_eq!(names, vec!["Collet-Serra", "Scott", "Smithee"]);

    let scott = ratings.iter().find(|r| r.id == c.scott.id).unwrap();
    assert!((scott.avg_rating - 8.25).abs() < 1e-9);
    assert_eq!(scott.num_movies, 2);

    // No movies: zero average, zero count.
    let smithee = ratings.iter().find(|r| r.last_name == "Smithee").unwrap();
    assert_eq!(smithee.avg_rating, 0.0);
    assert_eq!(smithee.num_movies, 0);
}

#[actix_rt::test]
async fn test_top_actors_by_sex() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let actresses = rating::top_actors_by_sex(&db.conn, "F", 6).await.unwrap();
    let ids: Vec<i32> = actresses.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![c.weaver.id, c.farmiga.id]);
    assert!((actresses[0].avg_rating - 8.5).abs() < 1e-9);

    let actors = rating::top_actors_by_sex(&db.conn, "M", 6).await.unwrap();
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].id, c.crowe.id);

    let limited = rating::top_actors_by_sex(&db.conn, "F", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[actix_rt::test]
async fn test_top_directors_and_movies() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let top = rating::top_directors(&db.conn, 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, c.scott.id);

    let top_movies = movies::top_rated(&db.conn, 2).await.unwrap();
    let titles: Vec<&str> = top_movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Alien", "Gladiator"]);
}

#[actix_rt::test]
async fn test_movie_filter() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let filter = MovieFilter {
        rating_min: Some(7.0),
        ..Default::default()
    };
    let titles: Vec<String> = movies::filter(&db.conn, &filter)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Alien", "Gladiator"]);

    let filter = MovieFilter {
        rating_max: Some(8.0),
        director: Some(c.scott.id),
        ..Default::default()
    };
    let found = movies::filter(&db.conn, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.gladiator.id);

    let none = MovieFilter::default();
    assert_eq!(movies::filter(&db.conn, &none).await.unwrap().len(), 3);
}

#[actix_rt::test]
async fn test_movie_filter_genres_are_conjoined() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let horror = MovieFilter {
        genres: Some(c.horror.id.to_string()),
        ..Default::default()
    };
    let titles: Vec<String> = movies::filter(&db.conn, &horror)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Alien", "Orphan"]);

    let horror_scifi = MovieFilter {
        genres: Some(format!("{},{}", c.horror.id, c.scifi.id)),
        ..Default::default()
    };
    let found = movies::filter(&db.conn, &horror_scifi).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.alien.id);

    let impossible = MovieFilter {
        genres: Some(format!("{},{}", c.drama.id, c.scifi.id)),
        ..Default::default()
    };
    assert!(movies::filter(&db.conn, &impossible).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_actor_filter() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let by_name = ActorFilter {
        first_name: Some("SIG".to_owned()),
        ..Default::default()
    };
    let found = actors::filter(&db.conn, &by_name).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.weaver.id);

    let by_movie = ActorFilter {
        movie: Some(c.orphan.id),
        ..Default::default()
    };
    let found = actors::filter(&db.conn, &by_movie).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.farmiga.id);

    let by_director = ActorFilter {
        director: Some(c.scott.id),
        ..Default::default()
    };
    let names: Vec<String> = actors::filter(&db.conn, &by_director)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.last_name)
        .collect();
    assert_eq!(names, vec!["Crowe", "Weaver"]);

    let by_birth_date = ActorFilter {
        birth_date: Some("1970".to_owned()),
        ..Default::default()
    };
    assert_eq!(actors::filter(&db.conn, &by_birth_date).await.unwrap().len(), 3);
}

#[actix_rt::test]
async fn test_actor_name_filter_with_ratings() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let filter = ActorNameFilter {
        pattern: Some("arm".to_owned()),
    };
    let found = actors::with_ratings(&db.conn, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.farmiga.id);
    assert_eq!(found[0].num_movies, 1);

    let everyone = actors::with_ratings(&db.conn, &ActorNameFilter::default())
        .await
        .unwrap();
    assert_eq!(everyone.len(), 3);
}

#[actix_rt::test]
async fn test_year_archive() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();
    create_movie(&db.conn, "Hannibal", 6.8, date(2001, 2, 9), Some(&c.scott))
        .await
        .unwrap();

    let movies_1979 = movies::year_archive(&db.conn, 1979).await.unwrap();
    assert_eq!(movies_1979.len(), 1);
    assert_eq!(movies_1979[0].id, c.alien.id);

    let all = movies::all_by_date(&db.conn).await.unwrap();
    let years = movies::release_years(&all);
    let listed: Vec<i32> = years.iter().map(|y| y.year).collect();
    assert_eq!(listed, vec![1979, 2000, 2001, 2009]);

    assert!(matches!(
        movies::year_archive(&db.conn, 1990).await,
        Err(Error::NotFound(_))
    ));
}

#[actix_rt::test]
async fn test_similar_movies_share_genres() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let similar = movies::similar_movies(&db.conn, c.alien.id, 3).await.unwrap();
    let ids: Vec<i32> = similar.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![c.orphan.id]);

    let similar = movies::similar_movies(&db.conn, c.gladiator.id, 3).await.unwrap();
    assert!(similar.is_empty());
}

#[actix_rt::test]
async fn test_movies_by_genre() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let (genre, found) = movies::by_genre(&db.conn, c.horror.id).await.unwrap();
    assert_eq!(genre.name, "Horror");
    let titles: Vec<String> = found.into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Alien", "Orphan"]);

    assert_eq!(genres::all(&db.conn).await.unwrap().len(), 3);
    assert!(matches!(
        movies::by_genre(&db.conn, 999).await,
        Err(Error::NotFound("Genre"))
    ));
}

#[actix_rt::test]
async fn test_movie_detail_relations() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let movie = movies::find_by_slug(&db.conn, "alien").await.unwrap();
    let detail = movies::detail(&db.conn, movie).await.unwrap();
    assert_eq!(detail.director_name().as_deref(), Some("Ridley Scott"));
    assert_eq!(detail.actors.len(), 1);
    assert_eq!(detail.actors[0].id, c.weaver.id);
    assert_eq!(detail.genres.len(), 2);

    assert!(matches!(
        movies::find_by_slug(&db.conn, "no-such-movie").await,
        Err(Error::NotFound("Movie"))
    ));
}

#[actix_rt::test]
async fn test_search_prefix() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let found = movies::search_prefix(&db.conn, "gla").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.gladiator.id);

    // Prefix, not substring.
    assert!(movies::search_prefix(&db.conn, "lien").await.unwrap().is_empty());

    let found = actors::search_prefix(&db.conn, "vera").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.farmiga.id);

    let found = directors::search_prefix(&db.conn, "Sc").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].num_movies, 2);

    // Wildcards match literally.
    assert!(movies::search_prefix(&db.conn, "%").await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_directors_with_movies_name_search() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();

    let search = NameSearch {
        q: "ridl".to_owned(),
    };
    let found = directors::with_movies(&db.conn, &search).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].movies.len(), 2);

    let everyone = directors::with_movies(&db.conn, &NameSearch::default())
        .await
        .unwrap();
    assert_eq!(everyone.len(), 2);
}

#[actix_rt::test]
async fn test_name_search_ignores_case() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();
    let smith = create_director(&db.conn, "Will", "Smith").await.unwrap();
    let zola = create_director(&db.conn, "Émile", "Zola").await.unwrap();

    async fn director_ids(db: &sea_orm::DatabaseConnection, q: &str) -> Vec<i32> {
        directors::with_movies(db, &NameSearch { q: q.to_owned() })
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.director.id)
            .collect()
    }

    assert_eq!(director_ids(&db.conn, "smith").await, vec![smith.id]);
    assert_eq!(director_ids(&db.conn, "SMITH").await, director_ids(&db.conn, "smith").await);

    for q in ["Émile", "émile", "ÉMILE", "mile", "zola", "ZOLA"] {
        assert_eq!(director_ids(&db.conn, q).await, vec![zola.id], "q = {:?}", q);
    }

    let found: Vec<i32> = directors::search_prefix(&db.conn, "émi")
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(found, vec![zola.id]);

    let found: Vec<i32> = actors::with_ratings(
        &db.conn,
        &ActorNameFilter {
            pattern: Some("FARMIGA".to_owned()),
        },
    )
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.id)
    .collect();
    let lower: Vec<i32> = actors::with_ratings(
        &db.conn,
        &ActorNameFilter {
            pattern: Some("farmiga".to_owned()),
        },
    )
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.id)
    .collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found, lower);
}

#[actix_rt::test]
async fn test_empty_pattern_lists_everyone_in_order() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();
    create_director(&db.conn, "Alan", "Smithee").await.unwrap();
    create_actor(&db.conn, "Ève", "Adam", "F").await.unwrap();

    let expected: Vec<i32> = directors::all(&db.conn)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    let found: Vec<i32> = directors::with_movies(&db.conn, &NameSearch::default())
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.director.id)
        .collect();
    assert_eq!(found.len(), 3);
    assert_eq!(found, expected);

    let expected: Vec<i32> = actors::all(&db.conn)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    let found: Vec<i32> = actors::with_ratings(
        &db.conn,
        &ActorNameFilter {
            pattern: Some(String::new()),
        },
    )
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.id)
    .collect();
    assert_eq!(found.len(), 4);
    assert_eq!(found, expected);

    let found: Vec<i32> = movies::search_prefix(&db.conn, "")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(found.len(), 3);
}

#[actix_rt::test]
async fn test_movies_in_rating_range() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();

    let range = RatingRange {
        min_rating: 6.0,
        max_rating: 8.0,
    };
    let found = movies::with_directors(&db.conn, Some(&range)).await.unwrap();
    let titles: Vec<&str> = found.iter().map(|(m, _)| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Gladiator", "Orphan"]);
    assert!(found.iter().all(|(_, d)| d.is_some()));
}

#[actix_rt::test]
async fn test_delete_director_keeps_movies() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    directors::delete_director(&db.conn, c.scott.id).await.unwrap();

    assert!(matches!(
        directors::find(&db.conn, c.scott.id).await,
        Err(Error::NotFound("Director"))
    ));

    let alien = movies::find_by_id(&db.conn, c.alien.id).await.unwrap();
    assert_eq!(alien.director_id, None);
    let orphan = movies::find_by_id(&db.conn, c.orphan.id).await.unwrap();
    assert_eq!(orphan.director_id, Some(c.collet_serra.id));

    let with_directors = movies::with_directors(&db.conn, None).await.unwrap();
    assert_eq!(with_directors.len(), 3);
    assert_eq!(with_directors.iter().filter(|(_, d)| d.is_none()).count(), 2);

    assert!(matches!(
        directors::delete_director(&db.conn, c.scott.id).await,
        Err(Error::NotFound("Director"))
    ));
}

#[actix_rt::test]
async fn test_update_title() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();

    let movie = movies::update_title(&db.conn, c.orphan.id, "Orphan: First Kill")
        .await
        .unwrap();
    assert_eq!(movie.title, "Orphan: First Kill");
    // The slug is stable.
    assert_eq!(movie.slug, "orphan");

    assert!(matches!(
        movies::update_title(&db.conn, 999, "Nothing").await,
        Err(Error::NotFound("Movie"))
    ));
}
