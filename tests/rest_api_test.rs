//! REST sub-API and session integration tests

mod common;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{database::*, fixtures::*};
use moviedb::middleware::ClientCtx;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::{json, Value};
use serial_test::serial;

/// The full application with sessions, as the site binary wires it.
macro_rules! site_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.conn.clone()))
                .wrap(ClientCtx::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7u8; 64]))
                        .cookie_secure(false)
                        .build(),
                )
                .configure(moviedb::web::configure),
        )
        .await
    };
}

/// Logs in through the form and evaluates to the session cookie.
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", $username), ("password", TEST_PASSWORD)])
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let cookie: Cookie<'static> = resp
            .response()
            .cookies()
            .find(|c| c.name() == "id")
            .expect("session cookie is set")
            .into_owned();
        cookie
    }};
}

#[actix_rt::test]
#[serial]
async fn test_directors_page() {
    let db = setup_test_database().await.expect("Failed to setup test database");
    create_catalogue(&db.conn).await.expect("Failed to create catalogue");
    let app = site_app!(db);

    let req = test::TestRequest::get().uri("/api/directors/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 2);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_null());
    assert_eq!(
        body["results"][0],
        json!({"first_name": "Jaume", "last_name": "Collet-Serra", "sex": "M", "birth_date": "1950-01-01"})
    );

    let req = test::TestRequest::get().uri("/api/directors/?page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Page not found");
}

#[actix_rt::test]
#[serial]
async fn test_page_links_keep_filters() {
    let db = setup_test_database().await.unwrap();
    for n in 0..21 {
        create_actor(&db.conn, "Extra", &format!("Number{:02}", n), "F")
            .await
            .unwrap();
    }
    create_actor(&db.conn, "Lead", "Male", "M").await.unwrap();
    let app = site_app!(db);

    let req = test::TestRequest::get().uri("/api/actors/?sex=F").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 21);
    assert_eq!(body["results"].as_array().unwrap().len(), 20);
    let next = body["next"].as_str().expect("a next link");
    assert!(next.ends_with("/api/actors/?sex=F&page=2"));

    let req = test::TestRequest::get()
        .uri("/api/actors/?sex=F&page=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    let previous = body["previous"].as_str().expect("a previous link");
    assert!(previous.ends_with("/api/actors/?sex=F"));
}

#[actix_rt::test]
#[serial]
async fn test_movies_carry_related_names_and_ids() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();
    let alice = create_test_user(&db.conn, "alice").await;
    moviedb::lists::toggle_watchlist(&db.conn, c.alien.id, alice.id)
        .await
        .unwrap();
    let app = site_app!(db);

    let req = test::TestRequest::get().uri("/api/movies/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 3);

    let alien = &body["results"][0];
    assert_eq!(alien["title"], "Alien");
    assert_eq!(alien["director"], "Ridley Scott");
    assert_eq!(alien["actors"], json!(["Weaver"]));
    assert_eq!(alien["users_to_watch"], json!([alice.id]));
    assert_eq!(alien["genres"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
#[serial]
async fn test_writes_require_a_session() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();
    let app = site_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/comments/")
        .set_json(json!({"text": "Anonymous", "movie": c.alien.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Authentication required");

    let req = test::TestRequest::get().uri("/api/messages/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
#[serial]
async fn test_logged_in_user_comments() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();
    let alice = create_test_user(&db.conn, "alice").await;
    let app = site_app!(db);
    let cookie = login!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/comments/")
        .cookie(cookie.clone())
        .set_json(json!({"text": "Still holds up", "movie": c.alien.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["movie"], c.alien.id);
    assert_eq!(body["author"], alice.id);

    let comment_id = body["id"].as_i64().expect("an id");
    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{}/", comment_id))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
#[serial]
async fn test_director_updates_are_staff_only() {
    let db = setup_test_database().await.unwrap();
    let c = create_catalogue(&db.conn).await.unwrap();
    create_test_user(&db.conn, "alice").await;
    create_staff_user(&db.conn, "editor").await;
    let app = site_app!(db);

    let update = json!({
        "first_name": "Sir Ridley",
        "last_name": "Scott",
        "sex": "M",
        "birth_date": "1937-11-30",
    });

    let cookie = login!(app, "alice");
    let req = test::TestRequest::put()
        .uri(&format!("/api/directors/{}/", c.scott.id))
        .cookie(cookie)
        .set_json(&update)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let cookie = login!(app, "editor");
    let req = test::TestRequest::put()
        .uri(&format!("/api/directors/{}/", c.scott.id))
        .cookie(cookie)
        .set_json(&update)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["first_name"], "Sir Ridley");
    assert_eq!(body["birth_date"], "1937-11-30");
}

#[actix_rt::test]
#[serial]
async fn test_messages_are_scoped_to_the_requester() {
    let db = setup_test_database().await.unwrap();
    let alice = create_test_user(&db.conn, "alice").await;
    let bob = create_test_user(&db.conn, "bob").await;
    let carol = create_test_user(&db.conn, "carol").await;
    moviedb::messages::send_message(&db.conn, alice.id, bob.id, "To Bob")
        .await
        .unwrap();
    moviedb::messages::send_message(&db.conn, bob.id, carol.id, "To Carol")
        .await
        .unwrap();
    let app = site_app!(db);

    let cookie = login!(app, "alice");
    let req = test::TestRequest::get()
        .uri("/api/messages/")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["addressee"], "bob");

    let cookie = login!(app, "carol");
    let req = test::TestRequest::post()
        .uri("/api/messages/")
        .cookie(cookie)
        .set_json(json!({"text": "Hello yourself", "addressee": carol.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
#[serial]
async fn test_bad_login_renders_the_form_again() {
    let db = setup_test_database().await.unwrap();
    create_test_user(&db.conn, "alice").await;
    let app = site_app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "alice"), ("password", "wrong-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Incorrect username or password."));
}

#[actix_rt::test]
#[serial]
async fn test_movie_pages_render() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();
    let app = site_app!(db);

    let req = test::TestRequest::get().uri("/movies/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Gladiator"));

    let req = test::TestRequest::get().uri("/movies/alien/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Ridley Scott"));

    let req = test::TestRequest::get().uri("/movies/no-such-movie/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
#[serial]
async fn test_search_page() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();
    let app = site_app!(db);

    // No pattern yet: only the form.
    let req = test::TestRequest::get().uri("/search").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(!body.contains("Gladiator"));

    // A submitted empty pattern lists everything.
    let req = test::TestRequest::post()
        .uri("/search")
        .set_form([("pattern", "")])
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    for name in ["Alien", "Gladiator", "Orphan", "Farmiga", "Collet-Serra"] {
        assert!(body.contains(name), "missing {}", name);
    }

    let req = test::TestRequest::post()
        .uri("/search")
        .set_form([("pattern", "g")])
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Gladiator"));
    assert!(!body.contains("Alien"));
}

#[actix_rt::test]
#[serial]
async fn test_pages_render_when_unread_count_fails() {
    let db = setup_test_database().await.unwrap();
    create_catalogue(&db.conn).await.unwrap();
    create_test_user(&db.conn, "alice").await;
    let app = site_app!(db);
    let cookie = login!(app, "alice");

    db.conn
        .execute(Statement::from_string(
            db.conn.get_database_backend(),
            "DROP TABLE messages".to_owned(),
        ))
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/movies/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("alice"));
}
