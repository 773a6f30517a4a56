use actix_files::Files;
use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use moviedb::middleware::ClientCtx;
use moviedb::{app_config, db};
use rand::{distributions::Alphanumeric, Rng};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_lib_mods();
    app_config::init();

    let db = open_database().await?;
    let secret_key = session_key();
    let cookie_secure = app_config::security().cookie_secure;
    let bind = app_config::server().bind;
    log::info!("Serving pages and /api on {}", bind);

    HttpServer::new(move || {
        // Middleware is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(db.clone()))
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::BAD_REQUEST, moviedb::web::error::render_400)
                    .handler(StatusCode::UNAUTHORIZED, moviedb::web::error::render_401)
                    .handler(StatusCode::FORBIDDEN, moviedb::web::error::render_403)
                    .handler(StatusCode::NOT_FOUND, moviedb::web::error::render_404)
                    .handler(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        moviedb::web::error::render_500,
                    ),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(cookie_secure)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %Dms"))
            .service(Files::new("/static", "./static"))
            .configure(moviedb::web::configure)
    })
    .bind(bind)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env is normal in production.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// `DATABASE_URL` wins over the configured URL.
async fn open_database() -> io::Result<sea_orm::DatabaseConnection> {
    let config = app_config::database();
    let url = std::env::var("DATABASE_URL").unwrap_or(config.url);

    let conn = db::connect(&url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    if config.create_schema {
        db::create_schema(&conn)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    }
    Ok(conn)
}

fn session_key() -> Key {
    let rejected = match std::env::var("SECRET_KEY") {
        Ok(key) => match Key::try_from(key.as_bytes()) {
            Ok(key) => return key,
            Err(err) => err.to_string(),
        },
        Err(err) => err.to_string(),
    };

    let random_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect();
    log::warn!("SECRET_KEY was invalid ({}). Session cookies will be invalidated on every restart. A secret key must be at least 64 bytes.", rejected);
    Key::from(random_string.as_bytes())
}
