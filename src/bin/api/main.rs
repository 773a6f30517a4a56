use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use moviedb::{app_config, db, typed_api};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    app_config::init();

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

    let bind = app_config::server().api_bind;
    log::info!("Serving the typed API on {}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(conn.clone()))
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(typed_api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
