use actix_web::{web, App, HttpServer};

use whiteboard_server::config::Config;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind_addr = config.bind_addr();

    let srv_tx = web::Data::new(spawn_server());
    let config = web::Data::new(config);

    log::info!("WebSocket relay running on ws://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(srv_tx.clone())
            .app_data(config.clone())
            .configure(handlers::root)
    })
    .bind(bind_addr)?
    .run()
    .await
}
