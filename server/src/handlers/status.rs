use actix_cors::Cors;
use actix_web::{error, web, HttpResponse};
use tokio::sync::oneshot;

use crate::server::{ServerCommand, ServerTx};

pub fn configure_status_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/status")
            .wrap(Cors::permissive())
            .route(web::get().to(get)),
    );
}

async fn get(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse, actix_web::Error> {
    let (tx, rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::Status { tx })
        .map_err(|_| error::ErrorServiceUnavailable("relay is not running"))?;
    let status = rx
        .await
        .map_err(|_| error::ErrorServiceUnavailable("relay is not running"))?;
    Ok(HttpResponse::Ok().json(status))
}
