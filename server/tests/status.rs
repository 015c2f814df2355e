use actix_web::{test, web, App};
use serde_json::{json, Value};

use whiteboard_server::config::Config;
use whiteboard_server::connection::ConnectionCommand;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;

#[actix_web::test]
async fn it_reports_relay_status() {
    let srv_tx = spawn_server();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(Config::default()))
            .configure(handlers::root),
    )
    .await;

    let req = test::TestRequest::get().uri("/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({ "usersCount": 0, "activeStrokes": 0, "historyLength": 0 })
    );

    let (tx, _rx) = tokio::sync::mpsc::channel(8);
    srv_tx
        .send(ConnectionCommand::Connect { tx }.into())
        .expect("relay task is running");

    let req = test::TestRequest::get().uri("/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["usersCount"], 1);
}

#[actix_web::test]
async fn it_rejects_plain_http_on_websocket_route() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(spawn_server()))
            .app_data(web::Data::new(Config::default()))
            .configure(handlers::root),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
