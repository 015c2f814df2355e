use std::fmt::Debug;
use std::time::Duration;

use actix_web::{web, App};
use awc::ws::{Frame, Message};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;

use whiteboard_server::config::Config;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;

fn start_relay() -> actix_test::TestServer {
    let srv_tx = spawn_server();
    actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(Config::default()))
            .configure(handlers::root)
    })
}

async fn next_json<S, E>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: Debug,
{
    loop {
        match timeout(Duration::from_secs(2), ws.next()).await {
            Ok(Some(Ok(Frame::Text(bytes)))) => return serde_json::from_slice(&bytes).expect(""),
            Ok(Some(Ok(Frame::Ping(_)))) | Ok(Some(Ok(Frame::Pong(_)))) => continue,
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}

async fn send_json<S>(ws: &mut S, value: Value)
where
    S: Sink<Message> + Unpin,
    S::Error: Debug,
{
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("");
}

fn drawing(stroke_id: &str) -> Value {
    json!({
        "type": "drawing",
        "stroke": {
            "id": "u1",
            "strokeId": stroke_id,
            "userId": "u1",
            "color": "#000000",
            "size": 5,
            "points": [{ "x": 0.123456789012, "y": 0.5 }]
        }
    })
}

#[actix_web::test]
async fn it_survives_bad_frames_and_keeps_relaying() {
    let mut srv = start_relay();

    let mut a = srv.ws_at("/ws").await.expect("");
    assert_eq!(next_json(&mut a).await, json!({ "type": "usersCount", "count": 1 }));
    let mut b = srv.ws_at("/ws").await.expect("");
    assert_eq!(next_json(&mut a).await, json!({ "type": "usersCount", "count": 2 }));
    assert_eq!(next_json(&mut b).await, json!({ "type": "usersCount", "count": 2 }));

    a.send(Message::Text("not json".into())).await.expect("");
    send_json(&mut a, json!({ "type": "cursor", "x": 1 })).await;
    send_json(&mut a, json!({ "type": "undo" })).await;
    send_json(&mut a, drawing("s1")).await;

    let relayed = next_json(&mut b).await;
    assert_eq!(relayed, drawing("s1"));

    let chat = json!({ "type": "chat", "text": "still here", "username": "a", "timestamp": "10:00" });
    send_json(&mut a, chat.clone()).await;
    assert_eq!(next_json(&mut a).await, chat);
    assert_eq!(next_json(&mut b).await, chat);
}

#[actix_web::test]
async fn it_relays_frames_sent_right_after_handshake_in_order() {
    let mut srv = start_relay();

    let mut a = srv.ws_at("/ws").await.expect("");
    assert_eq!(next_json(&mut a).await["count"], 1);
    send_json(&mut a, drawing("s1")).await;
    let sync = json!({ "type": "chat", "text": "sync", "username": "a", "timestamp": "10:00" });
    send_json(&mut a, sync.clone()).await;
    assert_eq!(next_json(&mut a).await, sync);

    let mut b = srv.ws_at("/ws").await.expect("");
    send_json(&mut b, drawing("s2")).await;
    send_json(&mut b, json!({ "type": "undo", "strokeId": "s1" })).await;

    assert_eq!(next_json(&mut b).await, json!({ "type": "usersCount", "count": 2 }));
    let init = next_json(&mut b).await;
    assert_eq!(init["type"], "init");
    assert_eq!(init["strokes"], json!([drawing("s1")["stroke"]]));

    assert_eq!(next_json(&mut a).await, json!({ "type": "usersCount", "count": 2 }));
    assert_eq!(next_json(&mut a).await, drawing("s2"));
    assert_eq!(next_json(&mut a).await, json!({ "type": "undo", "strokeId": "s1" }));
}
