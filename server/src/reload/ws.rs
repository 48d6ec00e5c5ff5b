use crate::reload::ReloadChannel;
use crate::server::Server;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use log::debug;
use std::sync::Arc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(server): State<Arc<Server>>,
) -> impl IntoResponse {
    let reload = server.reload().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, reload))
}

pub async fn handle_socket(socket: WebSocket, reload: Arc<ReloadChannel>) {
    let (id, mut rx) = reload.register();
    debug!("reload client {} connected", id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(payload) => {
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                // Notified and cleared from the registry.
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    reload.unregister(id);
    debug!("reload client {} disconnected", id);
}
