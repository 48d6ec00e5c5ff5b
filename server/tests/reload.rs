use futures::StreamExt;
use kiln_server::reload::{RELOAD_MESSAGE, ReloadChannel};
use kiln_server::server::{Context, RELOAD_PATH, Server, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

async fn spawn_server(root: &std::path::Path) -> (SocketAddr, Arc<ReloadChannel>) {
    let ctx = Context::new(ServerConfig::new().with_root(root.to_path_buf())).unwrap();
    let reload = Arc::new(ReloadChannel::new());
    let server = Arc::new(Server::new(Arc::new(ctx), reload.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, server.router()).await });

    (addr, reload)
}

async fn wait_for_clients(reload: &ReloadChannel, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while reload.len() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {count} reload client(s), found {}", reload.len()));
}

#[tokio::test]
async fn connected_clients_receive_the_update_frame() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, reload) = spawn_server(dir.path()).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}{RELOAD_PATH}")).await.unwrap();
    wait_for_clients(&reload, 1).await;

    assert_eq!(reload.notify_all(), 1);

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(frame, Message::text(RELOAD_MESSAGE));
    assert!(reload.is_empty());
}

#[tokio::test]
async fn closing_the_socket_unregisters_the_client() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, reload) = spawn_server(dir.path()).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}{RELOAD_PATH}")).await.unwrap();
    wait_for_clients(&reload, 1).await;

    socket.close(None).await.unwrap();
    wait_for_clients(&reload, 0).await;

    assert_eq!(reload.notify_all(), 0);
}
