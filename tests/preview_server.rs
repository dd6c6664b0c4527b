// tests/preview_server.rs

mod common;
use crate::common::{init_tracing, pipeline, with_timeout, write_file, ConfigFileBuilder};

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use assetdag::exec::TaskExecutor;
use assetdag::fs::RealFileSystem;
use assetdag::server::live_reload::{inject_client_tag, CLIENT_SCRIPT_PATH};
use assetdag::server::preview::resolve_request_path;
use assetdag::server::{start_preview, LiveReload, ReloadMessage};
use assetdag::types::Mode;

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "dist/index.html", "<html><body><h1>hi</h1></body></html>");
    write_file(dir.path(), "dist/css/main.css", ".a{color:red}");
    write_file(dir.path(), "secret.txt", "do not serve");
    dir
}

#[tokio::test]
async fn serves_files_and_injects_client_into_html() {
    init_tracing();
    let dir = site();
    let shutdown = CancellationToken::new();
    let handle = start_preview(
        dir.path().join("dist"),
        "127.0.0.1",
        0,
        LiveReload::new(),
        shutdown.clone(),
    )
    .await
    .unwrap();
    let addr = handle.local_addr();

    let index = with_timeout(get(addr, "/")).await;
    assert!(index.starts_with("HTTP/1.1 200"), "{index}");
    assert!(index.contains("<h1>hi</h1>"));
    assert!(index.contains(CLIENT_SCRIPT_PATH));

    let css = with_timeout(get(addr, "/css/main.css")).await;
    assert!(css.contains("text/css"));
    assert!(css.ends_with(".a{color:red}"));

    let script = with_timeout(get(addr, CLIENT_SCRIPT_PATH)).await;
    assert!(script.contains("WebSocket"));

    let missing = with_timeout(get(addr, "/nope.html")).await;
    assert!(missing.starts_with("HTTP/1.1 404"));

    let escape = with_timeout(get(addr, "/../secret.txt")).await;
    assert!(!escape.contains("do not serve"));

    shutdown.cancel();
}

#[test]
fn request_paths_cannot_leave_the_root() {
    let root = Path::new("/site/dist");
    assert_eq!(
        resolve_request_path(root, "/css/main.css"),
        Some(root.join("css/main.css"))
    );
    assert_eq!(resolve_request_path(root, "/../secret.txt"), None);
}

#[test]
fn client_tag_goes_before_body_close() {
    let html = inject_client_tag("<body><p>x</p></body>");
    assert!(html.ends_with(&format!(r#"<script src="{CLIENT_SCRIPT_PATH}"></script></body>"#)));
    assert!(inject_client_tag("plain").starts_with("plain<script"));
}

#[tokio::test]
async fn live_reload_messages_reach_subscribers() {
    let hub = LiveReload::new();
    assert_eq!(hub.client_count(), 0);
    // No subscribers yet: must be a silent no-op.
    hub.reload();
    hub.inject_stream("/css/main.css");

    let mut rx = hub.subscribe();
    assert_eq!(hub.client_count(), 1);
    hub.inject_stream("/css/main.css");
    hub.reload();

    assert_eq!(
        rx.recv().await.unwrap(),
        ReloadMessage::Inject {
            path: "css/main.css".into()
        }
    );
    assert_eq!(rx.recv().await.unwrap(), ReloadMessage::Reload);
    assert!(rx.try_recv().is_err());

    drop(rx);
    assert_eq!(hub.client_count(), 0);
    assert_eq!(
        serde_json::to_string(&ReloadMessage::Inject { path: "css/main.css".into() }).unwrap(),
        r#"{"type":"inject","path":"css/main.css"}"#
    );
}

#[tokio::test]
async fn serve_task_starts_server_and_styles_injects_into_it() {
    init_tracing();
    let dir = site();
    write_file(dir.path(), "src/sass/main.scss", ".b{color:blue}");
    let cfg = ConfigFileBuilder::new()
        .serve_port(0)
        .styles_cmd("cat {input}", "cat {input}")
        .build();
    let p = pipeline(cfg, Mode::Development, dir.path(), Arc::new(RealFileSystem));

    with_timeout(p.run_task("serve")).await.unwrap();
    let handle = p.preview().expect("serve should record the running server");

    // Running serve again is a no-op.
    with_timeout(p.run_task("serve")).await.unwrap();
    assert_eq!(p.preview().unwrap().local_addr(), handle.local_addr());

    let mut rx = p.live_reload().subscribe();
    with_timeout(p.run_task("styles")).await.unwrap();
    assert_eq!(
        with_timeout(rx.recv()).await.unwrap(),
        ReloadMessage::Inject {
            path: "css/main.css".into()
        }
    );

    let css = with_timeout(get(handle.local_addr(), "/css/main.css")).await;
    assert!(css.ends_with(".b{color:blue}"));

    p.shutdown_token().cancel();
}
