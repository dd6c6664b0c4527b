// src/server/preview.rs

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::live_reload::{
    CLIENT_SCRIPT, CLIENT_SCRIPT_PATH, LiveReload, ReloadMessage, SOCKET_PATH, inject_client_tag,
};

/// Running preview server.
#[derive(Debug, Clone, Copy)]
pub struct PreviewHandle {
    addr: SocketAddr,
}

impl PreviewHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

struct PreviewState {
    root: PathBuf,
    live_reload: LiveReload,
}

/// Bind the preview server and serve `root` until `shutdown` is cancelled.
///
/// Returns once the socket is listening; serving continues on a spawned task.
pub async fn start_preview(
    root: PathBuf,
    host: &str,
    port: u16,
    live_reload: LiveReload,
    shutdown: CancellationToken,
) -> Result<PreviewHandle> {
    let state = Arc::new(PreviewState { root, live_reload });

    let app = Router::new()
        .route(SOCKET_PATH, get(live_reload_socket))
        .route(CLIENT_SCRIPT_PATH, get(client_script))
        .fallback(serve_asset)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding preview server to {addr}"))?;
    let local = listener.local_addr()?;

    info!(url = %format!("http://{local}/"), root = ?state.root, "preview server listening");

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
        match result {
            Ok(()) => info!("preview server stopped"),
            Err(e) => warn!(error = %e, "preview server failed"),
        }
    });

    Ok(PreviewHandle { addr: local })
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        CLIENT_SCRIPT,
    )
}

async fn live_reload_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<PreviewState>>,
) -> Response {
    let rx = state.live_reload.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx))
}

async fn client_session(socket: WebSocket, mut rx: broadcast::Receiver<ReloadMessage>) {
    debug!("live-reload client connected");
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Ok(msg) => {
                    let Ok(json) = serde_json::to_string(&msg) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("live-reload client lagged by {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("live-reload client disconnected");
}

async fn serve_asset(State(state): State<Arc<PreviewState>>, uri: Uri) -> Response {
    let decoded = match urlencoding::decode(uri.path()) {
        Ok(p) => p.into_owned(),
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let Some(mut path) = resolve_request_path(&state.root, &decoded) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        path.push("index.html");
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let content_type = content_type_for(&path);
    if content_type.starts_with("text/html") {
        let html = String::from_utf8_lossy(&bytes);
        return ([(header::CONTENT_TYPE, content_type)], inject_client_tag(&html)).into_response();
    }

    ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
}

/// Map a request path onto a file under `root`, refusing to leave it.
pub fn resolve_request_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for part in Path::new(request_path.trim_start_matches('/')).components() {
        match part {
            Component::Normal(p) => path.push(p),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path)
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
