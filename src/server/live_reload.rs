// src/server/live_reload.rs

//! Fan-out of reload notifications to connected browser sessions.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Message pushed to every connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Reload the whole page.
    Reload,
    /// Swap the stylesheet whose URL ends with `path`.
    Inject { path: String },
}

/// Handle used by tasks to notify browsers.
///
/// Cloning is cheap; all clones share one broadcast channel. Sending with no
/// subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct LiveReload {
    tx: broadcast::Sender<ReloadMessage>,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Ask clients to hot-swap `asset` (a path relative to the served root).
    pub fn inject_stream(&self, asset: &str) {
        self.send(ReloadMessage::Inject {
            path: asset.trim_start_matches('/').to_string(),
        });
    }

    /// Ask clients to reload the page.
    pub fn reload(&self) {
        self.send(ReloadMessage::Reload);
    }

    fn send(&self, msg: ReloadMessage) {
        match self.tx.send(msg) {
            Ok(n) => debug!(clients = n, "live-reload message sent"),
            Err(broadcast::error::SendError(msg)) => {
                debug!(?msg, "no live-reload clients connected; dropping message")
            }
        }
    }
}

/// Browser-side client served at [`CLIENT_SCRIPT_PATH`].
pub const CLIENT_SCRIPT: &str = r#"(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(proto + location.host + "/__assetdag/ws");
  socket.onmessage = function (event) {
    var msg = JSON.parse(event.data);
    if (msg.type === "reload") {
      location.reload();
      return;
    }
    if (msg.type === "inject") {
      var links = document.querySelectorAll('link[rel="stylesheet"]');
      for (var i = 0; i < links.length; i++) {
        var href = links[i].getAttribute("href");
        if (!href) continue;
        var bare = href.split("?")[0];
        if (bare.slice(-msg.path.length) === msg.path) {
          links[i].setAttribute("href", bare + "?assetdag=" + Date.now());
        }
      }
    }
  };
})();
"#;

pub const CLIENT_SCRIPT_PATH: &str = "/__assetdag/livereload.js";
pub const SOCKET_PATH: &str = "/__assetdag/ws";

/// Insert the client script tag into an HTML document.
pub fn inject_client_tag(html: &str) -> String {
    let tag = format!(r#"<script src="{CLIENT_SCRIPT_PATH}"></script>"#);
    match html.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(&tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}
