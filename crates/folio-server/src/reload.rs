//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live reload WebSocket endpoint.
pub const RELOAD_PATH: &str = "/__folio/reload";

/// Messages sent to browsers after a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Site rebuilt; reload the page
    Reload,

    /// Rebuild failed; the last good build is still served
    BuildFailed {
        /// Error shown in the page overlay
        message: String,
    },

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected browsers.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side live reload script, injected into every page of a dev build.
///
/// The WebSocket URL is derived from the page location so the script works on
/// any host and port.
pub fn reload_client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  var proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var url = proto + location.host + '{}';
  var attempts = 0;

  function showError(message) {{
    var overlay = document.getElementById('folio-error');
    if (!overlay) {{
      overlay = document.createElement('pre');
      overlay.id = 'folio-error';
      overlay.style.cssText = 'position:fixed;inset:0;z-index:9999;margin:0;padding:2rem;' +
        'background:rgba(20,20,20,0.92);color:#ff8080;font:14px/1.5 monospace;white-space:pre-wrap;overflow:auto';
      document.body.appendChild(overlay);
    }}
    overlay.textContent = 'Build failed\n\n' + message;
  }}

  function connect() {{
    var ws = new WebSocket(url);

    ws.onopen = function() {{
      if (attempts > 0) {{
        location.reload();
      }}
      attempts = 0;
    }};

    ws.onmessage = function(event) {{
      var msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'build_failed':
          showError(msg.message);
          break;

        case 'connected':
          console.log('[folio] Live reload connected');
          break;
      }}
    }};

    ws.onclose = function() {{
      if (attempts < 10) {{
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        ws_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        hub.send(ReloadMessage::Reload);

        match rx.try_recv() {
            Ok(ReloadMessage::Reload) => {}
            other => panic!("Expected Reload message, got {:?}", other),
        }
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn send_without_subscribers_is_silent() {
        let hub = ReloadHub::new();

        hub.send(ReloadMessage::Connected);

        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn serializes_messages() {
        let msg = ReloadMessage::BuildFailed {
            message: "Sidebar 'problems' references unknown document".to_string(),
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(
            json,
            r#"{"type":"build_failed","message":"Sidebar 'problems' references unknown document"}"#
        );
        assert_eq!(
            serde_json::to_string(&ReloadMessage::Reload).unwrap(),
            r#"{"type":"reload"}"#
        );
    }

    #[test]
    fn client_script_uses_endpoint() {
        let script = reload_client_script(RELOAD_PATH);

        assert!(script.contains("location.host + '/__folio/reload'"));
        assert!(script.contains("case 'build_failed'"));
    }
}
