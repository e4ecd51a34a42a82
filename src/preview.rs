//! Local HTTP preview of a generated page.
//!
//! Browsers refuse to let a `file://` page fetch its sibling assets, so the
//! page and everything next to it are served over HTTP instead. With
//! watching enabled the inputs are re-converted whenever they change and
//! connected pages reload themselves over a websocket.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
  extract::ws::{Message, WebSocket, WebSocketUpgrade},
  extract::State,
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  routing::get,
  Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tower_http::services::ServeDir;

use crate::convert::{self, ConversionJob};
use crate::error::{Error, Result};

const DEBOUNCE: Duration = Duration::from_millis(100);

const RELOAD_SNIPPET: &str = r#"<script>
    (() => {
      const socket = new WebSocket(`ws://${location.host}/ws`);
      socket.onmessage = (msg) => {
        const event = JSON.parse(msg.data);
        if (event.type === 'rebuilt') location.reload();
        if (event.type === 'failed') console.error('Rebuild failed:', event.message);
      };
    })();
  </script>
"#;

#[derive(Clone, Debug)]
pub struct PreviewOptions {
  pub host: String,
  pub port: u16,
  /// Open the page in the default browser once listening.
  pub open: bool,
  /// Rebuild the page when an input changes.
  pub watch: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewEvent {
  Rebuilt,
  Failed { message: String },
}

#[derive(Clone)]
struct PreviewState {
  page: PathBuf,
  tx: broadcast::Sender<PreviewEvent>,
}

/// Routes for previewing `page`: the page itself at `/`, live reload events
/// at `/ws`, and the page's directory for everything else.
pub fn router(page: PathBuf, tx: broadcast::Sender<PreviewEvent>) -> Router {
  let root = match page.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
    _ => PathBuf::from("."),
  };
  Router::new()
    .route("/", get(serve_page))
    .route("/ws", get(websocket_handler))
    .fallback_service(ServeDir::new(root))
    .with_state(PreviewState { page, tx })
}

/// Serves the output of `job` until the process is stopped.
///
/// The page is expected to exist already.
pub async fn serve(job: ConversionJob, options: PreviewOptions) -> Result<()> {
  let (tx, _rx) = broadcast::channel::<PreviewEvent>(100);

  if options.watch {
    spawn_watcher(job.clone(), tx.clone())?;
  }

  let app = router(job.output.clone(), tx);
  let addr = format!("{}:{}", options.host, options.port);
  let listener = tokio::net::TcpListener::bind(&addr).await?;
  let url = format!("http://{addr}");

  log::info!("previewing {} at {}", job.output.display(), url);
  if options.open {
    if let Err(err) = open::that(&url) {
      log::warn!("could not open a browser: {err}");
    }
  }

  axum::serve(listener, app).await?;
  Ok(())
}

async fn serve_page(State(state): State<PreviewState>) -> Response {
  match tokio::fs::read_to_string(&state.page).await {
    Ok(html) => Html(inject_reload(&html)).into_response(),
    Err(err) => (
      StatusCode::NOT_FOUND,
      format!("{}: {err}", state.page.display()),
    )
      .into_response(),
  }
}

/// Adds the live reload script just before `</body>`.
pub fn inject_reload(html: &str) -> String {
  match html.rfind("</body>") {
    Some(at) => {
      let mut out = String::with_capacity(html.len() + RELOAD_SNIPPET.len());
      out.push_str(&html[..at]);
      out.push_str(RELOAD_SNIPPET);
      out.push_str(&html[at..]);
      out
    }
    None => format!("{html}{RELOAD_SNIPPET}"),
  }
}

async fn websocket_handler(
  ws: WebSocketUpgrade,
  State(state): State<PreviewState>,
) -> impl IntoResponse {
  ws.on_upgrade(move |socket| handle_socket(socket, state.tx))
}

async fn handle_socket(socket: WebSocket, tx: broadcast::Sender<PreviewEvent>) {
  let (mut sender, mut receiver) = socket.split();
  let mut rx = tx.subscribe();

  let mut send_task = tokio::spawn(async move {
    while let Ok(event) = rx.recv().await {
      let Ok(json) = serde_json::to_string(&event) else {
        continue;
      };
      if sender.send(Message::Text(json)).await.is_err() {
        break;
      }
    }
  });

  // Drain pings and closes
  let mut recv_task = tokio::spawn(async move {
    while let Some(Ok(_msg)) = receiver.next().await {}
  });

  tokio::select! {
    _ = (&mut send_task) => recv_task.abort(),
    _ = (&mut recv_task) => send_task.abort(),
  };
}

/// Canonical paths of every file the page is built from.
fn watched_inputs(job: &ConversionJob) -> Result<HashSet<PathBuf>> {
  job
    .assets
    .iter()
    .chain(job.template.as_deref())
    .map(|path| path.canonicalize().map_err(Error::from))
    .collect()
}

fn spawn_watcher(
  job: ConversionJob,
  tx: broadcast::Sender<PreviewEvent>,
) -> Result<()> {
  let inputs = watched_inputs(&job)?;
  let (watch_tx, mut watch_rx) = mpsc::channel::<Event>(100);

  let mut watcher =
    notify::recommended_watcher(move |res: notify::Result<Event>| {
      if let Ok(event) = res {
        let _ = watch_tx.blocking_send(event);
      }
    })?;

  // Editors replace files on save, so watch directories, not files
  let dirs: HashSet<&Path> = inputs.iter().filter_map(|p| p.parent()).collect();
  for dir in dirs {
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::info!("watching {}", dir.display());
  }

  tokio::spawn(async move {
    let _watcher = watcher;

    while let Some(event) = watch_rx.recv().await {
      if !touches(&event, &inputs) {
        continue;
      }
      // Let the burst of events from one save settle
      tokio::time::sleep(DEBOUNCE).await;
      while watch_rx.try_recv().is_ok() {}

      let _ = tx.send(rebuild(job.clone()).await);
    }
  });

  Ok(())
}

/// Regenerates the page on the blocking pool.
async fn rebuild(job: ConversionJob) -> PreviewEvent {
  let task = tokio::task::spawn_blocking(move || convert::convert_local(&job));
  let outcome = match task.await {
    Ok(converted) => converted.map_err(|err| err.to_string()),
    Err(err) => Err(err.to_string()),
  };

  match outcome {
    Ok(_) => PreviewEvent::Rebuilt,
    Err(message) => {
      log::warn!("rebuild failed: {message}");
      PreviewEvent::Failed { message }
    }
  }
}

fn touches(event: &Event, inputs: &HashSet<PathBuf>) -> bool {
  matches!(
    event.kind,
    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
  ) && event.paths.iter().any(|p| inputs.contains(p))
}
