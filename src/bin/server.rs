use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use maze_arcade_server::constants::MS_PER_TICK;
use maze_arcade_server::engine::{GameEngine, GameEngineOptions};
use maze_arcade_server::level::{load_layout_png, Level};
use maze_arcade_server::server_protocol::{parse_client_message, ParsedClientMessage};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type SharedState = Arc<Mutex<ServerState>>;

struct ClientContext {
    tx: mpsc::Sender<String>,
}

struct ServerState {
    engine: GameEngine,
    clients: HashMap<String, ClientContext>,
    /// The first connected socket drives the player; everyone else watches.
    controller_id: Option<String>,
    last_tick_at: Instant,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let level_path = std::env::var("LEVEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("levels/default.png"));

    let engine = match build_engine(&level_path) {
        Ok(engine) => engine,
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        level = %level_path.display(),
        board_width = engine.level().tile_width(),
        board_height = engine.level().tile_height(),
        "session ready"
    );

    let state = Arc::new(Mutex::new(ServerState {
        engine,
        clients: HashMap::new(),
        controller_id: None,
        last_tick_at: Instant::now(),
    }));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!("static file root: {}", static_dir.display());
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static file root not found; only /ws and /healthz are served");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(source) => {
            error!("failed to bind {bind_addr}: {source}");
            return ExitCode::FAILURE;
        }
    };

    info!("listening on :{port}");
    if let Err(source) = axum::serve(listener, app).await {
        error!("server runtime failed: {source}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn build_engine(level_path: &Path) -> Result<GameEngine, String> {
    let layout = load_layout_png(level_path).map_err(|source| source.to_string())?;
    let level = Level::from_image(&layout).map_err(|source| source.to_string())?;
    GameEngine::new(level, GameEngineOptions::default()).map_err(|source| source.to_string())
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }
    let fallback = PathBuf::from("web");
    fallback.join("index.html").is_file().then_some(fallback)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(MS_PER_TICK / 1_000.0));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard);
        }
    });
}

/// Accumulated real time is drained in whole logical ticks; a frame that ran
/// zero ticks broadcasts nothing, so rendering stays behind the simulation.
fn tick_game(state: &mut ServerState) {
    let now = Instant::now();
    let elapsed_ms = now.duration_since(state.last_tick_at).as_secs_f64() * 1000.0;
    state.last_tick_at = now;

    if state.engine.advance(elapsed_ms) == 0 {
        return;
    }
    let snapshot = state.engine.build_snapshot(true);
    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
    );
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_client_id();
    let (tx, mut rx) = mpsc::channel::<String>(256);

    {
        let mut guard = state.lock().await;
        guard
            .clients
            .insert(client_id.clone(), ClientContext { tx: tx.clone() });
        let grabbed_control = guard.controller_id.is_none();
        if grabbed_control {
            guard.controller_id = Some(client_id.clone());
        }

        let welcome = json!({
            "type": "init",
            "level": guard.engine.level_init(),
            "snapshot": guard.engine.build_snapshot(false),
            "control": grabbed_control,
        });
        send_to_client(&guard, &client_id, &welcome);
        info!(client = %client_id, control = grabbed_control, "client connected");
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };
        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.as_str()).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    disconnect_client(&state, &client_id).await;
    writer.abort();
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let Some(parsed) = parse_client_message(raw) else {
        let guard = state.lock().await;
        send_to_client(
            &guard,
            client_id,
            &json!({ "type": "error", "message": "unrecognized message" }),
        );
        return;
    };

    let mut guard = state.lock().await;
    let is_controller = guard.controller_id.as_deref() == Some(client_id);
    match parsed {
        ParsedClientMessage::Ping { t } => {
            send_to_client(&guard, client_id, &json!({ "type": "pong", "t": t }));
        }
        ParsedClientMessage::Input { dir } if is_controller => guard.engine.handle_input(dir),
        ParsedClientMessage::Restart if is_controller => guard.engine.handle_restart(),
        ParsedClientMessage::Continue if is_controller => guard.engine.handle_continue(),
        _ => {}
    }
}

async fn disconnect_client(state: &SharedState, client_id: &str) {
    let mut guard = state.lock().await;
    guard.clients.remove(client_id);
    if guard.controller_id.as_deref() == Some(client_id) {
        guard.controller_id = guard.clients.keys().next().cloned();
        if let Some(next) = guard.controller_id.clone() {
            send_to_client(&guard, &next, &json!({ "type": "control", "granted": true }));
            info!(client = %next, "control handed over");
        }
    }
    info!(client = %client_id, "client disconnected");
}

/// Slow consumers are skipped for this frame rather than blocking the tick.
fn broadcast(state: &ServerState, message: &Value) {
    let payload = message.to_string();
    for client in state.clients.values() {
        let _ = client.tx.try_send(payload.clone());
    }
}

fn send_to_client(state: &ServerState, client_id: &str, message: &Value) {
    if let Some(client) = state.clients.get(client_id) {
        let _ = client.tx.try_send(message.to_string());
    }
}

fn make_client_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("client_{suffix}")
}
