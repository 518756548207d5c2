//! HTTP + WebSocket API for mindread
//!
//! Endpoints:
//! - POST /session/new - Create new game
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/sample - Feed one sample
//! - POST /session/{id}/choose - Manual override
//! - DELETE /session/{id} - Tear down
//! - WS /ws/{id} - Live events out, samples in
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::core::replay::{self, TraceEvent};
use crate::core::session::GameSession;
use crate::types::{Direction, EngineConfig, Partition, Position, Sample, SessionEvent, Theme, TimerPhase};

/// Session state
#[derive(Debug)]
pub struct SessionHandle {
    pub id: String,
    pub theme: Option<Theme>,
    pub game: GameSession,
    pub update_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Apply one inbound event and fan out whatever it produced
    fn dispatch(&mut self, event: &TraceEvent) -> Vec<SessionEvent> {
        let events = replay::apply(&mut self.game, event);
        for e in &events {
            let _ = self.update_tx.send(e.clone());
        }
        events
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, SessionHandle>>,
    pub default_config: EngineConfig,
}

fn lookup<'a>(sessions: &'a HashMap<String, SessionHandle>, id: &str) -> crate::Result<&'a SessionHandle> {
    sessions.get(id).ok_or_else(|| crate::Error::Session(format!("unknown session {}", id)))
}

fn lookup_mut<'a>(sessions: &'a mut HashMap<String, SessionHandle>, id: &str) -> crate::Result<&'a mut SessionHandle> {
    sessions.get_mut(id).ok_or_else(|| crate::Error::Session(format!("unknown session {}", id)))
}

/// Map an engine error onto its HTTP status
fn status_for(err: &crate::Error) -> StatusCode {
    match err {
        crate::Error::Session(_) => StatusCode::NOT_FOUND,
        crate::Error::Config(_) | crate::Error::Replay { .. } | crate::Error::Serialization(_) => {
            StatusCode::BAD_REQUEST
        }
        crate::Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: crate::Error) -> StatusCode {
    debug!(error = %err, "request rejected");
    status_for(&err)
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    pub theme: Option<Theme>,
    /// Explicit pool; overrides `theme`
    pub words: Option<Vec<String>>,
    pub seed: Option<u64>,
    pub config: Option<EngineConfig>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub round: Option<usize>,
    pub partition: Option<Partition>,
    pub word: Option<String>,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub theme: Option<Theme>,
    pub phase: TimerPhase,
    pub round: Option<usize>,
    pub partition: Option<Partition>,
    pub highlighted: Option<Direction>,
    pub held_ms: u64,
    pub stable_ms: u64,
    pub finished: bool,
    pub word: Option<String>,
}

/// Feed sample request; a missing position is an absent payload
#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub timestamp_ms: u64,
    pub position: Option<Position>,
}

/// Manual override request
#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    pub direction: Direction,
    pub timestamp_ms: u64,
}

/// Events produced by one request
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<SessionEvent>,
    pub finished: bool,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(default_config: EngineConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        default_config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/sample", post(add_sample))
        .route("/session/:id/choose", post(choose))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let config = req.config.unwrap_or_else(|| state.default_config.clone());
    if let Err(e) = config.validate() {
        warn!(error = %e, "rejected session config");
        return Err(status_for(&e));
    }

    let theme = if req.words.is_some() { None } else { Some(req.theme.unwrap_or_default()) };
    let pool = match (req.words, theme) {
        (Some(words), _) => words,
        (None, Some(theme)) => {
            let mut rng = match req.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            theme.sample_words(config.word_pool_size, &mut rng)
        }
        (None, None) => Vec::new(),
    };

    let game = GameSession::new(config, pool).map_err(reject)?;
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let response = NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
        round: game.round().map(|r| r.round_index),
        partition: game.round().map(|r| r.partition.clone()),
        word: game.winning_word().map(str::to_string),
    };

    let handle = SessionHandle {
        id: session_id.clone(),
        theme,
        game,
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), handle);
    info!(session = %session_id, "session created");

    Ok(Json(response))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let handle = lookup(&sessions, &id).map_err(reject)?;
    let game = &handle.game;
    let readout = game.readout();

    Ok(Json(SessionStatusResponse {
        session_id: id,
        theme: handle.theme,
        phase: readout.phase,
        round: game.round().map(|r| r.round_index),
        partition: game.round().map(|r| r.partition.clone()),
        highlighted: readout.highlighted,
        held_ms: readout.held_ms,
        stable_ms: readout.stable_ms,
        finished: game.is_finished(),
        word: game.winning_word().map(str::to_string),
    }))
}

/// Feed one sample to a session
async fn add_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SampleRequest>,
) -> Result<Json<EventsResponse>, StatusCode> {
    let event = match req.position {
        Some(position) => TraceEvent::Sample(Sample::new(req.timestamp_ms, position)),
        None => TraceEvent::Absent { timestamp_ms: req.timestamp_ms },
    };
    dispatch(&state, &id, &event).await.map(Json)
}

/// Manual override
async fn choose(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChooseRequest>,
) -> Result<Json<EventsResponse>, StatusCode> {
    let event = TraceEvent::Choose { timestamp_ms: req.timestamp_ms, direction: req.direction };
    dispatch(&state, &id, &event).await.map(Json)
}

async fn dispatch(state: &AppState, id: &str, event: &TraceEvent) -> Result<EventsResponse, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let handle = lookup_mut(&mut sessions, id).map_err(reject)?;
    let events = handle.dispatch(event);
    Ok(EventsResponse {
        events,
        finished: handle.game.is_finished(),
    })
}

/// Tear down and forget a session
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(mut handle) => {
            handle.game.teardown();
            info!(session = %id, "session removed");
            StatusCode::NO_CONTENT
        }
        None => {
            warn!(session = %id, "teardown of unknown session");
            StatusCode::NOT_FOUND
        }
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let handle = lookup(&sessions, &id).map_err(reject)?;
    let rx = handle.update_tx.subscribe();
    let opening = handle.game.announce();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, state, id, opening, rx).await;
    }))
}

/// Inbound frames are JSON trace events or trace lines
fn parse_frame(text: &str) -> Result<Option<TraceEvent>, String> {
    if text.trim_start().starts_with('{') {
        serde_json::from_str(text).map(Some).map_err(|e| e.to_string())
    } else {
        replay::parse_line(text)
    }
}

/// Handle WebSocket connection
async fn handle_websocket(
    socket: WebSocket,
    state: Arc<AppState>,
    id: String,
    opening: Vec<SessionEvent>,
    mut rx: broadcast::Receiver<SessionEvent>,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        for event in opening {
            let json = serde_json::to_string(&event).unwrap_or_default();
            if sender.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket subscriber lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            match parse_frame(&text) {
                Ok(Some(event)) => {
                    let mut sessions = state.sessions.write().await;
                    match lookup_mut(&mut sessions, &id) {
                        Ok(handle) => {
                            handle.dispatch(&event);
                        }
                        Err(e) => {
                            debug!(error = %e, "websocket session gone");
                            break;
                        }
                    }
                }
                Ok(None) => {}
                Err(reason) => debug!(session = %id, %reason, "ignored websocket frame"),
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(addr: &str, default_config: EngineConfig) -> crate::Result<()> {
    let router = create_router(default_config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API listening");
    println!("🜂 mindread API running on {}", addr);
    println!("  POST   /session/new         - Create game");
    println!("  GET    /session/:id         - Get status");
    println!("  POST   /session/:id/sample  - Feed sample");
    println!("  POST   /session/:id/choose  - Manual override");
    println!("  DELETE /session/:id         - Tear down");
    println!("  WS     /ws/:id              - Live events");
    println!("  GET    /health              - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
