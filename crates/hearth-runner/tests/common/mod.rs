//! Shared fixtures: a mock chat-completions server and a scripted world.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use hearth_runner::WorldView;
use hearth_runner::config::{HearthConfig, RemoteConfig};
use hearth_types::{AgentId, Position, Weather, WeatherKind, WorldSnapshot};
use serde_json::{Value, json};

/// What the mock endpoint answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this text as `choices[0].message.content`.
    Content(String),
    /// This status with a plain-text body.
    Status(u16),
    /// Like `Content`, but only after holding the request for a while.
    Delayed(Duration, String),
}

/// Requests seen by the mock endpoint.
pub struct MockLlm {
    reply: MockReply,
    hits: AtomicUsize,
    last_body: Mutex<Option<Value>>,
    last_auth: Mutex<Option<String>>,
}

impl MockLlm {
    /// Number of requests received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent request.
    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    /// `Authorization` header of the most recent request.
    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(mock): State<Arc<MockLlm>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    *mock.last_auth.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *mock.last_body.lock().unwrap() = Some(body);

    match &mock.reply {
        MockReply::Content(text) => completion(text),
        MockReply::Delayed(delay, text) => {
            tokio::time::sleep(*delay).await;
            completion(text)
        }
        MockReply::Status(code) => (
            StatusCode::from_u16(*code).unwrap(),
            "upstream exploded",
        )
            .into_response(),
    }
}

fn completion(text: &str) -> Response {
    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// Start a mock endpoint on an ephemeral port. Returns its full URL and
/// the request log.
pub async fn spawn_mock(reply: MockReply) -> (String, Arc<MockLlm>) {
    let mock = Arc::new(MockLlm {
        reply,
        hits: AtomicUsize::new(0),
        last_body: Mutex::new(None),
        last_auth: Mutex::new(None),
    });
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(Arc::clone(&mock));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1/chat/completions"), mock)
}

/// A remote variant pointed at `endpoint`.
pub fn remote(endpoint: &str) -> RemoteConfig {
    RemoteConfig {
        api_key: Some("sk-test".to_owned()),
        endpoint: endpoint.to_owned(),
        model: "mock-model".to_owned(),
    }
}

/// Default config with a given budget ceiling.
pub fn config_with_budget(max_calls: u32) -> HearthConfig {
    let mut config = HearthConfig::default();
    config.budget.max_calls = max_calls;
    config
}

/// A world whose clock and weather only change when a test says so.
pub struct ScriptedWorld {
    pub hour: f32,
    pub weather: Weather,
    pub player: Position,
    pub positions: BTreeMap<AgentId, Position>,
}

impl ScriptedWorld {
    pub fn new(hour: f32, visibility: f32) -> Self {
        Self {
            hour,
            weather: Weather {
                kind: WeatherKind::Clear,
                visibility,
            },
            player: Position::new(0.0, 0.0),
            positions: BTreeMap::new(),
        }
    }

    /// Place an agent `distance` units east of the player.
    pub fn place(&mut self, agent_id: AgentId, distance: f32) {
        self.positions.insert(agent_id, Position::new(distance, 0.0));
    }
}

impl WorldView for ScriptedWorld {
    fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time_of_day: self.hour,
            weather: self.weather,
        }
    }

    fn reference_position(&self) -> Position {
        self.player
    }

    fn agent_position(&self, agent_id: AgentId) -> Option<Position> {
        self.positions.get(&agent_id).copied()
    }
}
