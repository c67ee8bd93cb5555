//! In-process fakes of the oEmbed, transcript and chat-completion services.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::config::{ApiKeys, Config, Settings};
use crate::error::AnalyzeError;
use crate::pipeline::{Observer, Stage};

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub const LLM_OUTPUT: &str = "The speaker walks through building a web service in Rust.

Key Takeaways:
- Keep handlers thin
- Propagate errors with ?
- Log at the boundaries

Main Topics:
1. Routing
2. Error handling
";

#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

#[derive(Clone)]
struct FakeState {
    metadata: Reply,
    transcript: Reply,
    llm: Reply,
    hits: Arc<Hits>,
}

#[derive(Default)]
pub struct Hits {
    pub metadata: AtomicUsize,
    pub transcript: AtomicUsize,
    pub llm: AtomicUsize,
}

impl Hits {
    pub fn total(&self) -> usize {
        self.metadata.load(Ordering::SeqCst) + self.transcript.load(Ordering::SeqCst) + self.llm.load(Ordering::SeqCst)
    }
}

pub struct FakeUpstreams {
    pub metadata: Reply,
    pub transcript: Reply,
    pub llm: Reply,
}

impl Default for FakeUpstreams {
    fn default() -> Self {
        Self {
            metadata: Reply::ok(json!({"title": "Rust Web Services", "author_name": "Ferris"})),
            transcript: Reply::ok(json!({
                "success": true,
                "data": {
                    "text": "Welcome to this talk about Rust web services.",
                    "segments": [{"text": "Welcome to this talk about Rust web services.", "offset": 0, "duration": 4.2}]
                }
            })),
            llm: Reply::ok(json!({"choices": [{"message": {"role": "assistant", "content": LLM_OUTPUT}}]})),
        }
    }
}

pub struct RunningUpstreams {
    pub addr: SocketAddr,
    pub hits: Arc<Hits>,
}

impl FakeUpstreams {
    pub async fn start(self) -> RunningUpstreams {
        let hits = Arc::new(Hits::default());
        let state = FakeState {
            metadata: self.metadata,
            transcript: self.transcript,
            llm: self.llm,
            hits: hits.clone(),
        };
        let app = Router::new()
            .route(
                "/oembed",
                get(|State(s): State<FakeState>| async move {
                    s.hits.metadata.fetch_add(1, Ordering::SeqCst);
                    (s.metadata.status, Json(s.metadata.body))
                }),
            )
            .route(
                "/v1/youtube/transcript",
                get(|State(s): State<FakeState>| async move {
                    s.hits.transcript.fetch_add(1, Ordering::SeqCst);
                    (s.transcript.status, Json(s.transcript.body))
                }),
            )
            .route(
                "/v1/chat/completions",
                post(|State(s): State<FakeState>| async move {
                    s.hits.llm.fetch_add(1, Ordering::SeqCst);
                    (s.llm.status, Json(s.llm.body))
                }),
            )
            .with_state(state);
        let addr = serve(app).await;
        RunningUpstreams { addr, hits }
    }
}

impl RunningUpstreams {
    pub fn settings(&self, keys: ApiKeys) -> Settings {
        let config = Config {
            supadata_url: Some(format!("http://{}/v1", self.addr)),
            openai_url: Some(format!("http://{}/v1", self.addr)),
            oembed_url: Some(format!("http://{}/oembed", self.addr)),
            ..Config::default()
        };
        Settings::resolve(&config, keys, None)
    }
}

pub fn both_keys() -> ApiKeys {
    ApiKeys {
        supadata: Some("sd-test".to_string()),
        openai: Some("sk-test".to_string()),
    }
}

/// Observer that panics when the pipeline reaches one stage
pub struct PanicOnStage(pub Stage);

impl Observer for PanicOnStage {
    fn on_stage(&self, _request_id: &str, stage: Stage) {
        if stage == self.0 {
            panic!("observer failed at {stage}");
        }
    }

    fn on_failure(&self, _request_id: &str, _stage: Stage, _error: &AnalyzeError) {}
}
