//! Shared fixtures: a local annotate endpoint and a capture image

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stepsense_eye::{CloudVisionClient, FileSource, VisionConfig};

pub const API_KEY: &str = "test-key";

/// One request received by the mock endpoint
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Mutex<(StatusCode, String)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Annotate endpoint on 127.0.0.1 answering every request with a fixed reply
pub struct MockVision {
    addr: SocketAddr,
    state: MockState,
}

impl MockVision {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let state = MockState {
            reply: Arc::new(Mutex::new((status, body.to_string()))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/v1/images:annotate", post(annotate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub async fn ok(body: Value) -> Self {
        Self::start(StatusCode::OK, body).await
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/images:annotate", self.addr)
    }

    pub fn set_reply(&self, status: StatusCode, body: Value) {
        *self.state.reply.lock() = (status, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn config(&self) -> VisionConfig {
        VisionConfig {
            endpoint: self.endpoint(),
            api_key: Some(API_KEY.to_string()),
            timeout_secs: Some(10),
            ..VisionConfig::default()
        }
    }

    pub fn client(&self) -> CloudVisionClient {
        CloudVisionClient::new(&self.config()).unwrap()
    }
}

async fn annotate(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.requests.lock().push(RecordedRequest {
        key: params.get("key").cloned(),
        body,
    });
    state.reply.lock().clone()
}

/// Write a solid-colour PNG and return its path
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 160]))
        .save(&path)
        .unwrap();
    path
}

pub fn file_source(path: PathBuf) -> FileSource {
    FileSource::new(path, (1280, 720), 70).unwrap()
}

pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!({
        "normalizedVertices": [
            {"x": x0, "y": y0},
            {"x": x1, "y": y0},
            {"x": x1, "y": y1},
            {"x": x0, "y": y1}
        ]
    })
}

pub fn object(name: &str, score: f64, poly: Value) -> Value {
    json!({"name": name, "score": score, "boundingPoly": poly})
}

pub fn label(description: &str, score: f64) -> Value {
    json!({"description": description, "score": score})
}

pub fn response(objects: Vec<Value>, labels: Vec<Value>) -> Value {
    json!({
        "responses": [{
            "localizedObjectAnnotations": objects,
            "labelAnnotations": labels
        }]
    })
}
