use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use chrono::Utc;
use grid_node::app::ports::{MinerMonitor, SpecsReader};
use grid_node::core::miner::{MinerHandle, MinerState};
use grid_node::core::system_info::{Metrics, Specs};
use grid_node::notify::{Manager, NotifierConfig, StateStore, StoredState};
use grid_node::ShutdownToken;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Request {
    method: &'static str,
    message_id: Option<String>,
    body: Value,
}

impl Request {
    fn title(&self) -> &str {
        self.body["embeds"][0]["title"].as_str().unwrap_or_default()
    }
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<Request>>>,
    missing: Arc<Mutex<Vec<String>>>,
    fail_all: bool,
}

impl Recorder {
    fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

async fn create(State(recorder): State<Recorder>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut requests = recorder.requests.lock();
    requests.push(Request {
        method: "POST",
        message_id: None,
        body,
    });
    if recorder.fail_all {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    let id = format!("m{}", requests.iter().filter(|r| r.method == "POST").count());
    (StatusCode::OK, Json(json!({ "id": id })))
}

async fn edit(
    State(recorder): State<Recorder>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    recorder.requests.lock().push(Request {
        method: "PATCH",
        message_id: Some(id.clone()),
        body,
    });
    if recorder.fail_all {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if recorder.missing.lock().contains(&id) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn mock_webhook(recorder: Recorder) -> String {
    let app = Router::new()
        .route("/api/webhooks/1/tok", post(create))
        .route("/api/webhooks/1/tok/messages/{id}", patch(edit))
        .with_state(recorder);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/webhooks/1/tok", addr)
}

struct StaticSpecs;

impl SpecsReader for StaticSpecs {
    fn read_specs(&self) -> grid_node::Result<Specs> {
        Ok(specs())
    }

    fn read_metrics(&self) -> grid_node::Result<Metrics> {
        Ok(Metrics {
            cpu_temp: "61.0°C".to_string(),
            cpu_wattage: "88.5 W".to_string(),
            time: Utc::now(),
        })
    }
}

fn specs() -> Specs {
    Specs {
        model: "AMD Ryzen 9 7950X 16-Core Processor".to_string(),
        cores: 16,
        threads: 32,
        ..Default::default()
    }
}

fn fast() -> NotifierConfig {
    NotifierConfig {
        interval: Duration::from_millis(50),
        retry_delay: Duration::from_millis(20),
        down_attempts: 2,
        request_timeout: Duration::from_millis(200),
    }
}

fn monitor(hashrate: f64) -> Arc<dyn MinerMonitor> {
    let state = Arc::new(MinerState::new());
    state.record_start(Utc::now());
    state.record_line("speed", Utc::now(), Some(hashrate));
    Arc::new(MinerHandle::new(state))
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_sends_once_then_edits_then_reports_down() {
    let recorder = Recorder::default();
    let url = mock_webhook(recorder.clone()).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("grid").join("state.json");

    let manager = Arc::new(
        Manager::new(&url, specs(), StateStore::new(&state_path))
            .unwrap()
            .with_config(fast()),
    );
    let shutdown = ShutdownToken::new();
    let task = {
        let manager = Arc::clone(&manager);
        let shutdown = shutdown.clone();
        let specs_reader: Arc<dyn SpecsReader> = Arc::new(StaticSpecs);
        tokio::spawn(async move { manager.run(monitor(2048.0), specs_reader, shutdown).await })
    };

    wait_until("an edit", || recorder.count("PATCH") >= 2).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    let requests = recorder.requests();
    assert_eq!(recorder.count("POST"), 1);
    assert_eq!(requests[0].title(), "AMD Ryzen 9 7950X");
    assert_eq!(requests[0].body["embeds"][0]["color"], 5763719);
    assert!(requests
        .iter()
        .filter(|r| r.method == "PATCH")
        .all(|r| r.message_id.as_deref() == Some("m1")));

    let last = requests.last().unwrap();
    assert_eq!(last.title(), "Miner Down");
    assert_eq!(last.body["embeds"][0]["color"], 16711680);

    let fields = requests[0].body["embeds"][0]["fields"].as_array().unwrap().clone();
    let names: Vec<&str> = fields.iter().filter_map(|f| f["name"].as_str()).collect();
    assert!(names.contains(&"CPU Temp"));
    assert!(names.contains(&"Best Hashrate"));
    assert!(names.contains(&"Updated"));

    let stored = StateStore::new(&state_path).load().unwrap();
    assert_eq!(stored.message_id, "m1");
    assert_eq!(stored.best_hashrate, 2048.0);
    assert_eq!(stored.last_hashrate, 2048.0);
}

#[tokio::test]
async fn test_missing_message_is_recreated() {
    let recorder = Recorder::default();
    recorder.missing.lock().push("stale".to_string());
    let url = mock_webhook(recorder.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    store
        .save(&StoredState {
            message_id: "stale".to_string(),
            best_hashrate: 5000.0,
            ..Default::default()
        })
        .unwrap();

    let manager = Manager::new(&url, specs(), store).unwrap().with_config(fast());
    let shutdown = ShutdownToken::new();
    let specs_reader: Arc<dyn SpecsReader> = Arc::new(StaticSpecs);

    let run = manager.run(monitor(1000.0), specs_reader, shutdown.clone());
    let stopper = async {
        wait_until("a new message", || recorder.count("POST") >= 1).await;
        shutdown.cancel();
    };
    tokio::time::timeout(Duration::from_secs(10), async { tokio::join!(run, stopper) })
        .await
        .unwrap();

    let requests = recorder.requests();
    assert_eq!(requests[0].method, "PATCH");
    assert_eq!(requests[0].message_id.as_deref(), Some("stale"));
    assert_eq!(requests[1].method, "POST");

    let stats = manager.stats();
    assert_eq!(stats.message_id, "m1");
    assert_eq!(stats.best_hashrate, 5000.0);
}

#[tokio::test]
async fn test_down_message_gives_up_after_bounded_attempts() {
    let recorder = Recorder {
        fail_all: true,
        ..Default::default()
    };
    let url = mock_webhook(recorder.clone()).await;
    let dir = TempDir::new().unwrap();
    let manager = Manager::new(&url, specs(), StateStore::new(dir.path().join("state.json")))
        .unwrap()
        .with_config(fast());

    let specs_reader: Arc<dyn SpecsReader> = Arc::new(StaticSpecs);
    tokio::time::timeout(Duration::from_secs(5), manager.stop(&specs_reader))
        .await
        .unwrap();

    assert_eq!(recorder.count("POST"), 2);
    assert!(recorder.requests().iter().all(|r| r.title() == "Miner Down"));
    assert!(dir.path().join("state.json").exists());
}

/// Accepts connections and never answers them.
async fn silent_webhook() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/api/webhooks/1/tok", addr)
}

#[tokio::test]
async fn test_unresponsive_webhook_does_not_block_shutdown() {
    let url = silent_webhook().await;
    let dir = TempDir::new().unwrap();
    let config = NotifierConfig {
        request_timeout: Duration::from_secs(2),
        down_attempts: 1,
        ..fast()
    };
    let manager = Arc::new(
        Manager::new(&url, specs(), StateStore::new(dir.path().join("state.json")))
            .unwrap()
            .with_config(config),
    );

    let shutdown = ShutdownToken::new();
    let task = {
        let manager = Arc::clone(&manager);
        let shutdown = shutdown.clone();
        let specs_reader: Arc<dyn SpecsReader> = Arc::new(StaticSpecs);
        tokio::spawn(async move { manager.run(monitor(512.0), specs_reader, shutdown).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.cancel();
    let cancelled_at = Instant::now();
    tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .expect("notifier stuck on a silent webhook")
        .unwrap();

    // The in-flight update is dropped on cancel, leaving only the single down attempt.
    assert!(cancelled_at.elapsed() < Duration::from_millis(3500));
    assert!(dir.path().join("state.json").exists());
}

#[tokio::test]
async fn test_unresponsive_webhook_request_times_out() {
    let url = silent_webhook().await;
    let dir = TempDir::new().unwrap();
    let manager = Manager::new(&url, specs(), StateStore::new(dir.path().join("state.json")))
        .unwrap()
        .with_config(fast());

    let specs_reader: Arc<dyn SpecsReader> = Arc::new(StaticSpecs);
    tokio::time::timeout(Duration::from_secs(5), manager.stop(&specs_reader))
        .await
        .expect("down message retries never timed out");
    assert_eq!(manager.stats().message_id, "");
}
