#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use grid_node::core::miner::{MinerMonitor, Supervisor, SupervisorConfig};
use grid_node::{GridError, ShutdownToken};
use parking_lot::Mutex;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn shell(script: &str, delay: Duration) -> SupervisorConfig {
    SupervisorConfig::new(vec!["-c".to_string(), script.to_string()], delay).with_program("/bin/sh")
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn start(supervisor: &Arc<Supervisor>, shutdown: &ShutdownToken) -> tokio::task::JoinHandle<()> {
    let supervisor = Arc::clone(supervisor);
    let shutdown = shutdown.clone();
    tokio::spawn(async move { supervisor.run(shutdown).await })
}

async fn stop(task: tokio::task::JoinHandle<()>, shutdown: &ShutdownToken) {
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("supervisor did not stop in time")
        .unwrap();
}

#[tokio::test]
async fn test_output_is_captured_and_hashrate_tracked() {
    let sink = SharedBuf::default();
    let config = shell(
        "echo '[2024-01-01] miner speed 10s/60s/15m 1234.5 1200.0 n/a H/s max 1300.0 H/s'; exec sleep 30",
        Duration::from_secs(30),
    );
    let supervisor = Arc::new(Supervisor::with_executable("/bin/sh", config).with_sink(sink.clone()));
    let handle = supervisor.handle();
    let shutdown = ShutdownToken::new();
    let task = start(&supervisor, &shutdown);

    wait_until("hashrate", || handle.status().hashrate_hs > 0.0).await;
    let status = handle.status();
    assert!(status.running);
    assert_eq!(status.hashrate_hs, 1234.5);
    assert!(status.last_start_time.is_some());
    assert!(status.last_log_time.is_some());
    assert!(sink.contents().contains("speed 10s/60s/15m"));

    let started = Instant::now();
    stop(task, &shutdown).await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let status = handle.status();
    assert!(!status.running);
    assert_eq!(status.hashrate_hs, 0.0);
    assert!(status.last_error.is_none());
    assert_eq!(supervisor.launch_attempts(), 1);
}

#[tokio::test]
async fn test_failed_exit_is_recorded() {
    let config = shell("echo first; echo second; exit 3", Duration::from_secs(30));
    let supervisor = Arc::new(Supervisor::with_executable("/bin/sh", config).with_sink(SharedBuf::default()));
    let handle = supervisor.handle();
    let shutdown = ShutdownToken::new();
    let task = start(&supervisor, &shutdown);

    wait_until("exit", || handle.status().last_exit_time.is_some()).await;
    let status = handle.status();
    assert!(!status.running);
    assert!(status.last_error.unwrap_or_default().contains('3'));

    let lines: Vec<String> = handle.logs(250).into_iter().map(|entry| entry.line).collect();
    assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);

    // Cancelling during the restart delay returns promptly.
    let started = Instant::now();
    stop(task, &shutdown).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(supervisor.launch_attempts(), 1);
}

#[tokio::test]
async fn test_restarts_after_exit() {
    let config = shell("echo tick", Duration::from_millis(50));
    let supervisor = Arc::new(Supervisor::with_executable("/bin/sh", config).with_sink(SharedBuf::default()));
    let handle = supervisor.handle();
    let shutdown = ShutdownToken::new();
    let task = start(&supervisor, &shutdown);

    wait_until("relaunch", || supervisor.launch_attempts() >= 3).await;
    stop(task, &shutdown).await;

    assert!(handle.logs(250).iter().all(|entry| entry.line == "tick"));
    assert!(handle.status().last_error.is_none());
}

#[tokio::test]
async fn test_launch_failure_is_recorded_and_retried() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake-miner");
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = SupervisorConfig::new(vec!["--bench".to_string()], Duration::from_millis(50))
        .with_program(path.to_string_lossy());
    let supervisor = Arc::new(Supervisor::new(config).unwrap());
    assert_eq!(supervisor.executable(), path.as_path());
    assert_eq!(supervisor.config().restart_delay, Duration::from_millis(50));
    assert_eq!(supervisor.config().args, vec!["--bench".to_string()]);
    std::fs::remove_file(&path).unwrap();

    let handle = supervisor.handle();
    let shutdown = ShutdownToken::new();
    let task = start(&supervisor, &shutdown);

    wait_until("retries", || supervisor.launch_attempts() >= 2).await;
    let status = handle.status();
    assert!(!status.running);
    assert!(!status.last_error.unwrap_or_default().is_empty());
    assert!(status.last_start_time.is_none());

    stop(task, &shutdown).await;
    let attempts = supervisor.launch_attempts();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(supervisor.launch_attempts(), attempts);
}

#[tokio::test]
async fn test_cancelled_before_start_never_launches() {
    let config = shell("exit 0", Duration::from_millis(50));
    let supervisor = Supervisor::with_executable("/bin/sh", config);
    let shutdown = ShutdownToken::new();
    shutdown.cancel();

    supervisor.run(shutdown).await;
    assert_eq!(supervisor.launch_attempts(), 0);
    assert!(supervisor.handle().status().last_start_time.is_none());
}

#[test]
fn test_missing_executable_is_fatal() {
    let config = SupervisorConfig::default().with_program("definitely-not-a-miner-binary-xyz");
    let result = Supervisor::new(config);
    assert!(matches!(result, Err(GridError::ExecutableNotFound { .. })));
}
