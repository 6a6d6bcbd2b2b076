//! Common test utilities for integration tests.
//!
//! Wire fixtures for building SSE bodies, plus helpers for waiting on stream
//! outcomes.

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::time::Duration;

use agent_stream::{ClientConfig, StreamHandle, StreamState};
use serde_json::{json, Value};

/// One `data:` frame followed by the blank separator line.
pub fn frame(payload: &Value) -> String {
    format!("data: {}\n\n", payload)
}

/// SSE body made of the given payloads, terminated by the sentinel.
pub fn sse_body(payloads: &[Value]) -> String {
    let mut body: String = payloads.iter().map(frame).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn step(thought: &str, action: &str) -> Value {
    json!({"type": "step", "thought": thought, "action": action})
}

pub fn final_answer(answer: &str) -> Value {
    json!({"type": "final_answer", "thought": "I know the answer", "answer": answer})
}

pub fn execution_time(time: f64) -> Value {
    json!({"type": "execution_time", "time": time})
}

/// A typical successful agent run.
pub fn agent_run() -> Vec<Value> {
    vec![
        json!({
            "type": "step",
            "thought": "I should look at the directory",
            "action": "list_dir",
            "action_input": {"path": "."},
            "observation": "Cargo.toml\nsrc"
        }),
        final_answer("The project has a Cargo.toml and a src directory."),
        execution_time(2.41),
    ]
}

/// Config pointing at a test server.
pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(base_url)
        .with_connect_timeout(Duration::from_secs(2))
}

/// Wait for a stream to finish, failing the test after a few seconds.
pub async fn finish(handle: &StreamHandle) -> StreamState {
    tokio::time::timeout(Duration::from_secs(5), handle.finished())
        .await
        .expect("stream did not finish in time")
}

/// Wait until the observer has seen at least `count` callbacks.
pub async fn wait_for_calls(observer: &RecordingObserver, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while observer.calls().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("observer callbacks did not arrive in time");
}
