//! Query command: stream one query and print what the agent does.

use std::sync::{Arc, Mutex, PoisonError};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::debug;

use super::args::QueryArgs;
use crate::config::ClientConfig;
use crate::error::StreamError;
use crate::models::{format_execution_time, truncate_text};
use crate::session::SessionClient;
use crate::sse::TaskEvent;
use crate::state::{TaskObserver, TaskStatus, TaskStore};
use crate::stream::{ChannelObserver, SseHandler, StreamMessage, StreamObserver};

/// Longest observation printed for a step.
const OBSERVATION_PREVIEW_CHARS: usize = 300;

/// Feeds the task store and the printing loop from one stream.
struct CliObserver {
    task: TaskObserver,
    channel: ChannelObserver,
}

impl StreamObserver for CliObserver {
    fn on_connection_start(&self) {
        self.task.on_connection_start();
        self.channel.on_connection_start();
    }

    fn on_event(&self, event: TaskEvent) {
        self.task.on_event(event.clone());
        self.channel.on_event(event);
    }

    fn on_error(&self, error: &StreamError) {
        self.task.on_error(error);
        self.channel.on_error(error);
    }

    fn on_close(&self) {
        self.task.on_close();
        self.channel.on_close();
    }
}

/// Render a stream message for the terminal. `None` prints nothing.
pub fn render_message(message: &StreamMessage) -> Option<String> {
    match message {
        StreamMessage::Connected => None,
        StreamMessage::Event(event) => Some(render_event(event)),
        StreamMessage::Error(error) => Some(format!("Error: {}", error.user_message())),
        StreamMessage::Closed => None,
    }
}

fn render_event(event: &TaskEvent) -> String {
    match event {
        TaskEvent::Step {
            thought,
            action,
            action_input,
            observation,
        } => {
            let mut out = format!("Thought: {}\nAction: {}", thought, action);
            if let Some(input) = action_input {
                out.push_str(&format!("\nInput: {}", input));
            }
            if let Some(observation) = observation {
                out.push_str(&format!(
                    "\nObservation: {}",
                    truncate_text(observation, OBSERVATION_PREVIEW_CHARS)
                ));
            }
            out.push('\n');
            out
        }
        TaskEvent::FinalAnswer { answer, .. } => format!("Answer: {}", answer),
        TaskEvent::ExecutionTime { time } => {
            format!("Completed in {}", format_execution_time(*time))
        }
        TaskEvent::Error { error } => format!("Agent error: {}", error),
    }
}

/// Handle a query run.
///
/// Creates a session unless one was given, streams the query, and prints
/// events as they arrive. Ctrl-C cancels the stream. Fails when the task ends
/// in error.
pub async fn handle_query_command(args: QueryArgs) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url {
        config = config.with_base_url(url);
    }
    config.validate()?;

    let session_id = match args.session {
        Some(id) => id,
        None => {
            let session = SessionClient::with_reqwest(config.clone())?
                .create_session()
                .await?;
            eprintln!("Session: {}", session.id);
            session.id
        }
    };

    let store = Arc::new(Mutex::new(TaskStore::new()));
    let task_id = store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .create_task(args.query.clone());

    let (channel, mut messages) = ChannelObserver::channel();
    let observer = Arc::new(CliObserver {
        task: TaskObserver::new(store.clone(), task_id.clone()),
        channel,
    });

    let mut handler = SseHandler::with_reqwest(config, observer)?;
    let handle = handler.open(&session_id, &args.query).await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            message = messages.recv() => {
                let Some(message) = message else { break };
                if let Some(text) = render_message(&message) {
                    println!("{}", text);
                }
                if message.is_terminal() {
                    break;
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                eprintln!("Cancelling...");
                handle.cancel();
            }
        }
    }

    handler.close().await;
    debug!("Stream finished in state {}", handle.state());

    let task = store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&task_id)
        .cloned()
        .ok_or_else(|| eyre!("task {} disappeared", task_id))?;

    match task.status {
        TaskStatus::Error => Err(eyre!("query failed")),
        _ if interrupted => Err(eyre!("query cancelled")),
        _ => Ok(()),
    }
}
