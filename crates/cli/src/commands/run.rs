//! `rumormill run` — interactive labeling session.
//!
//! Each entered line is one input event: the controller debounces it, labels
//! it after the quiet period, and persists the outcome. An empty line clears
//! the pending task and the displayed label.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use rumormill_labeler::HeuristicLabeler;
use rumormill_pipeline::{DebounceController, HistoryFeed, ViewHandle};
use rumormill_session::{LocalIdentity, SessionGate};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = super::build_store(&config).await?;

    let gate = SessionGate::new(Arc::new(LocalIdentity::new()));
    let session = match gate
        .ensure_session(config.identity.bootstrap_token.as_deref())
        .await
    {
        Ok(session) => Some(session),
        Err(e) => {
            // The session stays not-ready; input still works but only
            // clears the view. No retry.
            eprintln!("Failed to authenticate: {e}");
            None
        }
    };

    let view = ViewHandle::new();
    let mut controller = DebounceController::new(
        Arc::new(HeuristicLabeler::new()),
        gate.state(),
        view.clone(),
    )
    .with_store(Arc::clone(&store))
    .with_quiet_period(Duration::from_millis(config.debounce_ms));

    let _feed = match &session {
        Some(session) => Some(HistoryFeed::spawn(
            store.subscribe(&session.id).await?,
            view.clone(),
        )),
        None => None,
    };

    let renderer = spawn_renderer(view.clone());

    match &session {
        Some(session) => println!(
            "Session {} ready. Paste text below; an empty line clears, Ctrl-D exits.",
            session.id
        ),
        None => println!("No session established; text will not be labeled or saved."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        controller.on_input(&line);
    }

    controller.shutdown();
    renderer.abort();
    Ok(())
}

/// Print view-state transitions as they happen.
fn spawn_renderer(view: ViewHandle) -> tokio::task::JoinHandle<()> {
    let mut rx = view.subscribe();
    tokio::spawn(async move {
        let mut shown_history = 0usize;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();

            if let Some(message) = &state.message {
                eprintln!("  ! {message}");
            }
            if state.loading {
                println!("  … analyzing");
            } else if let Some(label) = state.label {
                println!("  => {label}");
            }

            if state.history.len() != shown_history {
                shown_history = state.history.len();
                println!("  ── history ({} predictions)", state.history.len());
                for record in state.history.iter().take(5) {
                    let when = record
                        .created_at
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_else(|| "pending".into());
                    println!(
                        "     [{when}] {}: {}",
                        record.label,
                        super::preview(&record.text, 48)
                    );
                }
            }
        }
    })
}
