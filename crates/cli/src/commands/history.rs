//! `rumormill history` — print the stored prediction history and exit.
//!
//! Without a bootstrap token each process mints a fresh anonymous identity,
//! so a meaningful history requires `[identity].bootstrap_token` (or
//! `RUMORMILL_BOOTSTRAP_TOKEN`) pinning the owner across runs.

use std::path::Path;
use std::sync::Arc;

use rumormill_core::record::sort_newest_first;
use rumormill_session::{LocalIdentity, SessionGate};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = super::build_store(&config).await?;

    let gate = SessionGate::new(Arc::new(LocalIdentity::new()));
    let session = gate
        .ensure_session(config.identity.bootstrap_token.as_deref())
        .await?;

    let mut subscription = store.subscribe(&session.id).await?;
    let snapshot = match subscription.next().await {
        Some(snapshot) => snapshot?,
        None => vec![],
    };
    subscription.cancel();

    let mut records = snapshot;
    sort_newest_first(&mut records);

    if records.is_empty() {
        println!("No predictions recorded for {}.", session.id);
        return Ok(());
    }

    for record in &records {
        let when = record
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "(pending)".into());
        println!(
            "{when}  {:<13}  {}",
            record.label.to_string(),
            super::preview(&record.text, 72)
        );
    }

    Ok(())
}
