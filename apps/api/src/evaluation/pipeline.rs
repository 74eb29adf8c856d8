//! Evaluation Pipeline — orchestrates one feedback request.
//!
//! Flow: load history → summarize → build prompt → LLM call → extract score →
//! append record → persist → return record.
//!
//! Nothing is persisted unless the model call succeeds: the append and save
//! only run once a response is in hand, so a transport failure leaves the
//! history file exactly as it was.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::extractor::extract_score;
use crate::evaluation::prompts::{build_prompt, EVALUATION_SYSTEM};
use crate::history::store::HistoryStore;
use crate::history::summary::summarize;
use crate::llm_client::CompletionBackend;
use crate::models::record::{EvaluationRecord, Score};

/// Runs one evaluation end to end and returns the freshly persisted record.
///
/// The caller serializes invocations (the handler holds the history lock for
/// the whole call), so the load here and the save at the end form one
/// consistent cycle.
pub async fn evaluate(
    store: &HistoryStore,
    backend: &dyn CompletionBackend,
    transcript: &str,
    source_name: &str,
) -> Result<EvaluationRecord, AppError> {
    let mut log = store.load();
    info!(
        "Evaluating transcript '{source_name}' with {} prior records",
        log.len()
    );

    let digest = summarize(&log);
    let prompt = build_prompt(transcript, &digest);

    let response = backend
        .complete(&prompt, EVALUATION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Evaluation call failed: {e}")))?;

    let score = extract_score(&response);
    if score == Score::Unavailable {
        warn!("Could not parse an overall score out of the critique for '{source_name}'");
    }

    let record = EvaluationRecord::new(source_name.to_string(), score, response);
    log.push(record.clone());
    store.save(&log).map_err(AppError::Internal)?;

    info!(
        "Recorded evaluation for '{source_name}' (score: {})",
        record.score
    );
    Ok(record)
}

/// Returns the persisted history, most recent first — the display order.
pub fn list_history(store: &HistoryStore) -> Vec<EvaluationRecord> {
    let mut log = store.load();
    log.reverse();
    log
}
