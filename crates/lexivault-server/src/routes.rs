//! HTTP routes
//!
//! The contract the core satisfies: write results carry `storage`, read
//! results carry `source`, and both-stores-down surfaces as a structured
//! 500 with `storage: "none"` rather than an unhandled fault.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;

use lexivault_core::{
    health_report, PrimaryStore, Provenance, RepositoryError, WordRepository,
};

use crate::tokenize::tokenize;

/// Shared server state
pub struct AppState {
    pub repo: WordRepository<PrimaryStore>,
    /// Redacted primary connection target for the health payload
    pub primary_target: String,
}

/// Build the HTTP API router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/submit-word", post(submit_word))
        .route("/get-words", get(get_words))
        .route("/parse-sentence", post(parse_sentence))
        .route("/sync-to-mongodb", post(sync_to_primary))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type JsonError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> JsonError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[derive(Deserialize)]
struct SubmitWordRequest {
    word: Option<String>,
    #[serde(default)]
    meaning: String,
    #[serde(default, rename = "type")]
    word_type: String,
    #[serde(default)]
    context: String,
}

async fn submit_word(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitWordRequest>,
) -> Result<Json<Value>, JsonError> {
    let Some(word) = request.word else {
        return Err(bad_request("No word provided"));
    };

    match state
        .repo
        .upsert_word(&word, &request.meaning, &request.word_type, &request.context)
        .await
    {
        Ok(receipt) => {
            let verb = if receipt.outcome.is_created() {
                "added to"
            } else {
                "updated in"
            };
            Ok(Json(json!({
                "success": true,
                "message": format!("Word '{}' {} the {} store", receipt.record.word, verb, receipt.storage),
                "storage": receipt.storage,
                "created": receipt.outcome.is_created(),
            })))
        }
        Err(e) if e.is_validation() => Err(bad_request(&e.to_string())),
        Err(RepositoryError::AllStoresDown) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "All storage backends are unavailable. Word cannot be saved.",
                "storage": Provenance::None,
            })),
        )),
        Err(e) => {
            error!("word submission failed: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Storage error: {}", e),
                    "storage": Provenance::None,
                })),
            ))
        }
    }
}

async fn get_words(State(state): State<Arc<AppState>>) -> Result<Json<Value>, JsonError> {
    match state.repo.list_all_words().await {
        Ok(list) => Ok(Json(json!({
            "words": list.words,
            "source": list.source,
        }))),
        Err(e) => {
            error!("word listing failed: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Storage error: {}", e) })),
            ))
        }
    }
}

#[derive(Deserialize)]
struct ParseSentenceRequest {
    sentence: Option<String>,
}

async fn parse_sentence(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ParseSentenceRequest>,
) -> Result<Json<Value>, JsonError> {
    let Some(sentence) = request.sentence else {
        return Err(bad_request("No sentence provided"));
    };

    let tokens = tokenize(&sentence);
    let known = state.repo.lookup_known_words().await;
    let known: HashSet<&str> = known.words.iter().map(String::as_str).collect();

    // Unknown words, first-seen order, deduplicated
    let mut seen = HashSet::new();
    let unknown: Vec<&String> = tokens
        .iter()
        .filter(|token| !known.contains(token.as_str()))
        .filter(|token| seen.insert(token.as_str()))
        .collect();

    Ok(Json(json!({ "unknown_words": unknown })))
}

async fn sync_to_primary(State(state): State<Arc<AppState>>) -> Result<Json<Value>, JsonError> {
    match state.repo.reconcile().await {
        Ok(report) => Ok(Json(json!({
            "success": true,
            "message": report.message,
            "count": report.synced,
        }))),
        Err(e) => {
            error!("reconciliation failed: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Sync error: {}", e) })),
            ))
        }
    }
}

/// Always 200; the status field conveys degradation
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let report = health_report(
        state.repo.primary(),
        &state.primary_target,
        state.repo.embedded(),
    )
    .await;

    Json(json!(report))
}
