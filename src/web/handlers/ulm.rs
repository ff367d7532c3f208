// POST /api/ulm-classifications: toxicity via the experimental ULM model.
//
// Texts are scored one at a time (the model has no batch path), so large
// requests take proportionally longer.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use super::default_preprocess;
use crate::text::preprocess::preprocess_texts;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct UlmRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
}

pub async fn classify_texts_ulm(
    State(state): State<AppState>,
    Json(body): Json<UlmRequest>,
) -> Response {
    let inputs = if body.preprocess {
        preprocess_texts(&body.texts)
    } else {
        body.texts.clone()
    };

    let pipeline = Arc::clone(&state.pipeline);
    let result =
        tokio::task::spawn_blocking(move || pipeline.predict_toxicity_ulm_multiple(&inputs)).await;

    match result {
        Ok(Ok(batch)) => Json(serde_json::json!({
            "texts": body.texts,
            "preds": batch.scores,
            "classes": batch.labels,
        }))
        .into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "ULM classification failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed")
        }
        Err(e) => {
            error!(error = %e, "ULM classification task panicked");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed")
        }
    }
}
