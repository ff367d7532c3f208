// Classification handlers.
//
// POST /api/classifications       many texts, any subset of categories
// POST /api/text-classifications  one text, any subset of categories
//
// Categories are always reported in the fixed order toxic, identity,
// obscene, insult, keyed by display name ("Toxicity", "Identity hate", ...).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use super::{default_preprocess, parse_types};
use crate::text::preprocess::{preprocess_text, preprocess_texts};
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct ClassificationsRequest {
    pub texts: Vec<String>,
    pub types: Vec<String>,
    /// Strip mentions and links before classifying (default true).
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
}

#[derive(Deserialize)]
pub struct TextClassificationRequest {
    pub text: String,
    pub types: Vec<String>,
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
}

/// POST /api/classifications: classify a batch of texts.
pub async fn classify_texts(
    State(state): State<AppState>,
    Json(body): Json<ClassificationsRequest>,
) -> Response {
    let categories = match parse_types(&body.types) {
        Ok(c) => c,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let inputs = if body.preprocess {
        preprocess_texts(&body.texts)
    } else {
        body.texts.clone()
    };

    let pipeline = Arc::clone(&state.pipeline);
    let result =
        tokio::task::spawn_blocking(move || pipeline.classify(&categories, &inputs)).await;

    let results = match result {
        Ok(Ok(results)) => results,
        Ok(Err(e)) => {
            error!(error = %e, "Batch classification failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed");
        }
        Err(e) => {
            error!(error = %e, "Classification task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed");
        }
    };

    let mut preds = serde_json::Map::new();
    let mut classes = serde_json::Map::new();
    let mut pred_types = Vec::with_capacity(results.len());
    for (category, batch) in results {
        let name = category.display_name();
        preds.insert(name.to_string(), serde_json::json!(batch.scores));
        classes.insert(name.to_string(), serde_json::json!(batch.labels));
        pred_types.push(name);
    }

    Json(serde_json::json!({
        "texts": body.texts,
        "pred_types": pred_types,
        "preds": preds,
        "classes": classes,
    }))
    .into_response()
}

/// POST /api/text-classifications: classify a single text.
pub async fn classify_text(
    State(state): State<AppState>,
    Json(body): Json<TextClassificationRequest>,
) -> Response {
    let categories = match parse_types(&body.types) {
        Ok(c) => c,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let input = if body.preprocess {
        preprocess_text(&body.text)
    } else {
        body.text.clone()
    };

    let pipeline = Arc::clone(&state.pipeline);
    let result =
        tokio::task::spawn_blocking(move || pipeline.classify(&categories, &[input])).await;

    let results = match result {
        Ok(Ok(results)) => results,
        Ok(Err(e)) => {
            error!(error = %e, "Text classification failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed");
        }
        Err(e) => {
            error!(error = %e, "Classification task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed");
        }
    };

    let mut preds = serde_json::Map::new();
    let mut classes = serde_json::Map::new();
    let mut pred_types = Vec::with_capacity(results.len());
    for (category, batch) in results {
        let Some(prediction) = batch.get(0) else {
            continue;
        };
        let name = category.display_name();
        preds.insert(name.to_string(), serde_json::json!(prediction.score));
        classes.insert(name.to_string(), serde_json::json!(prediction.label));
        pred_types.push(name);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "text": body.text,
            "pred_types": pred_types,
            "preds": preds,
            "classes": classes,
        })),
    )
        .into_response()
}
