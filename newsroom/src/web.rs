use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use llm::Completer;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storycraft::{
    GenerationOptions, NewStory, Pipeline, QaPair, StoryError, StoryRecord, StoryStore, StoryType,
    StoryUnit, StoryUpdate,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline<Arc<dyn Completer>>>,
    pub store: Arc<dyn StoryStore>,
}

/// Error body returned by every route: `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    details: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            error,
            details: details.into(),
        }
    }

    /// Map a domain error onto a status code, keeping the route's message.
    fn from_story(context: &'static str, e: StoryError) -> Self {
        let status = match &e {
            StoryError::Validation(_) => StatusCode::BAD_REQUEST,
            StoryError::Duplicate => StatusCode::CONFLICT,
            StoryError::NotFound => StatusCode::NOT_FOUND,
            StoryError::Completion(_) | StoryError::Parse { .. } | StoryError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(error = %e, "{context}");
        } else {
            warn!(error = %e, "{context}");
        }
        Self::new(status, context, e.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.error, "details": self.details });
        (self.status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, turning a malformed payload into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>, context: &'static str) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "rejected request body");
        ApiError::new(StatusCode::BAD_REQUEST, context, rejection.body_text())
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub inputs: Vec<StoryUnit>,
    #[serde(default)]
    pub story_type: Option<String>,
    #[serde(default)]
    pub config: GenerationOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub story: String,
    pub story_type: StoryType,
    pub inputs: Vec<StoryUnit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub original_story: String,
    pub edit_instructions: String,
    #[serde(default)]
    pub story_units: Vec<StoryUnit>,
}

#[derive(Deserialize)]
pub struct SplitRequest {
    pub input: String,
}

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub content: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate_story(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    const ERROR: &str = "Failed to generate story";
    let req = body(payload, ERROR)?;
    let story_type = req
        .story_type
        .as_deref()
        .map(str::parse::<StoryType>)
        .transpose()
        .map_err(|e| ApiError::from_story(ERROR, e))?
        .unwrap_or_default();
    info!(units = req.inputs.len(), %story_type, "storygen requested");
    let story = state
        .pipeline
        .generate_story(req.inputs, story_type, &req.config)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok(Json(GenerateResponse {
        story: story.story,
        story_type: story.story_type,
        inputs: story.units,
    }))
}

pub async fn edit_story(
    State(state): State<AppState>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> Result<Json<storycraft::EditedStory>, ApiError> {
    const ERROR: &str = "Failed to edit story";
    let req = body(payload, ERROR)?;
    info!(units = req.story_units.len(), "storyedit requested");
    let edited = state
        .pipeline
        .edit_story(&req.original_story, &req.edit_instructions, &req.story_units)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok(Json(edited))
}

pub async fn split_interview(
    State(state): State<AppState>,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> Result<Json<Vec<QaPair>>, ApiError> {
    const ERROR: &str = "Failed to split interview";
    let req = body(payload, ERROR)?;
    let pairs = state
        .pipeline
        .split_interview(&req.input)
        .await
        .map_err(|e| match e {
            StoryError::Parse { .. } => ApiError::from_story("Failed to parse interview splits", e),
            e => ApiError::from_story(ERROR, e),
        })?;
    Ok(Json(pairs))
}

pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    const ERROR: &str = "Failed to summarize text";
    let req = body(payload, ERROR)?;
    let summary = state
        .pipeline
        .summarize(&req.content)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok(Json(json!({ "summary": summary })))
}

pub async fn process_unit(
    State(state): State<AppState>,
    payload: Result<Json<StoryUnit>, JsonRejection>,
) -> Result<Json<StoryUnit>, ApiError> {
    const ERROR: &str = "Failed to process story unit";
    let unit = body(payload, ERROR)?;
    info!(kind = %unit.kind, words = unit.word_count(), "processing unit");
    let unit = state
        .pipeline
        .process_unit(unit)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok(Json(unit))
}

pub async fn list_stories(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<StoryRecord>>, ApiError> {
    let stories = state
        .store
        .list(&user)
        .await
        .map_err(|e| ApiError::from_story("Failed to fetch stories", e))?;
    Ok(Json(stories))
}

pub async fn save_story(
    State(state): State<AppState>,
    Path(user): Path<String>,
    payload: Result<Json<NewStory>, JsonRejection>,
) -> Result<(StatusCode, Json<StoryRecord>), ApiError> {
    const ERROR: &str = "Failed to save story";
    let story = body(payload, ERROR)?;
    let record = state
        .store
        .save(&user, story)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_story(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, String)>,
) -> Result<Json<StoryRecord>, ApiError> {
    const ERROR: &str = "Failed to fetch story";
    state
        .store
        .get(&user, &id)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?
        .map(Json)
        .ok_or_else(|| ApiError::from_story(ERROR, StoryError::NotFound))
}

pub async fn update_story(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, String)>,
    payload: Result<Json<StoryUpdate>, JsonRejection>,
) -> Result<Json<StoryRecord>, ApiError> {
    const ERROR: &str = "Failed to update story";
    let update = body(payload, ERROR)?;
    let record = state
        .store
        .update(&user, &id, update)
        .await
        .map_err(|e| ApiError::from_story(ERROR, e))?;
    Ok(Json(record))
}

pub async fn delete_story(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(&user, &id)
        .await
        .map_err(|e| ApiError::from_story("Failed to delete story", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build the application router with the provided state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/storygen", post(generate_story))
        .route("/api/storyedit", post(edit_story))
        .route("/api/split_atomic", post(split_interview))
        .route("/api/summarize", post(summarize))
        .route("/api/process_unit", post(process_unit))
        .route(
            "/api/users/{user}/stories",
            get(list_stories).post(save_story),
        )
        .route(
            "/api/users/{user}/stories/{id}",
            get(get_story).patch(update_story).delete(delete_story),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
