use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admin::AdminState;
use crate::resilience::TaskState;
use crate::store::{ConfigEntry, StoreError};

/// Shown to clients when a resolution fails outright.
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub tasks_in_flight: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryView {
    pub key: String,
    pub value: String,
    pub description: String,
    pub resolved: bool,
}

impl From<ConfigEntry> for EntryView {
    fn from(entry: ConfigEntry) -> Self {
        Self {
            resolved: entry.is_resolved(),
            key: entry.key,
            value: entry.value,
            description: entry.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub key: String,
    pub value: String,
    pub resolved: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: Uuid,
    pub key: String,
    pub state: TaskState,
    pub attempt_count: u32,
    pub attached: usize,
}

/// Store failure mapped to a 500.
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Admin store operation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        tasks_in_flight: state.resolver.engine().in_flight(),
    })
}

pub async fn get_entries(State(state): State<AdminState>) -> Result<Json<Vec<EntryView>>, ApiError> {
    let entries = state.resolver.store().entries()?;
    Ok(Json(entries.into_iter().map(EntryView::from).collect()))
}

/// Resolve through the bounded-wait path, exactly as an application caller would.
pub async fn get_config(State(state): State<AdminState>, Path(key): Path<String>) -> Response {
    match state.resolver.get_value(&key).await {
        Ok(value) => Json(ResolvedValue {
            resolved: !value.is_empty(),
            key,
            value,
        })
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": APOLOGY, "detail": e.to_string() })),
        )
            .into_response(),
    }
}

/// Operator write. Keeps the stored description unless a new one is given.
pub async fn put_config(
    State(state): State<AdminState>,
    Path(key): Path<String>,
    Json(update): Json<UpdateRequest>,
) -> Result<Json<EntryView>, ApiError> {
    let store = state.resolver.store();
    let description = match update.description {
        Some(description) => description,
        None => store.entry(&key)?.map(|e| e.description).unwrap_or_default(),
    };

    store.put(&key, &update.value, &description)?;
    tracing::info!(key = %key, resolved = !update.value.is_empty(), "Configuration value updated");

    Ok(Json(EntryView::from(ConfigEntry::new(key, update.value, description))))
}

pub async fn get_tasks(State(state): State<AdminState>) -> Json<Vec<TaskSummary>> {
    let mut tasks: Vec<TaskSummary> = state
        .resolver
        .engine()
        .tasks()
        .into_iter()
        .map(|task| {
            let snapshot = task.snapshot();
            TaskSummary {
                id: task.id(),
                key: task.key().to_string(),
                state: snapshot.state,
                attempt_count: snapshot.attempt_count,
                attached: task.attached(),
            }
        })
        .collect();
    tasks.sort_by(|a, b| a.key.cmp(&b.key));
    Json(tasks)
}

/// 202 means the request was recorded. A fetch already running may still
/// resolve the task, in which case waiters receive the value.
pub async fn cancel_task(State(state): State<AdminState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.resolver.engine().task(id) {
        Some(task) if task.cancel() => {
            tracing::info!(key = %task.key(), task_id = %id, "Resolution cancelled by operator");
            StatusCode::ACCEPTED
        }
        _ => StatusCode::NOT_FOUND,
    }
}
