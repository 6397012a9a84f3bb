use axum::{extract::Multipart, extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::imports::synthetic_publishers;
use crate::models::{NotificationKind, Template};
use crate::state::AppState;

pub async fn list_templates(State(state): State<AppState>) -> AppResult<Json<Vec<Template>>> {
    let store = state.store.read().await;
    Ok(Json(store.templates().to_vec()))
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub total_publishers: usize,
}

/// Simulated directory import. The uploaded file is drained and ignored.
pub async fn import_publishers(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let mut source = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(format!("invalid multipart data: {err}"))
    })? {
        if field.name() == Some("file") {
            source = field.file_name().map(str::to_string);
        }
        field.bytes().await.map_err(|err| {
            AppError::bad_request(format!("failed to read upload: {err}"))
        })?;
    }
    let source = source.ok_or_else(|| AppError::bad_request("file field is required"))?;
    info!(%source, count = state.config.import_count, "directory import started");

    tokio::time::sleep(state.config.import_delay).await;

    let now = Utc::now();
    let publishers = synthetic_publishers(&mut rand::thread_rng(), state.config.import_count, now);
    let imported = publishers.len();

    let mut store = state.store.write().await;
    store.add_publishers(publishers);
    store.notify(
        format!("{imported} publishers successfully imported and encrypted"),
        NotificationKind::Success,
        now,
    );
    info!(imported, total = store.publishers().len(), "directory import finished");

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported,
            total_publishers: store.publishers().len(),
        }),
    ))
}
