use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::auth::masking::{PublisherRow, PublisherView};
use crate::auth::CurrentUser;
use crate::compose::{self, ComposeError};
use crate::drafts::GeneratedDraft;
use crate::error::{AppError, AppResult};
use crate::imports::media_kit_document;
use crate::models::{MediaKitDocument, Message, NotificationKind, PublisherPatch, Thread};
use crate::state::AppState;
use crate::utils::json::classify_nullable;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const LOAD_MORE_STEP: usize = 100;

#[derive(Deserialize)]
pub struct ListPublishersQuery {
    pub search: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct PageCursor {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Serialize)]
pub struct PublisherListResponse {
    pub items: Vec<PublisherRow>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub next_page: Option<PageCursor>,
}

pub async fn list_publishers(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListPublishersQuery>,
) -> AppResult<Json<PublisherListResponse>> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let store = state.store.read().await;
    let matches = store.search_publishers(query.search.as_deref().unwrap_or_default());
    let total = matches.len();
    let items: Vec<PublisherRow> = matches
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|publisher| PublisherRow::for_role(publisher, user.role))
        .collect();

    let end = offset.saturating_add(limit);
    let next_page = (end < total).then_some(PageCursor {
        offset: end,
        limit: LOAD_MORE_STEP,
    });

    Ok(Json(PublisherListResponse {
        items,
        total,
        offset,
        limit,
        next_page,
    }))
}

#[derive(Serialize)]
pub struct PublisherDetailResponse {
    pub publisher: PublisherView,
    pub threads: Vec<Thread>,
}

pub async fn get_publisher(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(publisher_id): Path<String>,
) -> AppResult<Json<PublisherDetailResponse>> {
    let store = state.store.read().await;
    let publisher = store.publisher(&publisher_id).ok_or_else(AppError::not_found)?;
    Ok(Json(PublisherDetailResponse {
        publisher: PublisherView::for_role(publisher, user.role),
        threads: store
            .threads_for_publisher(&publisher_id)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

pub async fn update_publisher(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(publisher_id): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Json<PublisherView>> {
    let email = classify_nullable::<String>(body.get("email_encrypted"))
        .map_err(AppError::bad_request)?;
    let last_contacted = classify_nullable::<DateTime<Utc>>(body.get("last_contacted_at"))
        .map_err(AppError::bad_request)?;
    let mut patch: PublisherPatch = serde_json::from_value(body)?;
    patch.email_encrypted = email.into_patch();
    patch.last_contacted_at = last_contacted.into_patch();

    let mut store = state.store.write().await;
    if !store.update_publisher(&publisher_id, patch) {
        return Err(AppError::not_found());
    }
    store.notify(
        "Publisher information updated successfully",
        NotificationKind::Success,
        Utc::now(),
    );
    info!(%publisher_id, user_id = %user.user_id, "publisher updated");

    let publisher = store.publisher(&publisher_id).ok_or_else(AppError::not_found)?;
    Ok(Json(PublisherView::for_role(publisher, user.role)))
}

pub async fn list_publisher_threads(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
) -> AppResult<Json<Vec<Thread>>> {
    let store = state.store.read().await;
    if store.publisher(&publisher_id).is_none() {
        return Err(AppError::not_found());
    }
    Ok(Json(
        store
            .threads_for_publisher(&publisher_id)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct OpenThreadRequest {
    pub subject: String,
    pub body: String,
    pub sending_profile_id: Option<String>,
}

#[derive(Serialize)]
pub struct OpenThreadResponse {
    pub thread: Thread,
    pub message: Message,
}

pub async fn open_thread(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(publisher_id): Path<String>,
    Json(body): Json<OpenThreadRequest>,
) -> AppResult<(StatusCode, Json<OpenThreadResponse>)> {
    let now = Utc::now();
    let mut store = state.store.write().await;
    let publisher = store.publisher(&publisher_id).ok_or_else(AppError::not_found)?;

    let (thread, message) = match compose::open_thread(
        publisher,
        &body.subject,
        &body.body,
        &user.user_id,
        body.sending_profile_id,
        now,
    ) {
        Ok(created) => created,
        Err(err @ ComposeError::MissingSubjectOrBody) => {
            store.notify("Please enter both a subject and a message", NotificationKind::Error, now);
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    store.create_thread(thread.clone());
    store.add_message(message.clone());
    store.notify("New outreach thread created", NotificationKind::Success, now);
    info!(%publisher_id, thread_id = %thread.id, "outreach thread opened");

    Ok((StatusCode::CREATED, Json(OpenThreadResponse { thread, message })))
}

#[derive(Deserialize, Default)]
pub struct DraftRequestBody {
    pub template_id: Option<String>,
}

/// Subject and body for a brand new thread. Generator failures come back as
/// the fallback draft.
pub async fn draft_new_thread(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
    body: Option<Json<DraftRequestBody>>,
) -> AppResult<Json<GeneratedDraft>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let request = {
        let store = state.store.read().await;
        let publisher = store.publisher(&publisher_id).ok_or_else(AppError::not_found)?;
        compose::draft_request(store.templates(), body.template_id.as_deref(), publisher, None)
    };

    let draft = state.drafts.generate(&request).await;
    Ok(Json(draft))
}

struct UploadedFile {
    name: String,
    size: usize,
    content_type: Option<String>,
}

pub async fn upload_media_kits(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<MediaKitDocument>>)> {
    if state.store.read().await.publisher(&publisher_id).is_none() {
        return Err(AppError::not_found());
    }

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(format!("invalid multipart data: {err}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("filename is required"))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|err| {
            error!(error = %err, "failed to read media kit bytes");
            AppError::bad_request(format!("failed to read file bytes: {err}"))
        })?;
        files.push(UploadedFile {
            name,
            size: data.len(),
            content_type,
        });
    }

    if files.is_empty() {
        return Err(AppError::bad_request("file field is required"));
    }

    tokio::time::sleep(state.config.media_kit_delay).await;

    let now = Utc::now();
    let documents: Vec<MediaKitDocument> = files
        .iter()
        .map(|file| media_kit_document(&file.name, file.size, file.content_type.as_deref(), now))
        .collect();

    let mut store = state.store.write().await;
    let existing = store
        .publisher(&publisher_id)
        .map(|publisher| publisher.media_kits.clone())
        .ok_or_else(AppError::not_found)?;
    let media_kits = documents.iter().cloned().chain(existing).collect();
    store.update_publisher(
        &publisher_id,
        PublisherPatch {
            media_kits: Some(media_kits),
            ..Default::default()
        },
    );
    store.notify(
        format!("Successfully added {} documents.", documents.len()),
        NotificationKind::Success,
        now,
    );
    info!(%publisher_id, count = documents.len(), "media kits attached");

    Ok((StatusCode::CREATED, Json(documents)))
}
