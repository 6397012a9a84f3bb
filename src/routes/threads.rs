use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::masking::PublisherRow;
use crate::auth::CurrentUser;
use crate::compose;
use crate::drafts::{conversation_history, GeneratedDraft};
use crate::error::{AppError, AppResult};
use crate::models::{Message, NotificationKind, Thread, ThreadPatch, ThreadStatus};
use crate::routes::publishers::DraftRequestBody;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListThreadsQuery {
    pub status: Option<ThreadStatus>,
    pub publisher_id: Option<String>,
}

#[derive(Serialize)]
pub struct InboxEntry {
    pub thread: Thread,
    pub publisher: Option<PublisherRow>,
    pub message_count: usize,
}

pub async fn list_threads(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListThreadsQuery>,
) -> AppResult<Json<Vec<InboxEntry>>> {
    let store = state.store.read().await;
    let entries = store
        .threads()
        .iter()
        .filter(|thread| query.status.map_or(true, |status| thread.status == status))
        .filter(|thread| {
            query
                .publisher_id
                .as_deref()
                .map_or(true, |id| thread.publisher_id == id)
        })
        .map(|thread| InboxEntry {
            thread: thread.clone(),
            publisher: store
                .publisher(&thread.publisher_id)
                .map(|publisher| PublisherRow::for_role(publisher, user.role)),
            message_count: store.messages_for_thread(&thread.id).len(),
        })
        .collect();
    Ok(Json(entries))
}

#[derive(Serialize)]
pub struct ThreadDetailResponse {
    pub thread: Thread,
    pub messages: Vec<Message>,
    pub publisher: Option<PublisherRow>,
}

pub async fn get_thread(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(thread_id): Path<String>,
) -> AppResult<Json<ThreadDetailResponse>> {
    let store = state.store.read().await;
    let thread = store.thread(&thread_id).ok_or_else(AppError::not_found)?;
    Ok(Json(ThreadDetailResponse {
        thread: thread.clone(),
        messages: store
            .messages_for_thread(&thread_id)
            .into_iter()
            .cloned()
            .collect(),
        publisher: store
            .publisher(&thread.publisher_id)
            .map(|publisher| PublisherRow::for_role(publisher, user.role)),
    }))
}

pub async fn update_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(patch): Json<ThreadPatch>,
) -> AppResult<Json<Thread>> {
    let mut store = state.store.write().await;
    if !store.update_thread(&thread_id, patch) {
        return Err(AppError::not_found());
    }
    store
        .thread(&thread_id)
        .cloned()
        .map(Json)
        .ok_or_else(AppError::not_found)
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub body: String,
    pub sending_profile_id: Option<String>,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    pub thread: Thread,
    pub message: Message,
}

pub async fn send_reply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(thread_id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> AppResult<(StatusCode, Json<ReplyResponse>)> {
    let now = Utc::now();
    let mut store = state.store.write().await;
    let thread = store.thread(&thread_id).ok_or_else(AppError::not_found)?;
    let message =
        compose::reply_message(thread, &body.body, &user.user_id, body.sending_profile_id, now)?;

    store.add_message(message.clone());
    store.update_thread(
        &thread_id,
        ThreadPatch {
            last_message_at: Some(now),
            ..Default::default()
        },
    );
    store.notify("Message sent successfully", NotificationKind::Success, now);
    info!(%thread_id, message_id = %message.id, "reply sent");

    let thread = store.thread(&thread_id).cloned().ok_or_else(AppError::not_found)?;
    Ok((StatusCode::CREATED, Json(ReplyResponse { thread, message })))
}

/// Continuation draft using the thread's history. Never fails on generator
/// errors; the fallback draft is returned instead.
pub async fn draft_reply(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    body: Option<Json<DraftRequestBody>>,
) -> AppResult<Json<GeneratedDraft>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let request = {
        let store = state.store.read().await;
        let thread = store.thread(&thread_id).ok_or_else(AppError::not_found)?;
        let publisher = store
            .publisher(&thread.publisher_id)
            .ok_or_else(|| AppError::bad_request("thread publisher no longer exists"))?;
        let history = conversation_history(store.messages_for_thread(&thread_id).into_iter());
        compose::draft_request(
            store.templates(),
            body.template_id.as_deref(),
            publisher,
            Some(history),
        )
    };

    let draft = state.drafts.generate(&request).await;
    state
        .store
        .write()
        .await
        .notify("AI Draft generated", NotificationKind::Info, Utc::now());
    Ok(Json(draft))
}

#[derive(Deserialize)]
pub struct TemplatePreviewQuery {
    pub template_id: String,
}

#[derive(Serialize)]
pub struct TemplatePreview {
    pub template_id: String,
    pub body: String,
}

pub async fn template_preview(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(query): Query<TemplatePreviewQuery>,
) -> AppResult<Json<TemplatePreview>> {
    let store = state.store.read().await;
    let thread = store.thread(&thread_id).ok_or_else(AppError::not_found)?;
    let publisher = store
        .publisher(&thread.publisher_id)
        .ok_or_else(AppError::not_found)?;
    let template = store
        .template(&query.template_id)
        .ok_or_else(|| AppError::bad_request(format!("unknown template {}", query.template_id)))?;

    Ok(Json(TemplatePreview {
        template_id: template.id.clone(),
        body: compose::fill_template(template, publisher),
    }))
}
