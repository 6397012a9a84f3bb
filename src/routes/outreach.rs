use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::masking::PublisherRow;
use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::models::{NotificationKind, UserRole};
use crate::outreach::{BulkSession, DraftItem, DraftRunner, OutreachError, Progress, Step};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BulkSessionView {
    pub id: Uuid,
    pub step: Step,
    pub template_id: Option<String>,
    pub publishers: Vec<PublisherRow>,
    pub drafts: Vec<DraftItem>,
    pub progress: Progress,
    pub is_drafting: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl BulkSessionView {
    fn new(session: &BulkSession, role: UserRole) -> Self {
        Self {
            id: session.id(),
            step: session.step(),
            template_id: session.template_id().map(str::to_string),
            publishers: session
                .publishers()
                .iter()
                .map(|publisher| PublisherRow::for_role(publisher, role))
                .collect(),
            drafts: session.drafts().to_vec(),
            progress: session.progress(),
            is_drafting: session.is_drafting(),
            sent_at: session.sent_at(),
        }
    }
}

#[derive(Deserialize)]
pub struct OpenSessionRequest {
    pub publisher_ids: Vec<String>,
}

pub async fn open_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<OpenSessionRequest>,
) -> AppResult<(StatusCode, Json<BulkSessionView>)> {
    let mut store = state.store.write().await;
    let session_id = store.open_bulk_outreach_for(&body.publisher_ids)?;
    let session = store.bulk_outreach().ok_or(OutreachError::NoSession)?;
    info!(%session_id, publishers = session.publishers().len(), "bulk outreach opened");
    Ok((StatusCode::CREATED, Json(BulkSessionView::new(session, user.role))))
}

pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<BulkSessionView>> {
    let store = state.store.read().await;
    let session = store.bulk_outreach().ok_or(OutreachError::NoSession)?;
    Ok(Json(BulkSessionView::new(session, user.role)))
}

pub async fn dismiss_session(State(state): State<AppState>) -> AppResult<StatusCode> {
    let mut store = state.store.write().await;
    store
        .bulk_outreach()
        .ok_or(OutreachError::NoSession)?
        .ensure_dismissable()?;
    if let Some(session) = store.close_bulk_outreach() {
        info!(session_id = %session.id(), "bulk outreach dismissed");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SelectTemplateRequest {
    pub template_id: String,
}

pub async fn select_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<SelectTemplateRequest>,
) -> AppResult<Json<BulkSessionView>> {
    let mut store = state.store.write().await;
    let template = store
        .template(&body.template_id)
        .cloned()
        .ok_or_else(|| OutreachError::UnknownTemplate(body.template_id.clone()))?;
    let session = store.bulk_outreach_mut().ok_or(OutreachError::NoSession)?;
    session.select_template(&template)?;
    Ok(Json(BulkSessionView::new(session, user.role)))
}

/// Enters `drafting` and hands the queue to a background runner. Poll the
/// session for per-publisher progress.
pub async fn start_drafting(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<(StatusCode, Json<BulkSessionView>)> {
    let view = {
        let mut store = state.store.write().await;
        let session = store.bulk_outreach_mut().ok_or(OutreachError::NoSession)?;
        session.begin_drafting()?;
        BulkSessionView::new(session, user.role)
    };

    DraftRunner::new(state.clone(), view.id).spawn();
    Ok((StatusCode::ACCEPTED, Json(view)))
}

#[derive(Deserialize)]
pub struct EditDraftRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub async fn edit_draft(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
    Json(body): Json<EditDraftRequest>,
) -> AppResult<Json<DraftItem>> {
    let mut store = state.store.write().await;
    let session = store.bulk_outreach_mut().ok_or(OutreachError::NoSession)?;
    let item = session.edit_draft(&publisher_id, body.subject, body.body)?;
    Ok(Json(item.clone()))
}

#[derive(Deserialize, Default)]
pub struct SendAllRequest {
    pub sending_profile_id: Option<String>,
}

#[derive(Serialize)]
pub struct SendAllResponse {
    pub sent: usize,
    pub thread_ids: Vec<String>,
}

/// Sends every ready draft. The session closes itself after the configured
/// delay unless something else replaced or closed it first.
pub async fn send_all(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Option<Json<SendAllRequest>>,
) -> AppResult<Json<SendAllResponse>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let now = Utc::now();

    let mut store = state.store.write().await;
    let session = store.bulk_outreach_mut().ok_or(OutreachError::NoSession)?;
    let session_id = session.id();
    let outbound = session.send_all(&user.user_id, body.sending_profile_id.as_deref(), now)?;

    let mut thread_ids = Vec::with_capacity(outbound.len());
    let mut messages = Vec::with_capacity(outbound.len());
    for email in outbound {
        thread_ids.push(email.thread.id.clone());
        store.create_thread(email.thread);
        messages.push(email.message);
    }
    let sent = store.add_messages(messages);
    store.notify(
        format!("Successfully sent {sent} personalized emails."),
        NotificationKind::Success,
        now,
    );
    drop(store);
    info!(%session_id, sent, "bulk outreach sent");

    schedule_dismiss(state, session_id);

    Ok(Json(SendAllResponse { sent, thread_ids }))
}

fn schedule_dismiss(state: AppState, session_id: Uuid) {
    let delay = state.config.bulk_dismiss_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut store = state.store.write().await;
        if store.bulk_outreach().map(BulkSession::id) == Some(session_id) {
            store.close_bulk_outreach();
            info!(%session_id, "bulk outreach closed after send");
        }
    });
}

pub async fn start_over(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<BulkSessionView>> {
    let mut store = state.store.write().await;
    let session = store.bulk_outreach_mut().ok_or(OutreachError::NoSession)?;
    session.start_over()?;
    Ok(Json(BulkSessionView::new(session, user.role)))
}
