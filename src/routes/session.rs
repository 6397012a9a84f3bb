use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppResult;
use crate::models::{Notification, Tab, User};
use crate::state::AppState;
use crate::store::Store;

#[derive(Serialize)]
pub struct NavItem {
    pub tab: Tab,
    pub label: &'static str,
    pub admin_only: bool,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub active_tab: Tab,
    pub selected_publisher_id: Option<String>,
    pub bulk_outreach_open: bool,
    pub notification: Option<Notification>,
    pub nav: Vec<NavItem>,
}

impl SessionResponse {
    fn from_store(store: &Store) -> Self {
        Self {
            user: store.current_user().clone(),
            active_tab: store.active_tab(),
            selected_publisher_id: store.selected_publisher_id().map(str::to_string),
            bulk_outreach_open: store.bulk_outreach().is_some(),
            notification: store.notification(Utc::now()).cloned(),
            nav: Tab::ALL
                .iter()
                .map(|&tab| NavItem {
                    tab,
                    label: tab.label(),
                    admin_only: tab.admin_only(),
                })
                .collect(),
        }
    }
}

pub async fn get_session(State(state): State<AppState>) -> AppResult<Json<SessionResponse>> {
    let store = state.store.read().await;
    Ok(Json(SessionResponse::from_store(&store)))
}

pub async fn toggle_role(State(state): State<AppState>) -> AppResult<Json<SessionResponse>> {
    let mut store = state.store.write().await;
    let role = store.toggle_role().role;
    info!(?role, "switched acting role");
    Ok(Json(SessionResponse::from_store(&store)))
}

#[derive(Deserialize)]
pub struct SetTabRequest {
    pub tab: String,
}

pub async fn set_active_tab(
    State(state): State<AppState>,
    Json(body): Json<SetTabRequest>,
) -> AppResult<Json<SessionResponse>> {
    let tab = Tab::parse_lossy(&body.tab);
    let mut store = state.store.write().await;
    store.set_active_tab(tab);
    Ok(Json(SessionResponse::from_store(&store)))
}

#[derive(Deserialize)]
pub struct SelectPublisherRequest {
    pub publisher_id: Option<String>,
}

pub async fn select_publisher(
    State(state): State<AppState>,
    Json(body): Json<SelectPublisherRequest>,
) -> AppResult<Json<SessionResponse>> {
    let mut store = state.store.write().await;
    store.select_publisher(body.publisher_id.filter(|id| !id.trim().is_empty()));
    Ok(Json(SessionResponse::from_store(&store)))
}
