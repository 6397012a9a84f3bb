use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::DashboardStats;

pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let store = state.store.read().await;
    Ok(Json(store.dashboard_stats()))
}
