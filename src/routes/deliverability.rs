use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{SendingProfile, SendingProfilePatch, WarmupSchedule};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SendingProfileView {
    #[serde(flatten)]
    pub profile: SendingProfile,
    pub usage_percent: f64,
    pub warmup_progress: f64,
    pub is_default: bool,
}

#[derive(Serialize)]
pub struct DeliverabilityResponse {
    pub profiles: Vec<SendingProfileView>,
    pub warmup_schedules: Vec<WarmupSchedule>,
    pub sent_today: u32,
    pub daily_capacity: u32,
}

fn profile_view(profile: &SendingProfile, default_id: Option<&str>) -> SendingProfileView {
    SendingProfileView {
        usage_percent: profile.usage_percent(),
        warmup_progress: profile.warmup_progress(Utc::now().date_naive()),
        is_default: default_id == Some(profile.id.as_str()),
        profile: profile.clone(),
    }
}

pub async fn get_deliverability(
    State(state): State<AppState>,
) -> AppResult<Json<DeliverabilityResponse>> {
    let store = state.store.read().await;
    let default_id = store.default_sending_profile_id();
    let profiles = store.sending_profiles();

    Ok(Json(DeliverabilityResponse {
        profiles: profiles
            .iter()
            .map(|profile| profile_view(profile, default_id))
            .collect(),
        warmup_schedules: store.warmup_schedules().to_vec(),
        sent_today: profiles.iter().map(|p| p.sent_today).sum(),
        daily_capacity: profiles.iter().map(|p| p.current_daily_limit).sum(),
    }))
}

pub async fn update_sending_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(patch): Json<SendingProfilePatch>,
) -> AppResult<Json<SendingProfileView>> {
    let mut store = state.store.write().await;
    if !store.update_sending_profile(&profile_id, patch) {
        return Err(AppError::not_found());
    }
    info!(%profile_id, "sending profile updated");

    let default_id = store.default_sending_profile_id();
    store
        .sending_profiles()
        .iter()
        .find(|profile| profile.id == profile_id)
        .map(|profile| Json(profile_view(profile, default_id)))
        .ok_or_else(AppError::not_found)
}
