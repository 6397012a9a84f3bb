pub mod masking;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{User, UserRole},
    state::AppState,
};

/// The session's acting user, snapshotted at the start of the request.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = state.store.read().await;
        Ok(CurrentUser::from(store.current_user()))
    }
}
