use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub mod admin;
pub mod dashboard;
pub mod deliverability;
pub mod health;
pub mod outreach;
pub mod publishers;
pub mod session;
pub mod threads;

const UPLOAD_BODY_LIMIT: usize = 1024 * 1024 * 64;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .filter_map(|value| match value.parse::<HeaderValue>() {
                Ok(header) => Some(header),
                Err(_) => {
                    warn!(origin = value, "ignoring invalid CORS allowed origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let session_routes = Router::new()
        .route("/", get(session::get_session))
        .route("/role", post(session::toggle_role))
        .route("/tab", post(session::set_active_tab))
        .route("/selected-publisher", post(session::select_publisher));

    let publishers_routes = Router::new()
        .route("/", get(publishers::list_publishers))
        .route(
            "/:id",
            get(publishers::get_publisher).patch(publishers::update_publisher),
        )
        .route(
            "/:id/threads",
            get(publishers::list_publisher_threads).post(publishers::open_thread),
        )
        .route("/:id/draft", post(publishers::draft_new_thread))
        .route("/:id/media-kits", post(publishers::upload_media_kits));

    let threads_routes = Router::new()
        .route("/", get(threads::list_threads))
        .route(
            "/:id",
            get(threads::get_thread).patch(threads::update_thread),
        )
        .route("/:id/messages", post(threads::send_reply))
        .route("/:id/draft", post(threads::draft_reply))
        .route("/:id/template-preview", get(threads::template_preview));

    let outreach_routes = Router::new()
        .route(
            "/",
            get(outreach::get_session)
                .post(outreach::open_session)
                .delete(outreach::dismiss_session),
        )
        .route("/template", post(outreach::select_template))
        .route("/drafting", post(outreach::start_drafting))
        .route("/drafts/:publisher_id", patch(outreach::edit_draft))
        .route("/send", post(outreach::send_all))
        .route("/start-over", post(outreach::start_over));

    Router::new()
        .nest("/api/session", session_routes)
        .nest("/api/publishers", publishers_routes)
        .nest("/api/threads", threads_routes)
        .nest("/api/outreach", outreach_routes)
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/templates", get(admin::list_templates))
        .route("/api/admin/import", post(admin::import_publishers))
        .route("/api/deliverability", get(deliverability::get_deliverability))
        .route(
            "/api/sending-profiles/:id",
            patch(deliverability::update_sending_profile),
        )
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
