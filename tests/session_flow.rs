mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn session_starts_on_dashboard_as_operator() -> Result<()> {
    let app = TestApp::new();

    let session = body_json(app.get("/api/session").await?).await?;
    assert_eq!(session["user"]["name"], "Alex Rivera");
    assert_eq!(session["user"]["role"], "OPERATOR");
    assert_eq!(session["active_tab"], "dashboard");
    assert!(session["notification"].is_null());

    let nav = session["nav"].as_array().cloned().unwrap_or_default();
    assert_eq!(nav.len(), 5);
    let admin_only: Vec<_> = nav
        .iter()
        .filter(|item| item["admin_only"] == true)
        .map(|item| item["tab"].clone())
        .collect();
    assert_eq!(admin_only, vec![json!("deliverability"), json!("admin")]);

    Ok(())
}

#[tokio::test]
async fn tab_change_clears_detail_and_bulk_session() -> Result<()> {
    let app = TestApp::new();

    let selected = body_json(
        app.post_json("/api/session/selected-publisher", &json!({ "publisher_id": "p1" }))
            .await?,
    )
    .await?;
    assert_eq!(selected["selected_publisher_id"], "p1");

    app.post_json("/api/outreach", &json!({ "publisher_ids": ["p2"] }))
        .await?;

    let moved = body_json(
        app.post_json("/api/session/tab", &json!({ "tab": "publishers" }))
            .await?,
    )
    .await?;
    assert_eq!(moved["active_tab"], "publishers");
    assert!(moved["selected_publisher_id"].is_null());
    assert_eq!(moved["bulk_outreach_open"], false);

    let unknown = body_json(
        app.post_json("/api/session/tab", &json!({ "tab": "reports" }))
            .await?,
    )
    .await?;
    assert_eq!(unknown["active_tab"], "dashboard");

    Ok(())
}

#[tokio::test]
async fn role_toggle_round_trips() -> Result<()> {
    let app = TestApp::new();

    let admin = body_json(app.post_empty("/api/session/role").await?).await?;
    assert_eq!(admin["user"]["role"], "ADMIN");
    let operator = body_json(app.post_empty("/api/session/role").await?).await?;
    assert_eq!(operator["user"]["role"], "OPERATOR");

    Ok(())
}

#[tokio::test]
async fn import_prepends_synthetic_publishers() -> Result<()> {
    let app = TestApp::builder().config(|config| config.import_count = 12).build();

    let response = app
        .upload_files(
            "/api/admin/import",
            &[("partners.csv", "text/csv", &b"company,website\n"[..])],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let imported = body_json(response).await?;
    assert_eq!(imported["imported"], 12);
    assert_eq!(imported["total_publishers"], 14);

    let list = body_json(app.get("/api/publishers").await?).await?;
    assert_eq!(list["total"], 14);
    assert_eq!(list["items"][0]["company"], "Global Ad Ventures");
    assert_eq!(list["items"][0]["contact_email"]["state"], "masked");
    assert_eq!(list["items"][12]["id"], "p1");

    let dashboard = body_json(app.get("/api/dashboard").await?).await?;
    assert_eq!(dashboard["total_publishers"], 14);

    let session = body_json(app.get("/api/session").await?).await?;
    assert_eq!(
        session["notification"]["message"],
        "12 publishers successfully imported and encrypted"
    );

    let without_file = app.upload_files("/api/admin/import", &[]).await?;
    assert_eq!(without_file.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn deliverability_reports_usage_and_accepts_limits() -> Result<()> {
    let app = TestApp::new();

    let overview = body_json(app.get("/api/deliverability").await?).await?;
    let profiles = overview["profiles"].as_array().cloned().unwrap_or_default();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0]["id"], "sp1");
    assert_eq!(profiles[0]["is_default"], true);
    assert_eq!(profiles[0]["warmup_progress"], 100.0);
    assert_eq!(profiles[1]["status"], "warmup");
    assert_eq!(overview["warmup_schedules"].as_array().map(Vec::len), Some(2));

    let updated = app
        .patch_json(
            "/api/sending-profiles/sp2",
            &json!({ "current_daily_limit": 84, "sent_today": 0 }),
        )
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await?;
    assert_eq!(updated["current_daily_limit"], 84);
    assert_eq!(updated["sent_today"], 42);
    assert_eq!(updated["usage_percent"], 50.0);

    let missing = app
        .patch_json("/api/sending-profiles/sp9", &json!({ "status": "paused" }))
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn health_reports_draft_backend() -> Result<()> {
    let app = TestApp::new();
    let health = body_json(app.get("/api/health").await?).await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["draft_backend"], "scripted");

    let templates = body_json(app.get("/api/templates").await?).await?;
    assert_eq!(templates.as_array().map(Vec::len), Some(4));
    assert_eq!(templates[0]["id"], "tmp1");
    Ok(())
}
