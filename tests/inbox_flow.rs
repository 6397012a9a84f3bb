mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn reply_appends_message_and_touches_thread() -> Result<()> {
    let app = TestApp::new();
    let before = body_json(app.get("/api/threads/t1").await?).await?;
    let message_count = before["messages"].as_array().map(Vec::len).unwrap_or_default();
    let sent_before = app.sent_today("sp1").await?;

    let response = app
        .post_json(
            "/api/threads/t1/messages",
            &json!({ "body": "Thanks Sam, sending the brief today." }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let reply = body_json(response).await?;
    assert_eq!(reply["message"]["direction"], "outbound");
    assert_eq!(reply["message"]["subject"], before["thread"]["subject"]);
    assert_eq!(reply["message"]["created_by_user_id"], "user1");
    assert_eq!(reply["thread"]["last_message_at"], reply["message"]["sent_at"]);

    let after = body_json(app.get("/api/threads/t1").await?).await?;
    let messages = after["messages"].as_array().cloned().unwrap_or_default();
    assert_eq!(messages.len(), message_count + 1);
    assert_eq!(
        messages.last().map(|m| m["body_text"].clone()),
        Some(json!("Thanks Sam, sending the brief today."))
    );
    assert_eq!(app.sent_today("sp1").await?, sent_before + 1);

    let session = body_json(app.get("/api/session").await?).await?;
    assert_eq!(session["notification"]["message"], "Message sent successfully");

    Ok(())
}

#[tokio::test]
async fn blank_reply_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let sent_before = app.sent_today("sp1").await?;

    let response = app
        .post_json("/api/threads/t1/messages", &json!({ "body": "   " }))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.sent_today("sp1").await?, sent_before);

    let missing = app
        .post_json("/api/threads/t404/messages", &json!({ "body": "hi" }))
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn reply_can_charge_a_chosen_profile() -> Result<()> {
    let app = TestApp::new();
    let sp1 = app.sent_today("sp1").await?;
    let sp2 = app.sent_today("sp2").await?;

    let response = app
        .post_json(
            "/api/threads/t2/messages",
            &json!({ "body": "Following up", "sending_profile_id": "sp2" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.sent_today("sp1").await?, sp1);
    assert_eq!(app.sent_today("sp2").await?, sp2 + 1);

    Ok(())
}

#[tokio::test]
async fn failed_reply_draft_falls_back_to_template() -> Result<()> {
    let app = TestApp::builder().failing(&["Affilink"]).build();

    let response = app
        .post_json("/api/threads/t1/draft", &json!({ "template_id": "tmp2" }))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let draft = body_json(response).await?;
    assert_eq!(draft["subject"], "Partnership Update: Xark x Affilink");
    assert!(draft["body"]
        .as_str()
        .is_some_and(|body| body.starts_with("Hi Sam Jenkins,")));

    Ok(())
}

#[tokio::test]
async fn reply_draft_without_body_uses_first_template() -> Result<()> {
    let app = TestApp::new();

    let response = app.post_empty("/api/threads/t2/draft").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let draft = body_json(response).await?;
    assert_eq!(draft["subject"], "Partnering with Cache Media Limited");

    let session = body_json(app.get("/api/session").await?).await?;
    assert_eq!(session["notification"]["type"], "info");

    Ok(())
}

#[tokio::test]
async fn template_preview_fills_placeholders() -> Result<()> {
    let app = TestApp::new();

    let preview = body_json(
        app.get("/api/threads/t1/template-preview?template_id=tmp1")
            .await?,
    )
    .await?;
    let body = preview["body"].as_str().unwrap_or_default();
    assert!(body.contains("email to Affilink proposing"));
    assert!(body.contains("affilink.co.uk"));
    assert!(!body.contains("{{"));

    let unknown = app
        .get("/api/threads/t1/template-preview?template_id=nope")
        .await?;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn closing_a_thread_updates_dashboard() -> Result<()> {
    let app = TestApp::new();
    let before = body_json(app.get("/api/dashboard").await?).await?;

    let response = app
        .patch_json("/api/threads/t2", &json!({ "status": "closed" }))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["status"], "closed");

    let after = body_json(app.get("/api/dashboard").await?).await?;
    assert_eq!(
        after["open_threads"].as_u64(),
        before["open_threads"].as_u64().map(|n| n - 1)
    );

    let inbox = body_json(app.get("/api/threads?status=closed").await?).await?;
    assert_eq!(inbox.as_array().map(Vec::len), Some(1));
    assert_eq!(inbox[0]["publisher"]["company"], "Cache Media Limited");
    assert_eq!(inbox[0]["publisher"]["contact_email"]["state"], "masked");

    let missing = app
        .patch_json("/api/threads/t404", &json!({ "status": "closed" }))
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}
