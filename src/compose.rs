//! Single-thread composition: replies inside an existing thread and brand
//! new outreach threads.

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use uuid::Uuid;

use crate::drafts::{DraftContext, DraftRequest, DEFAULT_SYSTEM_PROMPT};
use crate::models::{Direction, Message, Publisher, Template, Thread, ThreadStatus};

const THREAD_TOKEN_LEN: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("message body must not be empty")]
    EmptyBody,
    #[error("please enter both a subject and a message")]
    MissingSubjectOrBody,
}

pub fn new_thread_id() -> String {
    format!("t-{}", Uuid::new_v4().simple())
}

pub fn new_message_id() -> String {
    format!("m-{}", Uuid::new_v4().simple())
}

pub fn new_thread_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(THREAD_TOKEN_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

/// Pre-fills a reply body from a template. Only the first occurrence of each
/// placeholder is substituted.
pub fn fill_template(template: &Template, publisher: &Publisher) -> String {
    template
        .prompt_user
        .replacen("{{company}}", &publisher.company, 1)
        .replacen("{{website}}", &publisher.website, 1)
}

/// Draft request for a thread continuation. Falls back to the first template,
/// then to a generic system prompt.
pub fn draft_request(
    templates: &[Template],
    template_id: Option<&str>,
    publisher: &Publisher,
    history: Option<String>,
) -> DraftRequest {
    let template = template_id
        .and_then(|id| templates.iter().find(|t| t.id == id))
        .or_else(|| templates.first());
    let system_prompt = template
        .map(|t| t.prompt_system.clone())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    DraftRequest {
        system_prompt,
        context: DraftContext::detailed(publisher),
        history: history.filter(|h| !h.is_empty()),
    }
}

pub fn reply_message(
    thread: &Thread,
    body: &str,
    sender_id: &str,
    sending_profile_id: Option<String>,
    now: DateTime<Utc>,
) -> Result<Message, ComposeError> {
    if body.trim().is_empty() {
        return Err(ComposeError::EmptyBody);
    }
    Ok(Message {
        id: new_message_id(),
        thread_id: thread.id.clone(),
        direction: Direction::Outbound,
        subject: thread.subject.clone(),
        body_text: body.to_string(),
        created_by_user_id: Some(sender_id.to_string()),
        sent_at: now,
        sending_profile_id,
    })
}

pub fn open_thread(
    publisher: &Publisher,
    subject: &str,
    body: &str,
    sender_id: &str,
    sending_profile_id: Option<String>,
    now: DateTime<Utc>,
) -> Result<(Thread, Message), ComposeError> {
    if subject.trim().is_empty() || body.trim().is_empty() {
        return Err(ComposeError::MissingSubjectOrBody);
    }
    let thread = Thread {
        id: new_thread_id(),
        publisher_id: publisher.id.clone(),
        thread_token: new_thread_token(),
        status: ThreadStatus::WaitingReply,
        last_message_at: now,
        subject: subject.to_string(),
    };
    let message = Message {
        id: new_message_id(),
        thread_id: thread.id.clone(),
        direction: Direction::Outbound,
        subject: subject.to_string(),
        body_text: body.to_string(),
        created_by_user_id: Some(sender_id.to_string()),
        sent_at: now,
        sending_profile_id,
    };
    Ok((thread, message))
}
