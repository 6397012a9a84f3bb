//! Bulk outreach: one template, many publishers, one personalised message
//! each.
//!
//! A session moves `template_select -> drafting -> review`. Drafting walks
//! the publishers strictly one at a time (see [`runner::DraftRunner`]), so the
//! per-draft states below always advance in selection order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::compose::{new_message_id, new_thread_id, new_thread_token};
use crate::drafts::{DraftContext, DraftRequest, GeneratedDraft};
use crate::models::{Direction, Message, Publisher, Template, Thread, ThreadStatus};

pub mod runner;

pub use runner::DraftRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    TemplateSelect,
    Drafting,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Pending,
    Drafting,
    Ready,
    Sent,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftItem {
    pub publisher_id: String,
    pub company: String,
    pub subject: String,
    pub body: String,
    pub status: DraftStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutreachError {
    #[error("no bulk outreach session is open")]
    NoSession,
    #[error("bulk outreach session was closed")]
    SessionGone,
    #[error("select at least one publisher")]
    EmptySelection,
    #[error("select a template first")]
    NoTemplateSelected,
    #[error("unknown template {0}")]
    UnknownTemplate(String),
    #[error("operation not allowed while the session is in the {0:?} step")]
    InvalidStep(Step),
    #[error("drafting is in progress")]
    DraftingInProgress,
    #[error("no ready drafts to send")]
    NothingToSend,
    #[error("no draft for publisher {0}")]
    UnknownDraft(String),
    #[error("draft for publisher {0} is not editable")]
    DraftLocked(String),
}

/// Work handed to the generator for a single publisher.
#[derive(Debug, Clone)]
pub struct DraftJob {
    pub index: usize,
    pub publisher_id: String,
    pub request: DraftRequest,
}

/// A thread and its opening message produced by [`BulkSession::send_all`].
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub thread: Thread,
    pub message: Message,
}

#[derive(Debug, Clone)]
pub struct BulkSession {
    id: Uuid,
    publishers: Vec<Publisher>,
    step: Step,
    template_id: Option<String>,
    system_prompt: Option<String>,
    drafts: Vec<DraftItem>,
    sent_at: Option<DateTime<Utc>>,
}

impl BulkSession {
    pub fn new(publishers: Vec<Publisher>) -> Self {
        Self {
            id: Uuid::new_v4(),
            publishers,
            step: Step::TemplateSelect,
            template_id: None,
            system_prompt: None,
            drafts: Vec::new(),
            sent_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn publishers(&self) -> &[Publisher] {
        &self.publishers
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn drafts(&self) -> &[DraftItem] {
        &self.drafts
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn is_drafting(&self) -> bool {
        self.step == Step::Drafting
    }

    /// Cancelling is refused while a draft request may be in flight.
    pub fn ensure_dismissable(&self) -> Result<(), OutreachError> {
        if self.is_drafting() {
            return Err(OutreachError::DraftingInProgress);
        }
        Ok(())
    }

    pub fn select_template(&mut self, template: &Template) -> Result<(), OutreachError> {
        if self.step != Step::TemplateSelect {
            return Err(OutreachError::InvalidStep(self.step));
        }
        self.template_id = Some(template.id.clone());
        self.system_prompt = Some(template.prompt_system.clone());
        Ok(())
    }

    /// Queues one pending draft per publisher and enters `drafting`.
    pub fn begin_drafting(&mut self) -> Result<(), OutreachError> {
        if self.step != Step::TemplateSelect {
            return Err(OutreachError::InvalidStep(self.step));
        }
        if self.template_id.is_none() || self.system_prompt.is_none() {
            return Err(OutreachError::NoTemplateSelected);
        }
        if self.publishers.is_empty() {
            return Err(OutreachError::EmptySelection);
        }

        self.drafts = self
            .publishers
            .iter()
            .map(|publisher| DraftItem {
                publisher_id: publisher.id.clone(),
                company: publisher.company.clone(),
                subject: String::new(),
                body: String::new(),
                status: DraftStatus::Pending,
                error: None,
            })
            .collect();
        self.step = Step::Drafting;
        Ok(())
    }

    /// Takes the first pending draft, marks it `drafting` and returns the
    /// request to run. `None` once the queue is drained.
    pub fn next_pending(&mut self) -> Option<DraftJob> {
        if self.step != Step::Drafting {
            return None;
        }
        let system_prompt = self.system_prompt.clone()?;
        let index = self
            .drafts
            .iter()
            .position(|draft| draft.status == DraftStatus::Pending)?;
        let publisher = self.publishers.get(index)?;

        self.drafts[index].status = DraftStatus::Drafting;
        Some(DraftJob {
            index,
            publisher_id: publisher.id.clone(),
            request: DraftRequest {
                system_prompt,
                context: DraftContext::outreach(publisher),
                history: None,
            },
        })
    }

    pub fn record_ready(&mut self, index: usize, draft: GeneratedDraft) {
        if let Some(item) = self.drafting_item(index) {
            item.subject = draft.subject;
            item.body = draft.body;
            item.status = DraftStatus::Ready;
        }
    }

    pub fn record_failure(&mut self, index: usize, error: impl Into<String>) {
        if let Some(item) = self.drafting_item(index) {
            item.status = DraftStatus::Error;
            item.error = Some(error.into());
        }
    }

    fn drafting_item(&mut self, index: usize) -> Option<&mut DraftItem> {
        self.drafts
            .get_mut(index)
            .filter(|item| item.status == DraftStatus::Drafting)
    }

    /// Moves to `review` once nothing is pending or in flight.
    pub fn finish_drafting(&mut self) -> bool {
        let unresolved = self
            .drafts
            .iter()
            .any(|d| matches!(d.status, DraftStatus::Pending | DraftStatus::Drafting));
        if self.step == Step::Drafting && !unresolved {
            self.step = Step::Review;
            return true;
        }
        false
    }

    pub fn progress(&self) -> Progress {
        let total = self.drafts.len();
        let completed = self
            .drafts
            .iter()
            .filter(|d| {
                matches!(
                    d.status,
                    DraftStatus::Ready | DraftStatus::Error | DraftStatus::Sent
                )
            })
            .count();
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Progress {
            completed,
            total,
            percent,
        }
    }

    pub fn edit_draft(
        &mut self,
        publisher_id: &str,
        subject: Option<String>,
        body: Option<String>,
    ) -> Result<&DraftItem, OutreachError> {
        if self.step != Step::Review {
            return Err(OutreachError::InvalidStep(self.step));
        }
        let item = self
            .drafts
            .iter_mut()
            .find(|d| d.publisher_id == publisher_id)
            .ok_or_else(|| OutreachError::UnknownDraft(publisher_id.to_string()))?;
        if item.status != DraftStatus::Ready {
            return Err(OutreachError::DraftLocked(publisher_id.to_string()));
        }
        if let Some(subject) = subject {
            item.subject = subject;
        }
        if let Some(body) = body {
            item.body = body;
        }
        Ok(item)
    }

    /// Turns every `ready` draft into a new `waiting_reply` thread with one
    /// outbound message, and marks those drafts `sent`. Failed drafts are
    /// left untouched.
    pub fn send_all(
        &mut self,
        sender_id: &str,
        sending_profile_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboundEmail>, OutreachError> {
        if self.step != Step::Review {
            return Err(OutreachError::InvalidStep(self.step));
        }
        if !self.drafts.iter().any(|d| d.status == DraftStatus::Ready) {
            return Err(OutreachError::NothingToSend);
        }

        let mut outbound = Vec::new();
        for item in self
            .drafts
            .iter_mut()
            .filter(|d| d.status == DraftStatus::Ready)
        {
            let thread = Thread {
                id: new_thread_id(),
                publisher_id: item.publisher_id.clone(),
                thread_token: new_thread_token(),
                status: ThreadStatus::WaitingReply,
                last_message_at: now,
                subject: item.subject.clone(),
            };
            let message = Message {
                id: new_message_id(),
                thread_id: thread.id.clone(),
                direction: Direction::Outbound,
                subject: item.subject.clone(),
                body_text: item.body.clone(),
                created_by_user_id: Some(sender_id.to_string()),
                sent_at: now,
                sending_profile_id: sending_profile_id.map(str::to_string),
            };
            item.status = DraftStatus::Sent;
            outbound.push(OutboundEmail { thread, message });
        }

        self.sent_at = Some(now);
        Ok(outbound)
    }

    /// Back to template selection with the same publishers.
    pub fn start_over(&mut self) -> Result<(), OutreachError> {
        self.ensure_dismissable()?;
        self.step = Step::TemplateSelect;
        self.template_id = None;
        self.system_prompt = None;
        self.drafts.clear();
        self.sent_at = None;
        Ok(())
    }
}
