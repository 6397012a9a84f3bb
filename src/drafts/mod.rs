use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Message, PriorityTier, Publisher};

pub mod gemini;

pub use gemini::GeminiBackend;

pub const DEFAULT_PLATFORM_NAME: &str = "Xark";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional outreach manager.";

/// Publisher attributes handed to the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftContext {
    pub company: String,
    pub website: String,
    pub tier: PriorityTier,
    pub contact_person: Option<String>,
    pub publisher_type: Option<String>,
    pub bio: Option<String>,
    pub traffic_estimate: Option<String>,
    pub promo_methods: Vec<String>,
    pub vertical_fit: Vec<String>,
}

impl DraftContext {
    /// The reduced context used for bulk outreach.
    pub fn outreach(publisher: &Publisher) -> Self {
        Self {
            company: publisher.company.clone(),
            website: publisher.website.clone(),
            tier: publisher.priority_tier,
            contact_person: Some(publisher.contact_person.clone()),
            publisher_type: Some(publisher.publisher_type.clone()),
            bio: None,
            traffic_estimate: None,
            promo_methods: Vec::new(),
            vertical_fit: Vec::new(),
        }
    }

    /// Everything known about the publisher, for single-thread compose.
    pub fn detailed(publisher: &Publisher) -> Self {
        Self {
            company: publisher.company.clone(),
            website: publisher.website.clone(),
            tier: publisher.priority_tier,
            contact_person: Some(publisher.contact_person.clone()),
            publisher_type: Some(publisher.publisher_type.clone()),
            bio: Some(publisher.bio.clone()),
            traffic_estimate: Some(publisher.traffic_estimate.clone()),
            promo_methods: publisher.promo_methods.clone(),
            vertical_fit: publisher.vertical_fit.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub system_prompt: String,
    pub context: DraftContext,
    pub history: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDraft {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("request to draft provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("draft provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("draft provider response had no text content")]
    MissingContent,
    #[error("draft provider returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("draft provider unavailable: {0}")]
    Unavailable(String),
}

/// A text-generation provider. Implementations may fail; callers go through
/// [`DraftGenerator`], which decides whether failures are replaced.
#[async_trait]
pub trait DraftBackend: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn complete(
        &self,
        request: &DraftRequest,
        prompt: &str,
    ) -> Result<GeneratedDraft, DraftError>;
}

/// Used when no provider key is configured. Produces the deterministic
/// fallback draft as a successful result.
pub struct OfflineBackend {
    platform: String,
}

impl OfflineBackend {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

#[async_trait]
impl DraftBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn complete(
        &self,
        request: &DraftRequest,
        _prompt: &str,
    ) -> Result<GeneratedDraft, DraftError> {
        Ok(fallback_draft(&self.platform, &request.context))
    }
}

#[derive(Clone)]
pub struct DraftGenerator {
    backend: Arc<dyn DraftBackend>,
    platform: String,
}

impl DraftGenerator {
    pub fn new(backend: Arc<dyn DraftBackend>, platform: impl Into<String>) -> Self {
        Self {
            backend,
            platform: platform.into(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Never fails: provider errors are logged and answered with the
    /// templated fallback.
    pub async fn generate(&self, request: &DraftRequest) -> GeneratedDraft {
        match self.try_generate(request).await {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    backend = self.backend.name(),
                    company = %request.context.company,
                    error = %err,
                    "draft generation failed; using fallback"
                );
                fallback_draft(&self.platform, &request.context)
            }
        }
    }

    /// Surfaces provider failures so batch callers can mark items individually.
    pub async fn try_generate(&self, request: &DraftRequest) -> Result<GeneratedDraft, DraftError> {
        let prompt = build_prompt(&self.platform, &request.context, request.history.as_deref());
        let draft = self
            .backend
            .complete(request, &prompt)
            .await?;
        info!(
            backend = self.backend.name(),
            company = %request.context.company,
            "draft generated"
        );
        Ok(draft)
    }
}

pub fn build_prompt(platform: &str, context: &DraftContext, history: Option<&str>) -> String {
    let verticals = if context.vertical_fit.is_empty() {
        "N/A".to_string()
    } else {
        context.vertical_fit.join(", ")
    };
    let bio = context
        .bio
        .as_deref()
        .filter(|bio| !bio.trim().is_empty())
        .unwrap_or("Affiliate publisher.");
    let conversation = match history.filter(|h| !h.trim().is_empty()) {
        Some(history) => format!("CONVERSATION LOGS:\n{history}"),
        None => "No previous history. This is a first-time outreach.".to_string(),
    };
    let contact = context
        .contact_person
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("their team");

    format!(
        "INTERNAL CONTEXT:\n\
         Platform: {platform} (High-performance Affiliate Network)\n\
         Partner: {company} ({website})\n\
         Classification: Tier {tier}\n\
         Verticals: {verticals}\n\
         Partner Bio: {bio}\n\
         Contact: {contact}\n\
         \n\
         {conversation}\n\
         \n\
         OBJECTIVE:\n\
         Generate a professional and engaging affiliate outreach message.\n\
         Tailor the tone specifically to the publisher's bio and the existing thread context.\n\
         Do not use generic placeholders like [Name]; use {contact} if appropriate.",
        company = context.company,
        website = context.website,
        tier = context.tier.as_str(),
    )
}

/// Serializes thread history as `direction: body` lines, oldest first.
pub fn conversation_history<'a, I>(messages: I) -> String
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .map(|m| format!("{}: {}", m.direction.as_str(), m.body_text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fallback_draft(platform: &str, context: &DraftContext) -> GeneratedDraft {
    let company = &context.company;
    let website = &context.website;
    let greeting = context
        .contact_person
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("Team");
    GeneratedDraft {
        subject: format!("Partnership Update: {platform} x {company}"),
        body: format!(
            "Hi {greeting},\n\n\
             I hope you're having a great week. We've been reviewing the performance at {website} \
             and believe there's a strong opportunity to deepen our partnership with some of our \
             upcoming Q3 campaigns.\n\n\
             Let me know if you're available for a quick chat next week.\n\n\
             Best regards,\nThe {platform} Team"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::Utc;

    struct FailingBackend;

    #[async_trait]
    impl DraftBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn complete(&self, _: &DraftRequest, _: &str) -> Result<GeneratedDraft, DraftError> {
            Err(DraftError::Unavailable("quota exhausted".into()))
        }
    }

    fn context() -> DraftContext {
        DraftContext {
            company: "Affilink".into(),
            website: "affilink.co.uk".into(),
            tier: PriorityTier::A,
            contact_person: Some("Sam Jenkins".into()),
            publisher_type: Some("Content".into()),
            bio: None,
            traffic_estimate: None,
            promo_methods: Vec::new(),
            vertical_fit: vec!["Tech".into(), "SaaS".into()],
        }
    }

    fn request() -> DraftRequest {
        DraftRequest {
            system_prompt: "Be brief.".into(),
            context: context(),
            history: None,
        }
    }

    #[test]
    fn prompt_mentions_partner_and_first_outreach() {
        let prompt = build_prompt("Xark", &context(), None);
        assert!(prompt.contains("Partner: Affilink (affilink.co.uk)"));
        assert!(prompt.contains("Classification: Tier A"));
        assert!(prompt.contains("Verticals: Tech, SaaS"));
        assert!(prompt.contains("Partner Bio: Affiliate publisher."));
        assert!(prompt.contains("first-time outreach"));
    }

    #[test]
    fn prompt_embeds_history_when_present() {
        let prompt = build_prompt("Xark", &context(), Some("outbound: hi\ninbound: hello"));
        assert!(prompt.contains("CONVERSATION LOGS:\noutbound: hi\ninbound: hello"));
        assert!(!prompt.contains("first-time outreach"));
    }

    #[test]
    fn history_lines_keep_message_order() {
        let make = |direction, body: &str| Message {
            id: body.into(),
            thread_id: "t".into(),
            direction,
            subject: String::new(),
            body_text: body.into(),
            created_by_user_id: None,
            sent_at: Utc::now(),
            sending_profile_id: None,
        };
        let messages = vec![make(Direction::Outbound, "one"), make(Direction::Inbound, "two")];
        assert_eq!(conversation_history(&messages), "outbound: one\ninbound: two");
    }

    #[tokio::test]
    async fn generate_substitutes_fallback_on_failure() {
        let generator = DraftGenerator::new(Arc::new(FailingBackend), "Xark");
        let draft = generator.generate(&request()).await;
        assert_eq!(draft.subject, "Partnership Update: Xark x Affilink");
        assert!(draft.body.starts_with("Hi Sam Jenkins,"));
        assert!(draft.body.contains("affilink.co.uk"));

        assert!(generator.try_generate(&request()).await.is_err());
    }

    #[tokio::test]
    async fn offline_backend_matches_fallback() {
        let generator = DraftGenerator::new(Arc::new(OfflineBackend::new("Xark")), "Xark");
        let draft = generator.try_generate(&request()).await.unwrap();
        assert_eq!(draft, fallback_draft("Xark", &context()));
    }

    #[test]
    fn fallback_greets_team_without_contact() {
        let mut ctx = context();
        ctx.contact_person = None;
        let draft = fallback_draft("Xark", &ctx);
        assert!(draft.body.starts_with("Hi Team,"));
    }
}
