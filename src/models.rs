use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Operator,
}

impl UserRole {
    pub fn toggled(self) -> Self {
        match self {
            UserRole::Admin => UserRole::Operator,
            UserRole::Operator => UserRole::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublisherStatus {
    Joined,
    Left,
    Rejected,
    #[serde(rename = "Partnership Ended")]
    PartnershipEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachStatus {
    Cold,
    Working,
    Replied,
    Paused,
    NotFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityTier {
    A,
    B,
    C,
}

impl PriorityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::A => "A",
            PriorityTier::B => "B",
            PriorityTier::C => "C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub clicks: u32,
    pub conversions: u32,
    pub sales: u32,
    pub commission: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaKitDocument {
    pub id: String,
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub upload_date: NaiveDate,
    pub url: String,
}

/// A partner in the directory.
///
/// `email_encrypted` is never serialized from this type; presentation goes
/// through [`crate::auth::masking`], which decides per role whether the value
/// may be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: String,
    pub company: String,
    pub contact_person: String,
    pub website: String,
    #[serde(rename = "type")]
    pub publisher_type: String,
    pub join_date: NaiveDate,
    pub state: String,
    pub country: String,
    pub status: PublisherStatus,
    #[serde(default, skip_serializing)]
    pub email_encrypted: Option<String>,
    pub priority_tier: PriorityTier,
    pub outreach_status: OutreachStatus,
    pub last_contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vertical_fit: Vec<String>,
    pub traffic_estimate: String,
    pub bio: String,
    pub avatar_url: String,
    #[serde(default)]
    pub promo_methods: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub promoted_countries: Vec<String>,
    #[serde(default)]
    pub performance: Vec<PerformancePoint>,
    #[serde(default)]
    pub media_kits: Vec<MediaKitDocument>,
}

/// Partial update for a publisher. Nullable columns use a nested option so
/// that "omitted" and "cleared" stay distinguishable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublisherPatch {
    pub company: Option<String>,
    pub contact_person: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub publisher_type: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub status: Option<PublisherStatus>,
    #[serde(skip)]
    pub email_encrypted: Option<Option<String>>,
    pub priority_tier: Option<PriorityTier>,
    pub outreach_status: Option<OutreachStatus>,
    #[serde(skip)]
    pub last_contacted_at: Option<Option<DateTime<Utc>>>,
    pub vertical_fit: Option<Vec<String>>,
    pub traffic_estimate: Option<String>,
    pub bio: Option<String>,
    pub promo_methods: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub promoted_countries: Option<Vec<String>>,
    #[serde(skip)]
    pub media_kits: Option<Vec<MediaKitDocument>>,
}

impl Publisher {
    pub fn apply(&mut self, patch: PublisherPatch) {
        if let Some(value) = patch.company {
            self.company = value;
        }
        if let Some(value) = patch.contact_person {
            self.contact_person = value;
        }
        if let Some(value) = patch.website {
            self.website = value;
        }
        if let Some(value) = patch.publisher_type {
            self.publisher_type = value;
        }
        if let Some(value) = patch.state {
            self.state = value;
        }
        if let Some(value) = patch.country {
            self.country = value;
        }
        if let Some(value) = patch.status {
            self.status = value;
        }
        if let Some(value) = patch.email_encrypted {
            self.email_encrypted = value;
        }
        if let Some(value) = patch.priority_tier {
            self.priority_tier = value;
        }
        if let Some(value) = patch.outreach_status {
            self.outreach_status = value;
        }
        if let Some(value) = patch.last_contacted_at {
            self.last_contacted_at = value;
        }
        if let Some(value) = patch.vertical_fit {
            self.vertical_fit = value;
        }
        if let Some(value) = patch.traffic_estimate {
            self.traffic_estimate = value;
        }
        if let Some(value) = patch.bio {
            self.bio = value;
        }
        if let Some(value) = patch.promo_methods {
            self.promo_methods = value;
        }
        if let Some(value) = patch.categories {
            self.categories = value;
        }
        if let Some(value) = patch.promoted_countries {
            self.promoted_countries = value;
        }
        if let Some(value) = patch.media_kits {
            self.media_kits = value;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Open,
    WaitingReply,
    Closed,
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub publisher_id: String,
    pub thread_token: String,
    pub status: ThreadStatus,
    pub last_message_at: DateTime<Utc>,
    pub subject: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadPatch {
    pub status: Option<ThreadStatus>,
    pub subject: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Thread {
    pub fn apply(&mut self, patch: ThreadPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(at) = patch.last_message_at {
            self.last_message_at = at;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub direction: Direction,
    pub subject: String,
    pub body_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_user_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    /// Profile whose daily quota this send consumes. `None` means the
    /// store's default profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sending_profile_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub prompt_system: String,
    pub prompt_user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailProvider {
    Mailgun,
    SendGrid,
    Postmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Warmup,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendingProfile {
    pub id: String,
    pub domain: String,
    pub provider: EmailProvider,
    pub status: ProfileStatus,
    pub current_daily_limit: u32,
    pub max_target_limit: u32,
    pub sent_today: u32,
    pub warmup_start_date: NaiveDate,
    pub warmup_duration_days: u32,
    pub reputation_score: u8,
}

/// `sent_today` is deliberately absent: it only moves through recorded sends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendingProfilePatch {
    pub status: Option<ProfileStatus>,
    pub current_daily_limit: Option<u32>,
    pub max_target_limit: Option<u32>,
    pub reputation_score: Option<u8>,
}

impl SendingProfile {
    pub fn apply(&mut self, patch: SendingProfilePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(limit) = patch.current_daily_limit {
            self.current_daily_limit = limit;
        }
        if let Some(limit) = patch.max_target_limit {
            self.max_target_limit = limit;
        }
        if let Some(score) = patch.reputation_score {
            self.reputation_score = score;
        }
    }

    /// Share of today's limit already consumed, capped at 100.
    pub fn usage_percent(&self) -> f64 {
        if self.current_daily_limit == 0 {
            return 100.0;
        }
        (f64::from(self.sent_today) / f64::from(self.current_daily_limit) * 100.0).min(100.0)
    }

    /// Elapsed share of the warmup window. Profiles outside warmup report 100.
    pub fn warmup_progress(&self, today: NaiveDate) -> f64 {
        if self.status != ProfileStatus::Warmup || self.warmup_duration_days == 0 {
            return 100.0;
        }
        let elapsed = (today - self.warmup_start_date).num_days().max(0) as f64;
        (elapsed / f64::from(self.warmup_duration_days) * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupStep {
    pub day: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupSchedule {
    pub id: String,
    pub name: String,
    pub steps: Vec<WarmupStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Dashboard,
    Publishers,
    Inbox,
    Deliverability,
    Admin,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Publishers,
        Tab::Inbox,
        Tab::Deliverability,
        Tab::Admin,
    ];

    /// Unknown names land on the dashboard.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "publishers" => Tab::Publishers,
            "inbox" => Tab::Inbox,
            "deliverability" => Tab::Deliverability,
            "admin" => Tab::Admin,
            _ => Tab::Dashboard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Publishers => "Publishers",
            Tab::Inbox => "Inbox",
            Tab::Deliverability => "Deliverability",
            Tab::Admin => "Admin Settings",
        }
    }

    pub fn admin_only(self) -> bool {
        matches!(self, Tab::Deliverability | Tab::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_parse_falls_back_to_dashboard() {
        assert_eq!(Tab::parse_lossy("Inbox"), Tab::Inbox);
        assert_eq!(Tab::parse_lossy("reports"), Tab::Dashboard);
        assert!(Tab::Admin.admin_only());
        assert!(!Tab::Publishers.admin_only());
    }

    #[test]
    fn usage_percent_is_capped() {
        let mut profile = SendingProfile {
            id: "sp".into(),
            domain: "example.io".into(),
            provider: EmailProvider::Postmark,
            status: ProfileStatus::Warmup,
            current_daily_limit: 50,
            max_target_limit: 1000,
            sent_today: 25,
            warmup_start_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            warmup_duration_days: 14,
            reputation_score: 85,
        };
        assert_eq!(profile.usage_percent(), 50.0);
        profile.sent_today = 80;
        assert_eq!(profile.usage_percent(), 100.0);

        let halfway = NaiveDate::from_ymd_opt(2024, 5, 22).unwrap();
        assert_eq!(profile.warmup_progress(halfway), 50.0);
        profile.status = ProfileStatus::Active;
        assert_eq!(profile.warmup_progress(halfway), 100.0);
    }

    #[test]
    fn publisher_serialization_omits_encrypted_email() {
        let json = serde_json::json!({
            "id": "p9",
            "company": "Acme",
            "contact_person": "Ann",
            "website": "acme.test",
            "type": "Content",
            "join_date": "2024-01-01",
            "state": "CA",
            "country": "USA",
            "status": "Partnership Ended",
            "email_encrypted": "ann@acme.test",
            "priority_tier": "A",
            "outreach_status": "not_fit",
            "last_contacted_at": null,
            "traffic_estimate": "1K/mo",
            "bio": "",
            "avatar_url": ""
        });
        let publisher: Publisher = serde_json::from_value(json).unwrap();
        assert_eq!(publisher.status, PublisherStatus::PartnershipEnded);
        assert_eq!(publisher.email_encrypted.as_deref(), Some("ann@acme.test"));

        let out = serde_json::to_string(&publisher).unwrap();
        assert!(!out.contains("ann@acme.test"));
        assert!(out.contains("\"type\":\"Content\""));
    }
}
