use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    Direction, Message, Notification, NotificationKind, OutreachStatus, Publisher, PublisherPatch,
    SendingProfile, SendingProfilePatch, Tab, Template, Thread, ThreadPatch, ThreadStatus, User,
    WarmupSchedule,
};
use crate::outreach::{BulkSession, OutreachError};
use crate::seed::SeedData;

pub const DEFAULT_NOTIFICATION_TTL_SECS: u32 = 5;

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub notification_ttl: ChronoDuration,
    /// Profile charged for outbound sends that do not name one. Falls back
    /// to the first seeded profile.
    pub default_sending_profile_id: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            notification_ttl: ChronoDuration::seconds(i64::from(DEFAULT_NOTIFICATION_TTL_SECS)),
            default_sending_profile_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_publishers: usize,
    pub active_outreach: usize,
    pub open_threads: usize,
}

/// Session-wide state. Every mutator is a merge: unknown ids are ignored and
/// reported through the `bool` return instead of an error.
#[derive(Debug)]
pub struct Store {
    current_user: User,
    publishers: Vec<Publisher>,
    threads: Vec<Thread>,
    messages: Vec<Message>,
    templates: Vec<Template>,
    sending_profiles: Vec<SendingProfile>,
    warmup_schedules: Vec<WarmupSchedule>,
    default_sending_profile_id: Option<String>,
    active_tab: Tab,
    selected_publisher_id: Option<String>,
    bulk_outreach: Option<BulkSession>,
    notification: Option<Notification>,
    notification_ttl: ChronoDuration,
}

impl Store {
    pub fn new(seed: SeedData, settings: StoreSettings) -> Self {
        let first_profile_id = seed.sending_profiles.first().map(|p| p.id.clone());
        let default_sending_profile_id = match settings.default_sending_profile_id {
            Some(id) if seed.sending_profiles.iter().any(|p| p.id == id) => Some(id),
            Some(id) => {
                warn!(
                    configured = %id,
                    fallback = first_profile_id.as_deref().unwrap_or("<none>"),
                    "default sending profile not found, using the first profile"
                );
                first_profile_id
            }
            None => first_profile_id,
        };

        Self {
            current_user: seed.current_user,
            publishers: seed.publishers,
            threads: seed.threads,
            messages: seed.messages,
            templates: seed.templates,
            sending_profiles: seed.sending_profiles,
            warmup_schedules: seed.warmup_schedules,
            default_sending_profile_id,
            active_tab: Tab::Dashboard,
            selected_publisher_id: None,
            bulk_outreach: None,
            notification: None,
            notification_ttl: settings.notification_ttl,
        }
    }

    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    pub fn set_current_user(&mut self, user: User) {
        self.current_user = user;
    }

    pub fn toggle_role(&mut self) -> &User {
        self.current_user.role = self.current_user.role.toggled();
        &self.current_user
    }

    pub fn publishers(&self) -> &[Publisher] {
        &self.publishers
    }

    pub fn publisher(&self, id: &str) -> Option<&Publisher> {
        self.publishers.iter().find(|p| p.id == id)
    }

    pub fn add_publisher(&mut self, publisher: Publisher) {
        self.publishers.insert(0, publisher);
    }

    /// Prepends in the given order. Ids are not checked for duplicates.
    pub fn add_publishers(&mut self, publishers: Vec<Publisher>) {
        self.publishers.splice(0..0, publishers);
    }

    pub fn update_publisher(&mut self, id: &str, patch: PublisherPatch) -> bool {
        match self.publishers.iter_mut().find(|p| p.id == id) {
            Some(publisher) => {
                publisher.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Case-insensitive substring match on company, contact person and
    /// website. A blank term returns everything.
    pub fn search_publishers(&self, term: &str) -> Vec<&Publisher> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.publishers.iter().collect();
        }
        self.publishers
            .iter()
            .filter(|p| {
                p.company.to_lowercase().contains(&needle)
                    || p.contact_person.to_lowercase().contains(&needle)
                    || p.website.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn threads_for_publisher(&self, publisher_id: &str) -> Vec<&Thread> {
        self.threads
            .iter()
            .filter(|t| t.publisher_id == publisher_id)
            .collect()
    }

    pub fn create_thread(&mut self, thread: Thread) {
        self.threads.insert(0, thread);
    }

    pub fn update_thread(&mut self, id: &str, patch: ThreadPatch) -> bool {
        match self.threads.iter_mut().find(|t| t.id == id) {
            Some(thread) => {
                thread.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_for_thread(&self, thread_id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .collect()
    }

    pub fn add_message(&mut self, message: Message) -> usize {
        self.add_messages(vec![message])
    }

    /// Appends messages and charges one quota unit per outbound message.
    /// Returns the number of outbound messages recorded.
    pub fn add_messages(&mut self, messages: Vec<Message>) -> usize {
        let mut charges: HashMap<String, u32> = HashMap::new();
        for message in messages.iter().filter(|m| m.direction == Direction::Outbound) {
            if let Some(profile_id) = self.quota_target(message.sending_profile_id.as_deref()) {
                *charges.entry(profile_id).or_default() += 1;
            }
        }
        let outbound = messages
            .iter()
            .filter(|m| m.direction == Direction::Outbound)
            .count();

        self.messages.extend(messages);

        for (profile_id, count) in charges {
            if let Some(profile) = self.sending_profiles.iter_mut().find(|p| p.id == profile_id) {
                profile.sent_today = profile.sent_today.saturating_add(count);
                debug!(profile_id = %profile.id, count, sent_today = profile.sent_today, "charged sending quota");
            }
        }

        outbound
    }

    fn quota_target(&self, requested: Option<&str>) -> Option<String> {
        requested
            .filter(|id| self.sending_profiles.iter().any(|p| p.id == *id))
            .map(str::to_string)
            .or_else(|| self.default_sending_profile_id.clone())
    }

    pub fn default_sending_profile_id(&self) -> Option<&str> {
        self.default_sending_profile_id.as_deref()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn sending_profiles(&self) -> &[SendingProfile] {
        &self.sending_profiles
    }

    pub fn update_sending_profile(&mut self, id: &str, patch: SendingProfilePatch) -> bool {
        match self.sending_profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) => {
                profile.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn warmup_schedules(&self) -> &[WarmupSchedule] {
        &self.warmup_schedules
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Tab navigation closes the publisher detail view and any bulk outreach
    /// session.
    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.selected_publisher_id = None;
        self.bulk_outreach = None;
    }

    pub fn selected_publisher_id(&self) -> Option<&str> {
        self.selected_publisher_id.as_deref()
    }

    pub fn select_publisher(&mut self, id: Option<String>) {
        self.selected_publisher_id = id;
    }

    pub fn bulk_outreach(&self) -> Option<&BulkSession> {
        self.bulk_outreach.as_ref()
    }

    pub fn bulk_outreach_mut(&mut self) -> Option<&mut BulkSession> {
        self.bulk_outreach.as_mut()
    }

    pub fn open_bulk_outreach(&mut self, session: BulkSession) {
        self.bulk_outreach = Some(session);
    }

    /// Opens a session over the given publishers, in the order given. Unknown
    /// ids are skipped. A session that is still drafting is never replaced,
    /// and an empty resolution leaves any current session alone.
    pub fn open_bulk_outreach_for(&mut self, publisher_ids: &[String]) -> Result<Uuid, OutreachError> {
        if let Some(current) = &self.bulk_outreach {
            current.ensure_dismissable()?;
        }
        let publishers: Vec<Publisher> = publisher_ids
            .iter()
            .filter_map(|id| self.publisher(id).cloned())
            .collect();
        if publishers.is_empty() {
            return Err(OutreachError::EmptySelection);
        }
        let session = BulkSession::new(publishers);
        let id = session.id();
        self.bulk_outreach = Some(session);
        Ok(id)
    }

    pub fn close_bulk_outreach(&mut self) -> Option<BulkSession> {
        self.bulk_outreach.take()
    }

    /// Replaces any pending notification.
    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind, now: DateTime<Utc>) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            expires_at: now + self.notification_ttl,
        });
    }

    pub fn notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|notification| notification.expires_at > now)
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        DashboardStats {
            total_publishers: self.publishers.len(),
            active_outreach: self
                .publishers
                .iter()
                .filter(|p| p.outreach_status == OutreachStatus::Working)
                .count(),
            open_threads: self
                .threads
                .iter()
                .filter(|t| t.status != ThreadStatus::Closed)
                .count(),
        }
    }
}
