//! Role-based redaction of publisher contact data.
//!
//! Every response that carries publisher contact details is built from
//! [`PublisherRow`] or [`PublisherView`], and both take the email through
//! [`contact_email`]. The raw value still lives in process memory; this is a
//! presentation rule, not an access-control boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{
    MediaKitDocument, OutreachStatus, PerformancePoint, PriorityTier, Publisher, PublisherStatus,
    UserRole,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ContactEmail {
    Visible(String),
    Masked,
    Missing,
}

pub fn can_view_contact_email(role: UserRole) -> bool {
    role == UserRole::Admin
}

pub fn contact_email(role: UserRole, publisher: &Publisher) -> ContactEmail {
    match publisher.email_encrypted.as_deref() {
        None => ContactEmail::Missing,
        Some(_) if !can_view_contact_email(role) => ContactEmail::Masked,
        Some(email) => ContactEmail::Visible(email.to_string()),
    }
}

/// Directory listing and thread sidebar shape.
#[derive(Debug, Clone, Serialize)]
pub struct PublisherRow {
    pub id: String,
    pub company: String,
    pub contact_person: String,
    pub website: String,
    #[serde(rename = "type")]
    pub publisher_type: String,
    pub status: PublisherStatus,
    pub priority_tier: PriorityTier,
    pub outreach_status: OutreachStatus,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub traffic_estimate: String,
    pub vertical_fit: Vec<String>,
    pub avatar_url: String,
    pub contact_email: ContactEmail,
}

impl PublisherRow {
    pub fn for_role(publisher: &Publisher, role: UserRole) -> Self {
        Self {
            id: publisher.id.clone(),
            company: publisher.company.clone(),
            contact_person: publisher.contact_person.clone(),
            website: publisher.website.clone(),
            publisher_type: publisher.publisher_type.clone(),
            status: publisher.status,
            priority_tier: publisher.priority_tier,
            outreach_status: publisher.outreach_status,
            last_contacted_at: publisher.last_contacted_at,
            traffic_estimate: publisher.traffic_estimate.clone(),
            vertical_fit: publisher.vertical_fit.clone(),
            avatar_url: publisher.avatar_url.clone(),
            contact_email: contact_email(role, publisher),
        }
    }
}

/// Full publisher detail.
#[derive(Debug, Clone, Serialize)]
pub struct PublisherView {
    #[serde(flatten)]
    pub row: PublisherRow,
    pub join_date: NaiveDate,
    pub state: String,
    pub country: String,
    pub bio: String,
    pub promo_methods: Vec<String>,
    pub categories: Vec<String>,
    pub promoted_countries: Vec<String>,
    pub performance: Vec<PerformancePoint>,
    pub media_kits: Vec<MediaKitDocument>,
}

impl PublisherView {
    pub fn for_role(publisher: &Publisher, role: UserRole) -> Self {
        Self {
            row: PublisherRow::for_role(publisher, role),
            join_date: publisher.join_date,
            state: publisher.state.clone(),
            country: publisher.country.clone(),
            bio: publisher.bio.clone(),
            promo_methods: publisher.promo_methods.clone(),
            categories: publisher.categories.clone(),
            promoted_countries: publisher.promoted_countries.clone(),
            performance: publisher.performance.clone(),
            media_kits: publisher.media_kits.clone(),
        }
    }
}
