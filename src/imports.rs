//! Simulated uploads: the directory import and media-kit documents.

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::models::{
    MediaKitDocument, OutreachStatus, PriorityTier, Publisher, PublisherStatus,
};
use crate::seed::generate_performance;

const COMPANY_PREFIXES: &[&str] = &[
    "Global", "Digital", "Apex", "NextGen", "Infinite", "Elite", "Smart", "Active", "Stellar",
    "Prime",
];
const COMPANY_SUFFIXES: &[&str] = &[
    "Media",
    "Adventures",
    "Marketing",
    "Solutions",
    "Publishing",
    "Network",
    "Partners",
    "Growth",
    "Labs",
    "Hub",
];
const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
];
const TLDS: &[&str] = &[".com", ".io", ".net", ".org", ".co.uk", ".ai"];

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Fabricates `count` directory records. Ids share a batch stamp so repeated
/// imports do not collide.
pub fn synthetic_publishers<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<Publisher> {
    let batch = now.timestamp_millis();
    let today = now.date_naive();
    let tiers = [PriorityTier::A, PriorityTier::B, PriorityTier::C];
    let statuses = [
        OutreachStatus::Cold,
        OutreachStatus::Working,
        OutreachStatus::Replied,
    ];

    (1..=count)
        .map(|n| {
            let prefix = pick(rng, COMPANY_PREFIXES);
            let suffix = pick(rng, COMPANY_SUFFIXES);
            let company = if n == 1 {
                "Global Ad Ventures".to_string()
            } else {
                format!("{prefix} {suffix} {n}")
            };
            let contact_person = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
            let website = format!(
                "{}-{}{n}{}",
                prefix.to_lowercase(),
                suffix.to_lowercase(),
                pick(rng, TLDS)
            );
            let publisher_type = if n % 3 == 0 {
                "Content"
            } else if n % 2 == 0 {
                "Media"
            } else {
                "Coupon"
            };

            Publisher {
                id: format!("p-bulk-{batch}-{n}"),
                bio: format!(
                    "Specialized in high-conversion traffic segments for {company}. Managed by {contact_person}."
                ),
                company,
                contact_person,
                website,
                publisher_type: publisher_type.to_string(),
                join_date: today,
                state: "Global".to_string(),
                country: if n % 5 == 0 { "UK" } else { "US" }.to_string(),
                status: PublisherStatus::Joined,
                email_encrypted: Some(format!("enc_contact_{n}@secure-xark.io")),
                priority_tier: tiers[n % 3],
                outreach_status: statuses[n % 3],
                last_contacted_at: None,
                vertical_fit: vec!["Tech".to_string(), "Marketing".to_string()],
                traffic_estimate: format!("{}K/mo", rng.gen_range(10..510)),
                avatar_url: format!("https://i.pravatar.cc/150?u=bulk-{n}"),
                promo_methods: vec!["Display Ads".to_string(), "Contextual".to_string()],
                categories: vec!["Software".to_string(), "Finance".to_string()],
                promoted_countries: vec!["US".to_string(), "Global".to_string()],
                performance: generate_performance(rng, today),
                media_kits: Vec::new(),
            }
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Metadata for an uploaded media-kit file. The content itself is not kept;
/// the URL is a transient local handle.
pub fn media_kit_document(
    name: &str,
    size_bytes: usize,
    content_type: Option<&str>,
    now: DateTime<Utc>,
) -> MediaKitDocument {
    let content_type = content_type
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(name).first_raw().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    let id = Uuid::new_v4().simple().to_string();

    MediaKitDocument {
        url: format!("blob:partnerdesk/{id}"),
        id: format!("doc-{}", &id[..9]),
        name: name.to_string(),
        size: format_size_mb(size_bytes),
        content_type,
        upload_date: now.date_naive(),
    }
}

pub fn format_size_mb(size_bytes: usize) -> String {
    format!("{:.2} MB", size_bytes as f64 / (1024.0 * 1024.0))
}
