use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::Rng;

use crate::models::{
    Direction, EmailProvider, MediaKitDocument, Message, OutreachStatus, PerformancePoint,
    PriorityTier, ProfileStatus, Publisher, PublisherStatus, SendingProfile, Template, Thread,
    ThreadStatus, User, UserRole, WarmupSchedule, WarmupStep,
};

const PERFORMANCE_DAYS: u64 = 30;

/// Collections loaded into a fresh store at startup.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub current_user: User,
    pub publishers: Vec<Publisher>,
    pub threads: Vec<Thread>,
    pub messages: Vec<Message>,
    pub templates: Vec<Template>,
    pub sending_profiles: Vec<SendingProfile>,
    pub warmup_schedules: Vec<WarmupSchedule>,
}

impl SeedData {
    pub fn demo() -> Self {
        let mut rng = rand::thread_rng();
        let may_first = date(2024, 5, 1);

        Self {
            current_user: User {
                id: "user1".into(),
                name: "Alex Rivera".into(),
                role: UserRole::Operator,
                avatar: "https://picsum.photos/seed/alex/100/100".into(),
            },
            publishers: vec![
                Publisher {
                    id: "p1".into(),
                    company: "Affilink".into(),
                    contact_person: "Sam Jenkins".into(),
                    website: "affilink.co.uk".into(),
                    publisher_type: "Content".into(),
                    join_date: date(2023, 11, 12),
                    state: "CA".into(),
                    country: "USA".into(),
                    status: PublisherStatus::Joined,
                    email_encrypted: Some("sam@affilink.co.uk".into()),
                    priority_tier: PriorityTier::A,
                    outreach_status: OutreachStatus::Working,
                    last_contacted_at: Some(timestamp("2024-05-20T14:30:00Z")),
                    vertical_fit: strings(&["Tech", "SaaS", "Finance"]),
                    traffic_estimate: "2.5M/mo".into(),
                    bio: "Hey there, I'm Sam from Affilink. We're an affiliate marketing agency currently promoting products, brands and software across the US & UK.".into(),
                    avatar_url: "https://i.pravatar.cc/150?u=p1".into(),
                    promo_methods: strings(&["Media buyer", "Content creator"]),
                    categories: strings(&[
                        "Office Products",
                        "Automotive",
                        "Tools & Home Improvement",
                        "Toys & Games",
                        "Pet Supplies",
                        "Industrial & Scientific",
                    ]),
                    promoted_countries: strings(&["US", "UK", "CA"]),
                    performance: generate_performance(&mut rng, may_first),
                    media_kits: vec![MediaKitDocument {
                        id: "doc1".into(),
                        name: "Affilink_Q1_Performance.pdf".into(),
                        size: "2.4 MB".into(),
                        content_type: "application/pdf".into(),
                        upload_date: date(2024, 2, 15),
                        url: "#".into(),
                    }],
                },
                Publisher {
                    id: "p2".into(),
                    company: "Cache Media Limited".into(),
                    contact_person: "Sarah Thompson".into(),
                    website: "cachemedia.net".into(),
                    publisher_type: "Coupon".into(),
                    join_date: date(2024, 1, 5),
                    state: "London".into(),
                    country: "UK".into(),
                    status: PublisherStatus::Joined,
                    email_encrypted: Some("partnerships@affglobal.net".into()),
                    priority_tier: PriorityTier::B,
                    outreach_status: OutreachStatus::Replied,
                    last_contacted_at: Some(timestamp("2024-05-22T09:15:00Z")),
                    vertical_fit: strings(&["E-commerce", "Lifestyle"]),
                    traffic_estimate: "800K/mo".into(),
                    bio: "Consumer Tested Reviews & Best Budget is a hub for people to make smart choices in their online purchases. Thousands of readers visit us every day.".into(),
                    avatar_url: "https://i.pravatar.cc/150?u=p2".into(),
                    promo_methods: strings(&["Media buyer"]),
                    categories: strings(&[
                        "Patio, Lawn & Garden",
                        "Toys & Games",
                        "Health & Personal Care",
                        "Appliances",
                    ]),
                    promoted_countries: strings(&["US", "UK"]),
                    performance: generate_performance(&mut rng, may_first),
                    media_kits: Vec::new(),
                },
            ],
            threads: vec![
                Thread {
                    id: "t1".into(),
                    publisher_id: "p1".into(),
                    thread_token: "abc123xyz".into(),
                    status: ThreadStatus::WaitingReply,
                    last_message_at: timestamp("2024-05-20T14:30:00Z"),
                    subject: "Question about your affiliate program rates".into(),
                },
                Thread {
                    id: "t2".into(),
                    publisher_id: "p2".into(),
                    thread_token: "pqr456uvw".into(),
                    status: ThreadStatus::Open,
                    last_message_at: timestamp("2024-05-22T09:15:00Z"),
                    subject: "New partnership proposal - Xark".into(),
                },
            ],
            messages: vec![
                Message {
                    id: "m1".into(),
                    thread_id: "t1".into(),
                    direction: Direction::Outbound,
                    subject: "Question about your affiliate program rates".into(),
                    body_text: "Hi TechInsider team, we are interested in expanding our partnership. What are your current CPAs for tech verticals?".into(),
                    created_by_user_id: Some("user1".into()),
                    sent_at: timestamp("2024-05-20T14:00:00Z"),
                    sending_profile_id: None,
                },
                Message {
                    id: "m2".into(),
                    thread_id: "t1".into(),
                    direction: Direction::Inbound,
                    subject: "Re: Question about your affiliate program rates".into(),
                    body_text: "Hello! Thanks for reaching out. Our standard CPA is $50, but for high-volume partners like Xark, we can discuss $65.".into(),
                    created_by_user_id: None,
                    sent_at: timestamp("2024-05-20T14:30:00Z"),
                    sending_profile_id: None,
                },
                Message {
                    id: "m3".into(),
                    thread_id: "t2".into(),
                    direction: Direction::Outbound,
                    subject: "New partnership proposal - Xark".into(),
                    body_text: "Hey SavingsGuru, we have a new campaign launching next month and your audience fits perfectly.".into(),
                    created_by_user_id: Some("user1".into()),
                    sent_at: timestamp("2024-05-22T09:15:00Z"),
                    sending_profile_id: None,
                },
            ],
            templates: vec![
                template(
                    "tmp1",
                    "First time outreach",
                    "You are an outreach specialist at Xark. Your tone is professional and enthusiastic.",
                    "Write a warm introductory email to {{company}} proposing a new affiliate partnership. Mention we love their website {{website}}.",
                ),
                template(
                    "tmp2",
                    "Move forward",
                    "You are an outreach specialist. The tone is decisive and encouraging.",
                    "The publisher {{company}} has shown interest. Write an email to move forward with the partnership integration steps.",
                ),
                template(
                    "tmp3",
                    "Schedule meeting",
                    "You are an outreach specialist. Professional and efficient tone.",
                    "Ask {{company}} for their availability next week to discuss deeper strategic alignment.",
                ),
                template(
                    "tmp4",
                    "Next month media plan discussion",
                    "Strategic and collaborative tone.",
                    "Reach out to {{company}} to start planning the media placements and promotional calendar for next month.",
                ),
            ],
            sending_profiles: vec![
                SendingProfile {
                    id: "sp1".into(),
                    domain: "xark.io".into(),
                    provider: EmailProvider::Postmark,
                    status: ProfileStatus::Active,
                    current_daily_limit: 5000,
                    max_target_limit: 5000,
                    sent_today: 1240,
                    warmup_start_date: date(2023, 10, 1),
                    warmup_duration_days: 30,
                    reputation_score: 98,
                },
                SendingProfile {
                    id: "sp2".into(),
                    domain: "outreach.xark.net".into(),
                    provider: EmailProvider::Mailgun,
                    status: ProfileStatus::Warmup,
                    current_daily_limit: 50,
                    max_target_limit: 1000,
                    sent_today: 42,
                    warmup_start_date: date(2024, 5, 15),
                    warmup_duration_days: 14,
                    reputation_score: 85,
                },
            ],
            warmup_schedules: vec![
                WarmupSchedule {
                    id: "ws1".into(),
                    name: "Conservative Growth".into(),
                    steps: steps(&[
                        (1, 10),
                        (2, 25),
                        (3, 50),
                        (4, 75),
                        (5, 100),
                        (7, 250),
                        (10, 500),
                        (14, 1000),
                    ]),
                },
                WarmupSchedule {
                    id: "ws2".into(),
                    name: "Aggressive Expansion".into(),
                    steps: steps(&[(1, 50), (3, 200), (5, 500), (7, 1000)]),
                },
            ],
        }
    }
}

/// Thirty consecutive daily points starting at `start`.
pub fn generate_performance<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate) -> Vec<PerformancePoint> {
    (0..PERFORMANCE_DAYS)
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .map(|date| PerformancePoint {
            date,
            clicks: rng.gen_range(50..250),
            conversions: rng.gen_range(2..22),
            sales: rng.gen_range(500..2500),
            commission: rng.gen_range(50..250),
        })
        .collect()
}

fn template(id: &str, name: &str, system: &str, user: &str) -> Template {
    Template {
        id: id.into(),
        name: name.into(),
        prompt_system: system.into(),
        prompt_user: user.into(),
    }
}

fn steps(pairs: &[(u32, u32)]) -> Vec<WarmupStep> {
    pairs
        .iter()
        .map(|&(day, limit)| WarmupStep { day, limit })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_seed_is_referentially_consistent() {
        let seed = SeedData::demo();
        for thread in &seed.threads {
            assert!(seed.publishers.iter().any(|p| p.id == thread.publisher_id));
        }
        for message in &seed.messages {
            assert!(seed.threads.iter().any(|t| t.id == message.thread_id));
        }
        assert_eq!(seed.sending_profiles[0].id, "sp1");
        assert_eq!(seed.current_user.role, UserRole::Operator);
    }

    #[test]
    fn performance_covers_thirty_days() {
        let start = date(2024, 5, 1);
        let points = generate_performance(&mut rand::thread_rng(), start);
        assert_eq!(points.len(), 30);
        assert_eq!(points[0].date, start);
        assert_eq!(points[29].date, date(2024, 5, 30));
        assert!(points.iter().all(|p| (50..250).contains(&p.clicks)));
    }
}
