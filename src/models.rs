use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const WAITLIST_TABLE: &str = "waitlist_signups";
pub const PARTNERSHIP_TABLE: &str = "partnership_requests";
pub const SESSIONS_TABLE: &str = "analytics_sessions";
pub const EVENTS_TABLE: &str = "analytics_events";
pub const BUSINESSES_TABLE: &str = "businesses";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaitlistSignup {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WaitlistForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartnershipStatus {
    #[default]
    Pending,
    Contacted,
    Approved,
    Rejected,
}

impl PartnershipStatus {
    pub const ALL: [PartnershipStatus; 4] = [
        PartnershipStatus::Pending,
        PartnershipStatus::Contacted,
        PartnershipStatus::Approved,
        PartnershipStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartnershipStatus::Pending => "pending",
            PartnershipStatus::Contacted => "contacted",
            PartnershipStatus::Approved => "approved",
            PartnershipStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PartnershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnershipStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        PartnershipStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                format!("status must be one of pending, contacted, approved, rejected (got '{value}')")
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartnershipRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: PartnershipStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartnershipForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Row inserted for a new partnership inquiry; status always starts as pending.
#[derive(Debug, Serialize)]
pub struct NewPartnership<'a> {
    #[serde(flatten)]
    pub form: &'a PartnershipForm,
    pub status: PartnershipStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalyticsSession {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub landing_page: Option<String>,
    #[serde(default)]
    pub page_views: u32,
    /// Seconds spent on the site.
    #[serde(default)]
    pub time_on_site: u32,
    #[serde(default)]
    pub waitlist_opened: bool,
    #[serde(default)]
    pub waitlist_submitted: bool,
    #[serde(default)]
    pub partnership_opened: bool,
    #[serde(default)]
    pub partnership_submitted: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalyticsEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_category: Option<String>,
    #[serde(default)]
    pub event_value: Option<f64>,
    #[serde(default)]
    pub page_path: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Payload posted by the landing page tracker when a visit starts or ends.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackSession {
    pub session_id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub landing_page: Option<String>,
    #[serde(default)]
    pub page_views: Option<u32>,
    #[serde(default)]
    pub time_on_site: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackEvent {
    #[serde(default)]
    pub session_id: Option<String>,
    pub event_type: String,
    pub event_name: String,
    #[serde(default)]
    pub event_category: Option<String>,
    #[serde(default)]
    pub event_value: Option<f64>,
    #[serde(default)]
    pub page_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Funnel {
    pub opened: u64,
    pub submitted: u64,
    /// Percentage of opened forms that were submitted.
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub visitors: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_visitors: u64,
    pub unique_countries: u64,
    pub avg_page_views: f64,
    pub avg_time_on_site: f64,
    pub bounce_count: u64,
    pub bounce_rate: f64,
    pub waitlist_funnel: Funnel,
    pub partnership_funnel: Funnel,
    pub by_country: Vec<CountEntry>,
    pub by_device: Vec<CountEntry>,
    pub by_browser: Vec<CountEntry>,
    pub by_referrer: Vec<CountEntry>,
    pub total_events: u64,
    pub by_event_type: Vec<CountEntry>,
    pub top_pages: Vec<CountEntry>,
    pub daily_visitors: Vec<DailyPoint>,
}

#[derive(Debug, Serialize)]
pub struct PartnershipCounts {
    pub total: u64,
    pub pending: u64,
    pub contacted: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub range: String,
    pub waitlist_total: u64,
    pub partnerships: PartnershipCounts,
    pub analytics: AnalyticsSummary,
}
