use crate::analytics;
use crate::config::Config;
use crate::errors::AppError;
use crate::filters::DateRange;
use crate::models::{
    AnalyticsEvent, AnalyticsSession, DashboardSummary, PartnershipCounts, PartnershipRequest,
    PartnershipStatus, WaitlistSignup, EVENTS_TABLE, PARTNERSHIP_TABLE, SESSIONS_TABLE,
    WAITLIST_TABLE,
};
use crate::store::{Datastore, Query, StoreError};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use tracing::warn;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Rows backing one render of the dashboard.
#[derive(Debug, Default)]
pub struct DashboardData {
    pub range: DateRange,
    pub waitlist: Vec<WaitlistSignup>,
    pub partnerships: Vec<PartnershipRequest>,
    pub sessions: Vec<AnalyticsSession>,
    pub events: Vec<AnalyticsEvent>,
}

impl DashboardData {
    pub async fn load(store: &Datastore, range: DateRange, now: DateTime<Utc>) -> Result<Self, StoreError> {
        let query = range.apply(now, Query::new().newest_first());
        let (waitlist, partnerships, sessions, events) = tokio::try_join!(
            store.fetch::<WaitlistSignup>(WAITLIST_TABLE, &query),
            store.fetch::<PartnershipRequest>(PARTNERSHIP_TABLE, &query),
            store.fetch_or_empty::<AnalyticsSession>(SESSIONS_TABLE, &query),
            store.fetch_or_empty::<AnalyticsEvent>(EVENTS_TABLE, &query),
        )?;

        Ok(Self {
            range,
            waitlist,
            partnerships,
            sessions,
            events,
        })
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            range: self.range.as_str().to_string(),
            waitlist_total: self.waitlist.len() as u64,
            partnerships: partnership_counts(&self.partnerships),
            analytics: analytics::summarize(&self.sessions, &self.events),
        }
    }
}

pub fn partnership_counts(requests: &[PartnershipRequest]) -> PartnershipCounts {
    let count = |status: PartnershipStatus| requests.iter().filter(|r| r.status == status).count() as u64;
    PartnershipCounts {
        total: requests.len() as u64,
        pending: count(PartnershipStatus::Pending),
        contacted: count(PartnershipStatus::Contacted),
        approved: count(PartnershipStatus::Approved),
        rejected: count(PartnershipStatus::Rejected),
    }
}

/// Admin access is open when no token is configured.
pub fn authorize(config: &Config, headers: &HeaderMap, query_token: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = config.admin_token.as_deref() else {
        return Ok(());
    };

    let from_header = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    let from_bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let presented = [from_header, from_bearer, query_token];
    if presented.into_iter().flatten().any(|token| token.trim() == expected) {
        Ok(())
    } else {
        warn!("rejected admin request without a valid token");
        Err(AppError::unauthorized())
    }
}
