use crate::models::{
    AnalyticsEvent, AnalyticsSession, AnalyticsSummary, CountEntry, DailyPoint, Funnel,
};
use chrono::{Duration, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};

pub const TOP_N: usize = 10;
pub const DAILY_WINDOW: usize = 14;

pub fn summarize(sessions: &[AnalyticsSession], events: &[AnalyticsEvent]) -> AnalyticsSummary {
    summarize_at(Utc::now().date_naive(), sessions, events, TOP_N)
}

pub fn summarize_at(
    today: NaiveDate,
    sessions: &[AnalyticsSession],
    events: &[AnalyticsEvent],
    top_n: usize,
) -> AnalyticsSummary {
    let total = sessions.len() as u64;

    let mut page_views = 0u64;
    let mut time_on_site = 0u64;
    let mut bounce_count = 0u64;
    let mut waitlist = (0u64, 0u64);
    let mut partnership = (0u64, 0u64);
    let mut countries = BTreeSet::new();

    for session in sessions {
        page_views += u64::from(session.page_views);
        time_on_site += u64::from(session.time_on_site);
        if session.page_views <= 1 {
            bounce_count += 1;
        }
        if session.waitlist_opened {
            waitlist.0 += 1;
        }
        if session.waitlist_submitted {
            waitlist.1 += 1;
        }
        if session.partnership_opened {
            partnership.0 += 1;
        }
        if session.partnership_submitted {
            partnership.1 += 1;
        }
        if let Some(country) = non_empty(session.country.as_deref()) {
            countries.insert(country.to_string());
        }
    }

    let top = |counts: Vec<CountEntry>| {
        let mut counts = counts;
        counts.truncate(top_n);
        counts
    };

    AnalyticsSummary {
        total_visitors: total,
        unique_countries: countries.len() as u64,
        avg_page_views: average(page_views, total),
        avg_time_on_site: average(time_on_site, total),
        bounce_count,
        bounce_rate: ratio(bounce_count, total),
        waitlist_funnel: funnel(waitlist.0, waitlist.1),
        partnership_funnel: funnel(partnership.0, partnership.1),
        by_country: top(count_by(sessions, |s| s.country.as_deref())),
        by_device: top(count_by(sessions, |s| s.device_type.as_deref())),
        by_browser: top(count_by(sessions, |s| s.browser.as_deref())),
        by_referrer: top(count_by(sessions, |s| s.referrer.as_deref())),
        total_events: events.len() as u64,
        by_event_type: top(count_by(events, |e| Some(e.event_type.as_str()))),
        top_pages: top(count_by(events, |e| e.page_path.as_deref())),
        daily_visitors: daily_visitors(today, sessions, DAILY_WINDOW),
    }
}

/// Groups items by a text field, skipping blanks. Sorted by count, then label.
pub fn count_by<T>(items: &[T], field: impl Fn(&T) -> Option<&str>) -> Vec<CountEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for item in items {
        if let Some(value) = non_empty(field(item)) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

/// Percentage of `numerator` over `denominator`; 0 when the denominator is 0.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 * 100.0 / denominator as f64
}

pub fn funnel(opened: u64, submitted: u64) -> Funnel {
    Funnel {
        opened,
        submitted,
        rate: ratio(submitted, opened),
    }
}

fn average(sum: u64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Sessions per calendar day (UTC) for the `days` days ending at `today`.
pub fn daily_visitors(today: NaiveDate, sessions: &[AnalyticsSession], days: usize) -> Vec<DailyPoint> {
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for session in sessions {
        *per_day.entry(session.created_at.date_naive()).or_default() += 1;
    }

    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            DailyPoint {
                date: date.to_string(),
                visitors: per_day.get(&date).copied().unwrap_or_default(),
            }
        })
        .collect()
}
