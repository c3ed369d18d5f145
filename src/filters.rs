use crate::models::{Business, PartnershipRequest, PartnershipStatus, WaitlistSignup};
use crate::store::Query;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    Today,
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    All,
}

impl DateRange {
    pub const ALL: [DateRange; 5] = [
        DateRange::Today,
        DateRange::Last7Days,
        DateRange::Last30Days,
        DateRange::Last90Days,
        DateRange::All,
    ];

    /// Unknown or missing values fall back to the last 30 days.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("today") => Self::Today,
            Some("7d") => Self::Last7Days,
            Some("30d") => Self::Last30Days,
            Some("90d") => Self::Last90Days,
            Some("all") => Self::All,
            _ => Self::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last90Days => "Last 90 days",
            Self::All => "All time",
        }
    }

    /// Lower bound of the range; `Today` starts at midnight UTC.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => now.date_naive().and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            Self::Last7Days => Some(now - Duration::days(7)),
            Self::Last30Days => Some(now - Duration::days(30)),
            Self::Last90Days => Some(now - Duration::days(90)),
            Self::All => None,
        }
    }

    /// Adds a `created_at >= since` filter when the range is bounded.
    pub fn apply(self, now: DateTime<Utc>, query: Query) -> Query {
        match self.since(now) {
            Some(since) => query.gte("created_at", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => query,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "search")]
    pub q: Option<String>,
}

impl BusinessFilter {
    pub fn matches(&self, business: &Business) -> bool {
        let category_ok = predicate(&self.category)
            .is_none_or(|category| business.category.trim().eq_ignore_ascii_case(category));
        let city_ok =
            predicate(&self.city).is_none_or(|city| business.city.trim().eq_ignore_ascii_case(city));
        let search_ok = predicate(&self.q).is_none_or(|term| {
            contains_ci(&business.name, term)
                || business.description.as_deref().is_some_and(|d| contains_ci(d, term))
        });
        category_ok && city_ok && search_ok
    }
}

/// Blank values and `all` mean "no restriction".
fn predicate(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn any_contains(fields: &[&str], term: &str) -> bool {
    fields.iter().any(|field| contains_ci(field, term))
}

pub fn filter_businesses<'a>(businesses: &'a [Business], filter: &BusinessFilter) -> Vec<&'a Business> {
    businesses.iter().filter(|b| filter.matches(b)).collect()
}

pub fn search_waitlist<'a>(signups: &'a [WaitlistSignup], query: Option<&str>) -> Vec<&'a WaitlistSignup> {
    let term = query.map(str::trim).filter(|t| !t.is_empty());
    signups
        .iter()
        .filter(|s| {
            term.is_none_or(|term| {
                any_contains(&[s.name.as_str(), s.email.as_str(), s.city.as_str(), s.service.as_str()], term)
            })
        })
        .collect()
}

pub fn search_partnerships<'a>(
    requests: &'a [PartnershipRequest],
    query: Option<&str>,
    status: Option<PartnershipStatus>,
) -> Vec<&'a PartnershipRequest> {
    let term = query.map(str::trim).filter(|t| !t.is_empty());
    requests
        .iter()
        .filter(|r| status.is_none_or(|status| r.status == status))
        .filter(|r| {
            term.is_none_or(|term| {
                let fields = [
                    r.name.as_str(),
                    r.email.as_str(),
                    r.business_name.as_str(),
                    r.business_type.as_str(),
                    r.city.as_str(),
                ];
                any_contains(&fields, term)
            })
        })
        .collect()
}

/// Sorted distinct non-blank values, used for the directory selectors.
pub fn distinct_values<'a, T>(items: &'a [T], field: impl Fn(&'a T) -> &'a str) -> Vec<String> {
    items
        .iter()
        .map(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn business(name: &str, category: &str, city: &str) -> Business {
        Business {
            id: name.to_lowercase(),
            name: name.to_string(),
            category: category.to_string(),
            city: city.to_string(),
            description: Some(format!("{category} in {city}")),
            rating: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn directory() -> Vec<Business> {
        vec![
            business("Glow Studio", "Salon", "Austin"),
            business("Fade Masters", "Barber", "Austin"),
            business("Zen Spa", "Spa", "Denver"),
            business("Curl Up", "Salon", "Denver"),
        ]
    }

    #[test]
    fn category_and_city_narrow_to_intersection() {
        let all = directory();
        let filter = BusinessFilter {
            category: Some("salon".into()),
            city: Some("Austin".into()),
            q: None,
        };
        let both: Vec<_> = filter_businesses(&all, &filter).iter().map(|b| b.id.clone()).collect();

        let by_category = BusinessFilter { category: Some("salon".into()), ..Default::default() };
        let by_city = BusinessFilter { city: Some("Austin".into()), ..Default::default() };
        let category_ids: BTreeSet<_> = filter_businesses(&all, &by_category).iter().map(|b| b.id.clone()).collect();
        let city_ids: BTreeSet<_> = filter_businesses(&all, &by_city).iter().map(|b| b.id.clone()).collect();
        let expected: Vec<_> = category_ids.intersection(&city_ids).cloned().collect();

        assert_eq!(both, expected);
        assert_eq!(both, vec!["glow studio"]);
    }

    #[test]
    fn all_and_blank_mean_unfiltered() {
        let all = directory();
        let filter = BusinessFilter {
            category: Some("all".into()),
            city: Some("  ".into()),
            q: None,
        };
        assert_eq!(filter_businesses(&all, &filter).len(), all.len());
    }

    #[test]
    fn search_matches_name_or_description() {
        let all = directory();
        let filter = BusinessFilter { q: Some("denver".into()), ..Default::default() };
        assert_eq!(filter_businesses(&all, &filter).len(), 2);
        let filter = BusinessFilter { q: Some("FADE".into()), ..Default::default() };
        assert_eq!(filter_businesses(&all, &filter)[0].name, "Fade Masters");
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let all = directory();
        assert_eq!(distinct_values(&all, |b| b.city.as_str()), vec!["Austin", "Denver"]);
        assert_eq!(distinct_values(&all, |b| b.category.as_str()), vec!["Barber", "Salon", "Spa"]);
    }

    #[test]
    fn date_range_parse_and_bounds() {
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 15, 0, 0).unwrap();
        assert_eq!(DateRange::parse(Some("7d")), DateRange::Last7Days);
        assert_eq!(DateRange::parse(Some("bogus")), DateRange::Last30Days);
        assert_eq!(DateRange::parse(None), DateRange::Last30Days);
        assert_eq!(
            DateRange::Today.since(now),
            Some(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(DateRange::All.since(now), None);

        let old = Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap();
        assert!(DateRange::Last7Days.since(now).is_some_and(|since| old < since));
        assert!(DateRange::Last30Days.since(now).is_some_and(|since| old >= since));
    }

    #[test]
    fn date_range_adds_lower_bound_filter() {
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 15, 0, 0).unwrap();
        let params = DateRange::Last7Days.apply(now, Query::new()).to_params();
        assert_eq!(params, vec![("created_at".to_string(), "gte.2026-01-24T15:00:00Z".to_string())]);
        assert!(DateRange::All.apply(now, Query::new()).filters.is_empty());
    }

    #[test]
    fn partnership_search_combines_status_and_text() {
        let request = |name: &str, status: PartnershipStatus| PartnershipRequest {
            id: name.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            business_name: format!("{name} Co"),
            business_type: "Salon".into(),
            city: "Austin".into(),
            website: None,
            message: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let all = vec![
            request("Alpha", PartnershipStatus::Pending),
            request("Beta", PartnershipStatus::Approved),
            request("Alpine", PartnershipStatus::Approved),
        ];
        let hits = search_partnerships(&all, Some("alp"), Some(PartnershipStatus::Approved));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alpine");
        assert_eq!(search_partnerships(&all, None, None).len(), 3);
    }

    #[test]
    fn waitlist_search_is_case_insensitive() {
        let signup = WaitlistSignup {
            id: "1".into(),
            name: "Maria Lopez".into(),
            email: "maria@example.com".into(),
            city: "Miami".into(),
            service: "Nails".into(),
            comments: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let list = vec![signup];
        assert_eq!(search_waitlist(&list, Some("NAILS")).len(), 1);
        assert_eq!(search_waitlist(&list, Some("boston")).len(), 0);
        assert_eq!(search_waitlist(&list, Some("")).len(), 1);
    }
}
