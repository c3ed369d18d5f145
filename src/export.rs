//! CSV rendering for the admin export links.

use crate::models::{AnalyticsEvent, AnalyticsSession, PartnershipRequest, WaitlistSignup};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Waitlist,
    Partnerships,
    Sessions,
    Events,
}

impl ExportKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim_end_matches(".csv") {
            "waitlist" => Some(Self::Waitlist),
            "partnerships" => Some(Self::Partnerships),
            "sessions" => Some(Self::Sessions),
            "events" => Some(Self::Events),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waitlist => "waitlist",
            Self::Partnerships => "partnerships",
            Self::Sessions => "sessions",
            Self::Events => "events",
        }
    }

    pub fn filename(self, date: NaiveDate) -> String {
        format!("{}-{}.csv", self.as_str(), date.format("%Y-%m-%d"))
    }
}

/// Quotes every cell and doubles embedded quotes.
pub fn to_csv<R, C>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<C>>,
    C: AsRef<str>,
{
    let mut out = String::new();
    push_line(&mut out, headers.iter().copied());
    for row in rows {
        push_line(&mut out, row.iter().map(AsRef::as_ref));
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
    }
    out.push('\n');
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flag(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

pub fn waitlist_csv(signups: &[WaitlistSignup]) -> String {
    to_csv(
        &["Name", "Email", "City", "Service", "Comments", "Signed Up"],
        signups.iter().map(|s| {
            vec![
                s.name.clone(),
                s.email.clone(),
                s.city.clone(),
                s.service.clone(),
                opt(&s.comments),
                timestamp(&s.created_at),
            ]
        }),
    )
}

pub fn partnerships_csv(requests: &[PartnershipRequest]) -> String {
    to_csv(
        &[
            "Name", "Email", "Phone", "Business", "Type", "City", "Website", "Message", "Status",
            "Submitted",
        ],
        requests.iter().map(|r| {
            vec![
                r.name.clone(),
                r.email.clone(),
                opt(&r.phone),
                r.business_name.clone(),
                r.business_type.clone(),
                r.city.clone(),
                opt(&r.website),
                opt(&r.message),
                r.status.to_string(),
                timestamp(&r.created_at),
            ]
        }),
    )
}

pub fn sessions_csv(sessions: &[AnalyticsSession]) -> String {
    to_csv(
        &[
            "Session", "Country", "City", "Device", "Browser", "Referrer", "Page Views",
            "Time On Site", "Waitlist Opened", "Waitlist Submitted", "Partnership Opened",
            "Partnership Submitted", "Started",
        ],
        sessions.iter().map(|s| {
            vec![
                s.session_id.clone(),
                opt(&s.country),
                opt(&s.city),
                opt(&s.device_type),
                opt(&s.browser),
                opt(&s.referrer),
                s.page_views.to_string(),
                s.time_on_site.to_string(),
                flag(s.waitlist_opened),
                flag(s.waitlist_submitted),
                flag(s.partnership_opened),
                flag(s.partnership_submitted),
                timestamp(&s.created_at),
            ]
        }),
    )
}

pub fn events_csv(events: &[AnalyticsEvent]) -> String {
    to_csv(
        &["Session", "Type", "Name", "Category", "Value", "Page", "Time"],
        events.iter().map(|e| {
            vec![
                opt(&e.session_id),
                e.event_type.clone(),
                e.event_name.clone(),
                opt(&e.event_category),
                e.event_value.map(|v| v.to_string()).unwrap_or_default(),
                opt(&e.page_path),
                timestamp(&e.created_at),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn cells_with_commas_and_quotes_round_trip() {
        let rows = vec![
            vec!["Smith, Jane", "said \"hi\"", "plain"],
            vec!["", "multi\nline", "\"\""],
        ];
        let text = to_csv(&["a", "b", "c"], rows.clone());
        let parsed = parse(&text);

        assert_eq!(parsed[0], vec!["a", "b", "c"]);
        for (expected, actual) in rows.iter().zip(&parsed[1..]) {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn every_cell_is_quoted_with_one_header_row() {
        let text = to_csv(&["Name", "Email"], vec![vec!["Ana", "ana@example.com"]]);
        assert_eq!(text, "\"Name\",\"Email\"\n\"Ana\",\"ana@example.com\"\n");
        assert_eq!(to_csv::<Vec<Vec<&str>>, &str>(&["Only"], vec![]), "\"Only\"\n");
    }

    #[test]
    fn waitlist_export_has_a_line_per_signup() {
        let signup = WaitlistSignup {
            id: "1".into(),
            name: "O'Neil, Pat".into(),
            email: "pat@example.com".into(),
            city: "Austin".into(),
            service: "Hair \"salon\"".into(),
            comments: None,
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap(),
        };
        let parsed = parse(&waitlist_csv(&[signup.clone(), signup]));
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1][0], "O'Neil, Pat");
        assert_eq!(parsed[1][3], "Hair \"salon\"");
        assert_eq!(parsed[1][5], "2026-02-01T08:30:00Z");
    }

    #[test]
    fn export_kind_parses_with_or_without_suffix() {
        assert_eq!(ExportKind::parse("waitlist.csv"), Some(ExportKind::Waitlist));
        assert_eq!(ExportKind::parse("events"), Some(ExportKind::Events));
        assert_eq!(ExportKind::parse("users"), None);
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(ExportKind::Partnerships.filename(date), "partnerships-2026-03-09.csv");
    }
}
