use super::{escape, fill, format_duration, format_percent, page};
use crate::admin::DashboardData;
use crate::filters::{search_partnerships, search_waitlist, DateRange};
use crate::forms::is_http_url;
use crate::models::{CountEntry, DashboardSummary, Funnel, PartnershipStatus};
use chrono::SecondsFormat;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Overview,
    Waitlist,
    Partnerships,
    Analytics,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Overview,
        AdminTab::Waitlist,
        AdminTab::Partnerships,
        AdminTab::Analytics,
    ];

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("waitlist") => Self::Waitlist,
            Some("partnerships") => Self::Partnerships,
            Some("analytics") => Self::Analytics,
            _ => Self::Overview,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Waitlist => "waitlist",
            Self::Partnerships => "partnerships",
            Self::Analytics => "analytics",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Waitlist => "Waitlist",
            Self::Partnerships => "Partnerships",
            Self::Analytics => "Analytics",
        }
    }
}

#[derive(Debug, Default)]
pub struct AdminView {
    pub site_name: String,
    pub tab: AdminTab,
    pub range: DateRange,
    pub q: Option<String>,
    pub status: Option<PartnershipStatus>,
    /// Carried on links when the token came from the query string.
    pub token: Option<String>,
}

impl AdminView {
    /// Dashboard URL with this view's filters, overriding tab and range.
    pub fn url(&self, tab: AdminTab, range: DateRange) -> String {
        let mut url = format!("/admin?tab={}&range={}", tab.as_str(), range.as_str());
        if tab == self.tab {
            if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
                let _ = write!(url, "&q={}", urlencoding::encode(q));
            }
            if let Some(status) = self.status {
                let _ = write!(url, "&status={status}");
            }
        }
        self.push_token(&mut url);
        url
    }

    pub fn current_url(&self) -> String {
        self.url(self.tab, self.range)
    }

    fn export_url(&self, kind: &str) -> String {
        let mut url = format!("/admin/export/{kind}?range={}", self.range.as_str());
        self.push_token(&mut url);
        url
    }

    fn push_token(&self, url: &mut String) {
        if let Some(token) = &self.token {
            let _ = write!(url, "&token={}", urlencoding::encode(token));
        }
    }

    fn hidden_fields(&self) -> String {
        let mut out = format!(
            r#"<input type="hidden" name="tab" value="{}" /><input type="hidden" name="range" value="{}" />"#,
            self.tab.as_str(),
            self.range.as_str()
        );
        if let Some(token) = &self.token {
            let _ = write!(out, r#"<input type="hidden" name="token" value="{}" />"#, escape(token));
        }
        out
    }
}

pub fn render_admin(view: &AdminView, data: &DashboardData, summary: &DashboardSummary) -> String {
    let content = match view.tab {
        AdminTab::Overview => render_overview(summary),
        AdminTab::Waitlist => render_waitlist(view, data),
        AdminTab::Partnerships => render_partnerships(view, data),
        AdminTab::Analytics => render_analytics(summary),
    };

    let body = fill(
        ADMIN_HTML,
        &[
            ("SITE", escape(&view.site_name).as_str()),
            ("RANGES", render_ranges(view).as_str()),
            ("TABS", render_tabs(view).as_str()),
            ("EXPORTS", render_exports(view).as_str()),
            ("CONTENT", content.as_str()),
        ],
    );
    page(&format!("{} admin", view.site_name), ADMIN_CSS, &body)
}

/// Generic failure page with a retry link back to the same view.
pub fn render_admin_error(view: &AdminView, message: &str) -> String {
    let content = format!(
        r#"<div class="card failure"><p class="notice error" role="alert">{}</p><a class="btn" href="{}">Retry</a></div>"#,
        escape(message),
        escape(&view.current_url()),
    );
    let body = fill(
        ADMIN_HTML,
        &[
            ("SITE", escape(&view.site_name).as_str()),
            ("RANGES", render_ranges(view).as_str()),
            ("TABS", render_tabs(view).as_str()),
            ("EXPORTS", ""),
            ("CONTENT", content.as_str()),
        ],
    );
    page(&format!("{} admin", view.site_name), ADMIN_CSS, &body)
}

fn render_ranges(view: &AdminView) -> String {
    let mut out = String::new();
    for range in DateRange::ALL {
        let _ = write!(
            out,
            r#"<a class="pill{}" href="{}">{}</a>"#,
            if range == view.range { " active" } else { "" },
            escape(&view.url(view.tab, range)),
            range.label()
        );
    }
    out
}

fn render_tabs(view: &AdminView) -> String {
    let mut out = String::new();
    for tab in AdminTab::ALL {
        let _ = write!(
            out,
            r#"<a class="tab{}" href="{}">{}</a>"#,
            if tab == view.tab { " active" } else { "" },
            escape(&view.url(tab, view.range)),
            tab.label()
        );
    }
    out
}

fn render_exports(view: &AdminView) -> String {
    let mut out = String::from("<span>Export CSV:</span>");
    for kind in ["waitlist", "partnerships", "sessions", "events"] {
        let _ = write!(
            out,
            r#"<a class="btn small secondary" href="{}">{kind}</a>"#,
            escape(&view.export_url(kind))
        );
    }
    out
}

fn stat(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><span class="label">{}</span><span class="value">{}</span></div>"#,
        escape(label),
        escape(value)
    )
}

fn funnel_text(funnel: &Funnel) -> String {
    format!("{} ({} of {})", format_percent(funnel.rate), funnel.submitted, funnel.opened)
}

fn render_overview(summary: &DashboardSummary) -> String {
    let a = &summary.analytics;
    let p = &summary.partnerships;
    let stats = [
        stat("Waitlist signups", &summary.waitlist_total.to_string()),
        stat("Partnership requests", &p.total.to_string()),
        stat("Pending partners", &p.pending.to_string()),
        stat("Visitors", &a.total_visitors.to_string()),
        stat("Countries", &a.unique_countries.to_string()),
        stat("Bounce rate", &format_percent(a.bounce_rate)),
        stat("Waitlist conversion", &funnel_text(&a.waitlist_funnel)),
        stat("Partner conversion", &funnel_text(&a.partnership_funnel)),
    ];

    let peak = a.daily_visitors.iter().map(|d| d.visitors).max().unwrap_or(0).max(1);
    let mut bars = String::new();
    for day in &a.daily_visitors {
        let height = day.visitors * 100 / peak;
        let _ = write!(
            bars,
            r#"<div class="bar" title="{date}: {count}"><span style="height: {height}%"></span><small>{label}</small></div>"#,
            date = day.date,
            count = day.visitors,
            label = day.date.get(5..).unwrap_or(&day.date),
        );
    }

    format!(
        r#"<div class="stats">{}</div><div class="card"><h2>Daily visitors</h2><div class="bars">{bars}</div></div>"#,
        stats.concat()
    )
}

fn search_form(view: &AdminView, placeholder: &str, extra: &str) -> String {
    format!(
        r#"<form class="toolbar" method="get" action="/admin">{hidden}<input type="search" name="q" placeholder="{placeholder}" value="{q}" />{extra}<button class="btn small" type="submit">Search</button></form>"#,
        hidden = view.hidden_fields(),
        placeholder = escape(placeholder),
        q = escape(view.q.as_deref().unwrap_or_default()),
    )
}

fn empty_row(cols: usize, text: &str) -> String {
    format!(r#"<tr><td colspan="{cols}" class="empty">{}</td></tr>"#, escape(text))
}

fn render_waitlist(view: &AdminView, data: &DashboardData) -> String {
    let rows = search_waitlist(&data.waitlist, view.q.as_deref());
    let mut out = search_form(view, "Search name, email, city, service", "");
    let _ = write!(
        out,
        r#"<p class="count">{} of {} signups</p><table><thead><tr><th>Name</th><th>Email</th><th>City</th><th>Service</th><th>Comments</th><th>Signed up</th></tr></thead><tbody>"#,
        rows.len(),
        data.waitlist.len()
    );
    if rows.is_empty() {
        out.push_str(&empty_row(6, "No signups match."));
    }
    for s in rows {
        let _ = write!(
            out,
            "<tr><td>{}</td><td><a href=\"mailto:{email}\">{email}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&s.name),
            escape(&s.city),
            escape(&s.service),
            escape(s.comments.as_deref().unwrap_or_default()),
            s.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            email = escape(&s.email),
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn status_options(selected: Option<PartnershipStatus>, include_all: bool) -> String {
    let mut out = String::new();
    if include_all {
        out.push_str(r#"<option value="">All statuses</option>"#);
    }
    for status in PartnershipStatus::ALL {
        let _ = write!(
            out,
            r#"<option value="{status}"{}>{status}</option>"#,
            if selected == Some(status) { " selected" } else { "" }
        );
    }
    out
}

fn render_partnerships(view: &AdminView, data: &DashboardData) -> String {
    let rows = search_partnerships(&data.partnerships, view.q.as_deref(), view.status);
    let status_filter = format!(r#"<select name="status">{}</select>"#, status_options(view.status, true));
    let mut out = search_form(view, "Search name, email, business, city", &status_filter);
    let _ = write!(
        out,
        r#"<p class="count">{} of {} requests</p><table><thead><tr><th>Contact</th><th>Business</th><th>City</th><th>Message</th><th>Submitted</th><th>Status</th></tr></thead><tbody>"#,
        rows.len(),
        data.partnerships.len()
    );
    if rows.is_empty() {
        out.push_str(&empty_row(6, "No partnership requests match."));
    }
    for r in rows {
        let website = r
            .website
            .as_deref()
            .map(|w| {
                if is_http_url(w) {
                    format!(r#"<br /><a href="{0}" rel="noopener noreferrer">{0}</a>"#, escape(w))
                } else {
                    format!("<br /><small>{}</small>", escape(w))
                }
            })
            .unwrap_or_default();
        let phone = r
            .phone
            .as_deref()
            .map(|p| format!("<br />{}", escape(p)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<tr><td>{name}<br /><a href="mailto:{email}">{email}</a>{phone}</td><td>{business}<br /><small>{kind}</small>{website}</td><td>{city}</td><td>{message}</td><td>{created}</td><td><form method="post" action="/admin/partnerships/{id}/status">{hidden}<select name="status" class="status-{current}">{options}</select><button class="btn small" type="submit">Save</button></form></td></tr>"#,
            name = escape(&r.name),
            email = escape(&r.email),
            business = escape(&r.business_name),
            kind = escape(&r.business_type),
            city = escape(&r.city),
            message = escape(r.message.as_deref().unwrap_or_default()),
            created = r.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            id = urlencoding::encode(&r.id),
            hidden = view.hidden_fields(),
            current = r.status,
            options = status_options(Some(r.status), false),
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn breakdown(title: &str, entries: &[CountEntry], total: u64) -> String {
    let mut out = format!(r#"<div class="card"><h3>{}</h3><table><tbody>"#, escape(title));
    if entries.is_empty() {
        out.push_str(&empty_row(3, "No data yet."));
    }
    for entry in entries {
        let share = if total == 0 { 0.0 } else { entry.count as f64 * 100.0 / total as f64 };
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&entry.label),
            entry.count,
            format_percent(share)
        );
    }
    out.push_str("</tbody></table></div>");
    out
}

fn render_analytics(summary: &DashboardSummary) -> String {
    let a = &summary.analytics;
    let stats = [
        stat("Visitors", &a.total_visitors.to_string()),
        stat("Avg. pages / visit", &format!("{:.1}", a.avg_page_views)),
        stat("Avg. time on site", &format_duration(a.avg_time_on_site)),
        stat("Bounces", &format!("{} ({})", a.bounce_count, format_percent(a.bounce_rate))),
        stat("Events", &a.total_events.to_string()),
        stat("Waitlist funnel", &funnel_text(&a.waitlist_funnel)),
        stat("Partner funnel", &funnel_text(&a.partnership_funnel)),
    ];
    let grids = [
        breakdown("Countries", &a.by_country, a.total_visitors),
        breakdown("Devices", &a.by_device, a.total_visitors),
        breakdown("Browsers", &a.by_browser, a.total_visitors),
        breakdown("Referrers", &a.by_referrer, a.total_visitors),
        breakdown("Event types", &a.by_event_type, a.total_events),
        breakdown("Top pages", &a.top_pages, a.total_events),
    ];
    format!(
        r#"<div class="stats">{}</div><div class="grid">{}</div>"#,
        stats.concat(),
        grids.concat()
    )
}

const ADMIN_CSS: &str = r#"
    .admin {
      padding: 28px 0 48px;
      display: grid;
      gap: 22px;
    }

    .admin-head, .toolbar, .exports, .tabs, .ranges {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .admin-head {
      justify-content: space-between;
    }

    .tab, .pill {
      padding: 8px 14px;
      border-radius: 999px;
      text-decoration: none;
      font-weight: 600;
      color: var(--muted);
    }

    .tab.active, .pill.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(35, 61, 77, 0.12);
    }

    .stats, .grid {
      display: grid;
      gap: 16px;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
    }

    .grid {
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .bars {
      display: flex;
      align-items: end;
      gap: 6px;
      height: 180px;
      margin-top: 16px;
    }

    .bar {
      flex: 1;
      height: 100%;
      display: flex;
      flex-direction: column;
      justify-content: end;
      align-items: center;
      gap: 4px;
    }

    .bar span {
      width: 100%;
      min-height: 2px;
      background: var(--accent);
      border-radius: 6px 6px 0 0;
    }

    .bar small, .count, .empty {
      color: var(--muted);
    }

    .status-pending { border-color: #d9a400; }
    .status-contacted { border-color: #3b7dd8; }
    .status-approved { border-color: var(--accent); }
    .status-rejected { border-color: var(--warn); }

    .failure {
      display: grid;
      gap: 16px;
      justify-items: start;
    }
"#;

const ADMIN_HTML: &str = r#"<main class="admin wrap">
  <div class="admin-head">
    <h1>{{SITE}} admin</h1>
    <nav class="ranges">{{RANGES}}</nav>
  </div>
  <nav class="tabs">{{TABS}}</nav>
  <div class="exports">{{EXPORTS}}</div>
  {{CONTENT}}
</main>
"#;
