use super::{escape, fill, page};
use crate::content::{self, Plan};
use crate::filters::BusinessFilter;
use crate::forms::FieldError;
use crate::models::{Business, PartnershipForm, WaitlistForm};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    WaitlistJoined,
    PartnershipReceived,
    Failed(String),
}

impl Notice {
    /// Reads the `joined=` marker set by the form redirects.
    pub fn from_joined(value: Option<&str>) -> Option<Self> {
        match value {
            Some("waitlist") => Some(Self::WaitlistJoined),
            Some("partnership") => Some(Self::PartnershipReceived),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LandingView {
    pub site_name: String,
    pub notice: Option<Notice>,
    pub waitlist: WaitlistForm,
    pub waitlist_errors: Vec<FieldError>,
    pub partnership: PartnershipForm,
    pub partnership_errors: Vec<FieldError>,
    /// `None` when the directory could not be loaded.
    pub directory: Option<Vec<Business>>,
    pub filter: BusinessFilter,
    pub categories: Vec<String>,
    pub cities: Vec<String>,
}

pub fn render_landing(view: &LandingView) -> String {
    let site = escape(&view.site_name);
    let year = chrono::Utc::now().format("%Y").to_string();
    let body = fill(
        LANDING_HTML,
        &[
            ("SITE", site.as_str()),
            ("YEAR", year.as_str()),
            ("TAGLINE", escape(content::TAGLINE).as_str()),
            ("HERO_SUBTITLE", escape(content::HERO_SUBTITLE).as_str()),
            ("NOTICE", render_notice(view.notice.as_ref()).as_str()),
            ("PROBLEMS", render_problems().as_str()),
            ("STATS", render_stats().as_str()),
            ("COMPARISON", render_comparison(&site).as_str()),
            ("PRICING", render_pricing().as_str()),
            ("DIRECTORY", render_directory(view).as_str()),
            ("WAITLIST_FORM", render_waitlist_form(&view.waitlist, &view.waitlist_errors).as_str()),
            ("PARTNERSHIP_FORM", render_partnership_form(&view.partnership, &view.partnership_errors).as_str()),
        ],
    );

    page(&format!("{} | {}", view.site_name, content::TAGLINE), LANDING_CSS, &body)
}

fn render_notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::WaitlistJoined) => {
            r#"<div class="notice ok" role="status">You're on the list! We'll email you as soon as early access opens.</div>"#
                .to_string()
        }
        Some(Notice::PartnershipReceived) => {
            r#"<div class="notice ok" role="status">Thanks! Our partnerships team will reach out within two business days.</div>"#
                .to_string()
        }
        Some(Notice::Failed(message)) => {
            format!(r#"<div class="notice error" role="alert">{}</div>"#, escape(message))
        }
        None => String::new(),
    }
}

fn render_problems() -> String {
    let mut out = String::new();
    for item in content::PROBLEMS {
        let _ = write!(
            out,
            r#"<div class="pair"><p class="problem">{}</p><p class="solution">{}</p></div>"#,
            escape(item.problem),
            escape(item.solution)
        );
    }
    out
}

fn render_stats() -> String {
    let mut out = String::new();
    for stat in content::STATS {
        let _ = write!(
            out,
            r#"<div class="stat"><span class="value">{}</span><span class="label">{}</span></div>"#,
            escape(stat.value),
            escape(stat.label)
        );
    }
    out
}

fn mark(yes: bool) -> &'static str {
    if yes {
        r#"<span class="yes" aria-label="yes">&#10003;</span>"#
    } else {
        r#"<span class="no" aria-label="no">&#8212;</span>"#
    }
}

fn render_comparison(site: &str) -> String {
    let mut out = format!(
        "<table><thead><tr><th>Feature</th><th>{site}</th><th>Marketplaces</th><th>Spreadsheets</th></tr></thead><tbody>"
    );
    for row in content::COMPARISON {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(row.feature),
            mark(row.ours),
            mark(row.marketplace),
            mark(row.spreadsheet)
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn render_plan(plan: &Plan) -> String {
    let mut features = String::new();
    for feature in plan.features {
        let _ = write!(features, "<li>{}</li>", escape(feature));
    }
    format!(
        r##"<div class="plan card{highlight}">
          <h3>{name}</h3>
          <p class="price"><strong>{price}</strong> <span>{period}</span></p>
          <p class="plan-summary">{summary}</p>
          <ul>{features}</ul>
          <a class="btn{secondary}" href="#waitlist" data-track="pricing_{slug}">{cta}</a>
        </div>"##,
        highlight = if plan.highlight { " highlight" } else { "" },
        secondary = if plan.highlight { "" } else { " secondary" },
        name = escape(plan.name),
        price = escape(plan.price),
        period = escape(plan.period),
        summary = escape(plan.summary),
        slug = plan.name.to_lowercase(),
        cta = escape(plan.cta),
    )
}

fn render_pricing() -> String {
    content::PLANS.iter().map(render_plan).collect()
}

fn field_error(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| format!(r#"<span class="field-error">{}</span>"#, escape(&e.message)))
        .unwrap_or_default()
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, required: bool, errors: &[FieldError]) -> String {
    format!(
        r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"{required} />{error}</label>"#,
        label = escape(label),
        value = escape(value),
        required = if required { " required" } else { "" },
        error = field_error(errors, name),
    )
}

fn select_input(name: &str, label: &str, options: &[&str], selected: &str, errors: &[FieldError]) -> String {
    let mut opts = String::from(r#"<option value="">Choose one</option>"#);
    for option in options {
        let _ = write!(
            opts,
            r#"<option value="{value}"{sel}>{value}</option>"#,
            value = escape(option),
            sel = if *option == selected { " selected" } else { "" }
        );
    }
    format!(
        r#"<label>{label}<select name="{name}" required>{opts}</select>{error}</label>"#,
        label = escape(label),
        error = field_error(errors, name),
    )
}

fn textarea(name: &str, label: &str, value: Option<&str>) -> String {
    format!(
        r#"<label>{label}<textarea name="{name}" rows="3">{value}</textarea></label>"#,
        label = escape(label),
        value = escape(value.unwrap_or_default()),
    )
}

fn render_waitlist_form(form: &WaitlistForm, errors: &[FieldError]) -> String {
    let fields = [
        text_input("name", "Full name", "text", &form.name, true, errors),
        text_input("email", "Email", "email", &form.email, true, errors),
        text_input("city", "City", "text", &form.city, true, errors),
        select_input("service", "Your business", content::SERVICES, &form.service, errors),
        textarea("comments", "Anything we should know?", form.comments.as_deref()),
    ];
    format!(
        r#"<form class="form-grid" method="post" action="/waitlist" data-form="waitlist">{}<button class="btn" type="submit">Join the waitlist</button></form>"#,
        fields.concat()
    )
}

fn render_partnership_form(form: &PartnershipForm, errors: &[FieldError]) -> String {
    let fields = [
        text_input("name", "Your name", "text", &form.name, true, errors),
        text_input("email", "Work email", "email", &form.email, true, errors),
        text_input("phone", "Phone", "tel", form.phone.as_deref().unwrap_or_default(), false, errors),
        text_input("business_name", "Business name", "text", &form.business_name, true, errors),
        select_input("business_type", "Business type", content::BUSINESS_TYPES, &form.business_type, errors),
        text_input("city", "City", "text", &form.city, true, errors),
        text_input("website", "Website", "url", form.website.as_deref().unwrap_or_default(), false, errors),
        textarea("message", "Tell us about your business", form.message.as_deref()),
    ];
    format!(
        r#"<form class="form-grid" method="post" action="/partnership" data-form="partnership">{}<button class="btn" type="submit">Request partnership</button></form>"#,
        fields.concat()
    )
}

fn filter_select(name: &str, label: &str, values: &[String], selected: Option<&str>) -> String {
    let mut opts = format!(r#"<option value="all">All {}</option>"#, escape(&label.to_lowercase()));
    for value in values {
        let is_selected = selected.is_some_and(|s| s.eq_ignore_ascii_case(value));
        let _ = write!(
            opts,
            r#"<option value="{v}"{sel}>{v}</option>"#,
            v = escape(value),
            sel = if is_selected { " selected" } else { "" }
        );
    }
    format!(r#"<label>{label}<select name="{name}">{opts}</select></label>"#)
}

fn render_directory(view: &LandingView) -> String {
    let Some(businesses) = &view.directory else {
        return r#"<p class="empty">The partner directory is unavailable right now. <a href="/#directory">Try again</a>.</p>"#
            .to_string();
    };

    let mut out = format!(
        r#"<form class="filters" method="get" action="/#directory">{}{}<label>Search<input type="search" name="q" value="{}" /></label><button class="btn small" type="submit">Filter</button></form>"#,
        filter_select("category", "Category", &view.categories, view.filter.category.as_deref()),
        filter_select("city", "City", &view.cities, view.filter.city.as_deref()),
        escape(view.filter.q.as_deref().unwrap_or_default()),
    );

    if businesses.is_empty() {
        out.push_str(r#"<p class="empty">No partners match those filters yet.</p>"#);
        return out;
    }

    out.push_str(r#"<div class="directory-grid">"#);
    for business in businesses {
        let rating = business
            .rating
            .map(|r| format!(r#"<span class="rating">&#9733; {r:.1}</span>"#))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<div class="business"><h3>{}</h3><p class="meta">{} &middot; {} {}</p><p>{}</p></div>"#,
            escape(&business.name),
            escape(&business.category),
            escape(&business.city),
            rating,
            escape(business.description.as_deref().unwrap_or_default()),
        );
    }
    out.push_str("</div>");
    out
}

const LANDING_CSS: &str = r#"
    header.site {
      padding: 22px 0;
    }

    header.site .wrap, footer .wrap {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    header.site nav a {
      margin-left: 18px;
      text-decoration: none;
      font-weight: 500;
    }

    .brand {
      font-family: "Fraunces", "Georgia", serif;
      font-size: 1.5rem;
      text-decoration: none;
      color: var(--ink);
    }

    section {
      padding: 56px 0;
    }

    .hero h1 {
      font-size: clamp(2.4rem, 5vw, 3.8rem);
      max-width: 14ch;
    }

    .hero p {
      font-size: 1.15rem;
      color: var(--muted);
      max-width: 56ch;
    }

    .hero .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      margin-top: 24px;
    }

    .pairs, .stats, .plans, .directory-grid {
      display: grid;
      gap: 18px;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      margin-top: 24px;
    }

    .pair .problem {
      color: var(--warn);
      font-weight: 500;
    }

    .pair .solution {
      color: #1c6b55;
    }

    .stat {
      display: grid;
      gap: 6px;
      padding: 20px;
      background: white;
      border-radius: 18px;
    }

    .stat .value {
      font-size: 2rem;
      font-weight: 600;
      color: var(--accent);
    }

    .stat .label {
      color: var(--muted);
    }

    .yes {
      color: var(--accent);
      font-weight: 700;
    }

    .no {
      color: #a9b2b5;
    }

    .plan.highlight {
      outline: 3px solid var(--accent);
    }

    .price strong {
      font-size: 2.2rem;
    }

    .plan ul {
      padding-left: 18px;
      line-height: 1.7;
    }

    .form-grid {
      display: grid;
      gap: 14px;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
    }

    .form-grid label:has(textarea), .form-grid button {
      grid-column: 1 / -1;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .business {
      background: white;
      border-radius: 18px;
      padding: 18px;
    }

    .business .meta, .empty {
      color: var(--muted);
    }

    footer {
      padding: 36px 0 48px;
      color: var(--muted);
    }
"#;

const LANDING_HTML: &str = r##"<header class="site">
  <div class="wrap">
    <a class="brand" href="/">{{SITE}}</a>
    <nav>
      <a href="#pricing">Pricing</a>
      <a href="#compare">Compare</a>
      <a href="#directory">Partners</a>
      <a class="btn small" href="#waitlist" data-track="nav_waitlist">Get early access</a>
    </nav>
  </div>
</header>

<main>
  <div class="wrap">{{NOTICE}}</div>

  <section class="hero">
    <div class="wrap">
      <h1>{{TAGLINE}}</h1>
      <p>{{HERO_SUBTITLE}}</p>
      <div class="actions">
        <a class="btn" href="#waitlist" data-track="hero_waitlist">Join the waitlist</a>
        <a class="btn secondary" href="#partnership" data-track="hero_partner">Become a partner</a>
      </div>
    </div>
  </section>

  <section id="problems">
    <div class="wrap">
      <h2>Running on texts and sticky notes?</h2>
      <div class="pairs">{{PROBLEMS}}</div>
    </div>
  </section>

  <section id="stats">
    <div class="wrap stats">{{STATS}}</div>
  </section>

  <section id="compare">
    <div class="wrap card">
      <h2>How {{SITE}} compares</h2>
      {{COMPARISON}}
    </div>
  </section>

  <section id="pricing">
    <div class="wrap">
      <h2>Simple pricing</h2>
      <div class="plans">{{PRICING}}</div>
    </div>
  </section>

  <section id="directory">
    <div class="wrap card">
      <h2>Businesses already on board</h2>
      {{DIRECTORY}}
    </div>
  </section>

  <section id="waitlist">
    <div class="wrap card">
      <h2>Get early access</h2>
      <p class="empty">Join the waitlist and we'll set up your booking page first.</p>
      {{WAITLIST_FORM}}
    </div>
  </section>

  <section id="partnership">
    <div class="wrap card">
      <h2>Partner with us</h2>
      <p class="empty">Agencies, suppliers and multi-location brands: let's build together.</p>
      {{PARTNERSHIP_FORM}}
    </div>
  </section>
</main>

<footer>
  <div class="wrap">
    <span>&copy; {{YEAR}} {{SITE}}</span>
    <span><a href="#waitlist">Waitlist</a> &middot; <a href="#partnership">Partnerships</a></span>
  </div>
</footer>

<script>
  (() => {
    const key = 'bw_session';
    let sessionId = sessionStorage.getItem(key);
    const isNew = !sessionId;
    if (!sessionId) {
      sessionId = (crypto.randomUUID && crypto.randomUUID()) || String(Date.now()) + Math.random().toString(16).slice(2);
      sessionStorage.setItem(key, sessionId);
    }
    const started = Date.now();
    const views = Number(sessionStorage.getItem('bw_views') || '0') + 1;
    sessionStorage.setItem('bw_views', String(views));

    const ua = navigator.userAgent;
    const device = /Mobi|Android/i.test(ua) ? 'mobile' : /iPad|Tablet/i.test(ua) ? 'tablet' : 'desktop';
    const browser = /Edg\//.test(ua) ? 'Edge' : /Firefox\//.test(ua) ? 'Firefox'
      : /Chrome\//.test(ua) ? 'Chrome' : /Safari\//.test(ua) ? 'Safari' : 'Other';
    const region = (navigator.language || '').split('-')[1] || null;

    const post = (path, body, beacon) => {
      const json = JSON.stringify(body);
      if (beacon && navigator.sendBeacon) {
        navigator.sendBeacon(path, new Blob([json], { type: 'application/json' }));
        return;
      }
      fetch(path, { method: 'POST', headers: { 'content-type': 'application/json' }, body: json })
        .catch(() => {});
    };

    post('/api/track/session', {
      session_id: sessionId,
      country: isNew ? region : null,
      device_type: device,
      browser,
      referrer: isNew ? (document.referrer || null) : null,
      landing_page: location.pathname,
      page_views: views
    });

    const track = (event_type, event_name, category) => post('/api/track/event', {
      session_id: sessionId,
      event_type,
      event_name,
      event_category: category || null,
      page_path: location.pathname
    });

    document.querySelectorAll('[data-track]').forEach((el) => {
      el.addEventListener('click', () => track('click', el.dataset.track, 'cta'));
    });

    document.querySelectorAll('form[data-form]').forEach((form) => {
      const name = form.dataset.form;
      let opened = false;
      form.addEventListener('focusin', () => {
        if (!opened) {
          opened = true;
          track('form', name + '_opened', name);
        }
      });
      form.addEventListener('submit', () => track('form', name + '_submitted', name));
    });

    addEventListener('pagehide', () => {
      post('/api/track/session', {
        session_id: sessionId,
        page_views: views,
        time_on_site: Math.round((Date.now() - started) / 1000)
      }, true);
    });
  })();
</script>
"##;
