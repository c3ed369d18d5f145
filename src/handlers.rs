use crate::admin::{authorize, DashboardData};
use crate::errors::{AppError, UPSTREAM_MESSAGE};
use crate::export::{events_csv, partnerships_csv, sessions_csv, waitlist_csv, ExportKind};
use crate::filters::{distinct_values, filter_businesses, search_partnerships, search_waitlist, BusinessFilter, DateRange};
use crate::forms::{validate_partnership, validate_waitlist, FieldError};
use crate::models::{
    AnalyticsEvent, AnalyticsSession, Business, DashboardSummary, NewPartnership, PartnershipForm,
    PartnershipRequest, PartnershipStatus, StatusUpdate, TrackEvent, TrackSession, WaitlistForm,
    WaitlistSignup, BUSINESSES_TABLE, EVENTS_TABLE, PARTNERSHIP_TABLE, SESSIONS_TABLE, WAITLIST_TABLE,
};
use crate::state::AppState;
use crate::store::{Query as StoreQuery, StoreError};
use crate::ui::{render_admin, render_admin_error, render_landing, AdminTab, AdminView, LandingView, Notice};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

/// Headers set by common edge networks carrying the visitor's country.
const COUNTRY_HEADERS: &[&str] = &["cf-ipcountry", "x-vercel-ip-country", "x-country-code"];

#[derive(Debug, Deserialize, Default)]
pub struct LandingQuery {
    pub joined: Option<String>,
    #[serde(flatten)]
    pub filter: BusinessFilter,
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminQuery {
    pub tab: Option<String>,
    pub range: Option<String>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub token: Option<String>,
}

impl AdminQuery {
    fn range(&self) -> DateRange {
        DateRange::parse(self.range.as_deref())
    }

    fn status(&self) -> Option<PartnershipStatus> {
        self.checked_status().ok().flatten()
    }

    /// Blank or `all` means no filter; anything else must be a known status.
    fn checked_status(&self) -> Result<Option<PartnershipStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
            Some(value) => value.parse().map(Some).map_err(AppError::bad_request),
        }
    }

    fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub tab: Option<String>,
    pub range: Option<String>,
    pub token: Option<String>,
}

pub async fn health() -> &'static str {
    "ok"
}

fn landing_view(state: &AppState) -> LandingView {
    LandingView {
        site_name: state.config.site_name.clone(),
        ..LandingView::default()
    }
}

/// Fills the partner directory; a failed load leaves it marked unavailable.
async fn load_directory(state: &AppState, view: &mut LandingView) {
    let query = StoreQuery::new().order_by("name", false);
    match state.store.fetch_or_empty::<Business>(BUSINESSES_TABLE, &query).await {
        Ok(all) => {
            view.categories = distinct_values(&all, |b| b.category.as_str());
            view.cities = distinct_values(&all, |b| b.city.as_str());
            view.directory = Some(filter_businesses(&all, &view.filter).into_iter().cloned().collect());
        }
        Err(err) => {
            error!("failed to load business directory: {err}");
            view.directory = None;
        }
    }
}

pub async fn index(State(state): State<AppState>, Query(params): Query<LandingQuery>) -> Html<String> {
    let mut view = landing_view(&state);
    view.notice = Notice::from_joined(params.joined.as_deref());
    view.filter = params.filter;
    load_directory(&state, &mut view).await;
    Html(render_landing(&view))
}

async fn render_form_failure(state: &AppState, mut view: LandingView, status: StatusCode) -> Response {
    load_directory(state, &mut view).await;
    (status, Html(render_landing(&view))).into_response()
}

pub async fn waitlist_form(State(state): State<AppState>, Form(form): Form<WaitlistForm>) -> Response {
    let mut view = landing_view(&state);
    match validate_waitlist(&form) {
        Ok(clean) => match create_waitlist(&state, &clean).await {
            Ok(_) => Redirect::to("/?joined=waitlist#waitlist").into_response(),
            Err(err) => {
                error!("failed to save waitlist signup: {err}");
                view.notice = Some(Notice::Failed(UPSTREAM_MESSAGE.to_string()));
                view.waitlist = clean;
                render_form_failure(&state, view, StatusCode::BAD_GATEWAY).await
            }
        },
        Err(errors) => {
            view.waitlist = form;
            view.waitlist_errors = errors;
            render_form_failure(&state, view, StatusCode::UNPROCESSABLE_ENTITY).await
        }
    }
}

pub async fn partnership_form(State(state): State<AppState>, Form(form): Form<PartnershipForm>) -> Response {
    let mut view = landing_view(&state);
    match validate_partnership(&form) {
        Ok(clean) => match create_partnership(&state, &clean).await {
            Ok(_) => Redirect::to("/?joined=partnership#partnership").into_response(),
            Err(err) => {
                error!("failed to save partnership request: {err}");
                view.notice = Some(Notice::Failed(UPSTREAM_MESSAGE.to_string()));
                view.partnership = clean;
                render_form_failure(&state, view, StatusCode::BAD_GATEWAY).await
            }
        },
        Err(errors) => {
            view.partnership = form;
            view.partnership_errors = errors;
            render_form_failure(&state, view, StatusCode::UNPROCESSABLE_ENTITY).await
        }
    }
}

async fn create_waitlist(state: &AppState, form: &WaitlistForm) -> Result<WaitlistSignup, StoreError> {
    let signup: WaitlistSignup = state.store.create(WAITLIST_TABLE, form).await?;
    info!(id = %signup.id, "waitlist signup received");
    Ok(signup)
}

async fn create_partnership(state: &AppState, form: &PartnershipForm) -> Result<PartnershipRequest, StoreError> {
    let record = NewPartnership {
        form,
        status: PartnershipStatus::Pending,
    };
    let request: PartnershipRequest = state.store.create(PARTNERSHIP_TABLE, &record).await?;
    info!(id = %request.id, "partnership request received");
    Ok(request)
}

fn invalid(errors: Vec<FieldError>) -> AppError {
    AppError::unprocessable(errors)
}

pub async fn api_waitlist(
    State(state): State<AppState>,
    Json(form): Json<WaitlistForm>,
) -> Result<(StatusCode, Json<WaitlistSignup>), AppError> {
    let clean = validate_waitlist(&form).map_err(invalid)?;
    let signup = create_waitlist(&state, &clean).await?;
    Ok((StatusCode::CREATED, Json(signup)))
}

pub async fn api_partnership(
    State(state): State<AppState>,
    Json(form): Json<PartnershipForm>,
) -> Result<(StatusCode, Json<PartnershipRequest>), AppError> {
    let clean = validate_partnership(&form).map_err(invalid)?;
    let request = create_partnership(&state, &clean).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn api_businesses(
    State(state): State<AppState>,
    Query(filter): Query<BusinessFilter>,
) -> Result<Json<Vec<Business>>, AppError> {
    let query = StoreQuery::new().order_by("name", false);
    let all: Vec<Business> = state.store.fetch_or_empty(BUSINESSES_TABLE, &query).await?;
    Ok(Json(filter_businesses(&all, &filter).into_iter().cloned().collect()))
}

fn country_from_headers(headers: &HeaderMap) -> Option<String> {
    COUNTRY_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty() && *value != "XX")
        .map(str::to_uppercase)
}

async fn find_session(state: &AppState, session_id: &str) -> Result<Option<AnalyticsSession>, StoreError> {
    let query = StoreQuery::new().eq("session_id", session_id).limit(1);
    let mut found: Vec<AnalyticsSession> = state.store.fetch_or_empty(SESSIONS_TABLE, &query).await?;
    Ok(found.pop())
}

pub async fn track_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TrackSession>,
) -> Result<StatusCode, AppError> {
    let session_id = payload.session_id.trim();
    if session_id.is_empty() {
        return Err(AppError::bad_request("session_id is required"));
    }

    if let Some(existing) = find_session(&state, session_id).await? {
        let mut patch = serde_json::Map::new();
        if let Some(views) = payload.page_views.filter(|v| *v > existing.page_views) {
            patch.insert("page_views".into(), json!(views));
        }
        if let Some(seconds) = payload.time_on_site.filter(|v| *v > existing.time_on_site) {
            patch.insert("time_on_site".into(), json!(seconds));
        }
        if !patch.is_empty() {
            state.store.update(SESSIONS_TABLE, &existing.id, patch.into()).await?;
        }
        return Ok(StatusCode::NO_CONTENT);
    }

    let record = json!({
        "session_id": session_id,
        "country": country_from_headers(&headers).or(payload.country),
        "city": payload.city,
        "device_type": payload.device_type,
        "browser": payload.browser,
        "os": payload.os,
        "referrer": payload.referrer,
        "landing_page": payload.landing_page,
        "page_views": payload.page_views.unwrap_or(1),
        "time_on_site": payload.time_on_site.unwrap_or(0),
        "waitlist_opened": false,
        "waitlist_submitted": false,
        "partnership_opened": false,
        "partnership_submitted": false,
    });
    state.store.insert(SESSIONS_TABLE, record).await?;
    Ok(StatusCode::CREATED)
}

/// Session column flipped by a funnel event, if the event is one.
pub fn funnel_flag(event_name: &str) -> Option<&'static str> {
    match event_name {
        "waitlist_opened" => Some("waitlist_opened"),
        "waitlist_submitted" => Some("waitlist_submitted"),
        "partnership_opened" => Some("partnership_opened"),
        "partnership_submitted" => Some("partnership_submitted"),
        _ => None,
    }
}

pub async fn track_event(
    State(state): State<AppState>,
    Json(payload): Json<TrackEvent>,
) -> Result<StatusCode, AppError> {
    if payload.event_type.trim().is_empty() || payload.event_name.trim().is_empty() {
        return Err(AppError::bad_request("event_type and event_name are required"));
    }

    let event = AnalyticsEvent {
        id: String::new(),
        session_id: payload.session_id.clone(),
        event_type: payload.event_type.trim().to_string(),
        event_name: payload.event_name.trim().to_string(),
        event_category: payload.event_category,
        event_value: payload.event_value,
        page_path: payload.page_path,
        created_at: Utc::now(),
    };
    let mut record = serde_json::to_value(&event).map_err(AppError::internal)?;
    if let Some(fields) = record.as_object_mut() {
        fields.remove("id");
    }
    state.store.insert(EVENTS_TABLE, record).await?;

    let flag = funnel_flag(&event.event_name);
    if let (Some(flag), Some(session_id)) = (flag, payload.session_id.as_deref()) {
        match find_session(&state, session_id).await? {
            Some(session) => {
                state.store.update(SESSIONS_TABLE, &session.id, json!({ flag: true })).await?;
            }
            None => warn!(session_id, "funnel event for unknown session"),
        }
    }

    Ok(StatusCode::CREATED)
}

fn admin_view(state: &AppState, params: &AdminQuery) -> AdminView {
    AdminView {
        site_name: state.config.site_name.clone(),
        tab: AdminTab::parse(params.tab.as_deref()),
        range: params.range(),
        q: params.query().map(str::to_string),
        status: params.status(),
        token: params.token.clone(),
    }
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminQuery>,
) -> Result<Response, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let view = admin_view(&state, &params);

    match DashboardData::load(&state.store, view.range, Utc::now()).await {
        Ok(data) => {
            let summary = data.summary();
            Ok(Html(render_admin(&view, &data, &summary)).into_response())
        }
        Err(err) => {
            error!("failed to load dashboard data: {err}");
            Ok((StatusCode::BAD_GATEWAY, Html(render_admin_error(&view, UPSTREAM_MESSAGE))).into_response())
        }
    }
}

pub async fn api_admin_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let data = DashboardData::load(&state.store, params.range(), Utc::now()).await?;
    Ok(Json(data.summary()))
}

fn range_query(range: DateRange) -> StoreQuery {
    range.apply(Utc::now(), StoreQuery::new().newest_first())
}

pub async fn api_admin_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminQuery>,
) -> Result<Json<Vec<WaitlistSignup>>, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let all: Vec<WaitlistSignup> = state.store.fetch(WAITLIST_TABLE, &range_query(params.range())).await?;
    Ok(Json(search_waitlist(&all, params.query()).into_iter().cloned().collect()))
}

pub async fn api_admin_partnerships(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminQuery>,
) -> Result<Json<Vec<PartnershipRequest>>, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let mut query = range_query(params.range());
    let status = params.checked_status()?;
    if let Some(status) = status {
        query = query.eq("status", status.as_str());
    }
    let all: Vec<PartnershipRequest> = state.store.fetch(PARTNERSHIP_TABLE, &query).await?;
    Ok(Json(search_partnerships(&all, params.query(), status).into_iter().cloned().collect()))
}

async fn set_partnership_status(state: &AppState, id: &str, status: &str) -> Result<PartnershipRequest, AppError> {
    let status: PartnershipStatus = status.parse().map_err(AppError::bad_request)?;
    let updated: PartnershipRequest = state
        .store
        .patch(PARTNERSHIP_TABLE, id, json!({ "status": status }))
        .await?;
    info!(id, status = %status, "partnership status updated");
    Ok(updated)
}

pub async fn api_update_partnership(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<AdminQuery>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<PartnershipRequest>, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let updated = set_partnership_status(&state, &id, &update.status).await?;
    Ok(Json(updated))
}

pub async fn update_partnership_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    authorize(&state.config, &headers, form.token.as_deref())?;
    set_partnership_status(&state, &id, &form.status).await?;

    let params = AdminQuery {
        tab: form.tab.or_else(|| Some(AdminTab::Partnerships.as_str().to_string())),
        range: form.range,
        token: form.token,
        ..AdminQuery::default()
    };
    Ok(Redirect::to(&admin_view(&state, &params).current_url()))
}

pub async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
    Query(params): Query<AdminQuery>,
) -> Result<Response, AppError> {
    authorize(&state.config, &headers, params.token.as_deref())?;
    let kind = ExportKind::parse(&kind).ok_or_else(|| AppError::not_found(format!("unknown export '{kind}'")))?;
    let query = range_query(params.range());

    let body = match kind {
        ExportKind::Waitlist => {
            waitlist_csv(&state.store.fetch::<WaitlistSignup>(WAITLIST_TABLE, &query).await?)
        }
        ExportKind::Partnerships => {
            partnerships_csv(&state.store.fetch::<PartnershipRequest>(PARTNERSHIP_TABLE, &query).await?)
        }
        ExportKind::Sessions => {
            sessions_csv(&state.store.fetch_or_empty::<AnalyticsSession>(SESSIONS_TABLE, &query).await?)
        }
        ExportKind::Events => {
            events_csv(&state.store.fetch_or_empty::<AnalyticsEvent>(EVENTS_TABLE, &query).await?)
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", kind.filename(Utc::now().date_naive()));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn country_prefers_edge_headers_and_skips_unknown() {
        let mut headers = HeaderMap::new();
        assert_eq!(country_from_headers(&headers), None);
        headers.insert("cf-ipcountry", HeaderValue::from_static("XX"));
        headers.insert("x-vercel-ip-country", HeaderValue::from_static("mx"));
        assert_eq!(country_from_headers(&headers).as_deref(), Some("MX"));
    }

    #[test]
    fn only_funnel_events_flip_session_flags() {
        assert_eq!(funnel_flag("waitlist_submitted"), Some("waitlist_submitted"));
        assert_eq!(funnel_flag("partnership_opened"), Some("partnership_opened"));
        assert_eq!(funnel_flag("hero_waitlist"), None);
    }

    #[test]
    fn admin_query_parses_filters() {
        let params = AdminQuery {
            range: Some("7d".into()),
            status: Some("Approved".into()),
            q: Some("  ".into()),
            ..AdminQuery::default()
        };
        assert_eq!(params.range(), DateRange::Last7Days);
        assert_eq!(params.status(), Some(PartnershipStatus::Approved));
        assert_eq!(params.query(), None);
    }

    #[test]
    fn unknown_status_filter_is_rejected() {
        let mut params = AdminQuery {
            status: Some("bogus".into()),
            ..AdminQuery::default()
        };
        let err = params.checked_status().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(params.status(), None);

        params.status = Some("all".into());
        assert!(matches!(params.checked_status(), Ok(None)));
        params.status = Some(String::new());
        assert!(matches!(params.checked_status(), Ok(None)));
    }
}
