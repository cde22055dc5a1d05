use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::attendance::{AttendanceRecord, SquadFilter};
use crate::badges::{BadgeCategory, BadgeKey, NewBadge, SelectionEvent};
use crate::members::NewMember;
use crate::parades::NewParade;
use crate::service::{BrigadeService, ServiceError};
use crate::store::DataStore;

type Shared<S> = State<Arc<BrigadeService<S>>>;

/// HTTP endpoints for the catalog, members, attendance and parades.
pub fn brigade_router<S>(service: Arc<BrigadeService<S>>) -> Router
where
    S: DataStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/badges",
            get(list_categories_handler::<S>).post(add_badge_handler::<S>),
        )
        .route("/api/v1/badges/:category", get(list_subcategories_handler::<S>))
        .route(
            "/api/v1/badges/:category/:sub_category",
            get(list_badges_handler::<S>),
        )
        .route(
            "/api/v1/badges/:category/:sub_category/:badge_key",
            delete(delete_badge_handler::<S>),
        )
        .route(
            "/api/v1/members",
            get(list_members_handler::<S>).post(create_member_handler::<S>),
        )
        .route(
            "/api/v1/members/:member_id",
            get(get_member_handler::<S>).delete(delete_member_handler::<S>),
        )
        .route(
            "/api/v1/members/:member_id/badges",
            post(member_badges_handler::<S>),
        )
        .route(
            "/api/v1/members/:member_id/eligibility",
            get(eligibility_handler::<S>),
        )
        .route("/api/v1/attendance", post(mark_attendance_handler::<S>))
        .route("/api/v1/attendance/stats", get(attendance_stats_handler::<S>))
        .route("/api/v1/attendance/rates", get(parade_rates_handler::<S>))
        .route(
            "/api/v1/parades",
            get(parades_handler::<S>).post(schedule_parade_handler::<S>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        other if other.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn unprocessable(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn list_categories_handler<S>(State(service): Shared<S>) -> Response
where
    S: DataStore + 'static,
{
    match service.catalog() {
        Ok(catalog) => {
            let categories: Vec<_> = catalog
                .list_categories()
                .into_iter()
                .map(|key| {
                    let name = BadgeCategory::from_key(&key)
                        .map(BadgeCategory::display_name)
                        .unwrap_or(key.as_str())
                        .to_string();
                    json!({ "key": key, "name": name })
                })
                .collect();
            (StatusCode::OK, Json(categories)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_subcategories_handler<S>(
    State(service): Shared<S>,
    Path(category): Path<String>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.catalog() {
        Ok(catalog) => (StatusCode::OK, Json(catalog.list_subcategories(&category))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_badges_handler<S>(
    State(service): Shared<S>,
    Path((category, sub_category)): Path<(String, String)>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.catalog() {
        Ok(catalog) => {
            (StatusCode::OK, Json(catalog.entries(&category, &sub_category))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_badge_handler<S>(
    State(service): Shared<S>,
    Json(badge): Json<NewBadge>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.add_badge(badge) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_members_handler<S>(State(service): Shared<S>) -> Response
where
    S: DataStore + 'static,
{
    match service.list_members() {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_member_handler<S>(
    State(service): Shared<S>,
    Json(input): Json<NewMember>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.create_member(input, Local::now().date_naive()) {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_member_handler<S>(
    State(service): Shared<S>,
    Path(member_id): Path<String>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.get_member(&member_id) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_badge_handler<S>(
    State(service): Shared<S>,
    Path((category, sub_category, badge_key)): Path<(String, String, String)>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.delete_badge(&BadgeKey::new(category, sub_category, badge_key)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_member_handler<S>(
    State(service): Shared<S>,
    Path(member_id): Path<String>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.delete_member(&member_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn member_badges_handler<S>(
    State(service): Shared<S>,
    Path(member_id): Path<String>,
    Json(events): Json<Vec<SelectionEvent>>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.apply_badge_selection(&member_id, events) {
        Ok(badges) => (StatusCode::OK, Json(badges)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityQuery {
    today: Option<NaiveDate>,
}

pub(crate) async fn eligibility_handler<S>(
    State(service): Shared<S>,
    Path(member_id): Path<String>,
    Query(query): Query<EligibilityQuery>,
) -> Response
where
    S: DataStore + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.evaluate_member(&member_id, today) {
        Ok(report) => {
            let missing = report.missing_messages();
            let mut body = json!(report);
            body["missing"] = json!(missing);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mark_attendance_handler<S>(
    State(service): Shared<S>,
    Json(record): Json<AttendanceRecord>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.mark_attendance(record) {
        Ok(key) => (StatusCode::OK, Json(json!({ "key": key }))).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsQuery {
    date: NaiveDate,
    squad: Option<String>,
}

pub(crate) async fn attendance_stats_handler<S>(
    State(service): Shared<S>,
    Query(query): Query<StatsQuery>,
) -> Response
where
    S: DataStore + 'static,
{
    let filter = match query.squad.as_deref().unwrap_or("all").parse::<SquadFilter>() {
        Ok(filter) => filter,
        Err(error) => return unprocessable(error.to_string()),
    };
    match service.attendance_stats(query.date, filter) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn parade_rates_handler<S>(State(service): Shared<S>) -> Response
where
    S: DataStore + 'static,
{
    match service.parade_rates() {
        Ok(rates) => (StatusCode::OK, Json(rates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn parades_handler<S>(State(service): Shared<S>) -> Response
where
    S: DataStore + 'static,
{
    match service.parade_schedule() {
        Ok(schedule) => {
            let months: serde_json::Map<String, serde_json::Value> = schedule
                .months()
                .map(|month| (month.to_string(), json!(schedule.count_for(month))))
                .collect();
            let payload = json!({
                "total": schedule.total(),
                "months": months,
                "dates": schedule.dates(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_parade_handler<S>(
    State(service): Shared<S>,
    Json(parade): Json<NewParade>,
) -> Response
where
    S: DataStore + 'static,
{
    match service.schedule_parade(parade, Local::now().naive_local()) {
        Ok(key) => (StatusCode::CREATED, Json(json!({ "key": key }))).into_response(),
        Err(error) => error_response(error),
    }
}
