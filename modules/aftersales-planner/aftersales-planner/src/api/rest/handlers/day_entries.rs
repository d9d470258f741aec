use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use planner_auth::CurrentSession;
use serde_json::json;

use crate::api::rest::dto::{
    AvailabilityDayDto, CreateDayEntryRequest, DayEntryDto, IdQuery, PatchDayEntryRequest,
    RangeQuery, RemainingDto, RemainingQuery, parse_date_param, parse_id_param,
};
use crate::api::rest::error::{ApiError, ApiResult};
use crate::api::rest::extract::{ApiQuery, JsonOrForm};
use crate::domain::fields::DayEntryFields;
use crate::domain::service::DayEntryService;

use super::ok_with;

pub async fn list_entries(
    Extension(svc): Extension<Arc<DayEntryService>>,
    ApiQuery(q): ApiQuery<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let from = parse_date_param(DayEntryFields::FROM, q.from.as_deref())?;
    let to = parse_date_param(DayEntryFields::TO, q.to.as_deref())?;
    let entries: Vec<DayEntryDto> = svc
        .list(from, to)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    ok_with("entries", entries)
}

/// Books an entry; the signed-in user is recorded as `created_by`.
pub async fn create_entry(
    Extension(svc): Extension<Arc<DayEntryService>>,
    CurrentSession(session): CurrentSession,
    JsonOrForm(req): JsonOrForm<CreateDayEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = req.into_domain(Some(session.user_id))?;
    let entry = svc.create(new).await?;
    Ok((StatusCode::CREATED, ok_with("entry", DayEntryDto::from(entry))?))
}

pub async fn update_entry(
    Extension(svc): Extension<Arc<DayEntryService>>,
    JsonOrForm(req): JsonOrForm<PatchDayEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let (id, patch) = req.into_domain()?;
    let entry = svc.update(id, patch).await?;
    ok_with("entry", DayEntryDto::from(entry))
}

pub async fn delete_entry(
    Extension(svc): Extension<Arc<DayEntryService>>,
    ApiQuery(q): ApiQuery<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id_param(q.id.as_deref())?;
    if svc.delete(id).await? {
        Ok(Json(json!({ "ok": true, "id": id })))
    } else {
        Err(ApiError::not_found(format!("day entry {id} not found")))
    }
}

pub async fn remaining(
    Extension(svc): Extension<Arc<DayEntryService>>,
    ApiQuery(q): ApiQuery<RemainingQuery>,
) -> ApiResult<impl IntoResponse> {
    let (work_day, category) = q.into_domain()?;
    let bucket = RemainingDto::from(svc.remaining(work_day, category).await?);
    Ok(Json(json!({
        "ok": true,
        "capacity": bucket.capacity,
        "used": bucket.used,
        "remaining": bucket.remaining,
        "delta": bucket.delta,
    })))
}

pub async fn availability(
    Extension(svc): Extension<Arc<DayEntryService>>,
    ApiQuery(q): ApiQuery<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let from = parse_date_param(DayEntryFields::FROM, q.from.as_deref())?;
    let to = parse_date_param(DayEntryFields::TO, q.to.as_deref())?;
    let days: Vec<AvailabilityDayDto> = svc
        .daily_availability(from, to)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    ok_with("days", days)
}
