use std::sync::Arc;

use axum::extract::Extension;
use axum::response::IntoResponse;
use time::OffsetDateTime;

use crate::api::rest::dto::{CapacityDayDto, CapacityQuery};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::ApiQuery;
use crate::domain::service::CapacityService;

use super::ok_with;

/// Capacity per category for a window of days; `start` defaults to today (UTC).
pub async fn capacity_days(
    Extension(svc): Extension<Arc<CapacityService>>,
    ApiQuery(q): ApiQuery<CapacityQuery>,
) -> ApiResult<impl IntoResponse> {
    let (start, days) = q.into_domain()?;
    let start = start.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let days: Vec<CapacityDayDto> = svc
        .capacity_days(start, days)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    ok_with("days", days)
}
