use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::api::rest::dto::{
    CreateEmployeeRequest, EmployeeDto, IdQuery, PatchEmployeeRequest, parse_id_param,
};
use crate::api::rest::error::{ApiError, ApiResult};
use crate::api::rest::extract::{ApiQuery, JsonOrForm};
use crate::domain::service::EmployeeService;

use super::ok_with;

pub async fn list_employees(
    Extension(svc): Extension<Arc<EmployeeService>>,
) -> ApiResult<impl IntoResponse> {
    let employees: Vec<EmployeeDto> = svc.list().await?.into_iter().map(Into::into).collect();
    ok_with("employees", employees)
}

pub async fn create_employee(
    Extension(svc): Extension<Arc<EmployeeService>>,
    JsonOrForm(req): JsonOrForm<CreateEmployeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let employee = svc.create(req.into_domain()?).await?;
    Ok((StatusCode::CREATED, ok_with("employee", EmployeeDto::from(employee))?))
}

pub async fn update_employee(
    Extension(svc): Extension<Arc<EmployeeService>>,
    JsonOrForm(req): JsonOrForm<PatchEmployeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let (id, patch) = req.into_domain()?;
    let employee = svc.update(id, patch).await?;
    ok_with("employee", EmployeeDto::from(employee))
}

pub async fn delete_employee(
    Extension(svc): Extension<Arc<EmployeeService>>,
    ApiQuery(q): ApiQuery<IdQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id_param(q.id.as_deref())?;
    if svc.delete(id).await? {
        Ok(Json(json!({ "ok": true, "id": id })))
    } else {
        Err(ApiError::not_found(format!("employee {id} not found")))
    }
}
