//! Wire types of the planner REST API.
//!
//! Request DTOs are lenient (every field optional, numbers may arrive as
//! strings from form posts) and convert into SDK types while collecting
//! field issues. Response DTOs render dates as `YYYY-MM-DD`.

use std::collections::BTreeMap;

use aftersales_planner_sdk::{
    CapacityBucket, Category, DEFAULT_PERFORMANCE, DayEntry, DayEntryPatch, Employee,
    EmployeeCapacity, EmployeePatch, NewDayEntry, NewEmployee, OpeningHours, Settings,
    format_iso_date, parse_iso_date,
};
use planner_auth::Session;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::error::{DomainError, Issues};
use crate::domain::fields::{DayEntryFields, EmployeeFields};
use crate::domain::models::UserAccount;
use crate::domain::service::{DayAvailability, DayCapacity};

/// Deserialize a present field (even `null`) as `Some(inner)`.
///
/// Combined with `#[serde(default)]` an absent field stays `None`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn parse_int(field: &'static str, value: Option<Value>, issues: &mut Issues) -> Option<i32> {
    let parsed = match value? {
        Value::Null => return None,
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        issues.push(field, "must be an integer");
    }
    parsed
}

fn parse_category(
    field: &'static str,
    value: Option<&str>,
    issues: &mut Issues,
) -> Option<Category> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.to_ascii_uppercase().parse() {
        Ok(c) => Some(c),
        Err(_) => {
            issues.push(field, "must be one of MECH, BODY, PREP");
            None
        }
    }
}

fn parse_date(field: &'static str, value: Option<&str>, issues: &mut Issues) -> Option<Date> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match parse_iso_date(value) {
        Ok(d) => Some(d),
        Err(_) => {
            issues.push(field, "must be a date (YYYY-MM-DD)");
            None
        }
    }
}

fn parse_id(value: Option<&str>, issues: &mut Issues) -> Option<Uuid> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        issues.push("id", "is required");
        return None;
    };
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            issues.push("id", "must be a UUID");
            None
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn is_blank_str(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn missing(field: &'static str, issues: &mut Issues) {
    issues.push(field, "is required");
}

/// Parse the `id` of a delete request.
pub fn parse_id_param(id: Option<&str>) -> Result<Uuid, DomainError> {
    let mut issues = Issues::new();
    let id = parse_id(id, &mut issues);
    issues.finish()?;
    id.ok_or_else(|| DomainError::validation("id", "is required"))
}

/// Parse an optional `YYYY-MM-DD` query parameter.
pub fn parse_date_param(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Date>, DomainError> {
    let mut issues = Issues::new();
    let date = parse_date(field, value, &mut issues);
    issues.finish()?;
    Ok(date)
}

// ---- employees ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub performance: Option<Value>,
}

impl CreateEmployeeRequest {
    pub fn into_domain(self) -> Result<NewEmployee, DomainError> {
        let mut issues = Issues::new();
        if self.name.is_none() {
            missing(EmployeeFields::NAME, &mut issues);
        }
        if is_blank_str(self.category.as_deref()) {
            missing(EmployeeFields::CATEGORY, &mut issues);
        }
        let category =
            parse_category(EmployeeFields::CATEGORY, self.category.as_deref(), &mut issues);
        let performance = parse_int(EmployeeFields::PERFORMANCE, self.performance, &mut issues);
        issues.finish()?;

        match (self.name, category) {
            (Some(name), Some(category)) => Ok(NewEmployee {
                name,
                category,
                performance: performance.unwrap_or(DEFAULT_PERFORMANCE),
            }),
            _ => Err(DomainError::validation(EmployeeFields::NAME, "is required")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchEmployeeRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub performance: Option<Value>,
}

impl PatchEmployeeRequest {
    pub fn into_domain(self) -> Result<(Uuid, EmployeePatch), DomainError> {
        let mut issues = Issues::new();
        let id = parse_id(self.id.as_deref(), &mut issues);
        let patch = EmployeePatch {
            name: self.name,
            category: parse_category(
                EmployeeFields::CATEGORY,
                self.category.as_deref(),
                &mut issues,
            ),
            performance: parse_int(EmployeeFields::PERFORMANCE, self.performance, &mut issues),
        };
        issues.finish()?;
        let id = id.ok_or_else(|| DomainError::validation("id", "is required"))?;
        Ok((id, patch))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDto {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub performance: i32,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            name: e.name,
            category: e.category,
            performance: e.performance,
        }
    }
}

// ---- day entries ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDayEntryRequest {
    pub work_day: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub work_text: Option<String>,
    pub drop_off: Option<String>,
    pub pick_up: Option<String>,
    pub aw: Option<Value>,
}

impl CreateDayEntryRequest {
    pub fn into_domain(self, created_by: Option<Uuid>) -> Result<NewDayEntry, DomainError> {
        let mut issues = Issues::new();
        if is_blank_str(self.work_day.as_deref()) {
            missing(DayEntryFields::WORK_DAY, &mut issues);
        }
        if is_blank_str(self.category.as_deref()) {
            missing(DayEntryFields::CATEGORY, &mut issues);
        }
        if is_blank(self.aw.as_ref()) {
            missing(DayEntryFields::AW, &mut issues);
        }
        let work_day = parse_date(DayEntryFields::WORK_DAY, self.work_day.as_deref(), &mut issues);
        let category =
            parse_category(DayEntryFields::CATEGORY, self.category.as_deref(), &mut issues);
        let aw = parse_int(DayEntryFields::AW, self.aw, &mut issues);
        issues.finish()?;

        let (Some(work_day), Some(category), Some(aw)) = (work_day, category, aw) else {
            return Err(DomainError::validation(DayEntryFields::AW, "is required"));
        };
        Ok(NewDayEntry {
            work_day,
            category,
            title: self.title,
            work_text: self.work_text.unwrap_or_default(),
            drop_off: self.drop_off,
            pick_up: self.pick_up,
            aw,
            created_by,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchDayEntryRequest {
    pub id: Option<String>,
    pub work_day: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    pub work_text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub drop_off: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub pick_up: Option<Option<String>>,
    pub aw: Option<Value>,
}

impl PatchDayEntryRequest {
    pub fn into_domain(self) -> Result<(Uuid, DayEntryPatch), DomainError> {
        let mut issues = Issues::new();
        let id = parse_id(self.id.as_deref(), &mut issues);
        let patch = DayEntryPatch {
            work_day: parse_date(DayEntryFields::WORK_DAY, self.work_day.as_deref(), &mut issues),
            category: parse_category(
                DayEntryFields::CATEGORY,
                self.category.as_deref(),
                &mut issues,
            ),
            title: self.title,
            work_text: self.work_text,
            drop_off: self.drop_off,
            pick_up: self.pick_up,
            aw: parse_int(DayEntryFields::AW, self.aw, &mut issues),
        };
        issues.finish()?;
        let id = id.ok_or_else(|| DomainError::validation("id", "is required"))?;
        Ok((id, patch))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayEntryDto {
    pub id: Uuid,
    pub work_day: String,
    pub category: Category,
    pub title: Option<String>,
    pub work_text: String,
    pub drop_off: Option<String>,
    pub pick_up: Option<String>,
    pub aw: i32,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<DayEntry> for DayEntryDto {
    fn from(e: DayEntry) -> Self {
        Self {
            id: e.id,
            work_day: format_iso_date(e.work_day),
            category: e.category,
            title: e.title,
            work_text: e.work_text,
            drop_off: e.drop_off,
            pick_up: e.pick_up,
            aw: e.aw,
            created_by: e.created_by,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemainingQuery {
    pub work_day: Option<String>,
    pub category: Option<String>,
}

impl RemainingQuery {
    pub fn into_domain(self) -> Result<(Date, Category), DomainError> {
        let mut issues = Issues::new();
        if is_blank_str(self.work_day.as_deref()) {
            missing(DayEntryFields::WORK_DAY, &mut issues);
        }
        if is_blank_str(self.category.as_deref()) {
            missing(DayEntryFields::CATEGORY, &mut issues);
        }
        let work_day = parse_date(DayEntryFields::WORK_DAY, self.work_day.as_deref(), &mut issues);
        let category =
            parse_category(DayEntryFields::CATEGORY, self.category.as_deref(), &mut issues);
        issues.finish()?;
        match (work_day, category) {
            (Some(d), Some(c)) => Ok((d, c)),
            _ => Err(DomainError::validation(DayEntryFields::WORK_DAY, "is required")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `{capacity, used, remaining, delta}` of one bucket.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RemainingDto {
    pub capacity: i64,
    pub used: i64,
    pub remaining: i64,
    pub delta: i64,
}

impl From<CapacityBucket> for RemainingDto {
    fn from(b: CapacityBucket) -> Self {
        Self {
            capacity: b.capacity,
            used: b.used,
            remaining: b.remaining(),
            delta: b.delta(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BucketDto {
    pub capacity: i64,
    pub used: i64,
    pub free: i64,
    pub delta: i64,
}

impl From<CapacityBucket> for BucketDto {
    fn from(b: CapacityBucket) -> Self {
        Self {
            capacity: b.capacity,
            used: b.used,
            free: b.remaining(),
            delta: b.delta(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityDayDto {
    pub date: String,
    pub categories: BTreeMap<Category, BucketDto>,
}

impl From<DayAvailability> for AvailabilityDayDto {
    fn from(d: DayAvailability) -> Self {
        Self {
            date: format_iso_date(d.date),
            categories: d
                .categories
                .into_iter()
                .map(|(c, b)| (c, b.into()))
                .collect(),
        }
    }
}

// ---- capacity ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapacityQuery {
    pub start: Option<String>,
    pub days: Option<String>,
}

impl CapacityQuery {
    pub fn into_domain(self) -> Result<(Option<Date>, Option<u32>), DomainError> {
        let mut issues = Issues::new();
        let start = parse_date("start", self.start.as_deref(), &mut issues);
        let days = match self.days.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => None,
            Some(d) => {
                let parsed = d.parse::<u32>().ok();
                if parsed.is_none() {
                    issues.push("days", "must be a positive integer");
                }
                parsed
            }
        };
        issues.finish()?;
        Ok((start, days))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmployeeCapacityDto {
    pub aw: i64,
    pub minutes: i64,
}

impl From<EmployeeCapacity> for EmployeeCapacityDto {
    fn from(c: EmployeeCapacity) -> Self {
        Self {
            aw: c.aw,
            minutes: c.minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityDayDto {
    pub date: String,
    pub categories: BTreeMap<Category, EmployeeCapacityDto>,
}

impl From<DayCapacity> for CapacityDayDto {
    fn from(d: DayCapacity) -> Self {
        Self {
            date: format_iso_date(d.date),
            categories: d
                .categories
                .into_iter()
                .map(|(c, cap)| (c, cap.into()))
                .collect(),
        }
    }
}

// ---- settings ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PutSettingsRequest {
    pub timezone: Option<String>,
    pub opening: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsDto {
    pub timezone: String,
    pub opening: OpeningHours,
}

impl From<Settings> for SettingsDto {
    fn from(s: Settings) -> Self {
        Self {
            timezone: s.timezone,
            opening: s.opening,
        }
    }
}

// ---- auth ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: planner_auth::Role,
}

impl From<UserAccount> for AccountDto {
    fn from(a: UserAccount) -> Self {
        Self {
            id: a.id,
            email: a.email,
            name: a.name,
            role: a.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub user_id: Uuid,
    pub email: String,
    pub role: planner_auth::Role,
    pub iat: i64,
    pub exp: i64,
}

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        Self {
            user_id: s.user_id,
            email: s.email,
            role: s.role,
            iat: s.iat,
            exp: s.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn issue_fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation { issues } => issues.into_iter().map(|i| i.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn aw_accepts_number_or_numeric_string() {
        for aw in [json!(12), json!("12"), json!(" 12 ")] {
            let req: CreateDayEntryRequest = serde_json::from_value(json!({
                "work_day": "2025-03-07", "category": "MECH", "aw": aw
            }))
            .unwrap();
            let new = req.into_domain(None).unwrap();
            assert_eq!(new.aw, 12);
            assert_eq!(new.work_day, date!(2025 - 03 - 07));
            assert_eq!(new.work_text, "");
        }
    }

    #[test]
    fn create_entry_reports_all_missing_fields() {
        let err = CreateDayEntryRequest::default().into_domain(None).unwrap_err();
        assert_eq!(issue_fields(err), vec!["work_day", "category", "aw"]);
    }

    #[test]
    fn create_entry_reports_bad_values() {
        let req: CreateDayEntryRequest = serde_json::from_value(json!({
            "work_day": "07.03.2025", "category": "PAINT", "aw": "viel"
        }))
        .unwrap();
        assert_eq!(
            issue_fields(req.into_domain(None).unwrap_err()),
            vec!["work_day", "category", "aw"]
        );
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let req: PatchDayEntryRequest = serde_json::from_value(json!({
            "id": "0190a4b2-7c3d-7000-8000-000000000001",
            "title": null,
            "aw": 8
        }))
        .unwrap();
        let (_, patch) = req.into_domain().unwrap();
        assert_eq!(patch.title, Some(None));
        assert_eq!(patch.drop_off, None);
        assert_eq!(patch.aw, Some(8));
    }

    #[test]
    fn patch_requires_valid_id() {
        let req: PatchDayEntryRequest = serde_json::from_value(json!({"id": "nope"})).unwrap();
        assert_eq!(issue_fields(req.into_domain().unwrap_err()), vec!["id"]);
        assert!(PatchEmployeeRequest::default().into_domain().is_err());
    }

    #[test]
    fn employee_performance_defaults_to_baseline() {
        let req: CreateEmployeeRequest =
            serde_json::from_value(json!({"name": "Jonas", "category": "body"})).unwrap();
        let new = req.into_domain().unwrap();
        assert_eq!(new.performance, DEFAULT_PERFORMANCE);
        assert_eq!(new.category, Category::Body);
    }

    #[test]
    fn entry_dto_formats_dates() {
        let entry = DayEntry {
            id: Uuid::nil(),
            work_day: date!(2025 - 03 - 07),
            category: Category::Prep,
            title: None,
            work_text: String::new(),
            drop_off: None,
            pick_up: None,
            aw: 4,
            created_by: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(DayEntryDto::from(entry)).unwrap();
        assert_eq!(json["work_day"], "2025-03-07");
        assert_eq!(json["category"], "PREP");
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn bucket_dto_exposes_free_and_delta() {
        let json = serde_json::to_value(BucketDto::from(CapacityBucket::new(96, 100))).unwrap();
        assert_eq!(json, json!({"capacity": 96, "used": 100, "free": 0, "delta": -4}));
    }

    #[test]
    fn capacity_query_rejects_bad_days() {
        let q = CapacityQuery {
            start: None,
            days: Some("-3".to_owned()),
        };
        assert_eq!(issue_fields(q.into_domain().unwrap_err()), vec!["days"]);
    }
}
