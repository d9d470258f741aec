use std::collections::HashMap;
use std::sync::Arc;

use aftersales_planner_sdk::{CapacityBucket, Category, DayEntry, DayEntryPatch, NewDayEntry};
use time::Date;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::domain::capacity::{self, PerCategory};
use crate::domain::error::{DomainError, FieldIssue, Issues};
use crate::domain::fields::{DayEntryFields, char_len, non_blank, parse_hhmm};
use crate::domain::models::BookingOutcome;
use crate::domain::repo::{DayEntryRepository, EmployeeRepository};

/// Free capacity of every category on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: Date,
    pub categories: PerCategory<CapacityBucket>,
}

/// Day-entry ledger
pub struct DayEntryService {
    entries: Arc<dyn DayEntryRepository>,
    employees: Arc<dyn EmployeeRepository>,
    config: PlannerConfig,
}

impl DayEntryService {
    pub fn new(
        entries: Arc<dyn DayEntryRepository>,
        employees: Arc<dyn EmployeeRepository>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            entries,
            employees,
            config,
        }
    }

    pub async fn list(
        &self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<Vec<DayEntry>, DomainError> {
        let (from, to) = self.validate_range(from, to)?;
        let entries = self.entries.list_between(from, to).await?;
        debug!(%from, %to, count = entries.len(), "listed day entries");
        Ok(entries)
    }

    /// Capacity, used AW and signed delta of one bucket.
    pub async fn remaining(
        &self,
        work_day: Date,
        category: Category,
    ) -> Result<CapacityBucket, DomainError> {
        let roster = self.employees.list().await?;
        let used = self.entries.used(work_day, category).await?;
        Ok(CapacityBucket::new(
            capacity::capacity_for_category(&roster, category),
            used,
        ))
    }

    /// Every date in `[from, to]` with a bucket per category.
    pub async fn daily_availability(
        &self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<Vec<DayAvailability>, DomainError> {
        let (from, to) = self.validate_range(from, to)?;
        let roster = self.employees.list().await?;
        let used: HashMap<(Date, Category), i64> = self
            .entries
            .used_between(from, to)
            .await?
            .into_iter()
            .map(|u| ((u.work_day, u.category), u.used))
            .collect();

        let capacities: PerCategory<i64> = Category::ALL
            .into_iter()
            .map(|c| (c, capacity::capacity_for_category(&roster, c)))
            .collect();

        let days = dates_between(from, to)
            .map(|date| DayAvailability {
                date,
                categories: capacities
                    .iter()
                    .map(|(&cat, &cap)| {
                        let used = used.get(&(date, cat)).copied().unwrap_or(0);
                        (cat, CapacityBucket::new(cap, used))
                    })
                    .collect(),
            })
            .collect();
        Ok(days)
    }

    pub async fn create(&self, new: NewDayEntry) -> Result<DayEntry, DomainError> {
        let new = validate_new(new)?;
        let (work_day, category) = (new.work_day, new.category);

        match self.entries.book(new).await? {
            BookingOutcome::Booked(entry) => {
                info!(
                    entry_id = %entry.id,
                    %work_day,
                    %category,
                    aw = entry.aw,
                    "day entry booked"
                );
                Ok(entry)
            }
            BookingOutcome::Rejected {
                remaining,
                requested,
            } => {
                warn!(
                    %work_day,
                    %category,
                    remaining,
                    requested,
                    "booking rejected, capacity exhausted"
                );
                Err(DomainError::insufficient_capacity(remaining, requested))
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: DayEntryPatch) -> Result<DayEntry, DomainError> {
        let patch = validate_patch(patch)?;

        match self.entries.rebook(id, patch).await? {
            None => Err(DomainError::not_found("day entry", id)),
            Some(BookingOutcome::Booked(entry)) => {
                info!(entry_id = %id, "day entry updated");
                Ok(entry)
            }
            Some(BookingOutcome::Rejected {
                remaining,
                requested,
            }) => {
                warn!(entry_id = %id, remaining, requested, "update rejected, capacity exhausted");
                Err(DomainError::insufficient_capacity(remaining, requested))
            }
        }
    }

    /// `false` when nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let removed = self.entries.delete(id).await?;
        if removed {
            info!(entry_id = %id, "day entry deleted");
        }
        Ok(removed)
    }

    fn validate_range(
        &self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<(Date, Date), DomainError> {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            (from, to) => {
                let missing = [(DayEntryFields::FROM, from), (DayEntryFields::TO, to)]
                    .into_iter()
                    .filter(|(_, d)| d.is_none())
                    .map(|(field, _)| FieldIssue::new(field, "is required"))
                    .collect();
                return Err(DomainError::validation_issues(missing));
            }
        };
        if from > to {
            return Err(DomainError::validation(
                DayEntryFields::TO,
                "must not be before from",
            ));
        }
        let span = (to - from).whole_days() + 1;
        if span > i64::from(self.config.max_range_days) {
            return Err(DomainError::validation(
                DayEntryFields::TO,
                format!("range must not exceed {} days", self.config.max_range_days),
            ));
        }
        Ok((from, to))
    }
}

fn dates_between(from: Date, to: Date) -> impl Iterator<Item = Date> {
    std::iter::successors(Some(from), |d| d.next_day()).take_while(move |d| *d <= to)
}

fn validate_aw(aw: i32, issues: &mut Issues) {
    if !(0..=DayEntryFields::AW_MAX).contains(&aw) {
        issues.push(
            DayEntryFields::AW,
            format!("must be between 0 and {}", DayEntryFields::AW_MAX),
        );
    }
}

fn validate_title(title: Option<String>, issues: &mut Issues) -> Option<String> {
    let title = non_blank(title)?;
    if char_len(&title) > DayEntryFields::TITLE_MAX_CHARS {
        issues.push(
            DayEntryFields::TITLE,
            format!("must be at most {} characters", DayEntryFields::TITLE_MAX_CHARS),
        );
    }
    Some(title)
}

fn validate_work_text(text: &str, issues: &mut Issues) -> String {
    let text = text.trim();
    if char_len(text) > DayEntryFields::WORK_TEXT_MAX_CHARS {
        issues.push(
            DayEntryFields::WORK_TEXT,
            format!(
                "must be at most {} characters",
                DayEntryFields::WORK_TEXT_MAX_CHARS
            ),
        );
    }
    text.to_owned()
}

fn validate_time(
    field: &'static str,
    value: Option<String>,
    issues: &mut Issues,
) -> Option<String> {
    let value = non_blank(value)?;
    if parse_hhmm(&value).is_none() {
        issues.push(field, "must be HH:MM");
    }
    Some(value)
}

fn validate_new(new: NewDayEntry) -> Result<NewDayEntry, DomainError> {
    let mut issues = Issues::new();
    validate_aw(new.aw, &mut issues);
    let title = validate_title(new.title, &mut issues);
    let work_text = validate_work_text(&new.work_text, &mut issues);
    let drop_off = validate_time(DayEntryFields::DROP_OFF, new.drop_off, &mut issues);
    let pick_up = validate_time(DayEntryFields::PICK_UP, new.pick_up, &mut issues);
    issues.finish()?;

    Ok(NewDayEntry {
        title,
        work_text,
        drop_off,
        pick_up,
        ..new
    })
}

fn validate_patch(patch: DayEntryPatch) -> Result<DayEntryPatch, DomainError> {
    let mut issues = Issues::new();
    if let Some(aw) = patch.aw {
        validate_aw(aw, &mut issues);
    }
    let title = patch.title.map(|t| validate_title(t, &mut issues));
    let work_text = patch
        .work_text
        .as_deref()
        .map(|t| validate_work_text(t, &mut issues));
    let drop_off = patch
        .drop_off
        .map(|t| validate_time(DayEntryFields::DROP_OFF, t, &mut issues));
    let pick_up = patch
        .pick_up
        .map(|t| validate_time(DayEntryFields::PICK_UP, t, &mut issues));
    issues.finish()?;

    Ok(DayEntryPatch {
        title,
        work_text,
        drop_off,
        pick_up,
        ..patch
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn new_entry(aw: i32) -> NewDayEntry {
        NewDayEntry {
            work_day: date!(2025 - 03 - 07),
            category: Category::Mech,
            title: Some("  Inspektion  ".to_owned()),
            work_text: " Bremsen vorne ".to_owned(),
            drop_off: Some("08:00".to_owned()),
            pick_up: Some(String::new()),
            aw,
            created_by: None,
        }
    }

    #[test]
    fn new_entry_is_normalized() {
        let e = validate_new(new_entry(10)).unwrap();
        assert_eq!(e.title.as_deref(), Some("Inspektion"));
        assert_eq!(e.work_text, "Bremsen vorne");
        assert_eq!(e.pick_up, None);
    }

    #[test]
    fn new_entry_collects_every_issue() {
        let mut e = new_entry(10_001);
        e.drop_off = Some("8 Uhr".to_owned());
        e.title = Some("x".repeat(201));
        let DomainError::Validation { issues } = validate_new(e).unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["aw", "title", "drop_off"]);
    }

    #[test]
    fn negative_aw_is_rejected() {
        assert!(validate_new(new_entry(-1)).is_err());
        assert!(validate_new(new_entry(0)).is_ok());
    }

    #[test]
    fn patch_keeps_explicit_null() {
        let patch = DayEntryPatch {
            title: Some(None),
            drop_off: Some(Some("  ".to_owned())),
            ..DayEntryPatch::default()
        };
        let patch = validate_patch(patch).unwrap();
        assert_eq!(patch.title, Some(None));
        assert_eq!(patch.drop_off, Some(None));
        assert_eq!(patch.pick_up, None);
    }

    #[test]
    fn dates_between_is_inclusive() {
        let days: Vec<_> = dates_between(date!(2025 - 02 - 27), date!(2025 - 03 - 02)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[3], date!(2025 - 03 - 02));
    }
}
