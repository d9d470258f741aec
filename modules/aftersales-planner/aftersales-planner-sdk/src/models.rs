//! Public models for the aftersales planner.
//!
//! These are transport-agnostic data structures that define the contract
//! between the planner module and its consumers. Value types that are
//! persisted as JSON (`OpeningHours` and friends) carry serde derives; the
//! entity types are mapped by the REST and storage layers explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::errors::ParseEnumError;

/// Work units (AW) a 100% employee delivers in one day.
pub const BASE_AW_PER_DAY: i64 = 96;

/// Working minutes of a 100% employee in one day.
pub const BASE_MINUTES_PER_DAY: i64 = 8 * 60;

/// Performance assumed when none is given.
pub const DEFAULT_PERFORMANCE: i32 = 100;

/// Workshop discipline an employee works in and a day entry books against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "MECH")]
    Mech,
    #[serde(rename = "BODY")]
    Body,
    #[serde(rename = "PREP")]
    Prep,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Mech, Self::Body, Self::Prep];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mech => "MECH",
            Self::Body => "BODY",
            Self::Prep => "PREP",
        }
    }

    /// Stable index, used to derive per-bucket lock keys.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::Mech => 0,
            Self::Body => 1,
            Self::Prep => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MECH" => Ok(Self::Mech),
            "BODY" => Ok(Self::Body),
            "PREP" => Ok(Self::Prep),
            other => Err(ParseEnumError::new("category", other)),
        }
    }
}

/// A mechanic (or other workshop employee).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    /// Percentage of the baseline daily output, nominally 0..=300.
    pub performance: i32,
}

/// Data for creating a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub category: Category,
    pub performance: i32,
}

/// Partial update data for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub performance: Option<i32>,
}

impl EmployeePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.performance.is_none()
    }
}

/// A booked job consuming AW capacity on one day in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub id: Uuid,
    pub work_day: Date,
    pub category: Category,
    pub title: Option<String>,
    pub work_text: String,
    /// Drop-off time of day, `HH:MM`.
    pub drop_off: Option<String>,
    /// Pick-up time of day, `HH:MM`.
    pub pick_up: Option<String>,
    pub aw: i32,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Data for booking a new day entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDayEntry {
    pub work_day: Date,
    pub category: Category,
    pub title: Option<String>,
    pub work_text: String,
    pub drop_off: Option<String>,
    pub pick_up: Option<String>,
    pub aw: i32,
    pub created_by: Option<Uuid>,
}

/// Partial update data for a day entry.
///
/// Nullable columns use `Option<Option<_>>`: the outer `None` leaves the
/// column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayEntryPatch {
    pub work_day: Option<Date>,
    pub category: Option<Category>,
    pub title: Option<Option<String>>,
    pub work_text: Option<String>,
    pub drop_off: Option<Option<String>>,
    pub pick_up: Option<Option<String>>,
    pub aw: Option<i32>,
}

impl DayEntryPatch {
    /// Whether applying the patch can change the capacity an entry consumes.
    #[must_use]
    pub fn touches_capacity(&self) -> bool {
        self.work_day.is_some() || self.category.is_some() || self.aw.is_some()
    }

    /// Apply the patch on top of an existing entry.
    #[must_use]
    pub fn apply(self, mut entry: DayEntry) -> DayEntry {
        if let Some(work_day) = self.work_day {
            entry.work_day = work_day;
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(work_text) = self.work_text {
            entry.work_text = work_text;
        }
        if let Some(drop_off) = self.drop_off {
            entry.drop_off = drop_off;
        }
        if let Some(pick_up) = self.pick_up {
            entry.pick_up = pick_up;
        }
        if let Some(aw) = self.aw {
            entry.aw = aw;
        }
        entry
    }
}

/// Effective daily output of one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmployeeCapacity {
    pub aw: i64,
    pub minutes: i64,
}

/// Capacity and consumption of one (day, category) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapacityBucket {
    pub capacity: i64,
    pub used: i64,
}

impl CapacityBucket {
    #[must_use]
    pub const fn new(capacity: i64, used: i64) -> Self {
        Self { capacity, used }
    }

    /// Signed `capacity - used`; negative means overbooked.
    #[must_use]
    pub const fn delta(self) -> i64 {
        self.capacity - self.used
    }

    /// Free AW for display, never below zero.
    #[must_use]
    pub const fn remaining(self) -> i64 {
        let delta = self.delta();
        if delta > 0 { delta } else { 0 }
    }

    #[must_use]
    pub const fn is_overbooked(self) -> bool {
        self.delta() < 0
    }
}

/// Day of the week as used in opening-hours keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }
}

impl From<time::Weekday> for Weekday {
    fn from(day: time::Weekday) -> Self {
        match day {
            time::Weekday::Monday => Self::Mon,
            time::Weekday::Tuesday => Self::Tue,
            time::Weekday::Wednesday => Self::Wed,
            time::Weekday::Thursday => Self::Thu,
            time::Weekday::Friday => Self::Fri,
            time::Weekday::Saturday => Self::Sat,
            time::Weekday::Sunday => Self::Sun,
        }
    }
}

impl FromStr for Weekday {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("weekday", s))
    }
}

/// One opening interval, both ends `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

impl TimeInterval {
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Weekly opening schedule plus closed dates.
///
/// Serialized flat, one key per weekday plus `holidays`:
/// `{"mon": [{"start": "07:30", "end": "17:00"}], ..., "holidays": ["2025-12-24"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(flatten)]
    pub days: BTreeMap<Weekday, Vec<TimeInterval>>,
    /// Closed dates, `YYYY-MM-DD`.
    #[serde(default)]
    pub holidays: Vec<String>,
}

impl Default for OpeningHours {
    fn default() -> Self {
        let days = Weekday::ALL
            .into_iter()
            .map(|day| {
                let intervals = match day {
                    Weekday::Sat | Weekday::Sun => Vec::new(),
                    _ => vec![TimeInterval::new("07:30", "17:00")],
                };
                (day, intervals)
            })
            .collect();
        Self {
            days,
            holidays: Vec::new(),
        }
    }
}

/// Workshop-wide configuration (single row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timezone: String,
    pub opening: OpeningHours,
}

impl Settings {
    pub const DEFAULT_TIMEZONE: &'static str = "Europe/Berlin";
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: Self::DEFAULT_TIMEZONE.to_owned(),
            opening: OpeningHours::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_wire_names() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("mech".parse::<Category>().is_err());
        assert_eq!(serde_json::to_string(&Category::Body).unwrap(), "\"BODY\"");
    }

    #[test]
    fn bucket_keeps_signed_delta_but_clamps_remaining() {
        let b = CapacityBucket::new(96, 120);
        assert_eq!(b.delta(), -24);
        assert_eq!(b.remaining(), 0);
        assert!(b.is_overbooked());

        let b = CapacityBucket::new(96, 50);
        assert_eq!(b.remaining(), 46);
        assert!(!b.is_overbooked());
    }

    #[test]
    fn patch_apply_distinguishes_absent_from_null() {
        let entry = DayEntry {
            id: Uuid::nil(),
            work_day: Date::MIN,
            category: Category::Mech,
            title: Some("Inspektion".to_owned()),
            work_text: "Oelwechsel".to_owned(),
            drop_off: Some("08:00".to_owned()),
            pick_up: None,
            aw: 10,
            created_by: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let patch = DayEntryPatch {
            title: Some(None),
            aw: Some(12),
            ..DayEntryPatch::default()
        };
        assert!(patch.touches_capacity());
        let updated = patch.apply(entry);
        assert_eq!(updated.title, None);
        assert_eq!(updated.drop_off.as_deref(), Some("08:00"));
        assert_eq!(updated.aw, 12);
    }

    #[test]
    fn default_opening_serializes_flat() {
        let json = serde_json::to_value(OpeningHours::default()).unwrap();
        assert_eq!(json["mon"][0]["start"], "07:30");
        assert_eq!(json["sat"], serde_json::json!([]));
        assert_eq!(json["holidays"], serde_json::json!([]));
    }
}
