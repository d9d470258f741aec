//! Contract types for the aftersales planner.
//!
//! Transport-agnostic data structures shared between the planner module,
//! its REST layer, and the server binary. Nothing in here performs I/O.

pub mod calendar;
pub mod errors;
pub mod models;

pub use calendar::{format_iso_date, parse_iso_date};
pub use errors::ParseEnumError;
pub use models::{
    BASE_AW_PER_DAY, BASE_MINUTES_PER_DAY, CapacityBucket, Category, DEFAULT_PERFORMANCE, DayEntry,
    DayEntryPatch, Employee, EmployeeCapacity, EmployeePatch, NewDayEntry, NewEmployee,
    OpeningHours, Settings, TimeInterval, Weekday,
};
