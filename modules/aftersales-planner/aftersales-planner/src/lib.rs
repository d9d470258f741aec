//! Aftersales Planner Module
//!
//! Workshop capacity planning: the employee roster, the per-day AW ledger,
//! workshop settings and login accounts. Contract types live in
//! `aftersales-planner-sdk` and are re-exported here.

pub use aftersales_planner_sdk::{
    CapacityBucket, Category, DayEntry, DayEntryPatch, Employee, EmployeePatch, NewDayEntry,
    NewEmployee, OpeningHours, Settings,
};

pub mod module;
pub use module::{AftersalesPlanner, AuthSettings};

pub mod config;
pub use config::PlannerConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
