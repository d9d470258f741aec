mod accounts;
mod capacity;
mod day_entries;
mod employees;
mod settings;

pub use accounts::{AccountService, SignedIn};
pub use capacity::{CapacityService, DayCapacity};
pub use day_entries::{DayAvailability, DayEntryService};
pub use employees::EmployeeService;
pub use settings::SettingsService;
