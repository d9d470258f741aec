pub mod day_entry;
pub mod employee;
pub mod settings;
pub mod user;
