pub mod capacity;
pub mod error;
pub mod fields;
pub mod models;
pub mod opening;
pub mod repo;
pub mod service;
