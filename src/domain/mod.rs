pub mod models;
pub mod schedule;
pub mod store;
