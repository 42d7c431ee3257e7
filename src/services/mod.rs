// src/services/mod.rs
pub mod aggregate;
pub mod categories;
pub mod data;
pub mod forecast;
pub mod insights;
pub mod model;
pub mod schema;
