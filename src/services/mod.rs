// src/services/mod.rs
pub mod analyzer;
pub mod db;
pub mod google_oauth;
pub mod report;
pub mod secrets;
pub mod store;
