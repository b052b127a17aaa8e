//! Orgdir - an organizational directory service
//!
//! This crate provides the department hierarchy, department membership, the
//! ungrouped bucket and the organization profile, served as JSON over HTTP.

pub mod client;
pub mod config;
pub mod database;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
