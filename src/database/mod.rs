//! Persistence primitives over the organization tables.
//!
//! Everything here is a single query or a short transaction; the tree and
//! membership rules live in [`crate::service`].

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

mod department;
mod member;
mod organization;

pub use department::DepartmentUpdate;
pub use member::MemberUpdate;
pub use organization::OrganizationUpdate;

/// Handle to the organization tables
#[derive(Clone)]
pub struct OrganizationDatabase {
    db: DatabaseConnection,
}

impl OrganizationDatabase {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Convert Unix milliseconds from the wire into a UTC timestamp
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
