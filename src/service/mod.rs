//! Organization engines
//!
//! [`OrganizationService`] owns the rules: the department tree (hierarchy),
//! membership, the ungrouped reconciler, the organization profile and the
//! directory lookups that join with the external user services.

use std::sync::Arc;

use crate::client::{UserAdminService, UserProfileService};
use crate::config::OrganizationConfig;
use crate::database::OrganizationDatabase;

mod directory;
mod hierarchy;
mod membership;
mod organization;
pub mod types;
mod ungrouped;

#[cfg(test)]
pub(crate) mod testing;

pub use hierarchy::gen_department_id;

#[derive(Clone)]
pub struct OrganizationService {
    database: OrganizationDatabase,
    users: Arc<dyn UserProfileService>,
    admin: Arc<dyn UserAdminService>,
    settings: OrganizationConfig,
}

impl OrganizationService {
    pub fn new(
        database: OrganizationDatabase,
        users: Arc<dyn UserProfileService>,
        admin: Arc<dyn UserAdminService>,
        settings: OrganizationConfig,
    ) -> Self {
        Self {
            database,
            users,
            admin,
            settings,
        }
    }

    /// Create the reserved rows the engines rely on
    pub async fn bootstrap(&self) -> crate::error::AppResult<()> {
        self.database.init_ungrouped(&self.settings.ungrouped_name).await?;
        self.database.init_organization().await
    }

    pub fn database(&self) -> &OrganizationDatabase {
        &self.database
    }
}
