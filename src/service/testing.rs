//! Service fixture over an in-memory database and fake user services

use std::sync::Arc;

use super::OrganizationService;
use crate::client::fake::{FakeAdmin, FakeUsers};
use crate::config::OrganizationConfig;
use crate::database::OrganizationDatabase;
use crate::db::memory_database;

pub struct Harness {
    pub service: OrganizationService,
    pub users: Arc<FakeUsers>,
    pub admin: Arc<FakeAdmin>,
}

/// A bootstrapped service whose user service knows `user_ids`
pub async fn harness(user_ids: &[&str]) -> Harness {
    let users = Arc::new(FakeUsers::with_users(user_ids));
    let admin = Arc::new(FakeAdmin::default());
    let service = OrganizationService::new(
        OrganizationDatabase::new(memory_database().await),
        users.clone(),
        admin.clone(),
        OrganizationConfig::default(),
    );
    service.bootstrap().await.unwrap();
    Harness { service, users, admin }
}
