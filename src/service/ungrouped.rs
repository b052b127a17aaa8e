//! Keeps the ungrouped bucket consistent: a user sits in it exactly when they
//! have no other membership.

use chrono::Utc;
use tracing::debug;

use super::types::UngroupedResp;
use super::OrganizationService;
use crate::entity::department::UNGROUPED_ID;
use crate::entity::department_member;
use crate::error::AppResult;

impl OrganizationService {
    /// Reconcile one user's ungrouped membership. Returns whether the user is
    /// ungrouped afterwards; safe to call any number of times.
    pub async fn add_user_to_ungrouped(&self, user_id: &str) -> AppResult<UngroupedResp> {
        let user = self.users.get_user_public_info(user_id).await?;
        let members = self
            .database
            .members_by_user_ids(std::slice::from_ref(&user.user_id))
            .await?;

        let ungrouped = match members.as_slice() {
            [] => {
                let now = Utc::now();
                self.database
                    .create_member(department_member::Model {
                        user_id: user.user_id.clone(),
                        department_id: UNGROUPED_ID.to_string(),
                        position: String::new(),
                        station: String::new(),
                        order: 0,
                        entry_time: now,
                        termination_time: None,
                        create_time: now,
                    })
                    .await?;
                debug!("User {} placed in ungrouped", user.user_id);
                true
            }
            [only] => only.department_id == UNGROUPED_ID,
            _ => {
                self.database.delete_member(&user.user_id, UNGROUPED_ID).await?;
                false
            }
        };
        Ok(UngroupedResp { ungrouped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::types::{CreateDepartmentMemberReq, CreateDepartmentReq};
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_no_membership_is_idempotent() {
        let h = crate::service::testing::harness(&["u1"]).await;

        let first = assert_ok!(h.service.add_user_to_ungrouped("u1").await);
        let second = assert_ok!(h.service.add_user_to_ungrouped("u1").await);
        assert!(first.ungrouped);
        assert!(second.ungrouped);

        let rows = h.service.database().members_by_user_ids(&["u1".to_string()]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department_id, UNGROUPED_ID);
    }

    #[tokio::test]
    async fn test_single_real_membership_is_not_ungrouped() {
        let h = crate::service::testing::harness(&["u1"]).await;
        h.service
            .create_department(CreateDepartmentReq {
                department_id: "a".into(),
                name: "A".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        h.service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        for _ in 0..2 {
            let resp = assert_ok!(h.service.add_user_to_ungrouped("u1").await);
            assert!(!resp.ungrouped);
        }
        let rows = h.service.database().members_by_user_ids(&["u1".to_string()]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_extra_ungrouped_row_is_removed() {
        let h = crate::service::testing::harness(&["u1"]).await;
        h.service
            .create_department(CreateDepartmentReq {
                department_id: "a".into(),
                name: "A".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        h.service.add_user_to_ungrouped("u1").await.unwrap();
        // Second row written directly so the reconciler sees two memberships.
        let now = Utc::now();
        h.service
            .database()
            .create_member(department_member::Model {
                user_id: "u1".into(),
                department_id: "a".into(),
                position: String::new(),
                station: String::new(),
                order: 0,
                entry_time: now,
                termination_time: None,
                create_time: now,
            })
            .await
            .unwrap();

        let resp = assert_ok!(h.service.add_user_to_ungrouped("u1").await);
        assert!(!resp.ungrouped);
        assert!(h.service.database().find_member("u1", UNGROUPED_ID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let h = crate::service::testing::harness(&[]).await;
        assert_err!(h.service.add_user_to_ungrouped("ghost").await);
    }
}
