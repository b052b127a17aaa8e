use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{error, info};

use super::types::*;
use super::OrganizationService;
use crate::database::{from_millis, MemberUpdate};
use crate::entity::department::UNGROUPED_ID;
use crate::entity::department_member;
use crate::error::{AppError, AppResult};

fn millis(ms: i64, field: &str) -> AppResult<chrono::DateTime<Utc>> {
    from_millis(ms).ok_or_else(|| AppError::args(format!("{} out of range: {}", field, ms)))
}

impl OrganizationService {
    pub async fn create_department_member(&self, req: CreateDepartmentMemberReq) -> AppResult<()> {
        if req.user_id.is_empty() {
            return Err(AppError::args("userID is empty"));
        }
        if req.department_id == UNGROUPED_ID {
            return Err(AppError::args("can not add user to the ungrouped department"));
        }
        self.users.get_user_public_info(&req.user_id).await?;
        self.database.get_department(&req.department_id).await?;
        if self
            .database
            .find_member(&req.user_id, &req.department_id)
            .await?
            .is_some()
        {
            return Err(AppError::args(format!(
                "user {} is already a member of department {}",
                req.user_id, req.department_id
            )));
        }

        let entry_time = millis(req.entry_time, "entryTime")?;
        let termination_time = if req.termination_time > req.entry_time {
            Some(millis(req.termination_time, "terminationTime")?)
        } else {
            None
        };
        self.database
            .create_member(department_member::Model {
                user_id: req.user_id.clone(),
                department_id: req.department_id.clone(),
                position: req.position,
                station: req.station,
                order: req.order.unwrap_or(0),
                entry_time,
                termination_time,
                create_time: Utc::now(),
            })
            .await?;
        info!("Member added: user_id={} department_id={}", req.user_id, req.department_id);

        self.add_user_to_ungrouped(&req.user_id).await?;
        Ok(())
    }

    pub async fn update_user_in_department(&self, req: UpdateUserInDepartmentReq) -> AppResult<()> {
        if req.department_id.is_empty() {
            return Err(AppError::args("departmentID is empty"));
        }
        if req.user_id.is_empty() {
            return Err(AppError::args("userID is empty"));
        }
        let update = MemberUpdate {
            position: req.position,
            station: req.station,
            order: req.order,
            entry_time: req.entry_time.map(|ms| millis(ms, "entryTime")).transpose()?,
            termination_time: match req.termination_time {
                None => None,
                Some(0) => Some(None),
                Some(ms) => Some(Some(millis(ms, "terminationTime")?)),
            },
        };
        if update.is_empty() {
            return Err(AppError::args("no field to update"));
        }
        self.database.get_member(&req.user_id, &req.department_id).await?;
        self.database
            .update_member(&req.user_id, &req.department_id, update)
            .await
    }

    pub async fn delete_user_in_department(&self, req: UserDepartmentReq) -> AppResult<()> {
        if req.department_id == UNGROUPED_ID {
            return Err(AppError::args("can not delete user in the ungrouped department"));
        }
        self.database
            .delete_member(&req.user_id, &req.department_id)
            .await?;
        info!("Member removed: user_id={} department_id={}", req.user_id, req.department_id);

        self.add_user_to_ungrouped(&req.user_id).await?;
        Ok(())
    }

    /// Batch move of memberships. New rows go in first; a failed delete of a
    /// source row leaves the user in both departments rather than neither.
    pub async fn move_user_department(&self, req: MoveUserDepartmentReq) -> AppResult<()> {
        if req.moves.is_empty() {
            return Err(AppError::args("move list is empty"));
        }

        let mut from_ungrouped = BTreeSet::new();
        let mut sources: HashMap<(String, String), department_member::Model> = HashMap::new();
        for mv in &req.moves {
            if mv.department_id == UNGROUPED_ID {
                return Err(AppError::args("can not move user to the ungrouped department"));
            }
            if mv.department_id == mv.current_department_id {
                return Err(AppError::args("destination equals the current department"));
            }
            if mv.current_department_id == UNGROUPED_ID {
                from_ungrouped.insert(mv.user_id.clone());
            }
            let key = (mv.current_department_id.clone(), mv.user_id.clone());
            if sources.contains_key(&key) {
                continue;
            }
            let member = self
                .database
                .get_member(&mv.user_id, &mv.current_department_id)
                .await?;
            sources.insert(key, member);
        }

        let destinations: Vec<String> = req
            .moves
            .iter()
            .map(|mv| mv.department_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let found: HashSet<String> = self
            .database
            .departments_by_ids(&destinations)
            .await?
            .into_iter()
            .map(|d| d.department_id)
            .collect();
        if let Some(missing) = destinations.iter().find(|id| !found.contains(*id)) {
            return Err(AppError::not_found(format!("department {} not found", missing)));
        }

        let now = Utc::now();
        let mut rows = Vec::with_capacity(req.moves.len());
        for mv in &req.moves {
            let key = (mv.current_department_id.clone(), mv.user_id.clone());
            let Some(source) = sources.get(&key) else {
                continue;
            };
            rows.push(department_member::Model {
                user_id: source.user_id.clone(),
                department_id: mv.department_id.clone(),
                position: source.position.clone(),
                station: source.station.clone(),
                order: source.order,
                entry_time: source.entry_time,
                termination_time: source.termination_time,
                create_time: now,
            });
        }
        self.database.create_members(rows).await?;

        for source in sources.values() {
            if let Err(e) = self
                .database
                .delete_member(&source.user_id, &source.department_id)
                .await
            {
                error!(
                    "Delete moved member failed: user_id={} department_id={} err={}",
                    source.user_id, source.department_id, e
                );
            }
        }

        for user_id in from_ungrouped {
            if let Err(e) = self.add_user_to_ungrouped(&user_id).await {
                error!("AddUserToUngrouped after move failed: user_id={} err={}", user_id, e);
            }
        }
        info!("Moved {} memberships", req.moves.len());
        Ok(())
    }

    /// Member counterpart of `sort_department_list`, scoped to one department
    pub async fn sort_organization_user_list(&self, req: SortOrganizationUserListReq) -> AppResult<SortResp> {
        if req.department_id.is_empty() {
            return Err(AppError::args("departmentID is empty"));
        }
        if req.user_id == req.next_user_id {
            return Err(AppError::args("userID is equal to nextUserID"));
        }
        self.database.get_department(&req.department_id).await?;
        self.database.get_member(&req.user_id, &req.department_id).await?;

        let max = self.database.max_member_order(&req.department_id).await?;
        let order = if req.next_user_id.is_empty() {
            max.checked_add(1).ok_or_else(|| AppError::args("order overflow"))?
        } else {
            let next = self
                .database
                .get_member(&req.next_user_id, &req.department_id)
                .await?;
            if max == i32::MAX {
                return Err(AppError::args("order overflow"));
            }
            self.database
                .incr_member_order(&req.department_id, next.order)
                .await?;
            next.order
        };

        self.database
            .update_member(
                &req.user_id,
                &req.department_id,
                MemberUpdate {
                    order: Some(order),
                    ..Default::default()
                },
            )
            .await?;
        Ok(SortResp { order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{harness, Harness};

    async fn dept(h: &Harness, id: &str) {
        h.service
            .create_department(CreateDepartmentReq {
                department_id: id.to_string(),
                name: id.to_uppercase(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn join(h: &Harness, user: &str, department: &str, order: i32) {
        h.service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: user.to_string(),
                department_id: department.to_string(),
                position: "engineer".to_string(),
                order: Some(order),
                entry_time: 1_000,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn departments_of(h: &Harness, user: &str) -> Vec<String> {
        let mut ids: Vec<String> = h
            .service
            .database()
            .members_by_user_ids(&[user.to_string()])
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.department_id)
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_create_member_replaces_ungrouped() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        dept(&h, "b").await;

        h.service.add_user_to_ungrouped("u1").await.unwrap();
        assert_eq!(departments_of(&h, "u1").await, vec![UNGROUPED_ID]);

        join(&h, "u1", "a", 0).await;
        assert_eq!(departments_of(&h, "u1").await, vec!["a"]);

        join(&h, "u1", "b", 0).await;
        assert_eq!(departments_of(&h, "u1").await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_create_member_termination_only_after_entry() {
        let h = harness(&["u1", "u2"]).await;
        dept(&h, "a").await;

        for (user, termination) in [("u1", 500), ("u2", 2_000)] {
            h.service
                .create_department_member(CreateDepartmentMemberReq {
                    user_id: user.into(),
                    department_id: "a".into(),
                    entry_time: 1_000,
                    termination_time: termination,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let db = h.service.database();
        assert!(db.get_member("u1", "a").await.unwrap().termination_time.is_none());
        let kept = db.get_member("u2", "a").await.unwrap().termination_time.unwrap();
        assert_eq!(kept.timestamp_millis(), 2_000);
    }

    #[tokio::test]
    async fn test_create_member_rejections() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        join(&h, "u1", "a", 0).await;

        let err = h
            .service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "u1".into(),
                department_id: UNGROUPED_ID.into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "ghost".into(),
                department_id: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = h
            .service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "u1".into(),
                department_id: "nowhere".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_last_membership_falls_back_to_ungrouped() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        join(&h, "u1", "a", 0).await;

        h.service
            .delete_user_in_department(UserDepartmentReq {
                user_id: "u1".into(),
                department_id: "a".into(),
            })
            .await
            .unwrap();
        assert_eq!(departments_of(&h, "u1").await, vec![UNGROUPED_ID]);

        let err = h
            .service
            .delete_user_in_department(UserDepartmentReq {
                user_id: "u1".into(),
                department_id: UNGROUPED_ID.into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
    }

    #[tokio::test]
    async fn test_delete_department_moves_members_to_ungrouped() {
        let h = harness(&["u1", "u2"]).await;
        dept(&h, "a").await;
        dept(&h, "b").await;
        join(&h, "u1", "a", 0).await;
        join(&h, "u2", "a", 0).await;
        join(&h, "u2", "b", 0).await;

        h.service
            .delete_department(DepartmentIdsReq { department_ids: vec!["a".into()] })
            .await
            .unwrap();

        assert_eq!(departments_of(&h, "u1").await, vec![UNGROUPED_ID]);
        assert_eq!(departments_of(&h, "u2").await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_update_member() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        h.service
            .create_department_member(CreateDepartmentMemberReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                entry_time: 1_000,
                termination_time: 9_000,
                ..Default::default()
            })
            .await
            .unwrap();

        h.service
            .update_user_in_department(UpdateUserInDepartmentReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                station: Some("desk 4".into()),
                termination_time: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();

        let member = h.service.database().get_member("u1", "a").await.unwrap();
        assert_eq!(member.station, "desk 4");
        assert!(member.termination_time.is_none());

        let err = h
            .service
            .update_user_in_department(UpdateUserInDepartmentReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .update_user_in_department(UpdateUserInDepartmentReq {
                user_id: "u1".into(),
                department_id: "b".into(),
                order: Some(3),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_move_carries_fields() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        dept(&h, "b").await;
        join(&h, "u1", "a", 7).await;

        h.service
            .move_user_department(MoveUserDepartmentReq {
                moves: vec![MoveUserDepartment {
                    user_id: "u1".into(),
                    department_id: "b".into(),
                    current_department_id: "a".into(),
                }],
            })
            .await
            .unwrap();

        assert_eq!(departments_of(&h, "u1").await, vec!["b"]);
        let moved = h.service.database().get_member("u1", "b").await.unwrap();
        assert_eq!(moved.position, "engineer");
        assert_eq!(moved.order, 7);
        assert_eq!(moved.entry_time.timestamp_millis(), 1_000);
    }

    #[tokio::test]
    async fn test_move_out_of_ungrouped() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        h.service.add_user_to_ungrouped("u1").await.unwrap();

        h.service
            .move_user_department(MoveUserDepartmentReq {
                moves: vec![MoveUserDepartment {
                    user_id: "u1".into(),
                    department_id: "a".into(),
                    current_department_id: UNGROUPED_ID.into(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(departments_of(&h, "u1").await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_move_rejections() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        dept(&h, "b").await;
        join(&h, "u1", "a", 0).await;

        let one = |dst: &str, src: &str| MoveUserDepartmentReq {
            moves: vec![MoveUserDepartment {
                user_id: "u1".into(),
                department_id: dst.into(),
                current_department_id: src.into(),
            }],
        };

        let err = h.service.move_user_department(MoveUserDepartmentReq::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
        let err = h.service.move_user_department(one(UNGROUPED_ID, "a")).await.unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
        let err = h.service.move_user_department(one("a", "a")).await.unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
        let err = h.service.move_user_department(one("a", "b")).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(departments_of(&h, "u1").await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_sort_members() {
        let h = harness(&["u1", "u2", "u3"]).await;
        dept(&h, "a").await;
        join(&h, "u1", "a", 10).await;
        join(&h, "u2", "a", 20).await;
        join(&h, "u3", "a", 30).await;

        let resp = h
            .service
            .sort_organization_user_list(SortOrganizationUserListReq {
                user_id: "u1".into(),
                department_id: "a".into(),
                next_user_id: "u3".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.order, 30);

        let db = h.service.database();
        assert_eq!(db.get_member("u1", "a").await.unwrap().order, 30);
        assert_eq!(db.get_member("u2", "a").await.unwrap().order, 20);
        assert_eq!(db.get_member("u3", "a").await.unwrap().order, 31);

        let resp = h
            .service
            .sort_organization_user_list(SortOrganizationUserListReq {
                user_id: "u2".into(),
                department_id: "a".into(),
                next_user_id: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(resp.order, 32);

        let err = h
            .service
            .sort_organization_user_list(SortOrganizationUserListReq {
                user_id: "u1".into(),
                department_id: String::new(),
                next_user_id: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
    }

    #[tokio::test]
    async fn test_move_to_unknown_department_keeps_source() {
        let h = harness(&["u1"]).await;
        dept(&h, "a").await;
        join(&h, "u1", "a", 0).await;

        let err = h
            .service
            .move_user_department(MoveUserDepartmentReq {
                moves: vec![MoveUserDepartment {
                    user_id: "u1".into(),
                    department_id: "ghost".into(),
                    current_department_id: "a".into(),
                }],
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(departments_of(&h, "u1").await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_sort_members_rejects_order_overflow() {
        let h = harness(&["u1", "u2"]).await;
        dept(&h, "a").await;
        join(&h, "u1", "a", i32::MAX).await;
        join(&h, "u2", "a", 1).await;

        for next in ["", "u1"] {
            let err = h
                .service
                .sort_organization_user_list(SortOrganizationUserListReq {
                    user_id: "u2".into(),
                    department_id: "a".into(),
                    next_user_id: next.into(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Args(_)));
        }

        let db = h.service.database();
        assert_eq!(db.get_member("u1", "a").await.unwrap().order, i32::MAX);
        assert_eq!(db.get_member("u2", "a").await.unwrap().order, 1);
    }
}
