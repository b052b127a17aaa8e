//! Lookups that join directory rows with user profiles, plus path import

use std::collections::{HashMap, HashSet};
use tracing::info;

use super::types::*;
use super::OrganizationService;
use crate::entity::department_member;
use crate::error::{AppError, AppResult};

impl OrganizationService {
    /// Profiles and memberships of the requested users, in request order.
    /// Users without a profile or without any membership are left out.
    pub async fn get_user_in_department(&self, req: UserIdsReq) -> AppResult<UserInDepartmentResp> {
        if req.user_ids.is_empty() {
            return Err(AppError::args("userIDs is empty"));
        }
        let mut unique = HashSet::with_capacity(req.user_ids.len());
        if !req.user_ids.iter().all(|id| unique.insert(id.as_str())) {
            return Err(AppError::args("userIDs contains duplicates"));
        }

        let rows = self.database.members_by_user_ids(&req.user_ids).await?;
        let mut department_ids: Vec<String> = rows.iter().map(|m| m.department_id.clone()).collect();
        department_ids.sort();
        department_ids.dedup();

        let mut departments: HashMap<String, DepartmentNum> = HashMap::new();
        for department in self.database.departments_by_ids(&department_ids).await? {
            let num = self.get_department_member_num(&department.department_id).await?;
            departments.insert(department.department_id.clone(), DepartmentNum::new(department, num));
        }

        let mut by_user: HashMap<String, Vec<department_member::Model>> = HashMap::new();
        for row in rows {
            by_user.entry(row.user_id.clone()).or_default().push(row);
        }
        let mut profiles = self.users.map_user_full_info(&req.user_ids).await?;

        let mut users = Vec::with_capacity(req.user_ids.len());
        for user_id in &req.user_ids {
            let (Some(members), Some(user)) = (by_user.remove(user_id), profiles.remove(user_id)) else {
                continue;
            };
            let members = members
                .into_iter()
                .map(|m| {
                    let department = departments.get(&m.department_id).cloned();
                    MemberDepartment {
                        member: m.into(),
                        department,
                    }
                })
                .collect();
            users.push(DepartmentMemberUser { user, members });
        }
        Ok(UserInDepartmentResp { users })
    }

    /// Keyword search across department names, member position/station and
    /// user profiles, paged by the user service
    pub async fn get_search_department_user(
        &self,
        req: GetSearchDepartmentUserReq,
    ) -> AppResult<SearchDepartmentUserResp> {
        let pagination = req
            .pagination
            .ok_or_else(|| AppError::args("pagination is missing"))?;
        if pagination.page_number < 1 || pagination.show_number < 1 {
            return Err(AppError::args("pagination must start at page 1 with a positive size"));
        }

        let department_ids = self.database.search_department(&req.keyword).await?;
        let member_ids = self
            .database
            .search_member(&req.keyword, &department_ids)
            .await?;
        let (total, user_ids) = self
            .users
            .search_user_id(&req.keyword, &member_ids, pagination)
            .await?;

        let users = if user_ids.is_empty() {
            Vec::new()
        } else {
            self.get_user_in_department(UserIdsReq { user_ids }).await?.users
        };
        Ok(SearchDepartmentUserResp { total, users })
    }

    /// Create every missing department along each row's path
    pub async fn import_departments(&self, req: ImportDepartmentsReq) -> AppResult<ImportDepartmentsResp> {
        if req.departments.is_empty() {
            return Err(AppError::args("departments is empty"));
        }
        let mut parsed = Vec::with_capacity(req.departments.len());
        for row in req.departments {
            let names: Vec<String> = row.path.split('/').map(|s| s.trim().to_string()).collect();
            if names.iter().any(|name| name.is_empty()) {
                return Err(AppError::args(format!("invalid department path {:?}", row.path)));
            }
            parsed.push((names, row));
        }

        let mut created = 0u32;
        for (names, row) in parsed {
            let existing = self.resolve_path(&names).await?;
            let mut parent_id = existing
                .last()
                .map(|d| d.department_id.clone())
                .unwrap_or_default();
            for (index, name) in names.iter().enumerate().skip(existing.len()) {
                let last = index + 1 == names.len();
                let resp = self
                    .create_department(CreateDepartmentReq {
                        department_id: if last { row.department_id.clone() } else { String::new() },
                        name: name.clone(),
                        face_url: if last { row.face_url.clone() } else { String::new() },
                        order: if last { row.order } else { None },
                        parent_department_id: parent_id,
                    })
                    .await?;
                parent_id = resp.department_id;
                created += 1;
            }
        }
        info!("Imported {} departments", created);
        Ok(ImportDepartmentsResp { created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Pagination;
    use crate::entity::department::UNGROUPED_ID;
    use crate::service::testing::{harness, Harness};

    async fn seed(h: &Harness) {
        for (id, name) in [("eng", "Engineering"), ("ops", "Operations")] {
            h.service
                .create_department(CreateDepartmentReq {
                    department_id: id.into(),
                    name: name.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        for (user, department, position) in [
            ("u1", "eng", "backend"),
            ("u2", "eng", "frontend"),
            ("u2", "ops", "oncall"),
            ("u3", "ops", "sre"),
        ] {
            h.service
                .create_department_member(CreateDepartmentMemberReq {
                    user_id: user.into(),
                    department_id: department.into(),
                    position: position.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
    }

    fn page(show_number: i32) -> Option<Pagination> {
        Some(Pagination {
            page_number: 1,
            show_number,
        })
    }

    #[tokio::test]
    async fn test_user_in_department_keeps_request_order() {
        let h = harness(&["u1", "u2", "u3", "u4"]).await;
        seed(&h).await;

        let resp = h
            .service
            .get_user_in_department(UserIdsReq {
                user_ids: vec!["u3".into(), "ghost".into(), "u4".into(), "u2".into()],
            })
            .await
            .unwrap();
        let ids: Vec<&str> = resp.users.iter().map(|u| u.user.user_id.as_str()).collect();
        // u4 has a profile but no membership; ghost has neither.
        assert_eq!(ids, vec!["u3", "u2"]);

        let u2 = &resp.users[1];
        assert_eq!(u2.members.len(), 2);
        let eng = u2
            .members
            .iter()
            .find(|m| m.member.department_id == "eng")
            .and_then(|m| m.department.clone())
            .unwrap();
        assert_eq!(eng.member_num, 2);
    }

    #[tokio::test]
    async fn test_user_in_department_argument_errors() {
        let h = harness(&["u1"]).await;
        let err = h.service.get_user_in_department(UserIdsReq::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .get_user_in_department(UserIdsReq {
                user_ids: vec!["u1".into(), "u1".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
    }

    #[tokio::test]
    async fn test_search_by_department_name_and_position() {
        let h = harness(&["u1", "u2", "u3"]).await;
        seed(&h).await;

        let resp = h
            .service
            .get_search_department_user(GetSearchDepartmentUserReq {
                keyword: "Operations".into(),
                pagination: page(10),
            })
            .await
            .unwrap();
        assert_eq!(resp.total, 2);
        let ids: Vec<&str> = resp.users.iter().map(|u| u.user.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3"]);

        let resp = h
            .service
            .get_search_department_user(GetSearchDepartmentUserReq {
                keyword: "backend".into(),
                pagination: page(1),
            })
            .await
            .unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.users[0].user.user_id, "u1");
    }

    #[tokio::test]
    async fn test_search_matches_profile_nickname() {
        let h = harness(&["u1", "u2", "u3"]).await;
        seed(&h).await;
        h.users.add("u9", "Zelda");

        let resp = h
            .service
            .get_search_department_user(GetSearchDepartmentUserReq {
                keyword: "Zel".into(),
                pagination: page(10),
            })
            .await
            .unwrap();
        // Found by profile, but without memberships there is nothing to expand.
        assert_eq!(resp.total, 1);
        assert!(resp.users.is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_pagination() {
        let h = harness(&[]).await;
        let err = h
            .service
            .get_search_department_user(GetSearchDepartmentUserReq {
                keyword: "x".into(),
                pagination: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .get_search_department_user(GetSearchDepartmentUserReq {
                keyword: "x".into(),
                pagination: page(0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
    }

    #[tokio::test]
    async fn test_import_creates_missing_segments_once() {
        let h = harness(&[]).await;
        let resp = h
            .service
            .import_departments(ImportDepartmentsReq {
                departments: vec![
                    ImportDepartmentRow {
                        path: "Dev/Backend/Go".into(),
                        department_id: "go".into(),
                        order: Some(5),
                        ..Default::default()
                    },
                    ImportDepartmentRow {
                        path: "Dev / Backend / Rust".into(),
                        ..Default::default()
                    },
                    ImportDepartmentRow {
                        path: "Dev/Backend".into(),
                        ..Default::default()
                    },
                ],
            })
            .await
            .unwrap();
        assert_eq!(resp.created, 4);

        let go = h.service.database().get_department("go").await.unwrap();
        assert_eq!(go.order, 5);
        let chain = h
            .service
            .get_department_parents(DepartmentIdReq { department_id: "go".into() })
            .await
            .unwrap();
        let names: Vec<&str> = chain.departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Go", "Backend", "Dev"]);
    }

    #[tokio::test]
    async fn test_import_rejects_empty_segment() {
        let h = harness(&[]).await;
        let err = h
            .service
            .import_departments(ImportDepartmentsReq {
                departments: vec![
                    ImportDepartmentRow {
                        path: "Dev".into(),
                        ..Default::default()
                    },
                    ImportDepartmentRow {
                        path: "Dev//Go".into(),
                        ..Default::default()
                    },
                ],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
        // Rows are validated before anything is written.
        let top = h.service.database().child_departments("").await.unwrap();
        assert!(top.iter().all(|d| d.department_id == UNGROUPED_ID));
    }
}
