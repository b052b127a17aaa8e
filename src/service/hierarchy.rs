//! Department tree: creation, patching, splice-out deletion, ordering and the
//! upward/downward walks. Every walk carries a seen-set; meeting a department
//! twice means the parent pointers form a ring, which is reported as an
//! internal error instead of looping.

use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{error, info};
use uuid::Uuid;

use super::types::*;
use super::OrganizationService;
use crate::database::DepartmentUpdate;
use crate::entity::department::{self, UNGROUPED_ID};
use crate::error::{AppError, AppResult};

/// Random 128-bit department ID, hex encoded
pub fn gen_department_id() -> String {
    hex::encode(Uuid::new_v4().as_bytes())
}

fn ring_error(department_id: &str) -> AppError {
    AppError::internal(format!("department ring detected at {}", department_id))
}

impl OrganizationService {
    pub async fn create_department(&self, req: CreateDepartmentReq) -> AppResult<CreateDepartmentResp> {
        if req.name.is_empty() {
            return Err(AppError::args("name is empty"));
        }
        let department_id = if req.department_id.is_empty() {
            gen_department_id()
        } else {
            req.department_id
        };
        if department_id == UNGROUPED_ID {
            return Err(AppError::args("departmentID is the ungrouped department"));
        }
        let parent_id = req.parent_department_id;

        let mut lookup = vec![department_id.clone()];
        if !parent_id.is_empty() {
            if parent_id == department_id {
                return Err(AppError::args("departmentID is equal to parentDepartmentID"));
            }
            if parent_id == UNGROUPED_ID {
                return Err(AppError::args("the ungrouped department cannot have sub departments"));
            }
            lookup.push(parent_id.clone());
        }

        let existing = self.database.departments_by_ids(&lookup).await?;
        if existing.iter().any(|d| d.department_id == department_id) {
            return Err(AppError::args(format!("department {} already exists", department_id)));
        }
        if !parent_id.is_empty() && !existing.iter().any(|d| d.department_id == parent_id) {
            return Err(AppError::not_found(format!("parent department {} not found", parent_id)));
        }

        self.database
            .create_department(department::Model {
                department_id: department_id.clone(),
                name: req.name,
                face_url: req.face_url,
                order: req.order.unwrap_or(self.settings.default_department_order),
                parent_department_id: parent_id,
                create_time: Utc::now(),
            })
            .await?;
        info!("Department created: {}", department_id);

        Ok(CreateDepartmentResp { department_id })
    }

    pub async fn update_department(&self, req: UpdateDepartmentReq) -> AppResult<()> {
        if req.department_id.is_empty() {
            return Err(AppError::args("departmentID is empty"));
        }
        if matches!(req.name.as_deref(), Some("")) {
            return Err(AppError::args("name is empty"));
        }
        let update = DepartmentUpdate {
            name: req.name,
            face_url: req.face_url,
            parent_department_id: req.parent_department_id,
            order: req.order,
        };
        if update.is_empty() {
            return Err(AppError::args("no field to update"));
        }

        let new_parent = update
            .parent_department_id
            .clone()
            .filter(|parent| !parent.is_empty());
        if req.department_id == UNGROUPED_ID && new_parent.is_some() {
            return Err(AppError::args("the ungrouped department cannot be moved"));
        }

        let mut lookup = vec![req.department_id.clone()];
        if let Some(parent) = &new_parent {
            if *parent == req.department_id {
                return Err(AppError::args("departmentID is equal to parentDepartmentID"));
            }
            if parent == UNGROUPED_ID {
                return Err(AppError::args("the ungrouped department cannot have sub departments"));
            }
            lookup.push(parent.clone());
        }
        let found = self.database.departments_by_ids(&lookup).await?;
        if found.len() != lookup.len() {
            return Err(AppError::not_found(format!("department not found in {:?}", lookup)));
        }

        if let Some(parent) = &new_parent {
            // The new parent must not sit below the department being moved.
            let chain = self.department_parents(parent).await?;
            if chain.iter().any(|d| d.department_id == req.department_id) {
                return Err(AppError::args(format!(
                    "department {} cannot move under its descendant {}",
                    req.department_id, parent
                )));
            }
        }

        self.database.update_department(&req.department_id, update).await
    }

    pub async fn delete_department(&self, req: DepartmentIdsReq) -> AppResult<()> {
        if req.department_ids.is_empty() {
            return Err(AppError::args("departmentIDs is empty"));
        }
        if req.department_ids.iter().any(|id| id == UNGROUPED_ID) {
            return Err(AppError::args("can not delete the ungrouped department"));
        }

        let departments = self.database.departments_by_ids(&req.department_ids).await?;
        if departments.is_empty() {
            return Err(AppError::not_found(format!(
                "departments {:?} not found",
                req.department_ids
            )));
        }

        // Children of a deleted department go to its nearest surviving ancestor,
        // which skips over parents deleted in the same call.
        let parent_of: HashMap<&str, &str> = departments
            .iter()
            .map(|d| (d.department_id.as_str(), d.parent_department_id.as_str()))
            .collect();
        let mut reparent = Vec::with_capacity(departments.len());
        for department in &departments {
            let mut target = department.parent_department_id.as_str();
            let mut seen = HashSet::from([department.department_id.as_str()]);
            while let Some(&next) = parent_of.get(target) {
                if !seen.insert(target) {
                    return Err(ring_error(target));
                }
                target = next;
            }
            reparent.push((department.department_id.clone(), target.to_string()));
        }

        let department_ids: Vec<String> = departments.iter().map(|d| d.department_id.clone()).collect();
        let members = self.database.members_by_department_ids(&department_ids).await?;

        self.database
            .delete_departments(reparent, department_ids.clone())
            .await?;
        info!("Departments deleted: {:?}", department_ids);

        let mut user_ids: Vec<String> = members.into_iter().map(|m| m.user_id).collect();
        user_ids.sort();
        user_ids.dedup();
        for user_id in user_ids {
            if let Err(e) = self.add_user_to_ungrouped(&user_id).await {
                error!("AddUserToUngrouped after department delete failed: user_id={} err={}", user_id, e);
            }
        }
        Ok(())
    }

    /// Existing departments among the IDs; the organization itself when empty
    pub async fn get_department(&self, req: DepartmentIdsReq) -> AppResult<DepartmentsResp> {
        if req.department_ids.is_empty() {
            let org = self.database.get_organization().await?;
            return Ok(DepartmentsResp {
                departments: vec![Department::from(&org)],
            });
        }
        let departments = self.database.departments_by_ids(&req.department_ids).await?;
        Ok(DepartmentsResp {
            departments: departments.into_iter().map(Department::from).collect(),
        })
    }

    pub async fn get_department_parents(&self, req: DepartmentIdReq) -> AppResult<DepartmentsResp> {
        let chain = self.department_parents(&req.department_id).await?;
        Ok(DepartmentsResp {
            departments: chain.into_iter().map(Department::from).collect(),
        })
    }

    /// The department and its ancestors, leaf first. Unknown IDs give an empty
    /// chain and a missing parent ends the walk.
    pub(crate) async fn department_parents(&self, department_id: &str) -> AppResult<Vec<department::Model>> {
        let Some(first) = self.database.find_department(department_id).await? else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::from([first.department_id.clone()]);
        let mut chain = vec![first];
        loop {
            let parent_id = match chain.last() {
                Some(last) if !last.is_root() => last.parent_department_id.clone(),
                _ => break,
            };
            let Some(parent) = self.database.find_department(&parent_id).await? else {
                break;
            };
            if !seen.insert(parent.department_id.clone()) {
                error!("Department ring detected while walking up from {}", department_id);
                return Err(ring_error(&parent.department_id));
            }
            chain.push(parent);
        }
        Ok(chain)
    }

    /// Resolve names level by level from the root; stops at the first miss
    pub async fn get_department_by_name(&self, req: GetDepartmentByNameReq) -> AppResult<DepartmentsResp> {
        if req.names.is_empty() {
            return Err(AppError::args("names is empty"));
        }
        let chain = self.resolve_path(&req.names).await?;
        Ok(DepartmentsResp {
            departments: chain.into_iter().map(Department::from).collect(),
        })
    }

    pub(crate) async fn resolve_path(&self, names: &[String]) -> AppResult<Vec<department::Model>> {
        let mut chain = Vec::with_capacity(names.len());
        let mut parent_id = String::new();
        for name in names {
            match self.database.department_by_name(name, &parent_id).await? {
                Some(department) => {
                    parent_id = department.department_id.clone();
                    chain.push(department);
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// Distinct members of the department and everything below it; every
    /// member of the organization when `department_id` is empty
    pub async fn get_department_member_num(&self, department_id: &str) -> AppResult<u64> {
        if department_id.is_empty() {
            return self.database.member_count(None).await;
        }
        let ids = self.subtree_ids(department_id).await?;
        self.database.member_count(Some(&ids)).await
    }

    /// Breadth-first collection of `department_id` and all its descendants
    async fn subtree_ids(&self, department_id: &str) -> AppResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut queue = VecDeque::from([department_id.to_string()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                error!("Department ring detected below {}", department_id);
                return Err(ring_error(&id));
            }
            for child in self.database.child_departments(&id).await? {
                queue.push_back(child.department_id);
            }
            ids.push(id);
        }
        Ok(ids)
    }

    pub async fn get_sub_department(&self, req: DepartmentIdReq) -> AppResult<SubDepartmentResp> {
        let department_id = req.department_id;
        let current = if department_id.is_empty() {
            None
        } else {
            Some(self.database.get_department(&department_id).await?)
        };

        let mut departments = Vec::new();
        for child in self.database.child_departments(&department_id).await? {
            let num = self.get_department_member_num(&child.department_id).await?;
            departments.push(DepartmentNum::new(child, num));
        }

        let members = self.database.members_of_department(&department_id).await?;
        let mut user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let (user_map, block_map) = futures::try_join!(
            self.users.map_user_full_info(&user_ids),
            self.admin.find_user_block_info(&user_ids),
        )?;
        let members = members
            .into_iter()
            .filter_map(|member| {
                let user = user_map.get(&member.user_id)?.clone();
                let disabled = block_map.contains_key(&member.user_id);
                Some(MemberUserInfo {
                    member: member.into(),
                    user,
                    disabled,
                })
            })
            .collect();

        let org = self.database.get_organization().await?;
        let total = self.database.member_count(None).await?;
        let org_node = DepartmentNum::new(&org, total);

        let Some(current) = current else {
            return Ok(SubDepartmentResp {
                departments,
                members,
                parents: Vec::new(),
                current: org_node,
            });
        };

        let mut parents = vec![org_node];
        let ancestors = self.department_parents(&current.parent_department_id).await?;
        for ancestor in ancestors.into_iter().rev() {
            let num = self.get_department_member_num(&ancestor.department_id).await?;
            parents.push(DepartmentNum::new(ancestor, num));
        }
        let num = self.get_department_member_num(&current.department_id).await?;

        Ok(SubDepartmentResp {
            departments,
            members,
            parents,
            current: DepartmentNum::new(current, num),
        })
    }

    /// The whole tree from the root, each node with its member count
    pub async fn get_organization_department(&self) -> AppResult<OrganizationDepartmentResp> {
        let all = self.database.all_departments().await?;
        let mut children: HashMap<String, Vec<department::Model>> = HashMap::new();
        for d in all {
            children.entry(d.parent_department_id.clone()).or_default().push(d);
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| a.order.cmp(&b.order).then(a.create_time.cmp(&b.create_time)));
        }

        // Breadth-first from the root; each reachable node gets its count.
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = children
            .get("")
            .map(|roots| roots.iter().map(|d| d.department_id.clone()).collect())
            .unwrap_or_default();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                return Err(ring_error(&id));
            }
            let subtree = collect_subtree(&children, &id)?;
            counts.insert(id.clone(), self.database.member_count(Some(&subtree)).await?);
            if let Some(kids) = children.get(&id) {
                queue.extend(kids.iter().map(|d| d.department_id.clone()));
            }
        }

        Ok(OrganizationDepartmentResp {
            departments: build_tree(&children, &counts, ""),
        })
    }

    /// Move `department_id` in front of `next_department_id`, or to the end of
    /// its siblings when `next_department_id` is empty
    pub async fn sort_department_list(&self, req: SortDepartmentListReq) -> AppResult<SortResp> {
        if req.department_id == req.next_department_id {
            return Err(AppError::args("departmentID is equal to nextDepartmentID"));
        }
        let department = self.database.get_department(&req.department_id).await?;

        let max = self
            .database
            .max_department_order(&department.parent_department_id)
            .await?;
        let order = if req.next_department_id.is_empty() {
            max.checked_add(1).ok_or_else(|| AppError::args("order overflow"))?
        } else {
            let next = self.database.get_department(&req.next_department_id).await?;
            if next.parent_department_id != department.parent_department_id {
                return Err(AppError::args("departments do not share a parent"));
            }
            // The shift bumps every sibling at or after `next` by one.
            if max == i32::MAX {
                return Err(AppError::args("order overflow"));
            }
            self.database
                .incr_department_order(&next.parent_department_id, next.order)
                .await?;
            next.order
        };

        self.database
            .update_department(
                &department.department_id,
                DepartmentUpdate {
                    order: Some(order),
                    ..Default::default()
                },
            )
            .await?;
        Ok(SortResp { order })
    }
}

/// IDs in the subtree rooted at `root`, from the in-memory children index
fn collect_subtree(children: &HashMap<String, Vec<department::Model>>, root: &str) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([root.to_string()]);
    while let Some(id) = queue.pop_front() {
        if let Some(kids) = children.get(&id) {
            queue.extend(kids.iter().map(|d| d.department_id.clone()));
        }
        if !seen.insert(id.clone()) {
            return Err(ring_error(&id));
        }
    }
    Ok(seen.into_iter().collect())
}

fn build_tree(
    children: &HashMap<String, Vec<department::Model>>,
    counts: &HashMap<String, u64>,
    parent_id: &str,
) -> Vec<DepartmentInfo> {
    children
        .get(parent_id)
        .map(|siblings| {
            siblings
                .iter()
                .filter(|d| counts.contains_key(&d.department_id))
                .map(|d| DepartmentInfo {
                    department: DepartmentNum::new(d.clone(), counts[&d.department_id]),
                    subdepartments: build_tree(children, counts, &d.department_id),
                })
                .collect()
        })
        .unwrap_or_default()
}
