//! In-process stand-ins for the user and admin services, used by tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{BlockInfo, Pagination, UserAdminService, UserFullInfo, UserProfileService, UserPublicInfo};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<String, UserFullInfo>>,
}

impl FakeUsers {
    pub fn with_users(ids: &[&str]) -> Self {
        let fake = Self::default();
        for id in ids {
            fake.add(id, &format!("nick-{}", id));
        }
        fake
    }

    pub fn add(&self, user_id: &str, nickname: &str) {
        self.users.lock().unwrap().insert(
            user_id.to_string(),
            UserFullInfo {
                user_id: user_id.to_string(),
                account: user_id.to_string(),
                phone_number: String::new(),
                area_code: String::new(),
                email: String::new(),
                nickname: nickname.to_string(),
                face_url: String::new(),
                gender: 0,
                level: 1,
                birth: 0,
            },
        );
    }
}

#[async_trait]
impl UserProfileService for FakeUsers {
    async fn get_user_public_info(&self, user_id: &str) -> AppResult<UserPublicInfo> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(user_id)
            .ok_or_else(|| AppError::not_found(format!("user {} not found", user_id)))?;
        Ok(UserPublicInfo {
            user_id: user.user_id.clone(),
            account: user.account.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            face_url: user.face_url.clone(),
            gender: user.gender,
            level: user.level,
        })
    }

    async fn map_user_full_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, UserFullInfo>> {
        let users = self.users.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (id.clone(), u.clone())))
            .collect())
    }

    async fn search_user_id(
        &self,
        keyword: &str,
        or_user_ids: &[String],
        pagination: Pagination,
    ) -> AppResult<(u32, Vec<String>)> {
        let users = self.users.lock().unwrap();
        let extra: HashSet<&String> = or_user_ids.iter().collect();
        let mut matched: Vec<String> = users
            .values()
            .filter(|u| (!keyword.is_empty() && u.nickname.contains(keyword)) || extra.contains(&u.user_id))
            .map(|u| u.user_id.clone())
            .collect();
        matched.sort();
        let total = matched.len() as u32;
        let skip = ((pagination.page_number - 1) * pagination.show_number) as usize;
        let page = matched
            .into_iter()
            .skip(skip)
            .take(pagination.show_number as usize)
            .collect();
        Ok((total, page))
    }
}

#[derive(Default)]
pub struct FakeAdmin {
    blocked: Mutex<HashSet<String>>,
}

impl FakeAdmin {
    pub fn block(&self, user_id: &str) {
        self.blocked.lock().unwrap().insert(user_id.to_string());
    }
}

#[async_trait]
impl UserAdminService for FakeAdmin {
    async fn find_user_block_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, BlockInfo>> {
        let blocked = self.blocked.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter(|id| blocked.contains(*id))
            .map(|id| {
                (
                    id.clone(),
                    BlockInfo {
                        user_id: id.clone(),
                        reason: "test".to_string(),
                        op_user_id: "admin".to_string(),
                        create_time: 0,
                    },
                )
            })
            .collect())
    }
}
