//! External collaborators
//!
//! User profiles and block state are owned by other services. The engines only
//! see the traits below; `http` talks to the real services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AppResult;

pub mod http;
pub mod token;

#[cfg(test)]
pub mod fake;

pub use http::{HttpAdminClient, HttpUserClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublicInfo {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(rename = "faceURL", default)]
    pub face_url: String,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFullInfo {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(default)]
    pub account: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    #[serde(rename = "areaCode", default)]
    pub area_code: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(rename = "faceURL", default)]
    pub face_url: String,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub level: i32,
    /// Birthday, Unix milliseconds
    #[serde(default)]
    pub birth: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(rename = "opUserID", default)]
    pub op_user_id: String,
    #[serde(rename = "createTime", default)]
    pub create_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "pageNumber")]
    pub page_number: i32,
    #[serde(rename = "showNumber")]
    pub show_number: i32,
}

/// User-profile service
#[async_trait]
pub trait UserProfileService: Send + Sync {
    /// Public profile of one user; `NotFound` if the user does not exist
    async fn get_user_public_info(&self, user_id: &str) -> AppResult<UserPublicInfo>;

    /// Full profiles keyed by user ID; unknown IDs are absent from the map
    async fn map_user_full_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, UserFullInfo>>;

    /// Users matching `keyword`, or listed in `or_user_ids`; returns the total
    /// match count and the IDs on the requested page
    async fn search_user_id(
        &self,
        keyword: &str,
        or_user_ids: &[String],
        pagination: Pagination,
    ) -> AppResult<(u32, Vec<String>)>;
}

/// User-admin service
#[async_trait]
pub trait UserAdminService: Send + Sync {
    /// Block records keyed by user ID; users that are not blocked are absent
    async fn find_user_block_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, BlockInfo>>;
}
