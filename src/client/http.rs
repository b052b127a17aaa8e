//! JSON-over-HTTP clients for the user and admin services

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::token::TokenCache;
use super::{BlockInfo, Pagination, UserAdminService, UserFullInfo, UserProfileService, UserPublicInfo};
use crate::config::ServicesConfig;
use crate::error::{AppError, AppResult};

/// Response envelope shared by the upstream services
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "errCode", default)]
    err_code: i32,
    #[serde(rename = "errMsg", default)]
    err_msg: String,
    data: Option<T>,
}

#[derive(Serialize)]
struct UserIdsReq<'a> {
    #[serde(rename = "userIDs")]
    user_ids: &'a [String],
}

#[derive(Deserialize)]
struct PublicUsersResp {
    #[serde(default)]
    users: Vec<UserPublicInfo>,
}

#[derive(Deserialize)]
struct FullUsersResp {
    #[serde(default)]
    users: Vec<UserFullInfo>,
}

#[derive(Serialize)]
struct SearchUserIdReq<'a> {
    keyword: &'a str,
    #[serde(rename = "orUserIDs")]
    or_user_ids: &'a [String],
    pagination: Pagination,
}

#[derive(Deserialize)]
struct SearchUserIdResp {
    #[serde(default)]
    total: u32,
    #[serde(rename = "userIDs", default)]
    user_ids: Vec<String>,
}

#[derive(Serialize)]
struct TokenReq<'a> {
    secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResp {
    token: String,
    #[serde(rename = "expireSeconds", default)]
    expire_seconds: u64,
}

#[derive(Deserialize)]
struct BlockInfoResp {
    #[serde(default)]
    blocks: Vec<BlockInfo>,
}

fn build_client(timeout_secs: u64) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Config(format!("http client: {}", e)))
}

/// Outcome of an upstream call that got past the transport layer
enum Reply<T> {
    Data(T),
    /// The upstream answered 401
    Rejected,
}

/// POST `body` to `url` and unwrap the envelope
async fn call_json<B, T>(client: &reqwest::Client, url: &str, token: Option<&str>, body: &B) -> AppResult<Reply<T>>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut request = client.post(url).json(body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Ok(Reply::Rejected);
    }
    if !status.is_success() {
        return Err(AppError::Upstream(format!("{} returned {}", url, status)));
    }

    let envelope: Envelope<T> = response.json().await?;
    if envelope.err_code != 0 {
        return Err(AppError::Upstream(format!(
            "{} failed: [{}] {}",
            url, envelope.err_code, envelope.err_msg
        )));
    }
    envelope
        .data
        .map(Reply::Data)
        .ok_or_else(|| AppError::Upstream(format!("{} returned no data", url)))
}

/// Like [`call_json`], with an upstream 401 reported as a collaborator failure
async fn post_json<B, T>(client: &reqwest::Client, url: &str, token: Option<&str>, body: &B) -> AppResult<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    match call_json(client, url, token, body).await? {
        Reply::Data(data) => Ok(data),
        Reply::Rejected => Err(AppError::Upstream(format!("{} rejected the request", url))),
    }
}

/// Client for the user-profile service
#[derive(Clone)]
pub struct HttpUserClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUserClient {
    pub fn new(config: &ServicesConfig) -> AppResult<Self> {
        Ok(Self {
            base_url: config.user_api_url.trim_end_matches('/').to_string(),
            client: build_client(config.timeout_secs)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl UserProfileService for HttpUserClient {
    async fn get_user_public_info(&self, user_id: &str) -> AppResult<UserPublicInfo> {
        let ids = [user_id.to_string()];
        let resp: PublicUsersResp =
            post_json(&self.client, &self.url("/user/find/public"), None, &UserIdsReq { user_ids: &ids }).await?;
        resp.users
            .into_iter()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("user {} not found", user_id)))
    }

    async fn map_user_full_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, UserFullInfo>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let resp: FullUsersResp =
            post_json(&self.client, &self.url("/user/find/full"), None, &UserIdsReq { user_ids }).await?;
        Ok(resp.users.into_iter().map(|u| (u.user_id.clone(), u)).collect())
    }

    async fn search_user_id(
        &self,
        keyword: &str,
        or_user_ids: &[String],
        pagination: Pagination,
    ) -> AppResult<(u32, Vec<String>)> {
        let req = SearchUserIdReq {
            keyword,
            or_user_ids,
            pagination,
        };
        let resp: SearchUserIdResp = post_json(&self.client, &self.url("/user/search/id"), None, &req).await?;
        Ok((resp.total, resp.user_ids))
    }
}

/// Client for the user-admin service, authenticated with a cached admin token
#[derive(Clone)]
pub struct HttpAdminClient {
    base_url: String,
    secret: String,
    client: reqwest::Client,
    token: Arc<TokenCache>,
}

impl HttpAdminClient {
    pub fn new(config: &ServicesConfig) -> AppResult<Self> {
        Ok(Self {
            base_url: config.admin_api_url.trim_end_matches('/').to_string(),
            secret: config.admin_secret.clone(),
            client: build_client(config.timeout_secs)?,
            token: Arc::new(TokenCache::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn admin_token(&self) -> AppResult<String> {
        self.token
            .get_or_refresh(|| async {
                let resp: TokenResp = post_json(
                    &self.client,
                    &self.url("/account/token"),
                    None,
                    &TokenReq { secret: &self.secret },
                )
                .await
                .map_err(|e| {
                    tracing::error!("get admin token: {}", e);
                    e
                })?;
                Ok((resp.token, Duration::from_secs(resp.expire_seconds)))
            })
            .await
    }
}

#[async_trait]
impl UserAdminService for HttpAdminClient {
    async fn find_user_block_info(&self, user_ids: &[String]) -> AppResult<HashMap<String, BlockInfo>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let token = self.admin_token().await?;
        let reply: Reply<BlockInfoResp> =
            call_json(&self.client, &self.url("/block/find"), Some(&token), &UserIdsReq { user_ids }).await?;
        let resp = match reply {
            Reply::Data(resp) => resp,
            Reply::Rejected => {
                self.token.invalidate().await;
                return Err(AppError::Upstream("admin token rejected".to_string()));
            }
        };
        Ok(resp.blocks.into_iter().map(|b| (b.user_id.clone(), b)).collect())
    }
}
