//! Minimal REST client helpers for API consumers.

use super::endpoints as ep;
use super::*;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
}

impl RestError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
});

fn mk_client() -> reqwest::Client {
    HTTP_CLIENT.clone()
}

async fn handle_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, RestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            body,
        });
    }
    res.json::<T>()
        .await
        .map_err(|e| RestError::Serde(e.to_string()))
}

async fn handle_empty(res: reqwest::Response) -> Result<(), RestError> {
    if res.status().is_success() {
        Ok(())
    } else {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        Err(RestError::Status { status, body })
    }
}

async fn get_json<T: DeserializeOwned>(url: String, bearer: &str) -> Result<T, RestError> {
    let res = mk_client()
        .get(url)
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

async fn post_json<B: Serialize, T: DeserializeOwned>(
    url: String,
    bearer: &str,
    body: &B,
) -> Result<T, RestError> {
    let res = mk_client()
        .post(url)
        .bearer_auth(bearer)
        .json(body)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

async fn post_empty(url: String, bearer: &str) -> Result<(), RestError> {
    let res = mk_client()
        .post(url)
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_empty(res).await
}

pub async fn login(base: &str, req: &AuthReq) -> Result<AuthResp, RestError> {
    let res = mk_client()
        .post(ep::auth_login(base))
        .json(req)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

pub async fn server_version(base: &str) -> Result<VersionInfoDto, RestError> {
    let res = mk_client()
        .get(ep::version(base))
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

pub async fn me(base: &str, bearer: &str) -> Result<UserDto, RestError> {
    get_json(ep::me(base), bearer).await
}

pub async fn create_family(
    base: &str,
    bearer: &str,
    req: &CreateFamilyReq,
) -> Result<FamilyDto, RestError> {
    post_json(ep::families(base), bearer, req).await
}

pub async fn join_family(
    base: &str,
    bearer: &str,
    req: &JoinFamilyReq,
) -> Result<FamilyDto, RestError> {
    post_json(ep::family_join(base), bearer, req).await
}

pub async fn list_families(base: &str, bearer: &str) -> Result<Vec<FamilyDto>, RestError> {
    get_json(ep::families(base), bearer).await
}

pub async fn list_children(base: &str, bearer: &str) -> Result<Vec<UserDto>, RestError> {
    get_json(ep::children(base), bearer).await
}

pub async fn create_task(
    base: &str,
    bearer: &str,
    req: &CreateTaskReq,
) -> Result<TaskDto, RestError> {
    post_json(ep::tasks(base), bearer, req).await
}

pub async fn list_tasks(base: &str, bearer: &str) -> Result<Vec<TaskDto>, RestError> {
    get_json(ep::tasks(base), bearer).await
}

pub async fn submit_task(
    base: &str,
    bearer: &str,
    task_id: i32,
    req: &SubmitTaskReq,
) -> Result<SubmissionDto, RestError> {
    post_json(ep::task_submissions(base, task_id), bearer, req).await
}

pub async fn pending_submissions(
    base: &str,
    bearer: &str,
) -> Result<Vec<PendingSubmissionDto>, RestError> {
    get_json(ep::pending_submissions(base), bearer).await
}

pub async fn decide_submission(
    base: &str,
    bearer: &str,
    submission_id: i32,
    decision: Decision,
) -> Result<SubmissionDto, RestError> {
    post_json(
        ep::submission_decision(base, submission_id),
        bearer,
        &DecisionReq { decision },
    )
    .await
}

pub async fn create_reward(
    base: &str,
    bearer: &str,
    req: &CreateRewardReq,
) -> Result<RewardDto, RestError> {
    post_json(ep::rewards(base), bearer, req).await
}

pub async fn list_rewards(base: &str, bearer: &str) -> Result<Vec<RewardDto>, RestError> {
    get_json(ep::rewards(base), bearer).await
}

pub async fn request_redemption(
    base: &str,
    bearer: &str,
    reward_id: i32,
) -> Result<RedemptionDto, RestError> {
    post_json(
        ep::reward_redemptions(base, reward_id),
        bearer,
        &serde_json::json!({}),
    )
    .await
}

pub async fn list_redemptions(base: &str, bearer: &str) -> Result<Vec<RedemptionDto>, RestError> {
    get_json(ep::redemptions(base), bearer).await
}

pub async fn decide_redemption(
    base: &str,
    bearer: &str,
    redemption_id: i32,
    decision: Decision,
) -> Result<RedemptionDto, RestError> {
    post_json(
        ep::redemption_decision(base, redemption_id),
        bearer,
        &DecisionReq { decision },
    )
    .await
}

pub async fn notifications(base: &str, bearer: &str) -> Result<Vec<NotificationDto>, RestError> {
    get_json(ep::notifications(base), bearer).await
}

pub async fn notifications_count(
    base: &str,
    bearer: &str,
) -> Result<NotificationsCountDto, RestError> {
    get_json(ep::notifications_count(base), bearer).await
}

pub async fn mark_notification_read(
    base: &str,
    bearer: &str,
    notification_id: i32,
) -> Result<(), RestError> {
    post_empty(ep::notification_read(base, notification_id), bearer).await
}

pub async fn clear_notifications(base: &str, bearer: &str) -> Result<(), RestError> {
    post_empty(ep::notifications_clear(base), bearer).await
}

pub async fn user_points(base: &str, bearer: &str, user_id: i32) -> Result<PointsDto, RestError> {
    get_json(ep::user_points(base, user_id), bearer).await
}

pub async fn user_points_history(
    base: &str,
    bearer: &str,
    user_id: i32,
) -> Result<Vec<PointsEntryDto>, RestError> {
    get_json(ep::user_points_history(base, user_id), bearer).await
}
