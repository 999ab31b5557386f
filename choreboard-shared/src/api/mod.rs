use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::domain::{Decision, NotificationKind, ReviewStatus, TaskStatus};

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

pub const API_V1_PREFIX: &str = "/api/v1";

// Auth
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResp {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfoDto {
    pub version: String,
}

// Users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub points: i32,
}

// Families
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFamilyReq {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinFamilyReq {
    pub invite_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyDto {
    pub id: i32,
    pub name: String,
    pub invite_code: String,
    pub owner_parent_id: i32,
    pub created_at: String, // RFC3339 UTC
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMemberDto {
    pub user_id: i32,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub joined_at: String, // RFC3339 UTC
}

// Tasks
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskReq {
    pub child_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub parent_id: i32,
    pub child_id: i32,
    pub status: TaskStatus,
    pub created_at: String, // RFC3339 UTC
    pub updated_at: String, // RFC3339 UTC
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub child_id: Option<i32>,
}

// Submissions
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubmitTaskReq {
    pub message: Option<String>,
    /// Opaque pointer to the evidence (file path, URL); never dereferenced here.
    pub evidence_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionDto {
    pub id: i32,
    pub task_id: i32,
    pub child_id: i32,
    pub message: Option<String>,
    pub evidence_ref: Option<String>,
    pub status: ReviewStatus,
    pub submitted_at: String,        // RFC3339 UTC
    pub reviewed_at: Option<String>, // RFC3339 UTC
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSubmissionDto {
    pub id: i32,
    pub task_id: i32,
    pub task_title: String,
    pub points: i32,
    pub child_id: i32,
    pub child_name: String,
    pub message: Option<String>,
    pub evidence_ref: Option<String>,
    pub submitted_at: String, // RFC3339 UTC
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionReq {
    pub decision: Decision,
}

// Rewards
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRewardReq {
    pub name: String,
    pub description: Option<String>,
    pub cost: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDto {
    pub id: i32,
    pub parent_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub cost: i32,
    pub created_at: String, // RFC3339 UTC
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionDto {
    pub id: i32,
    pub reward_id: i32,
    pub reward_name: String,
    pub cost: i32,
    pub child_id: i32,
    pub status: ReviewStatus,
    pub created_at: String,          // RFC3339 UTC
    pub reviewed_at: Option<String>, // RFC3339 UTC
}

// Notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDto {
    pub id: i32,
    pub actor_user_id: i32,
    pub kind: NotificationKind,
    pub entity: String,
    pub entity_id: i32,
    pub message: String,
    pub is_read: bool,
    pub created_at: String, // RFC3339 UTC
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsCountDto {
    pub count: u32,
}

// Points
#[derive(Debug, Serialize, Deserialize)]
pub struct PointsDto {
    pub user_id: i32,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsEntryDto {
    pub id: i32,
    pub delta: i32,
    pub reason: String,
    pub task_id: Option<i32>,
    pub redemption_id: Option<i32>,
    pub created_at: String, // RFC3339 UTC
}

// Audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntryDto {
    pub id: i32,
    pub action: String,
    pub target_table: String,
    pub target_id: i32,
    pub details: serde_json::Value,
    pub created_at: String, // RFC3339 UTC
}
