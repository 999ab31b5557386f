use crate::storage::schema::{
    audit_log, families, family_members, notifications, points_ledger, reward_redemptions,
    rewards, submissions, tasks, users,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub points: i32,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = families)]
pub struct Family {
    pub id: i32,
    pub name: String,
    pub invite_code: String,
    pub owner_parent_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = families)]
pub struct NewFamily<'a> {
    pub name: &'a str,
    pub invite_code: &'a str,
    pub owner_parent_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = family_members)]
pub struct FamilyMember {
    pub family_id: i32,
    pub user_id: i32,
    pub role: String,
    pub joined_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = family_members)]
pub struct NewFamilyMember<'a> {
    pub family_id: i32,
    pub user_id: i32,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = tasks)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub parent_id: i32,
    pub child_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub points: i32,
    pub parent_id: i32,
    pub child_id: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = submissions)]
#[diesel(belongs_to(Task, foreign_key = task_id))]
pub struct Submission {
    pub id: i32,
    pub task_id: i32,
    pub child_id: i32,
    pub message: Option<String>,
    pub evidence_ref: Option<String>,
    pub status: String,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = submissions)]
pub struct NewSubmission<'a> {
    pub task_id: i32,
    pub child_id: i32,
    pub message: Option<&'a str>,
    pub evidence_ref: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = rewards)]
pub struct Reward {
    pub id: i32,
    pub parent_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub cost: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = rewards)]
pub struct NewReward<'a> {
    pub parent_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub cost: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = reward_redemptions)]
#[diesel(belongs_to(Reward, foreign_key = reward_id))]
pub struct Redemption {
    pub id: i32,
    pub reward_id: i32,
    pub child_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = reward_redemptions)]
pub struct NewRedemption {
    pub reward_id: i32,
    pub child_id: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: i32,
    pub to_user_id: i32,
    pub actor_user_id: i32,
    pub kind: String,
    pub entity: String,
    pub entity_id: i32,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub to_user_id: i32,
    pub actor_user_id: i32,
    pub kind: &'a str,
    pub entity: &'a str,
    pub entity_id: i32,
    pub message: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = points_ledger)]
pub struct PointsEntry {
    pub id: i32,
    pub user_id: i32,
    pub delta: i32,
    pub reason: String,
    pub task_id: Option<i32>,
    pub redemption_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = points_ledger)]
pub struct NewPointsEntry<'a> {
    pub user_id: i32,
    pub delta: i32,
    pub reason: &'a str,
    pub task_id: Option<i32>,
    pub redemption_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = audit_log)]
pub struct AuditEntry {
    pub id: i32,
    pub actor_id: i32,
    pub action: String,
    pub target_table: String,
    pub target_id: i32,
    pub details: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditEntry<'a> {
    pub actor_id: i32,
    pub action: &'a str,
    pub target_table: &'a str,
    pub target_id: i32,
    pub details: &'a str,
}
