use diesel::prelude::*;

use super::models::AuditEntry;
use super::{Actor, Store, StorageError, schema};
use choreboard_shared::auth::Role;

/// State-changing actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    FamilyCreate,
    FamilyJoin,
    TaskCreate,
    SubmissionCreate,
    SubmissionApprove,
    SubmissionReject,
    RewardCreate,
    RedemptionRequest,
    RedemptionApprove,
    RedemptionReject,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::FamilyCreate => "family_create",
            AuditAction::FamilyJoin => "family_join",
            AuditAction::TaskCreate => "task_create",
            AuditAction::SubmissionCreate => "submission_create",
            AuditAction::SubmissionApprove => "submission_approve",
            AuditAction::SubmissionReject => "submission_reject",
            AuditAction::RewardCreate => "reward_create",
            AuditAction::RedemptionRequest => "redemption_request",
            AuditAction::RedemptionApprove => "redemption_approve",
            AuditAction::RedemptionReject => "redemption_reject",
        }
    }

    pub fn target_table(self) -> &'static str {
        match self {
            AuditAction::FamilyCreate | AuditAction::FamilyJoin => "families",
            AuditAction::TaskCreate => "tasks",
            AuditAction::SubmissionCreate
            | AuditAction::SubmissionApprove
            | AuditAction::SubmissionReject => "submissions",
            AuditAction::RewardCreate => "rewards",
            AuditAction::RedemptionRequest
            | AuditAction::RedemptionApprove
            | AuditAction::RedemptionReject => "reward_redemptions",
        }
    }
}

impl Store {
    /// Entries authored by a parent, newest first.
    pub async fn list_audit(
        &self,
        actor: Actor,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, StorageError> {
        actor.require(Role::Parent)?;
        let limit = limit.clamp(1, 500);
        self.run(move |conn| {
            use schema::audit_log::dsl as al;
            Ok(al::audit_log
                .filter(al::actor_id.eq(actor.user_id))
                .order((al::created_at.desc(), al::id.desc()))
                .limit(limit)
                .load::<AuditEntry>(conn)?)
        })
        .await
    }
}
