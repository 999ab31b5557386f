use chrono::Utc;
use choreboard_shared::auth::Role;
use choreboard_shared::domain::{self, Decision, NotificationKind, ReviewStatus};
use diesel::prelude::*;
use serde_json::json;
use tracing::{info, warn};

use super::models::{NewPointsEntry, NewRedemption, NewReward, Redemption, Reward};
use super::{
    Actor, AuditAction, Store, StorageError, family_ids_of, load_user, non_empty, notify, parse_text,
    record_audit, schema, shares_family,
};

pub struct RewardInput {
    pub name: String,
    pub description: Option<String>,
    pub cost: i32,
}

fn load_reward(conn: &mut SqliteConnection, reward_id: i32) -> Result<Reward, StorageError> {
    use schema::rewards::dsl as r;
    r::rewards
        .filter(r::id.eq(reward_id))
        .first::<Reward>(conn)
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("reward not found: {reward_id}")))
}

impl Store {
    pub async fn create_reward(
        &self,
        actor: Actor,
        input: RewardInput,
    ) -> Result<Reward, StorageError> {
        actor.require(Role::Parent)?;
        let name = non_empty(&input.name, "name")?.to_string();
        if input.cost < 0 {
            return Err(StorageError::InvalidInput("cost must not be negative".into()));
        }
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let cost = input.cost;
        self.write(move |conn| {
            let reward = diesel::insert_into(schema::rewards::table)
                .values(&NewReward {
                    parent_id: actor.user_id,
                    name: &name,
                    description: description.as_deref(),
                    cost,
                })
                .returning(Reward::as_returning())
                .get_result(conn)?;
            record_audit(
                conn,
                actor.user_id,
                AuditAction::RewardCreate,
                reward.id,
                json!({ "cost": cost }),
            )?;
            Ok(reward)
        })
        .await
    }

    /// Parents see their own catalog; children see the catalogs of parents in
    /// their families.
    pub async fn list_rewards(&self, actor: Actor) -> Result<Vec<Reward>, StorageError> {
        self.run(move |conn| {
            use schema::family_members::dsl as fm;
            use schema::rewards::dsl as r;
            let rows = match actor.role {
                Role::Parent => r::rewards
                    .filter(r::parent_id.eq(actor.user_id))
                    .order((r::cost.asc(), r::id.asc()))
                    .load::<Reward>(conn)?,
                Role::Child => {
                    let my_families = family_ids_of(conn, actor.user_id)?;
                    let parent_ids = fm::family_members
                        .filter(fm::family_id.eq_any(&my_families))
                        .filter(fm::role.eq(Role::Parent.as_str()))
                        .select(fm::user_id);
                    r::rewards
                        .filter(r::parent_id.eq_any(parent_ids))
                        .order((r::cost.asc(), r::id.asc()))
                        .load::<Reward>(conn)?
                }
            };
            Ok(rows)
        })
        .await
    }

    /// Opens a pending redemption; one pending request per reward and child.
    pub async fn request_redemption(
        &self,
        actor: Actor,
        reward_id: i32,
    ) -> Result<(Redemption, Reward), StorageError> {
        actor.require(Role::Child)?;
        self.write(move |conn| {
            use schema::reward_redemptions::dsl as rr;
            let reward = load_reward(conn, reward_id)?;
            if !shares_family(conn, reward.parent_id, actor.user_id)? {
                return Err(StorageError::Forbidden(format!(
                    "reward {reward_id} is not offered to you"
                )));
            }
            let pending: i64 = rr::reward_redemptions
                .filter(rr::reward_id.eq(reward_id))
                .filter(rr::child_id.eq(actor.user_id))
                .filter(rr::status.eq(ReviewStatus::Pending.as_str()))
                .count()
                .get_result(conn)?;
            if pending > 0 {
                return Err(StorageError::Conflict(format!(
                    "a redemption of reward {reward_id} is already pending"
                )));
            }
            let redemption = diesel::insert_into(schema::reward_redemptions::table)
                .values(&NewRedemption {
                    reward_id,
                    child_id: actor.user_id,
                })
                .returning(Redemption::as_returning())
                .get_result(conn)?;
            let child = load_user(conn, actor.user_id)?;
            notify(
                conn,
                reward.parent_id,
                actor.user_id,
                NotificationKind::RedemptionRequested,
                "reward_redemption",
                redemption.id,
                &format!(
                    "{} wants to redeem \"{}\" for {} points",
                    child.display_name, reward.name, reward.cost
                ),
            )?;
            record_audit(
                conn,
                actor.user_id,
                AuditAction::RedemptionRequest,
                redemption.id,
                json!({ "reward_id": reward_id, "cost": reward.cost }),
            )?;
            Ok((redemption, reward))
        })
        .await
    }

    /// Parents get pending requests on their rewards; children get their own
    /// requests in every state.
    pub async fn list_redemptions(
        &self,
        actor: Actor,
    ) -> Result<Vec<(Redemption, Reward)>, StorageError> {
        self.run(move |conn| {
            use schema::{reward_redemptions, rewards};
            let query = reward_redemptions::table
                .inner_join(rewards::table)
                .into_boxed();
            let query = match actor.role {
                Role::Parent => query
                    .filter(rewards::parent_id.eq(actor.user_id))
                    .filter(reward_redemptions::status.eq(ReviewStatus::Pending.as_str())),
                Role::Child => query.filter(reward_redemptions::child_id.eq(actor.user_id)),
            };
            Ok(query
                .order((
                    reward_redemptions::created_at.desc(),
                    reward_redemptions::id.desc(),
                ))
                .select((Redemption::as_select(), Reward::as_select()))
                .load::<(Redemption, Reward)>(conn)?)
        })
        .await
    }

    /// Applies the reward owner's verdict. Approval requires the child to hold
    /// at least the reward's cost at decision time; otherwise nothing changes
    /// and the request stays pending.
    pub async fn decide_redemption(
        &self,
        actor: Actor,
        redemption_id: i32,
        decision: Decision,
    ) -> Result<(Redemption, Reward), StorageError> {
        actor.require(Role::Parent)?;
        self.write(move |conn| {
            use schema::reward_redemptions::dsl as rr;
            use schema::users::dsl as u;
            let redemption = rr::reward_redemptions
                .filter(rr::id.eq(redemption_id))
                .first::<Redemption>(conn)
                .optional()?
                .ok_or_else(|| {
                    StorageError::NotFound(format!("redemption not found: {redemption_id}"))
                })?;
            let reward = load_reward(conn, redemption.reward_id)?;
            if reward.parent_id != actor.user_id {
                return Err(StorageError::Forbidden(format!(
                    "redemption {redemption_id} is for another parent's reward"
                )));
            }
            let status: ReviewStatus = parse_text(&redemption.status)?;
            let status = status.decide(decision)?;

            let (kind, action, message) = match decision {
                Decision::Approve => {
                    let child = load_user(conn, redemption.child_id)?;
                    let balance = domain::debit(child.points, reward.cost).map_err(|e| {
                        warn!(
                            redemption_id,
                            child_id = child.id,
                            balance = e.balance,
                            cost = e.cost,
                            "redemption approval refused"
                        );
                        e
                    })?;
                    diesel::update(u::users.filter(u::id.eq(child.id)))
                        .set(u::points.eq(balance))
                        .execute(conn)?;
                    diesel::insert_into(schema::points_ledger::table)
                        .values(&NewPointsEntry {
                            user_id: child.id,
                            delta: -reward.cost,
                            reason: "reward_redeemed",
                            task_id: None,
                            redemption_id: Some(redemption_id),
                        })
                        .execute(conn)?;
                    (
                        NotificationKind::RedemptionApproved,
                        AuditAction::RedemptionApprove,
                        format!("\"{}\" redeemed: -{} points", reward.name, reward.cost),
                    )
                }
                Decision::Reject => (
                    NotificationKind::RedemptionRejected,
                    AuditAction::RedemptionReject,
                    format!("Redemption of \"{}\" was declined", reward.name),
                ),
            };

            let updated = diesel::update(rr::reward_redemptions.filter(rr::id.eq(redemption_id)))
                .set((
                    rr::status.eq(status.as_str()),
                    rr::reviewed_at.eq(Some(Utc::now().naive_utc())),
                ))
                .returning(Redemption::as_returning())
                .get_result(conn)?;
            notify(
                conn,
                redemption.child_id,
                actor.user_id,
                kind,
                "reward_redemption",
                redemption_id,
                &message,
            )?;
            record_audit(
                conn,
                actor.user_id,
                action,
                redemption_id,
                json!({ "reward_id": reward.id, "cost": reward.cost, "status": status.as_str() }),
            )?;
            info!(
                redemption_id,
                reward_id = reward.id,
                child_id = redemption.child_id,
                decision = %decision,
                "redemption decided"
            );
            Ok((updated, reward))
        })
        .await
    }
}
