use chrono::Utc;
use choreboard_shared::auth::Role;
use choreboard_shared::domain::{self, Decision, NotificationKind, ReviewStatus, TaskStatus};
use diesel::prelude::*;
use serde_json::json;
use tracing::{debug, info, warn};

use super::models::{NewPointsEntry, NewSubmission, NewTask, Submission, Task, User};
use super::{
    Actor, AuditAction, Store, StorageError, load_user, non_empty, notify, parse_text,
    record_audit, schema, shares_family,
};

pub struct TaskInput {
    pub child_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
}

pub struct SubmissionInput {
    pub message: Option<String>,
    pub evidence_ref: Option<String>,
}

fn load_task(conn: &mut SqliteConnection, task_id: i32) -> Result<Task, StorageError> {
    use schema::tasks::dsl as t;
    t::tasks
        .filter(t::id.eq(task_id))
        .first::<Task>(conn)
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("task not found: {task_id}")))
}

fn ensure_involved(actor: Actor, task: &Task) -> Result<(), StorageError> {
    let involved = match actor.role {
        Role::Parent => task.parent_id == actor.user_id,
        Role::Child => task.child_id == actor.user_id,
    };
    if involved {
        Ok(())
    } else {
        Err(StorageError::Forbidden(format!(
            "task {} is not yours",
            task.id
        )))
    }
}

fn set_task_status(
    conn: &mut SqliteConnection,
    task_id: i32,
    status: TaskStatus,
) -> Result<(), StorageError> {
    use schema::tasks::dsl as t;
    diesel::update(t::tasks.filter(t::id.eq(task_id)))
        .set((
            t::status.eq(status.as_str()),
            t::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Store {
    /// Assigns a task to a child who shares a family with the parent.
    pub async fn create_task(&self, actor: Actor, input: TaskInput) -> Result<Task, StorageError> {
        actor.require(Role::Parent)?;
        let title = non_empty(&input.title, "title")?.to_string();
        if input.points < 0 {
            return Err(StorageError::InvalidInput(
                "points must not be negative".into(),
            ));
        }
        let description = blank_to_none(input.description);
        let child_id = input.child_id;
        let points = input.points;
        self.write(move |conn| {
            let child = load_user(conn, child_id)?;
            if child.role != Role::Child.as_str() {
                return Err(StorageError::InvalidInput(format!(
                    "user {child_id} is not a child"
                )));
            }
            if !shares_family(conn, actor.user_id, child_id)? {
                return Err(StorageError::Forbidden(format!(
                    "child {child_id} is not in any of your families"
                )));
            }
            let task = diesel::insert_into(schema::tasks::table)
                .values(&NewTask {
                    title: &title,
                    description: description.as_deref(),
                    points,
                    parent_id: actor.user_id,
                    child_id,
                })
                .returning(Task::as_returning())
                .get_result(conn)?;
            record_audit(
                conn,
                actor.user_id,
                AuditAction::TaskCreate,
                task.id,
                json!({ "child_id": child_id, "points": points }),
            )?;
            info!(task_id = task.id, parent_id = actor.user_id, child_id, points, "task created");
            Ok(task)
        })
        .await
    }

    /// Children see their own tasks; parents see the tasks they assigned,
    /// optionally narrowed to one child.
    pub async fn list_tasks(
        &self,
        actor: Actor,
        child_filter: Option<i32>,
    ) -> Result<Vec<Task>, StorageError> {
        self.run(move |conn| {
            use schema::tasks::dsl as t;
            let mut query = t::tasks.into_boxed();
            match actor.role {
                Role::Child => query = query.filter(t::child_id.eq(actor.user_id)),
                Role::Parent => {
                    query = query.filter(t::parent_id.eq(actor.user_id));
                    if let Some(child) = child_filter {
                        query = query.filter(t::child_id.eq(child));
                    }
                }
            }
            Ok(query
                .order((t::created_at.desc(), t::id.desc()))
                .load::<Task>(conn)?)
        })
        .await
    }

    pub async fn get_task(&self, actor: Actor, task_id: i32) -> Result<Task, StorageError> {
        self.run(move |conn| {
            let task = load_task(conn, task_id)?;
            ensure_involved(actor, &task)?;
            Ok(task)
        })
        .await
    }

    /// Records the child's evidence and moves the task to `submitted`.
    pub async fn submit_task(
        &self,
        actor: Actor,
        task_id: i32,
        input: SubmissionInput,
    ) -> Result<Submission, StorageError> {
        actor.require(Role::Child)?;
        let message = blank_to_none(input.message);
        let evidence_ref = blank_to_none(input.evidence_ref);
        self.write(move |conn| {
            let task = load_task(conn, task_id)?;
            if task.child_id != actor.user_id {
                return Err(StorageError::Forbidden(format!(
                    "task {task_id} is not assigned to you"
                )));
            }
            let current: TaskStatus = parse_text(&task.status)?;
            let next = current.submit()?;
            let submission = diesel::insert_into(schema::submissions::table)
                .values(&NewSubmission {
                    task_id,
                    child_id: actor.user_id,
                    message: message.as_deref(),
                    evidence_ref: evidence_ref.as_deref(),
                })
                .returning(Submission::as_returning())
                .get_result(conn)?;
            set_task_status(conn, task_id, next)?;
            let child = load_user(conn, actor.user_id)?;
            notify(
                conn,
                task.parent_id,
                actor.user_id,
                NotificationKind::SubmissionSubmitted,
                "submission",
                submission.id,
                &format!("{} submitted \"{}\"", child.display_name, task.title),
            )?;
            record_audit(
                conn,
                actor.user_id,
                AuditAction::SubmissionCreate,
                submission.id,
                json!({ "task_id": task_id, "resubmission": current == TaskStatus::Rejected }),
            )?;
            debug!(task_id, submission_id = submission.id, from = %current, "task submitted");
            Ok(submission)
        })
        .await
    }

    /// Pending submissions on tasks the parent assigned, newest first.
    pub async fn list_pending_submissions(
        &self,
        actor: Actor,
    ) -> Result<Vec<(Submission, Task, User)>, StorageError> {
        actor.require(Role::Parent)?;
        self.run(move |conn| {
            use schema::{submissions, tasks, users};
            Ok(submissions::table
                .inner_join(tasks::table)
                .inner_join(users::table.on(users::id.eq(submissions::child_id)))
                .filter(tasks::parent_id.eq(actor.user_id))
                .filter(submissions::status.eq(ReviewStatus::Pending.as_str()))
                .order((submissions::submitted_at.desc(), submissions::id.desc()))
                .select((Submission::as_select(), Task::as_select(), User::as_select()))
                .load::<(Submission, Task, User)>(conn)?)
        })
        .await
    }

    /// Review history of one task, newest first.
    pub async fn list_task_submissions(
        &self,
        actor: Actor,
        task_id: i32,
    ) -> Result<Vec<Submission>, StorageError> {
        self.run(move |conn| {
            let task = load_task(conn, task_id)?;
            ensure_involved(actor, &task)?;
            use schema::submissions::dsl as s;
            Ok(s::submissions
                .filter(s::task_id.eq(task_id))
                .order((s::submitted_at.desc(), s::id.desc()))
                .load::<Submission>(conn)?)
        })
        .await
    }

    /// Applies the owning parent's verdict. Approval credits the task's
    /// points to the child in the same transaction.
    pub async fn decide_submission(
        &self,
        actor: Actor,
        submission_id: i32,
        decision: Decision,
    ) -> Result<Submission, StorageError> {
        actor.require(Role::Parent)?;
        self.write(move |conn| {
            use schema::submissions::dsl as s;
            use schema::users::dsl as u;
            let submission = s::submissions
                .filter(s::id.eq(submission_id))
                .first::<Submission>(conn)
                .optional()?
                .ok_or_else(|| {
                    StorageError::NotFound(format!("submission not found: {submission_id}"))
                })?;
            let task = load_task(conn, submission.task_id)?;
            if task.parent_id != actor.user_id {
                return Err(StorageError::Forbidden(format!(
                    "submission {submission_id} belongs to another parent's task"
                )));
            }
            let review: ReviewStatus = parse_text(&submission.status)?;
            let review = review.decide(decision)?;
            let task_status: TaskStatus = parse_text(&task.status)?;
            let task_status = task_status.decide(decision)?;

            let now = Utc::now().naive_utc();
            let updated = diesel::update(s::submissions.filter(s::id.eq(submission_id)))
                .set((s::status.eq(review.as_str()), s::reviewed_at.eq(Some(now))))
                .returning(Submission::as_returning())
                .get_result(conn)?;
            set_task_status(conn, task.id, task_status)?;

            let (kind, action, message) = match decision {
                Decision::Approve => {
                    let child = load_user(conn, submission.child_id)?;
                    let balance = domain::credit(child.points, task.points).map_err(|e| {
                        warn!(
                            submission_id,
                            child_id = child.id,
                            balance = e.balance,
                            amount = e.amount,
                            "submission approval refused"
                        );
                        e
                    })?;
                    diesel::update(u::users.filter(u::id.eq(child.id)))
                        .set(u::points.eq(balance))
                        .execute(conn)?;
                    diesel::insert_into(schema::points_ledger::table)
                        .values(&NewPointsEntry {
                            user_id: submission.child_id,
                            delta: task.points,
                            reason: "task_approved",
                            task_id: Some(task.id),
                            redemption_id: None,
                        })
                        .execute(conn)?;
                    (
                        NotificationKind::SubmissionApproved,
                        AuditAction::SubmissionApprove,
                        format!("\"{}\" approved: +{} points", task.title, task.points),
                    )
                }
                Decision::Reject => (
                    NotificationKind::SubmissionRejected,
                    AuditAction::SubmissionReject,
                    format!("\"{}\" was not approved", task.title),
                ),
            };
            notify(
                conn,
                submission.child_id,
                actor.user_id,
                kind,
                "submission",
                submission_id,
                &message,
            )?;
            record_audit(
                conn,
                actor.user_id,
                action,
                submission_id,
                json!({ "task_id": task.id, "points": task.points, "status": review.as_str() }),
            )?;
            info!(
                submission_id,
                task_id = task.id,
                child_id = submission.child_id,
                decision = %decision,
                "submission decided"
            );
            Ok(updated)
        })
        .await
    }
}
