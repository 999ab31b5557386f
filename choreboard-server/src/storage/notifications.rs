use diesel::prelude::*;

use super::models::Notification;
use super::{Actor, Store, StorageError, schema};

const LIST_LIMIT: i64 = 100;

impl Store {
    /// The actor's inbox, newest first.
    pub async fn list_notifications(
        &self,
        actor: Actor,
    ) -> Result<Vec<Notification>, StorageError> {
        self.run(move |conn| {
            use schema::notifications::dsl as n;
            Ok(n::notifications
                .filter(n::to_user_id.eq(actor.user_id))
                .order((n::created_at.desc(), n::id.desc()))
                .limit(LIST_LIMIT)
                .load::<Notification>(conn)?)
        })
        .await
    }

    pub async fn unread_count(&self, actor: Actor) -> Result<u32, StorageError> {
        self.run(move |conn| {
            use schema::notifications::dsl as n;
            let count: i64 = n::notifications
                .filter(n::to_user_id.eq(actor.user_id))
                .filter(n::is_read.eq(false))
                .count()
                .get_result(conn)?;
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
        .await
    }

    /// Marks one of the actor's notifications as read. Someone else's
    /// notification is reported as missing.
    pub async fn mark_notification_read(
        &self,
        actor: Actor,
        notification_id: i32,
    ) -> Result<(), StorageError> {
        self.run(move |conn| {
            use schema::notifications::dsl as n;
            let updated = diesel::update(
                n::notifications
                    .filter(n::id.eq(notification_id))
                    .filter(n::to_user_id.eq(actor.user_id)),
            )
            .set(n::is_read.eq(true))
            .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::NotFound(format!(
                    "notification not found: {notification_id}"
                )));
            }
            Ok(())
        })
        .await
    }

    /// Deletes every notification addressed to the actor.
    pub async fn clear_notifications(&self, actor: Actor) -> Result<usize, StorageError> {
        self.run(move |conn| {
            use schema::notifications::dsl as n;
            Ok(diesel::delete(n::notifications.filter(n::to_user_id.eq(actor.user_id)))
                .execute(conn)?)
        })
        .await
    }
}
