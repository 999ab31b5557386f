use choreboard_shared::auth::Role;
use diesel::prelude::*;

use super::models::{PointsEntry, User};
use super::{Actor, Store, StorageError, family_ids_of, load_user, schema, shares_family};

impl Store {
    pub async fn get_user(&self, user_id: i32) -> Result<Option<User>, StorageError> {
        self.run(move |conn| {
            use schema::users::dsl as u;
            Ok(u::users
                .filter(u::id.eq(user_id))
                .first::<User>(conn)
                .optional()?)
        })
        .await
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        let name = username.to_string();
        self.run(move |conn| {
            use schema::users::dsl as u;
            Ok(u::users
                .filter(u::username.eq(&name))
                .first::<User>(conn)
                .optional()?)
        })
        .await
    }

    /// Children sharing at least one family with the parent.
    pub async fn list_children(&self, actor: Actor) -> Result<Vec<User>, StorageError> {
        actor.require(Role::Parent)?;
        self.run(move |conn| {
            use schema::family_members::dsl as fm;
            use schema::users::dsl as u;
            let my_families = family_ids_of(conn, actor.user_id)?;
            let child_ids = fm::family_members
                .filter(fm::family_id.eq_any(&my_families))
                .select(fm::user_id);
            Ok(u::users
                .filter(u::id.eq_any(child_ids))
                .filter(u::role.eq(Role::Child.as_str()))
                .order((u::display_name.asc(), u::id.asc()))
                .load::<User>(conn)?)
        })
        .await
    }

    pub async fn get_points(&self, actor: Actor, user_id: i32) -> Result<User, StorageError> {
        self.run(move |conn| {
            let user = load_user(conn, user_id)?;
            ensure_can_view(conn, actor, user_id)?;
            Ok(user)
        })
        .await
    }

    /// Every points change for a user, newest first.
    pub async fn points_history(
        &self,
        actor: Actor,
        user_id: i32,
    ) -> Result<Vec<PointsEntry>, StorageError> {
        self.run(move |conn| {
            load_user(conn, user_id)?;
            ensure_can_view(conn, actor, user_id)?;
            use schema::points_ledger::dsl as pl;
            Ok(pl::points_ledger
                .filter(pl::user_id.eq(user_id))
                .order((pl::created_at.desc(), pl::id.desc()))
                .load::<PointsEntry>(conn)?)
        })
        .await
    }
}

/// A user sees their own balance; a parent sees children of their families.
fn ensure_can_view(
    conn: &mut SqliteConnection,
    actor: Actor,
    user_id: i32,
) -> Result<(), StorageError> {
    if actor.user_id == user_id {
        return Ok(());
    }
    if actor.role == Role::Parent && shares_family(conn, actor.user_id, user_id)? {
        return Ok(());
    }
    Err(StorageError::Forbidden(format!(
        "not allowed to view user {user_id}"
    )))
}
