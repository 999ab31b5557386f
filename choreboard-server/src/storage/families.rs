use choreboard_shared::auth::Role;
use choreboard_shared::domain::normalize_invite_code;
use diesel::prelude::*;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::models::{Family, FamilyMember, NewFamily, NewFamilyMember, User};
use super::{Actor, AuditAction, Store, StorageError, load_user, non_empty, record_audit, schema};

const INVITE_CODE_PREFIX: &str = "FAM-";

fn generate_invite_code() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{INVITE_CODE_PREFIX}{}", token[..6].to_ascii_uppercase())
}

fn unique_invite_code(conn: &mut SqliteConnection) -> Result<String, StorageError> {
    use schema::families::dsl as f;
    loop {
        let code = generate_invite_code();
        let taken: i64 = f::families
            .filter(f::invite_code.eq(&code))
            .count()
            .get_result(conn)?;
        if taken == 0 {
            return Ok(code);
        }
        debug!(code = %code, "invite code collision; regenerating");
    }
}

impl Store {
    /// Creates a family owned by the parent, who becomes its first member.
    pub async fn create_family(&self, actor: Actor, name: &str) -> Result<Family, StorageError> {
        actor.require(Role::Parent)?;
        let name = non_empty(name, "family name")?.to_string();
        self.write(move |conn| {
            use schema::families::dsl as f;
            let exists: i64 = f::families
                .filter(f::name.eq(&name))
                .count()
                .get_result(conn)?;
            if exists > 0 {
                return Err(StorageError::Conflict(format!(
                    "family name already taken: {name}"
                )));
            }
            let code = unique_invite_code(conn)?;
            let family = diesel::insert_into(schema::families::table)
                .values(&NewFamily {
                    name: &name,
                    invite_code: &code,
                    owner_parent_id: actor.user_id,
                })
                .returning(Family::as_returning())
                .get_result(conn)?;
            diesel::insert_into(schema::family_members::table)
                .values(&NewFamilyMember {
                    family_id: family.id,
                    user_id: actor.user_id,
                    role: Role::Parent.as_str(),
                })
                .execute(conn)?;
            record_audit(
                conn,
                actor.user_id,
                AuditAction::FamilyCreate,
                family.id,
                json!({ "name": family.name }),
            )?;
            Ok(family)
        })
        .await
    }

    /// Adds a child to the family behind `invite_code`.
    pub async fn join_family(&self, actor: Actor, invite_code: &str) -> Result<Family, StorageError> {
        let code = normalize_invite_code(invite_code);
        self.write(move |conn| {
            use schema::families::dsl as f;
            use schema::family_members::dsl as fm;
            let family = f::families
                .filter(f::invite_code.eq(&code))
                .first::<Family>(conn)
                .optional()?
                .ok_or_else(|| StorageError::InvalidInput("invalid invite code".into()))?;
            let user = load_user(conn, actor.user_id)?;
            if user.role != Role::Child.as_str() {
                return Err(StorageError::InvalidInput(
                    "only children can join a family".into(),
                ));
            }
            let already: i64 = fm::family_members
                .filter(fm::family_id.eq(family.id))
                .filter(fm::user_id.eq(user.id))
                .count()
                .get_result(conn)?;
            if already > 0 {
                return Err(StorageError::InvalidInput("already joined".into()));
            }
            diesel::insert_into(schema::family_members::table)
                .values(&NewFamilyMember {
                    family_id: family.id,
                    user_id: user.id,
                    role: Role::Child.as_str(),
                })
                .execute(conn)?;
            record_audit(
                conn,
                user.id,
                AuditAction::FamilyJoin,
                family.id,
                json!({ "role": Role::Child.as_str() }),
            )?;
            Ok(family)
        })
        .await
    }

    pub async fn list_families(&self, actor: Actor) -> Result<Vec<Family>, StorageError> {
        self.run(move |conn| {
            use schema::families::dsl as f;
            use schema::family_members::dsl as fm;
            let mine = fm::family_members
                .filter(fm::user_id.eq(actor.user_id))
                .select(fm::family_id);
            Ok(f::families
                .filter(f::id.eq_any(mine))
                .order((f::name.asc(), f::id.asc()))
                .load::<Family>(conn)?)
        })
        .await
    }

    /// Members of a family; only visible to its members.
    pub async fn list_members(
        &self,
        actor: Actor,
        family_id: i32,
    ) -> Result<Vec<(FamilyMember, User)>, StorageError> {
        self.run(move |conn| {
            use schema::families::dsl as f;
            use schema::family_members::dsl as fm;
            use schema::users;
            let exists: i64 = f::families
                .filter(f::id.eq(family_id))
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(StorageError::NotFound(format!(
                    "family not found: {family_id}"
                )));
            }
            let is_member: i64 = fm::family_members
                .filter(fm::family_id.eq(family_id))
                .filter(fm::user_id.eq(actor.user_id))
                .count()
                .get_result(conn)?;
            if is_member == 0 {
                return Err(StorageError::Forbidden("not a member of this family".into()));
            }
            Ok(fm::family_members
                .inner_join(users::table)
                .filter(fm::family_id.eq(family_id))
                .order((fm::joined_at.asc(), fm::user_id.asc()))
                .select((FamilyMember::as_select(), User::as_select()))
                .load::<(FamilyMember, User)>(conn)?)
        })
        .await
    }
}
