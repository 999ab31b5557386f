pub mod models;
pub mod schema;

mod audit;
mod families;
mod notifications;
mod rewards;
mod tasks;
mod users;

use choreboard_shared::auth::Role;
use choreboard_shared::domain::{
    BalanceOverflow, InsufficientPoints, NotificationKind, TransitionError,
};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{NewAuditEntry, NewNotification, NewUser};
use tracing::{debug, trace};

pub use audit::AuditAction;
pub use rewards::RewardInput;
pub use tasks::{SubmissionInput, TaskInput};

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error (query failure, constraint violation, etc.)
    #[error("database error: {0}")]
    Database(DieselError),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// The referenced row does not exist (or is not visible to the actor).
    #[error("{0}")]
    NotFound(String),

    /// The actor is not allowed to touch the referenced row.
    #[error("{0}")]
    Forbidden(String),

    /// The row is not in a state that allows the requested change.
    #[error("{0}")]
    Conflict(String),

    /// The caller supplied invalid input.
    #[error("{0}")]
    InvalidInput(String),
}

impl From<DieselError> for StorageError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StorageError::Conflict(format!("conflict: {}", info.message()))
            }
            other => StorageError::Database(other),
        }
    }
}

impl From<TransitionError> for StorageError {
    fn from(err: TransitionError) -> Self {
        StorageError::Conflict(err.to_string())
    }
}

impl From<InsufficientPoints> for StorageError {
    fn from(err: InsufficientPoints) -> Self {
        StorageError::InvalidInput(err.to_string())
    }
}

impl From<BalanceOverflow> for StorageError {
    fn from(err: BalanceOverflow) -> Self {
        StorageError::Conflict(err.to_string())
    }
}

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl Actor {
    pub fn parent(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Parent,
        }
    }

    pub fn child(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Child,
        }
    }

    fn require(&self, role: Role) -> Result<(), StorageError> {
        if self.role == role {
            Ok(())
        } else {
            Err(StorageError::Forbidden(format!("{role} role required")))
        }
    }
}

/// Account seeded from configuration.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder().max_size(8).build(manager)?;

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                let applied = conn
                    .run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                debug!(count = applied.len(), "migrations applied");
                Ok(())
            })
            .await??;
        }

        Ok(Store { pool })
    }

    /// Upserts configured accounts by username. Points are never touched so a
    /// restart does not reset balances.
    pub async fn seed_users(&self, seed: &[SeedUser]) -> Result<(), StorageError> {
        use schema::users;
        let seed = seed.to_vec();
        self.run(move |conn| {
            for u in &seed {
                let row = NewUser {
                    username: &u.username,
                    display_name: &u.display_name,
                    role: u.role.as_str(),
                    password_hash: &u.password_hash,
                };
                diesel::insert_into(users::table)
                    .values(&row)
                    .on_conflict(users::username)
                    .do_update()
                    .set((
                        users::display_name.eq(row.display_name),
                        users::role.eq(row.role),
                        users::password_hash.eq(row.password_hash),
                    ))
                    .execute(conn)?;
                trace!(username = %u.username, role = %u.role, "seeded user");
            }
            Ok(())
        })
        .await
    }

    /// Runs `f` on a pooled connection off the async runtime. The connection
    /// returns to the pool when `f` finishes, whatever the outcome.
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            f(&mut *conn)
        })
        .await?
    }

    /// Like [`Store::run`], inside `BEGIN IMMEDIATE`. The write lock is taken
    /// before the first read, so check-then-update sequences on one row are
    /// serialized across connections.
    async fn write<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        self.run(move |conn| conn.immediate_transaction(f)).await
    }
}

/// True when both users belong to at least one common family.
fn shares_family(
    conn: &mut SqliteConnection,
    user_a: i32,
    user_b: i32,
) -> Result<bool, StorageError> {
    use schema::family_members::dsl as fm;
    let families_of_a = family_ids_of(conn, user_a)?;
    let shared: i64 = fm::family_members
        .filter(fm::user_id.eq(user_b))
        .filter(fm::family_id.eq_any(&families_of_a))
        .count()
        .get_result(conn)?;
    Ok(shared > 0)
}

fn family_ids_of(conn: &mut SqliteConnection, user_id: i32) -> Result<Vec<i32>, StorageError> {
    use schema::family_members::dsl as fm;
    Ok(fm::family_members
        .filter(fm::user_id.eq(user_id))
        .select(fm::family_id)
        .load::<i32>(conn)?)
}

fn load_user(conn: &mut SqliteConnection, user_id: i32) -> Result<models::User, StorageError> {
    use schema::users::dsl as u;
    u::users
        .filter(u::id.eq(user_id))
        .first::<models::User>(conn)
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("user not found: {user_id}")))
}

fn notify(
    conn: &mut SqliteConnection,
    to_user_id: i32,
    actor_user_id: i32,
    kind: NotificationKind,
    entity: &str,
    entity_id: i32,
    message: &str,
) -> Result<(), StorageError> {
    diesel::insert_into(schema::notifications::table)
        .values(&NewNotification {
            to_user_id,
            actor_user_id,
            kind: kind.as_str(),
            entity,
            entity_id,
            message,
        })
        .execute(conn)?;
    trace!(to_user_id, kind = %kind, entity, entity_id, "notification stored");
    Ok(())
}

fn record_audit(
    conn: &mut SqliteConnection,
    actor_id: i32,
    action: AuditAction,
    target_id: i32,
    details: serde_json::Value,
) -> Result<(), StorageError> {
    let details = details.to_string();
    diesel::insert_into(schema::audit_log::table)
        .values(&NewAuditEntry {
            actor_id,
            action: action.as_str(),
            target_table: action.target_table(),
            target_id,
            details: &details,
        })
        .execute(conn)?;
    Ok(())
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    // Enable WAL for better read/write concurrency and set a busy timeout
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    Ok(())
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, StorageError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Parses a status column written by this crate. A value that does not parse
/// means the row was written by something else.
fn parse_text<T>(value: &str) -> Result<T, StorageError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse::<T>()
        .map_err(|e| StorageError::Database(DieselError::DeserializationError(e.into())))
}
