mod acl;
pub mod auth;
mod config;
mod extract;

use crate::server::auth::AuthCtx;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery};
use crate::storage::models::{
    AuditEntry, Family, Notification, PointsEntry, Redemption, Reward, Submission, Task, User,
};
use crate::storage::{RewardInput, StorageError, Store, SubmissionInput, TaskInput};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware;
use axum::response::Response as AxumResponse;
use axum::{
    Json, Router,
    extract::{Extension, State},
    http::{Method, StatusCode, header},
    routing::{get, post},
};
use bcrypt::verify;
use chrono::NaiveDateTime;
use choreboard_shared::api;
use choreboard_shared::auth::Role;
pub use config::{AppConfig, ConfigError, UserConfig};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Span, info_span};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        Self {
            config,
            store,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancelled once the process starts shutting down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[derive(Clone, Debug)]
struct ReqId(pub String);

pub fn router(state: AppState) -> Router {
    let private = Router::new()
        .route("/api/v1/me", get(api_me))
        .route("/api/v1/families", get(api_list_families).post(api_create_family))
        .route("/api/v1/families/join", post(api_join_family))
        .route("/api/v1/families/{id}/members", get(api_family_members))
        .route("/api/v1/children", get(api_list_children))
        .route("/api/v1/tasks", get(api_list_tasks).post(api_create_task))
        .route("/api/v1/tasks/{id}", get(api_get_task))
        .route(
            "/api/v1/tasks/{id}/submissions",
            get(api_list_task_submissions).post(api_submit_task),
        )
        .route("/api/v1/submissions/pending", get(api_pending_submissions))
        .route(
            "/api/v1/submissions/{id}/decision",
            post(api_decide_submission),
        )
        .route("/api/v1/rewards", get(api_list_rewards).post(api_create_reward))
        .route(
            "/api/v1/rewards/{id}/redemptions",
            post(api_request_redemption),
        )
        .route("/api/v1/redemptions", get(api_list_redemptions))
        .route(
            "/api/v1/redemptions/{id}/decision",
            post(api_decide_redemption),
        )
        .route("/api/v1/notifications", get(api_notifications))
        .route("/api/v1/notifications/count", get(api_notifications_count))
        .route("/api/v1/notifications/clear", post(api_notifications_clear))
        .route("/api/v1/notifications/{id}/read", post(api_notification_read))
        .route("/api/v1/users/{id}/points", get(api_user_points))
        .route(
            "/api/v1/users/{id}/points/history",
            get(api_user_points_history),
        )
        .route("/api/v1/audit", get(api_audit))
        .with_state(state.clone())
        // Innermost first: bearer runs, then span fields, then the role gate.
        .layer(middleware::from_fn(acl::enforce_acl))
        .layer(middleware::from_fn(set_auth_span_fields))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    // Trace with request context (method, path, request_id)
    let trace = TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
        let request_id = req
            .extensions()
            .get::<ReqId>()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
            username = tracing::field::Empty,
            role = tracing::field::Empty,
            user_id = tracing::field::Empty
        )
    });

    let app = Router::new()
        .route("/healthz", get(health))
        .route("/api/v1/version", get(api_version))
        .route("/api/v1/auth/login", post(api_auth_login))
        .merge(private)
        .with_state(state.clone())
        .layer(trace)
        .layer(middleware::from_fn(add_security_headers))
        .layer(middleware::from_fn(add_request_id));

    // Optionally add CORS for dev if configured

    if let Some(origin) = &state.config.dev_cors_origin {
        let hv = header::HeaderValue::from_str(origin)
            .unwrap_or(header::HeaderValue::from_static("http://localhost:5173"));
        let cors = CorsLayer::new()
            .allow_origin(hv)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        app.layer(cors)
    } else {
        app
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn api_version() -> Json<api::VersionInfoDto> {
    Json(api::VersionInfoDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn add_request_id(
    mut req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    let hdr = HeaderName::from_static("x-request-id");
    // Use provided x-request-id if present, else generate
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(ReqId(rid.clone()));
    let mut resp = next.run(req).await;
    if let Ok(hv) = HeaderValue::from_str(&rid) {
        resp.headers_mut().insert(hdr, hv);
    }
    Ok(resp)
}

async fn add_security_headers(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    let path = req.uri().path().to_string();
    let mut resp = next.run(req).await;

    let headers = resp.headers_mut();
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    // Balances and review queues must never be served from a cache
    if path == "/healthz" || path.starts_with("/api/") {
        headers.insert(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
        headers.insert(
            HeaderName::from_static("pragma"),
            HeaderValue::from_static("no-cache"),
        );
    }

    Ok(resp)
}

async fn set_auth_span_fields(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    if let Some(auth) = req.extensions().get::<AuthCtx>() {
        let span = Span::current();
        span.record("username", tracing::field::display(&auth.username));
        span.record("role", tracing::field::display(&auth.role));
        span.record("user_id", auth.user_id);
    }
    Ok(next.run(req).await)
}

fn rfc3339(dt: NaiveDateTime) -> String {
    chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(dt, chrono::Utc).to_rfc3339()
}

/// Parses a text column into its enum; a bad value is a server-side fault.
fn column<T: FromStr<Err = String>>(value: &str) -> Result<T, AppError> {
    value.parse::<T>().map_err(AppError::internal)
}

fn user_dto(u: User) -> Result<api::UserDto, AppError> {
    Ok(api::UserDto {
        id: u.id,
        role: column::<Role>(&u.role)?,
        username: u.username,
        display_name: u.display_name,
        points: u.points,
    })
}

fn family_dto(f: Family) -> api::FamilyDto {
    api::FamilyDto {
        id: f.id,
        name: f.name,
        invite_code: f.invite_code,
        owner_parent_id: f.owner_parent_id,
        created_at: rfc3339(f.created_at),
    }
}

fn task_dto(t: Task) -> Result<api::TaskDto, AppError> {
    Ok(api::TaskDto {
        id: t.id,
        status: column(&t.status)?,
        title: t.title,
        description: t.description,
        points: t.points,
        parent_id: t.parent_id,
        child_id: t.child_id,
        created_at: rfc3339(t.created_at),
        updated_at: rfc3339(t.updated_at),
    })
}

fn submission_dto(s: Submission) -> Result<api::SubmissionDto, AppError> {
    Ok(api::SubmissionDto {
        id: s.id,
        status: column(&s.status)?,
        task_id: s.task_id,
        child_id: s.child_id,
        message: s.message,
        evidence_ref: s.evidence_ref,
        submitted_at: rfc3339(s.submitted_at),
        reviewed_at: s.reviewed_at.map(rfc3339),
    })
}

fn reward_dto(r: Reward) -> api::RewardDto {
    api::RewardDto {
        id: r.id,
        parent_id: r.parent_id,
        name: r.name,
        description: r.description,
        cost: r.cost,
        created_at: rfc3339(r.created_at),
    }
}

fn redemption_dto((r, reward): (Redemption, Reward)) -> Result<api::RedemptionDto, AppError> {
    Ok(api::RedemptionDto {
        id: r.id,
        reward_id: r.reward_id,
        reward_name: reward.name,
        cost: reward.cost,
        child_id: r.child_id,
        status: column(&r.status)?,
        created_at: rfc3339(r.created_at),
        reviewed_at: r.reviewed_at.map(rfc3339),
    })
}

fn notification_dto(n: Notification) -> Result<api::NotificationDto, AppError> {
    Ok(api::NotificationDto {
        id: n.id,
        kind: column(&n.kind)?,
        actor_user_id: n.actor_user_id,
        entity: n.entity,
        entity_id: n.entity_id,
        message: n.message,
        is_read: n.is_read,
        created_at: rfc3339(n.created_at),
    })
}

fn points_entry_dto(e: PointsEntry) -> api::PointsEntryDto {
    api::PointsEntryDto {
        id: e.id,
        delta: e.delta,
        reason: e.reason,
        task_id: e.task_id,
        redemption_id: e.redemption_id,
        created_at: rfc3339(e.created_at),
    }
}

fn audit_dto(e: AuditEntry) -> api::AuditEntryDto {
    let details = serde_json::from_str(&e.details)
        .unwrap_or_else(|_| serde_json::Value::String(e.details.clone()));
    api::AuditEntryDto {
        id: e.id,
        action: e.action,
        target_table: e.target_table,
        target_id: e.target_id,
        details,
        created_at: rfc3339(e.created_at),
    }
}

async fn api_auth_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::AuthReq>,
) -> Result<Json<api::AuthResp>, AppError> {
    let user = state
        .store
        .find_user_by_username(&body.username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username=%body.username, "login: unknown username");
            AppError::unauthorized()
        })?;
    if !verify(&body.password, &user.password_hash).map_err(|e| {
        tracing::error!(username=%body.username, error=%e, "login: bcrypt verify failed");
        AppError::internal(e)
    })? {
        tracing::warn!(username=%body.username, "login: invalid password");
        return Err(AppError::unauthorized());
    }
    let token = auth::issue_jwt_for_user(&state, &user)?;
    tracing::info!(username = %user.username, role = %user.role, "login: token issued");
    Ok(Json(api::AuthResp { token }))
}

async fn api_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<api::UserDto>, AppError> {
    let user = state
        .store
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user not found: {}", auth.user_id)))?;
    Ok(Json(user_dto(user)?))
}

async fn api_list_families(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::FamilyDto>>, AppError> {
    let rows = state.store.list_families(auth.actor()).await?;
    Ok(Json(rows.into_iter().map(family_dto).collect()))
}

async fn api_create_family(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiJson(body): ApiJson<api::CreateFamilyReq>,
) -> Result<(StatusCode, Json<api::FamilyDto>), AppError> {
    let family = state.store.create_family(auth.actor(), &body.name).await?;
    Ok((StatusCode::CREATED, Json(family_dto(family))))
}

async fn api_join_family(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiJson(body): ApiJson<api::JoinFamilyReq>,
) -> Result<Json<api::FamilyDto>, AppError> {
    let family = state
        .store
        .join_family(auth.actor(), &body.invite_code)
        .await?;
    Ok(Json(family_dto(family)))
}

async fn api_family_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<api::FamilyMemberDto>>, AppError> {
    let rows = state.store.list_members(auth.actor(), id).await?;
    let items = rows
        .into_iter()
        .map(|(m, u)| {
            Ok(api::FamilyMemberDto {
                user_id: u.id,
                username: u.username,
                display_name: u.display_name,
                role: column(&m.role)?,
                joined_at: rfc3339(m.joined_at),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(Json(items))
}

async fn api_list_children(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::UserDto>>, AppError> {
    let rows = state.store.list_children(auth.actor()).await?;
    let items = rows
        .into_iter()
        .map(user_dto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

async fn api_list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiQuery(filter): ApiQuery<api::TaskFilter>,
) -> Result<Json<Vec<api::TaskDto>>, AppError> {
    let rows = state.store.list_tasks(auth.actor(), filter.child_id).await?;
    let items = rows
        .into_iter()
        .map(task_dto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

async fn api_create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiJson(body): ApiJson<api::CreateTaskReq>,
) -> Result<(StatusCode, Json<api::TaskDto>), AppError> {
    let task = state
        .store
        .create_task(
            auth.actor(),
            TaskInput {
                child_id: body.child_id,
                title: body.title,
                description: body.description,
                points: body.points,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(task_dto(task)?)))
}

async fn api_get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::TaskDto>, AppError> {
    let task = state.store.get_task(auth.actor(), id).await?;
    Ok(Json(task_dto(task)?))
}

async fn api_list_task_submissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<api::SubmissionDto>>, AppError> {
    let rows = state.store.list_task_submissions(auth.actor(), id).await?;
    let items = rows
        .into_iter()
        .map(submission_dto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

async fn api_submit_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::SubmitTaskReq>,
) -> Result<(StatusCode, Json<api::SubmissionDto>), AppError> {
    let submission = state
        .store
        .submit_task(
            auth.actor(),
            id,
            SubmissionInput {
                message: body.message,
                evidence_ref: body.evidence_ref,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(submission_dto(submission)?)))
}

async fn api_pending_submissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::PendingSubmissionDto>>, AppError> {
    let rows = state.store.list_pending_submissions(auth.actor()).await?;
    let items = rows
        .into_iter()
        .map(|(s, t, child)| api::PendingSubmissionDto {
            id: s.id,
            task_id: t.id,
            task_title: t.title,
            points: t.points,
            child_id: child.id,
            child_name: child.display_name,
            message: s.message,
            evidence_ref: s.evidence_ref,
            submitted_at: rfc3339(s.submitted_at),
        })
        .collect();
    Ok(Json(items))
}

async fn api_decide_submission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::DecisionReq>,
) -> Result<Json<api::SubmissionDto>, AppError> {
    let submission = state
        .store
        .decide_submission(auth.actor(), id, body.decision)
        .await?;
    Ok(Json(submission_dto(submission)?))
}

async fn api_list_rewards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::RewardDto>>, AppError> {
    let rows = state.store.list_rewards(auth.actor()).await?;
    Ok(Json(rows.into_iter().map(reward_dto).collect()))
}

async fn api_create_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiJson(body): ApiJson<api::CreateRewardReq>,
) -> Result<(StatusCode, Json<api::RewardDto>), AppError> {
    let reward = state
        .store
        .create_reward(
            auth.actor(),
            RewardInput {
                name: body.name,
                description: body.description,
                cost: body.cost,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reward_dto(reward))))
}

async fn api_request_redemption(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<(StatusCode, Json<api::RedemptionDto>), AppError> {
    let row = state.store.request_redemption(auth.actor(), id).await?;
    Ok((StatusCode::CREATED, Json(redemption_dto(row)?)))
}

async fn api_list_redemptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::RedemptionDto>>, AppError> {
    let rows = state.store.list_redemptions(auth.actor()).await?;
    let items = rows
        .into_iter()
        .map(redemption_dto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

async fn api_decide_redemption(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::DecisionReq>,
) -> Result<Json<api::RedemptionDto>, AppError> {
    let row = state
        .store
        .decide_redemption(auth.actor(), id, body.decision)
        .await?;
    Ok(Json(redemption_dto(row)?))
}

async fn api_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::NotificationDto>>, AppError> {
    let rows = state.store.list_notifications(auth.actor()).await?;
    let items = rows
        .into_iter()
        .map(notification_dto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

async fn api_notifications_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<api::NotificationsCountDto>, AppError> {
    let count = state.store.unread_count(auth.actor()).await?;
    Ok(Json(api::NotificationsCountDto { count }))
}

async fn api_notification_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    state.store.mark_notification_read(auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn api_notifications_clear(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.clear_notifications(auth.actor()).await?;
    tracing::debug!(user_id = auth.user_id, removed, "notifications cleared");
    Ok(StatusCode::NO_CONTENT)
}

async fn api_user_points(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::PointsDto>, AppError> {
    let user = state.store.get_points(auth.actor(), id).await?;
    Ok(Json(api::PointsDto {
        user_id: user.id,
        points: user.points,
    }))
}

async fn api_user_points_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<api::PointsEntryDto>>, AppError> {
    let rows = state.store.points_history(auth.actor(), id).await?;
    Ok(Json(rows.into_iter().map(points_entry_dto).collect()))
}

#[derive(Deserialize)]
struct AuditOpts {
    limit: Option<i64>,
}

async fn api_audit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiQuery(opts): ApiQuery<AuditOpts>,
) -> Result<Json<Vec<api::AuditEntryDto>>, AppError> {
    let rows = state
        .store
        .list_audit(auth.actor(), opts.limit.unwrap_or(100))
        .await?;
    Ok(Json(rows.into_iter().map(audit_dto).collect()))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn unauthorized() -> Self {
        Self::Unauthorized
    }
    fn forbidden() -> Self {
        Self::Forbidden("forbidden".into())
    }
    fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }
    fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(m) => AppError::NotFound(m),
            StorageError::Forbidden(m) => AppError::Forbidden(m),
            StorageError::Conflict(m) => AppError::Conflict(m),
            StorageError::InvalidInput(m) => AppError::BadRequest(m),
            other => AppError::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg, kind, detail) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m, "bad_request", None),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized".into(),
                "unauthorized",
                None,
            ),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, m, "forbidden", None),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m, "not_found", None),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m, "conflict", None),
            // Do not leak internal error details to clients, but log them
            AppError::Internal(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
                "internal",
                Some(m),
            ),
        };
        if let Some(detail) = detail {
            tracing::error!(status = %status, kind = kind, message = %msg, detail = %detail, "request failed");
        } else {
            tracing::warn!(status = %status, kind = kind, message = %msg, "request rejected");
        }
        let body = axum::Json(ErrorBody { error: msg });
        (status, body).into_response()
    }
}
