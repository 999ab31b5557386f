use axum::http::StatusCode;
use choreboard_server::{server, storage};
use choreboard_shared::api::{self, rest};
use choreboard_shared::auth::Role;
use choreboard_shared::domain::{Decision, NotificationKind, ReviewStatus, TaskStatus};
use reqwest::Client;
use serde_json::{Value, json};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;

const LOGIN_PATH: &str = "/api/v1/auth/login";
const PASSWORD: &str = "secret123";
// Minimum bcrypt cost keeps test setup fast.
const TEST_BCRYPT_COST: u32 = 4;

struct TestServer {
    base: String,
    client: Client,
    handle: tokio::task::JoinHandle<()>,
    _tempdir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Option<Self> {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let (addr, handle) = match start_server(&db_path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                eprintln!("Skipping test due to sandbox restrictions: {e}");
                return None;
            }
            Err(e) => panic!("failed to start server: {e}"),
        };
        Some(Self {
            base: format!("http://{}", addr),
            client: Client::new(),
            handle,
            _tempdir: dir,
        })
    }

    async fn login(&self, username: &str) -> String {
        let body = self
            .request_expect(
                "POST",
                LOGIN_PATH,
                None,
                Some(json!({"username": username, "password": PASSWORD})),
                StatusCode::OK,
            )
            .await;
        body.get("token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .expect("token missing from auth response")
    }

    /// Logs in and resolves the account id through `/me`.
    async fn session(&self, username: &str) -> Session {
        let token = self.login(username).await;
        let me = rest::me(&self.base, &token).await.unwrap();
        Session { token, id: me.id }
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let url = format!("{}{}", self.base, path);
        let mut req = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            other => panic!("unsupported method {other}"),
        };
        if let Some(t) = token {
            req = req.bearer_auth(t);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        let resp = req.send().await.unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        let text = resp.text().await.unwrap();
        let val = if text.is_empty() {
            json!(null)
        } else {
            serde_json::from_str(&text).unwrap_or(json!({"raw": text}))
        };
        (status, val)
    }

    async fn request_expect(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let (status, value) = self.request(method, path, token, body).await;
        assert_eq!(
            status, expected,
            "{method} {path} returned {status:?} with body {value:?}",
        );
        value
    }

    /// Creates a family owned by `parent` and enrolls each child in it.
    async fn family_with(&self, parent: &Session, name: &str, children: &[&Session]) {
        let family = rest::create_family(
            &self.base,
            &parent.token,
            &api::CreateFamilyReq { name: name.into() },
        )
        .await
        .unwrap();
        for child in children {
            rest::join_family(
                &self.base,
                &child.token,
                &api::JoinFamilyReq {
                    invite_code: family.invite_code.clone(),
                },
            )
            .await
            .unwrap();
        }
    }

    async fn points_of(&self, viewer: &Session, user_id: i32) -> i32 {
        rest::user_points(&self.base, &viewer.token, user_id)
            .await
            .unwrap()
            .points
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Session {
    token: String,
    id: i32,
}

fn user(username: &str, display_name: &str, role: Role) -> server::UserConfig {
    server::UserConfig {
        username: username.into(),
        display_name: Some(display_name.into()),
        password_hash: bcrypt::hash(PASSWORD, TEST_BCRYPT_COST).unwrap(),
        role,
    }
}

async fn start_server(
    tmp_db: &Path,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), std::io::Error> {
    let config = server::AppConfig {
        jwt_secret: "testsecret".into(),
        users: vec![
            user("mom", "Mom", Role::Parent),
            user("dad", "Dad", Role::Parent),
            user("alice", "Alice", Role::Child),
            user("bob", "Bob", Role::Child),
        ],
        dev_cors_origin: None,
        listen_port: None,
    };

    let store = storage::Store::connect_sqlite(tmp_db.to_str().unwrap())
        .await
        .expect("db");
    store.seed_users(&config.seed_users()).await.expect("seed");

    let state = server::AppState::new(config, store);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok((addr, handle))
}

fn error_message(body: &Value) -> &str {
    body.get("error").and_then(|v| v.as_str()).unwrap_or("")
}

#[tokio::test]
async fn public_endpoints_work() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    server
        .request_expect("GET", "/healthz", None, None, StatusCode::OK)
        .await;
    let version = rest::server_version(&server.base).await.unwrap();
    assert_eq!(version.version, env!("CARGO_PKG_VERSION"));

    let token = server.login("mom").await;
    assert!(!token.is_empty());
    let claims = choreboard_shared::jwt::decode_unverified(&token).unwrap();
    assert_eq!(claims.sub, "mom");
    assert_eq!(claims.role, Role::Parent);

    server
        .request_expect(
            "POST",
            LOGIN_PATH,
            None,
            Some(json!({"username": "mom", "password": "wrong"})),
            StatusCode::UNAUTHORIZED,
        )
        .await;
    server
        .request_expect(
            "POST",
            LOGIN_PATH,
            None,
            Some(json!({"username": "nobody", "password": PASSWORD})),
            StatusCode::UNAUTHORIZED,
        )
        .await;
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let cases: Vec<(&str, &str, Option<Value>)> = vec![
        ("GET", "/api/v1/me", None),
        ("GET", "/api/v1/families", None),
        ("POST", "/api/v1/families/join", Some(json!({"invite_code": "FAM-000000"}))),
        ("GET", "/api/v1/children", None),
        ("GET", "/api/v1/tasks", None),
        (
            "POST",
            "/api/v1/tasks",
            Some(json!({"child_id": 1, "title": "x", "points": 1})),
        ),
        ("POST", "/api/v1/tasks/1/submissions", Some(json!({}))),
        ("GET", "/api/v1/submissions/pending", None),
        (
            "POST",
            "/api/v1/submissions/1/decision",
            Some(json!({"decision": "approve"})),
        ),
        ("GET", "/api/v1/rewards", None),
        ("POST", "/api/v1/rewards/1/redemptions", Some(json!({}))),
        ("GET", "/api/v1/notifications/count", None),
        ("GET", "/api/v1/users/1/points", None),
        ("GET", "/api/v1/audit", None),
    ];

    for (method, path, body) in cases.iter() {
        let value = server
            .request_expect(method, path, None, body.clone(), StatusCode::UNAUTHORIZED)
            .await;
        assert_eq!(error_message(&value), "unauthorized");
    }

    server
        .request_expect(
            "GET",
            "/api/v1/me",
            Some("not-a-jwt"),
            None,
            StatusCode::UNAUTHORIZED,
        )
        .await;
}

#[tokio::test]
async fn role_gate_blocks_wrong_role() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let mom = server.login("mom").await;
    let alice = server.login("alice").await;

    let child_denied: Vec<(&str, &str, Option<Value>)> = vec![
        ("POST", "/api/v1/families", Some(json!({"name": "Kids Only"}))),
        ("GET", "/api/v1/children", None),
        (
            "POST",
            "/api/v1/tasks",
            Some(json!({"child_id": 1, "title": "x", "points": 1})),
        ),
        ("GET", "/api/v1/submissions/pending", None),
        (
            "POST",
            "/api/v1/submissions/1/decision",
            Some(json!({"decision": "approve"})),
        ),
        (
            "POST",
            "/api/v1/rewards",
            Some(json!({"name": "x", "cost": 1})),
        ),
        (
            "POST",
            "/api/v1/redemptions/1/decision",
            Some(json!({"decision": "approve"})),
        ),
        ("GET", "/api/v1/audit", None),
    ];
    for (method, path, body) in child_denied.iter() {
        server
            .request_expect(method, path, Some(&alice), body.clone(), StatusCode::FORBIDDEN)
            .await;
    }

    let parent_denied: Vec<(&str, &str, Option<Value>)> = vec![
        ("POST", "/api/v1/tasks/1/submissions", Some(json!({}))),
        ("POST", "/api/v1/rewards/1/redemptions", Some(json!({}))),
    ];
    for (method, path, body) in parent_denied.iter() {
        server
            .request_expect(method, path, Some(&mom), body.clone(), StatusCode::FORBIDDEN)
            .await;
    }

    // Both roles may read their own profile and inbox.
    for token in [&mom, &alice] {
        server
            .request_expect("GET", "/api/v1/me", Some(token), None, StatusCode::OK)
            .await;
        server
            .request_expect(
                "GET",
                "/api/v1/notifications",
                Some(token),
                None,
                StatusCode::OK,
            )
            .await;
    }
}

#[tokio::test]
async fn joining_a_family() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;

    let family = rest::create_family(
        &server.base,
        &mom.token,
        &api::CreateFamilyReq {
            name: "Smiths".into(),
        },
    )
    .await
    .unwrap();
    assert!(family.invite_code.starts_with("FAM-"));
    assert_eq!(family.owner_parent_id, mom.id);

    // Codes are matched case-insensitively after trimming.
    let joined = rest::join_family(
        &server.base,
        &alice.token,
        &api::JoinFamilyReq {
            invite_code: format!("  {}  ", family.invite_code.to_lowercase()),
        },
    )
    .await
    .unwrap();
    assert_eq!(joined.id, family.id);

    let again = server
        .request_expect(
            "POST",
            "/api/v1/families/join",
            Some(&alice.token),
            Some(json!({"invite_code": family.invite_code})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error_message(&again), "already joined");

    let bad = server
        .request_expect(
            "POST",
            "/api/v1/families/join",
            Some(&alice.token),
            Some(json!({"invite_code": "FAM-NOPE00"})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error_message(&bad), "invalid invite code");

    let parent_join = server
        .request_expect(
            "POST",
            "/api/v1/families/join",
            Some(&mom.token),
            Some(json!({"invite_code": family.invite_code})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error_message(&parent_join), "only children can join a family");

    // Family names are unique.
    server
        .request_expect(
            "POST",
            "/api/v1/families",
            Some(&mom.token),
            Some(json!({"name": "Smiths"})),
            StatusCode::CONFLICT,
        )
        .await;

    let members = server
        .request_expect(
            "GET",
            &format!("/api/v1/families/{}/members", family.id),
            Some(&alice.token),
            None,
            StatusCode::OK,
        )
        .await;
    let names: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m.get("username").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(names, vec!["mom", "alice"]);

    let dad = server.login("dad").await;
    server
        .request_expect(
            "GET",
            &format!("/api/v1/families/{}/members", family.id),
            Some(&dad),
            None,
            StatusCode::FORBIDDEN,
        )
        .await;

    let children = rest::list_children(&server.base, &mom.token).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, alice.id);
    assert_eq!(children[0].role, Role::Child);
}

#[tokio::test]
async fn task_approval_credits_points() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let base = server.base.clone();
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;

    let task = rest::create_task(
        &base,
        &mom.token,
        &api::CreateTaskReq {
            child_id: alice.id,
            title: "Clean room".into(),
            description: Some("Floor and desk".into()),
            points: 10,
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, TaskStatus::Assigned);
    assert_eq!(task.parent_id, mom.id);

    let child_tasks = rest::list_tasks(&base, &alice.token).await.unwrap();
    assert_eq!(child_tasks.len(), 1);
    assert_eq!(child_tasks[0].id, task.id);

    let submission = rest::submit_task(
        &base,
        &alice.token,
        task.id,
        &api::SubmitTaskReq {
            message: Some("done!".into()),
            evidence_ref: Some("photos/room.jpg".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(submission.status, ReviewStatus::Pending);

    // A second submission while one is under review is a state conflict.
    let dup = rest::submit_task(&base, &alice.token, task.id, &api::SubmitTaskReq::default())
        .await
        .unwrap_err();
    assert_eq!(dup.status(), Some(409));

    let pending = rest::pending_submissions(&base, &mom.token).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, submission.id);
    assert_eq!(pending[0].task_title, "Clean room");
    assert_eq!(pending[0].child_name, "Alice");
    assert_eq!(pending[0].points, 10);

    let inbox = rest::notifications(&base, &mom.token).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::SubmissionSubmitted);
    assert_eq!(inbox[0].entity_id, submission.id);

    let decided = rest::decide_submission(&base, &mom.token, submission.id, Decision::Approve)
        .await
        .unwrap();
    assert_eq!(decided.status, ReviewStatus::Approved);
    assert!(decided.reviewed_at.is_some());

    let task_after = server
        .request_expect(
            "GET",
            &format!("/api/v1/tasks/{}", task.id),
            Some(&alice.token),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(task_after["status"], "approved");
    assert_eq!(server.points_of(&alice, alice.id).await, 10);
    assert_eq!(server.points_of(&mom, alice.id).await, 10);

    // Deciding again must not credit twice.
    let again = rest::decide_submission(&base, &mom.token, submission.id, Decision::Approve)
        .await
        .unwrap_err();
    assert_eq!(again.status(), Some(409));
    assert_eq!(server.points_of(&alice, alice.id).await, 10);

    let history = rest::user_points_history(&base, &alice.token, alice.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].delta, 10);
    assert_eq!(history[0].reason, "task_approved");
    assert_eq!(history[0].task_id, Some(task.id));

    let count = rest::notifications_count(&base, &alice.token).await.unwrap();
    assert_eq!(count.count, 1);
    let inbox = rest::notifications(&base, &alice.token).await.unwrap();
    assert_eq!(inbox[0].kind, NotificationKind::SubmissionApproved);
    rest::mark_notification_read(&base, &alice.token, inbox[0].id)
        .await
        .unwrap();
    let count = rest::notifications_count(&base, &alice.token).await.unwrap();
    assert_eq!(count.count, 0);

    // Someone else's notification looks missing.
    let foreign = rest::mark_notification_read(&base, &mom.token, inbox[0].id)
        .await
        .unwrap_err();
    assert_eq!(foreign.status(), Some(404));

    rest::clear_notifications(&base, &alice.token).await.unwrap();
    assert!(rest::notifications(&base, &alice.token).await.unwrap().is_empty());

    assert!(rest::pending_submissions(&base, &mom.token).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_task_can_be_resubmitted() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let base = server.base.clone();
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;

    let task = rest::create_task(
        &base,
        &mom.token,
        &api::CreateTaskReq {
            child_id: alice.id,
            title: "Homework".into(),
            description: None,
            points: 5,
        },
    )
    .await
    .unwrap();
    let first = rest::submit_task(&base, &alice.token, task.id, &api::SubmitTaskReq::default())
        .await
        .unwrap();
    let rejected = rest::decide_submission(&base, &mom.token, first.id, Decision::Reject)
        .await
        .unwrap();
    assert_eq!(rejected.status, ReviewStatus::Rejected);
    assert_eq!(server.points_of(&alice, alice.id).await, 0);

    let tasks = rest::list_tasks(&base, &alice.token).await.unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Rejected);

    let second = rest::submit_task(
        &base,
        &alice.token,
        task.id,
        &api::SubmitTaskReq {
            message: Some("fixed the mistakes".into()),
            evidence_ref: None,
        },
    )
    .await
    .unwrap();
    assert_ne!(second.id, first.id);
    let tasks = rest::list_tasks(&base, &alice.token).await.unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Submitted);

    rest::decide_submission(&base, &mom.token, second.id, Decision::Approve)
        .await
        .unwrap();
    assert_eq!(server.points_of(&alice, alice.id).await, 5);

    // Both reviews stay on record.
    let history = server
        .request_expect(
            "GET",
            &format!("/api/v1/tasks/{}/submissions", task.id),
            Some(&mom.token),
            None,
            StatusCode::OK,
        )
        .await;
    let statuses: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s.get("status").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(statuses, vec!["approved", "rejected"]);

    // An approved task is final.
    let after = rest::submit_task(&base, &alice.token, task.id, &api::SubmitTaskReq::default())
        .await
        .unwrap_err();
    assert_eq!(after.status(), Some(409));
}

#[tokio::test]
async fn assignment_is_scoped_to_shared_families() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let base = server.base.clone();
    let mom = server.session("mom").await;
    let dad = server.session("dad").await;
    let alice = server.session("alice").await;
    let bob = server.session("bob").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;
    server.family_with(&dad, "Joneses", &[&bob]).await;

    let cross = server
        .request_expect(
            "POST",
            "/api/v1/tasks",
            Some(&mom.token),
            Some(json!({"child_id": bob.id, "title": "Rake leaves", "points": 3})),
            StatusCode::FORBIDDEN,
        )
        .await;
    assert!(!error_message(&cross).is_empty());

    server
        .request_expect(
            "POST",
            "/api/v1/tasks",
            Some(&mom.token),
            Some(json!({"child_id": dad.id, "title": "Not a child", "points": 3})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    server
        .request_expect(
            "POST",
            "/api/v1/tasks",
            Some(&mom.token),
            Some(json!({"child_id": alice.id, "title": "  ", "points": 3})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    server
        .request_expect(
            "POST",
            "/api/v1/tasks",
            Some(&mom.token),
            Some(json!({"child_id": alice.id, "title": "Dishes", "points": -1})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    server
        .request_expect(
            "POST",
            "/api/v1/tasks",
            Some(&mom.token),
            Some(json!({"child_id": 9999, "title": "Ghost", "points": 1})),
            StatusCode::NOT_FOUND,
        )
        .await;

    let task = rest::create_task(
        &base,
        &mom.token,
        &api::CreateTaskReq {
            child_id: alice.id,
            title: "Dishes".into(),
            description: None,
            points: 2,
        },
    )
    .await
    .unwrap();

    // Other people's tasks are off limits, both to read and to act on.
    server
        .request_expect(
            "GET",
            &format!("/api/v1/tasks/{}", task.id),
            Some(&bob.token),
            None,
            StatusCode::FORBIDDEN,
        )
        .await;
    server
        .request_expect(
            "POST",
            &format!("/api/v1/tasks/{}/submissions", task.id),
            Some(&bob.token),
            Some(json!({})),
            StatusCode::FORBIDDEN,
        )
        .await;
    let submission =
        rest::submit_task(&base, &alice.token, task.id, &api::SubmitTaskReq::default())
            .await
            .unwrap();
    let foreign = rest::decide_submission(&base, &dad.token, submission.id, Decision::Approve)
        .await
        .unwrap_err();
    assert_eq!(foreign.status(), Some(403));
    assert!(rest::pending_submissions(&base, &dad.token).await.unwrap().is_empty());

    server
        .request_expect(
            "GET",
            "/api/v1/tasks/424242",
            Some(&mom.token),
            None,
            StatusCode::NOT_FOUND,
        )
        .await;

    // Balances are visible to the child and to parents sharing a family only.
    server
        .request_expect(
            "GET",
            &format!("/api/v1/users/{}/points", alice.id),
            Some(&dad.token),
            None,
            StatusCode::FORBIDDEN,
        )
        .await;
    server
        .request_expect(
            "GET",
            &format!("/api/v1/users/{}/points", bob.id),
            Some(&alice.token),
            None,
            StatusCode::FORBIDDEN,
        )
        .await;

    // Filtering a parent's task list by child.
    let filtered = server
        .request_expect(
            "GET",
            &format!("/api/v1/tasks?child_id={}", bob.id),
            Some(&mom.token),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(filtered.as_array().unwrap().is_empty());
    let filtered = server
        .request_expect(
            "GET",
            &format!("/api/v1/tasks?child_id={}", alice.id),
            Some(&mom.token),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn redemption_requires_enough_points() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let base = server.base.clone();
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;
    let bob = server.session("bob").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;

    let reward = rest::create_reward(
        &base,
        &mom.token,
        &api::CreateRewardReq {
            name: "Movie night".into(),
            description: None,
            cost: 50,
        },
    )
    .await
    .unwrap();

    let catalog = rest::list_rewards(&base, &alice.token).await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, reward.id);
    assert!(rest::list_rewards(&base, &bob.token).await.unwrap().is_empty());
    let outsider = rest::request_redemption(&base, &bob.token, reward.id)
        .await
        .unwrap_err();
    assert_eq!(outsider.status(), Some(403));

    let redemption = rest::request_redemption(&base, &alice.token, reward.id)
        .await
        .unwrap();
    assert_eq!(redemption.status, ReviewStatus::Pending);
    assert_eq!(redemption.cost, 50);
    assert_eq!(redemption.reward_name, "Movie night");

    let dup = rest::request_redemption(&base, &alice.token, reward.id)
        .await
        .unwrap_err();
    assert_eq!(dup.status(), Some(409));

    let refused = server
        .request_expect(
            "POST",
            &format!("/api/v1/redemptions/{}/decision", redemption.id),
            Some(&mom.token),
            Some(json!({"decision": "approve"})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(
        error_message(&refused).starts_with("insufficient points"),
        "unexpected error body {refused:?}"
    );
    assert_eq!(server.points_of(&alice, alice.id).await, 0);
    let queue = rest::list_redemptions(&base, &mom.token).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].status, ReviewStatus::Pending);

    // Earn enough, then the same request goes through.
    let task = rest::create_task(
        &base,
        &mom.token,
        &api::CreateTaskReq {
            child_id: alice.id,
            title: "Mow the lawn".into(),
            description: None,
            points: 60,
        },
    )
    .await
    .unwrap();
    let submission = rest::submit_task(&base, &alice.token, task.id, &api::SubmitTaskReq::default())
        .await
        .unwrap();
    rest::decide_submission(&base, &mom.token, submission.id, Decision::Approve)
        .await
        .unwrap();
    assert_eq!(server.points_of(&alice, alice.id).await, 60);

    let approved = rest::decide_redemption(&base, &mom.token, redemption.id, Decision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, ReviewStatus::Approved);
    assert_eq!(server.points_of(&alice, alice.id).await, 10);
    assert!(rest::list_redemptions(&base, &mom.token).await.unwrap().is_empty());

    let mine = rest::list_redemptions(&base, &alice.token).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, ReviewStatus::Approved);

    let history = rest::user_points_history(&base, &mom.token, alice.id)
        .await
        .unwrap();
    let deltas: Vec<(i32, &str)> = history
        .iter()
        .map(|e| (e.delta, e.reason.as_str()))
        .collect();
    assert_eq!(deltas, vec![(-50, "reward_redeemed"), (60, "task_approved")]);
    assert_eq!(history[0].redemption_id, Some(redemption.id));

    // A fresh request after approval is allowed and can be declined.
    let next = rest::request_redemption(&base, &alice.token, reward.id)
        .await
        .unwrap();
    let declined = rest::decide_redemption(&base, &mom.token, next.id, Decision::Reject)
        .await
        .unwrap();
    assert_eq!(declined.status, ReviewStatus::Rejected);
    assert_eq!(server.points_of(&alice, alice.id).await, 10);

    let kinds: Vec<NotificationKind> = rest::notifications(&base, &alice.token)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.kind)
        .collect();
    assert!(kinds.contains(&NotificationKind::RedemptionApproved));
    assert!(kinds.contains(&NotificationKind::RedemptionRejected));
}

#[tokio::test]
async fn audit_log_records_parent_actions() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let base = server.base.clone();
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;
    rest::create_reward(
        &base,
        &mom.token,
        &api::CreateRewardReq {
            name: "Ice cream".into(),
            description: Some("One scoop".into()),
            cost: 5,
        },
    )
    .await
    .unwrap();

    let entries = server
        .request_expect("GET", "/api/v1/audit", Some(&mom.token), None, StatusCode::OK)
        .await;
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e.get("action").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(actions, vec!["reward_create", "family_create"]);
    assert_eq!(entries[0]["details"]["cost"], 5);
    assert_eq!(entries[1]["target_table"], "families");

    let limited = server
        .request_expect(
            "GET",
            "/api/v1/audit?limit=1",
            Some(&mom.token),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let Some(server) = TestServer::spawn().await else {
        return;
    };
    let mom = server.session("mom").await;
    let alice = server.session("alice").await;
    server.family_with(&mom, "Smiths", &[&alice]).await;

    let cases = [
        (
            "/api/v1/submissions/1/decision",
            json!({"decision": "maybe"}),
        ),
        (
            "/api/v1/tasks",
            json!({"child_id": alice.id, "title": "Dishes"}),
        ),
        (
            "/api/v1/tasks",
            json!({"child_id": alice.id, "title": "Dishes", "points": 3_000_000_000u64}),
        ),
        ("/api/v1/rewards", json!({"name": 5, "cost": 10})),
    ];
    for (path, body) in cases {
        let value = server
            .request_expect("POST", path, Some(&mom.token), Some(body), StatusCode::BAD_REQUEST)
            .await;
        assert!(!error_message(&value).is_empty(), "{path}: {value:?}");
    }

    let value = server
        .request_expect(
            "GET",
            "/api/v1/audit?limit=lots",
            Some(&mom.token),
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(!error_message(&value).is_empty(), "{value:?}");

    // Nothing was created by the rejected bodies.
    let tasks = rest::list_tasks(&server.base, &mom.token).await.unwrap();
    assert!(tasks.is_empty());
}
