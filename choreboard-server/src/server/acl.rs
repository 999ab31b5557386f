use super::{AppError, auth::AuthCtx};
use axum::response::Response;
use axum::{
    extract::OriginalUri,
    http::{Method, Request},
    middleware::Next,
};
use choreboard_shared::auth::Role;

/// Role gate for private routes. Row ownership is checked by the store.
pub async fn enforce_acl(req: Request<axum::body::Body>, next: Next) -> Result<Response, AppError> {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|orig| orig.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().clone();
    let Some(auth) = req.extensions().get::<AuthCtx>() else {
        return Err(AppError::unauthorized());
    };

    let segs = segmented(&path);
    let prefix = ["api", "v1"];
    if !segs.as_slice().starts_with(&prefix) {
        tracing::warn!(?segs, "ACL: path outside api scope");
        return Err(AppError::forbidden());
    }
    let rest = &segs[prefix.len()..];

    let allowed = allow_any(&method, rest)
        || match auth.role {
            Role::Parent => allow_parent(&method, rest),
            Role::Child => allow_child(&method, rest),
        };

    if !allowed {
        tracing::warn!(
            method = %method,
            path = %path,
            username = %auth.username,
            role = %auth.role,
            "ACL: no rule matched; denying"
        );
        return Err(AppError::forbidden());
    }

    Ok(next.run(req).await)
}

fn allow_any(method: &Method, rest: &[&str]) -> bool {
    let get = *method == Method::GET;
    let post = *method == Method::POST;
    match rest {
        ["me"] | ["families"] | ["tasks"] | ["rewards"] | ["redemptions"] => get,
        ["families", id, "members"] => get && is_id(id),
        ["tasks", id] | ["tasks", id, "submissions"] => get && is_id(id),
        ["notifications"] | ["notifications", "count"] => get,
        ["notifications", "clear"] => post,
        ["notifications", id, "read"] => post && is_id(id),
        ["users", id, "points"] | ["users", id, "points", "history"] => get && is_id(id),
        // Parents reach the store so a wrong-role join reports a validation error.
        ["families", "join"] => post,
        _ => false,
    }
}

fn allow_parent(method: &Method, rest: &[&str]) -> bool {
    let get = *method == Method::GET;
    let post = *method == Method::POST;
    match rest {
        ["families"] | ["tasks"] | ["rewards"] => post,
        ["children"] | ["submissions", "pending"] | ["audit"] => get,
        ["submissions", id, "decision"] | ["redemptions", id, "decision"] => post && is_id(id),
        _ => false,
    }
}

fn allow_child(method: &Method, rest: &[&str]) -> bool {
    let post = *method == Method::POST;
    match rest {
        ["tasks", id, "submissions"] | ["rewards", id, "redemptions"] => post && is_id(id),
        _ => false,
    }
}

fn segmented(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_id(seg: &str) -> bool {
    seg.parse::<i32>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &str) -> Vec<&str> {
        let all = segmented(path);
        all[2..].to_vec()
    }

    #[test]
    fn child_cannot_review_or_create() {
        for (method, path) in [
            (Method::POST, "/api/v1/tasks"),
            (Method::POST, "/api/v1/rewards"),
            (Method::POST, "/api/v1/submissions/3/decision"),
            (Method::POST, "/api/v1/redemptions/3/decision"),
            (Method::GET, "/api/v1/submissions/pending"),
            (Method::GET, "/api/v1/audit"),
            (Method::GET, "/api/v1/children"),
        ] {
            let rest = segs(path);
            assert!(!allow_any(&method, &rest), "{method} {path}");
            assert!(!allow_child(&method, &rest), "{method} {path}");
            assert!(allow_parent(&method, &rest), "{method} {path}");
        }
    }

    #[test]
    fn parent_cannot_submit_or_redeem() {
        for path in ["/api/v1/tasks/1/submissions", "/api/v1/rewards/1/redemptions"] {
            let rest = segs(path);
            assert!(!allow_any(&Method::POST, &rest));
            assert!(!allow_parent(&Method::POST, &rest));
            assert!(allow_child(&Method::POST, &rest));
        }
    }

    #[test]
    fn shared_reads_open_to_both_roles() {
        for path in [
            "/api/v1/me",
            "/api/v1/tasks/7",
            "/api/v1/tasks/7/submissions",
            "/api/v1/notifications/count",
            "/api/v1/users/2/points/history",
        ] {
            assert!(allow_any(&Method::GET, &segs(path)), "{path}");
        }
    }

    #[test]
    fn non_numeric_ids_and_unknown_paths_rejected() {
        assert!(!allow_any(&Method::GET, &segs("/api/v1/tasks/abc")));
        assert!(!allow_parent(&Method::POST, &segs("/api/v1/submissions/x/decision")));
        assert!(!allow_any(&Method::GET, &segs("/api/v1/nope")));
        assert!(!allow_any(&Method::DELETE, &segs("/api/v1/tasks")));
    }
}
