use super::API_V1_PREFIX;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

fn v1(base: &str, path: &str) -> String {
    base_join(base, &format!("{}/{}", API_V1_PREFIX, path.trim_start_matches('/')))
}

pub fn auth_login(base: &str) -> String {
    v1(base, "auth/login")
}
pub fn version(base: &str) -> String {
    v1(base, "version")
}
pub fn me(base: &str) -> String {
    v1(base, "me")
}
pub fn families(base: &str) -> String {
    v1(base, "families")
}
pub fn family_join(base: &str) -> String {
    v1(base, "families/join")
}
pub fn family_members(base: &str, family_id: i32) -> String {
    v1(base, &format!("families/{family_id}/members"))
}
pub fn children(base: &str) -> String {
    v1(base, "children")
}
pub fn tasks(base: &str) -> String {
    v1(base, "tasks")
}
pub fn tasks_for_child(base: &str, child_id: i32) -> String {
    v1(base, &format!("tasks?child_id={child_id}"))
}
pub fn task(base: &str, task_id: i32) -> String {
    v1(base, &format!("tasks/{task_id}"))
}
pub fn task_submissions(base: &str, task_id: i32) -> String {
    v1(base, &format!("tasks/{task_id}/submissions"))
}
pub fn pending_submissions(base: &str) -> String {
    v1(base, "submissions/pending")
}
pub fn submission_decision(base: &str, submission_id: i32) -> String {
    v1(base, &format!("submissions/{submission_id}/decision"))
}
pub fn rewards(base: &str) -> String {
    v1(base, "rewards")
}
pub fn reward_redemptions(base: &str, reward_id: i32) -> String {
    v1(base, &format!("rewards/{reward_id}/redemptions"))
}
pub fn redemptions(base: &str) -> String {
    v1(base, "redemptions")
}
pub fn redemption_decision(base: &str, redemption_id: i32) -> String {
    v1(base, &format!("redemptions/{redemption_id}/decision"))
}
pub fn notifications(base: &str) -> String {
    v1(base, "notifications")
}
pub fn notifications_count(base: &str) -> String {
    v1(base, "notifications/count")
}
pub fn notification_read(base: &str, notification_id: i32) -> String {
    v1(base, &format!("notifications/{notification_id}/read"))
}
pub fn notifications_clear(base: &str) -> String {
    v1(base, "notifications/clear")
}
pub fn user_points(base: &str, user_id: i32) -> String {
    v1(base, &format!("users/{user_id}/points"))
}
pub fn user_points_history(base: &str, user_id: i32) -> String {
    v1(base, &format!("users/{user_id}/points/history"))
}
pub fn audit(base: &str) -> String {
    v1(base, "audit")
}
