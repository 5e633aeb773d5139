mod common;

use actix_web::http::StatusCode;
use chrono::{Datelike, NaiveDate};
use leave_desk::config::Policy;
use serde_json::json;

use common::*;

#[actix_web::test]
async fn manager_approves_team_leave_end_to_end() {
    let app = init_app(Policy::default()).await;

    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    assert_eq!(find_user(&app, "e1").await["manager_id"], m1);

    let (status, body) = apply(&app, e1, this_year(1, 20), this_year(1, 22)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Leave applied successfully");

    let (status, team) = call(&app, get(&format!("/manager/leaves/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);
    let team = team.as_array().unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0]["user_id"], e1);
    assert_eq!(team[0]["status"], "Pending");
    assert_eq!(team[0]["username"], "e1");
    assert_eq!(team[0]["role"], "employee");

    let leave_id = team[0]["id"].as_u64().unwrap();
    let (status, body) = call(&app, post(&format!("/approve/{leave_id}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Leave approved");

    let (status, balance) = call(&app, get(&format!("/leave-balance/{e1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance, json!({ "total": 20, "used": 3, "remaining": 17 }));
}

#[actix_web::test]
async fn processed_leave_cannot_be_reviewed_again() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let leave_id = apply_ok(&app, e1, this_year(3, 2), this_year(3, 3)).await;

    let (status, _) = call(&app, post(&format!("/approve/{leave_id}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, post(&format!("/approve/{leave_id}/{m1}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Leave already processed");

    let (status, body) = call(
        &app,
        post_json(&format!("/reject/{leave_id}/{m1}"), json!({ "reason": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Leave already processed");

    assert_eq!(my_leaves(&app, e1).await[0]["status"], "Approved");
}

#[actix_web::test]
async fn processed_state_is_reported_before_role_pairing() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let hr = register_ok(&app, "hr1", "hr").await;
    let leave_id = apply_ok(&app, e1, this_year(3, 2), this_year(3, 3)).await;

    let (status, _) = call(&app, post(&format!("/approve/{leave_id}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, post(&format!("/approve/{leave_id}/{hr}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Leave already processed");
}

#[actix_web::test]
async fn manager_cannot_review_another_managers_employee() {
    let app = init_app(Policy::default()).await;
    register_ok(&app, "manager_one", "manager").await;
    let manager_two = register_ok(&app, "manager_two", "manager").await;
    let employee = register_ok(&app, "employee_one", "employee").await;
    let leave_id = apply_ok(&app, employee, this_year(1, 20), this_year(1, 22)).await;

    let (status, body) = call(&app, post(&format!("/approve/{leave_id}/{manager_two}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not responsible for this employee");

    let (status, _) = call(
        &app,
        post_json(&format!("/reject/{leave_id}/{manager_two}"), json!({ "reason": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(my_leaves(&app, employee).await[0]["status"], "Pending");
}

#[actix_web::test]
async fn hr_decides_on_managers_only() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let hr = register_ok(&app, "hr1", "hr").await;

    let manager_leave = apply_ok(&app, m1, this_year(4, 6), this_year(4, 10)).await;
    let employee_leave = apply_ok(&app, e1, this_year(4, 6), this_year(4, 10)).await;

    let (status, _) = call(&app, post(&format!("/approve/{manager_leave}/{hr}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, post(&format!("/approve/{employee_leave}/{hr}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to approve this leave");

    let hr_leave = apply_ok(&app, hr, this_year(5, 4), this_year(5, 4)).await;
    let (status, _) = call(&app, post(&format!("/approve/{hr_leave}/{m1}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn nobody_approves_their_own_leave() {
    let app = init_app(Policy::default()).await;
    let hr = register_ok(&app, "hr1", "hr").await;
    let leave_id = apply_ok(&app, hr, this_year(2, 2), this_year(2, 2)).await;

    let (status, body) = call(&app, post(&format!("/approve/{leave_id}/{hr}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Cannot approve your own leave");
}

#[actix_web::test]
async fn employee_cannot_approve_a_colleague() {
    let app = init_app(Policy::default()).await;
    register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let e2 = register_ok(&app, "e2", "employee").await;
    let leave_id = apply_ok(&app, e1, this_year(2, 2), this_year(2, 3)).await;

    let (status, _) = call(&app, post(&format!("/approve/{leave_id}/{e2}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approval_beyond_the_yearly_quota_is_refused() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;

    // 18 days
    let first = apply_ok(&app, e1, this_year(2, 1), this_year(2, 18)).await;
    let (status, _) = call(&app, post(&format!("/approve/{first}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);

    // 3 more would make 21
    let second = apply_ok(&app, e1, this_year(6, 1), this_year(6, 3)).await;
    let (status, body) = call(&app, post(&format!("/approve/{second}/{m1}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient leave balance");

    let leaves = my_leaves(&app, e1).await;
    let still_pending = leaves.iter().find(|l| l["id"] == second).unwrap();
    assert_eq!(still_pending["status"], "Pending");

    // exactly 20 is fine
    let third = apply_ok(&app, e1, this_year(7, 1), this_year(7, 2)).await;
    let (status, _) = call(&app, post(&format!("/approve/{third}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, balance) = call(&app, get(&format!("/leave-balance/{e1}"))).await;
    assert_eq!(balance, json!({ "total": 20, "used": 20, "remaining": 0 }));
}

#[actix_web::test]
async fn approvals_from_earlier_years_count_against_the_quota() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;

    let last_year = this_year(1, 1).year() - 1;
    let old = apply_ok(
        &app,
        e1,
        NaiveDate::from_ymd_opt(last_year, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(last_year, 3, 15).unwrap(),
    )
    .await;
    let (status, _) = call(&app, post(&format!("/approve/{old}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);

    // 15 + 10 > 20
    let current = apply_ok(&app, e1, this_year(6, 1), this_year(6, 10)).await;
    let (status, body) = call(&app, post(&format!("/approve/{current}/{m1}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient leave balance");

    // 15 + 5 fills the quota exactly
    let short = apply_ok(&app, e1, this_year(7, 1), this_year(7, 5)).await;
    let (status, _) = call(&app, post(&format!("/approve/{short}/{m1}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn quota_follows_the_configured_policy() {
    let app = init_app(Policy {
        annual_quota: 2,
        ..Policy::default()
    })
    .await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;

    let leave_id = apply_ok(&app, e1, this_year(3, 9), this_year(3, 11)).await;
    let (status, _) = call(&app, post(&format!("/approve/{leave_id}/{m1}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, balance) = call(&app, get(&format!("/leave-balance/{e1}"))).await;
    assert_eq!(balance["total"], 2);
}

#[actix_web::test]
async fn rejection_needs_a_reason_and_stores_it() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let leave_id = apply_ok(&app, e1, this_year(8, 3), this_year(8, 7)).await;

    let (status, body) = call(
        &app,
        post_json(&format!("/reject/{leave_id}/{m1}"), json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Rejection reason required");
    assert_eq!(my_leaves(&app, e1).await[0]["status"], "Pending");

    let (status, body) = call(
        &app,
        post_json(&format!("/reject/{leave_id}/{m1}"), json!({ "reason": "Release week" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Leave rejected");

    let leave = &my_leaves(&app, e1).await[0];
    assert_eq!(leave["status"], "Rejected");
    assert_eq!(leave["rejection_reason"], "Release week");
}

#[actix_web::test]
async fn rejection_ignores_the_quota() {
    let app = init_app(Policy {
        annual_quota: 1,
        ..Policy::default()
    })
    .await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let leave_id = apply_ok(&app, e1, this_year(9, 1), this_year(9, 10)).await;

    let (status, _) = call(
        &app,
        post_json(&format!("/reject/{leave_id}/{m1}"), json!({ "reason": "busy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn missing_records_are_not_found() {
    let app = init_app(Policy::default()).await;
    let m1 = register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let leave_id = apply_ok(&app, e1, this_year(3, 2), this_year(3, 2)).await;

    let (status, _) = call(&app, post(&format!("/approve/999/{m1}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, post(&format!("/approve/{leave_id}/999"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json(&format!("/reject/999/{m1}"), json!({ "reason": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn apply_validates_range_and_applicant() {
    let app = init_app(Policy::default()).await;
    let hr = register_ok(&app, "hr1", "hr").await;

    let (status, body) = apply(&app, hr, this_year(5, 10), this_year(5, 9)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "to_date cannot be before from_date");

    let (status, _) = apply(&app, 4242, this_year(5, 9), this_year(5, 10)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        post_json(&format!("/apply_leave/{hr}"), json!({ "from_date": "tomorrow", "to_date": "2026-01-01", "reason": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(my_leaves(&app, hr).await.is_empty());
}

#[actix_web::test]
async fn listings_cover_own_and_all_leaves() {
    let app = init_app(Policy::default()).await;
    register_ok(&app, "m1", "manager").await;
    let e1 = register_ok(&app, "e1", "employee").await;
    let e2 = register_ok(&app, "e2", "employee").await;
    apply_ok(&app, e1, this_year(1, 5), this_year(1, 6)).await;
    apply_ok(&app, e2, this_year(1, 7), this_year(1, 7)).await;

    let mine = my_leaves(&app, e1).await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["user_id"], e1);
    assert_eq!(mine[0]["reason"], "Family function");
    assert!(mine[0]["rejection_reason"].is_null());

    let (status, all) = call(&app, get("/leaves")).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1]["username"], "e2");
    assert_eq!(all[1]["role"], "employee");
}

#[actix_web::test]
async fn delete_removes_the_leave() {
    let app = init_app(Policy::default()).await;
    let hr = register_ok(&app, "hr1", "hr").await;
    let leave_id = apply_ok(&app, hr, this_year(10, 1), this_year(10, 2)).await;

    let (status, body) = call(&app, delete(&format!("/delete/{leave_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");
    assert!(my_leaves(&app, hr).await.is_empty());

    let (status, _) = call(&app, delete(&format!("/delete/{leave_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn non_numeric_path_is_a_client_error() {
    let app = init_app(Policy::default()).await;
    let (status, body) = call(&app, get("/my_leaves/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
