//! Integration tests for schedule sharing and permissions

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_strangers_cannot_see_a_schedule() {
    let app = TestApp::new().await;
    let owner = app.account("owner").await;
    let stranger = app.account("stranger").await;
    let schedule_id = app.create_schedule(&owner, "Private").await;

    let (status, _) = app
        .call(&stranger, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(&stranger, "GET", &format!("/api/v1/schedules/{}/permissions", schedule_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "is_owner": false, "can_edit": false, "can_view": false }));

    let (_, list) = app.call(&stranger, "GET", "/api/v1/schedules", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_view_share_allows_reading_only() {
    let app = TestApp::new().await;
    let owner = app.account("owner").await;
    let viewer = app.account("viewer").await;
    let schedule_id = app.create_schedule(&owner, "Shared").await;
    app.place(&owner, &schedule_id, 1, "p5").await;

    let (status, share) = app
        .call(
            &owner,
            "POST",
            &format!("/api/v1/schedules/{}/shares", schedule_id),
            Some(json!({ "email": viewer.email, "permission": "view" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", share);
    assert_eq!(share["account_id"], viewer.id.to_string());
    assert_eq!(share["permission"], "view");

    let (status, detail) = app
        .call(&viewer, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["permissions"]["can_edit"], false);
    assert_eq!(detail["weeks"][0]["workouts"][0]["original_id"], "p5");

    let (status, body) = app
        .call(
            &viewer,
            "PUT",
            &format!("/api/v1/schedules/{}/weeks/1/mileage", schedule_id),
            Some(json!({ "field": "actual_mileage", "value": "12" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "You do not have permission to edit this schedule");

    let (_, list) = app.call(&viewer, "GET", "/api/v1/schedules", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["is_owner"], false);
    assert_eq!(list[0]["permission"], "view");
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_resharing_upgrades_to_edit() {
    let app = TestApp::new().await;
    let owner = app.account("owner").await;
    let partner = app.account("partner").await;
    let schedule_id = app.create_schedule(&owner, "Team plan").await;
    let shares = format!("/api/v1/schedules/{}/shares", schedule_id);

    app.call(&owner, "POST", &shares, Some(json!({ "email": partner.email }))).await;
    let (status, share) = app
        .call(&owner, "POST", &shares, Some(json!({ "email": partner.email, "permission": "edit" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["permission"], "edit");

    let (_, listed) = app.call(&owner, "GET", &shares, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .call(
            &partner,
            "POST",
            &format!("/api/v1/schedules/{}/weeks/2/workouts", schedule_id),
            Some(json!({ "workout_id": "s3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Editors still cannot delete or manage sharing
    let (status, _) = app
        .call(&partner, "DELETE", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(&partner, "GET", &shares, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_unshare_revokes_access() {
    let app = TestApp::new().await;
    let owner = app.account("owner").await;
    let friend = app.account("friend").await;
    let schedule_id = app.create_schedule(&owner, "Temporary").await;

    let (_, share) = app
        .call(
            &owner,
            "POST",
            &format!("/api/v1/schedules/{}/shares", schedule_id),
            Some(json!({ "email": friend.email })),
        )
        .await;
    let share_id = share["id"].as_str().unwrap();

    let (status, _) = app
        .call(
            &owner,
            "DELETE",
            &format!("/api/v1/schedules/{}/shares/{}", schedule_id, share_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(&friend, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_share_target_must_exist_and_differ_from_owner() {
    let app = TestApp::new().await;
    let owner = app.account("owner").await;
    let schedule_id = app.create_schedule(&owner, "Solo").await;
    let shares = format!("/api/v1/schedules/{}/shares", schedule_id);

    let (status, body) = app
        .call(&owner, "POST", &shares, Some(json!({ "email": "nobody-here@example.com" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "User not found with that email address");

    let (status, _) = app
        .call(&owner, "POST", &shares, Some(json!({ "email": owner.email })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(&owner, "POST", &shares, Some(json!({ "email": "not-an-email" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
