//! Integration tests for concurrent edits of one schedule and mileage input

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{week_workouts, TestApp};
use serde_json::json;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_concurrent_places_are_all_kept() {
    let app = Arc::new(TestApp::new().await);
    let runner = Arc::new(app.account("runner").await);
    let schedule_id = app.create_schedule(&runner, "Busy week").await;
    let path = format!("/api/v1/schedules/{}/weeks/1/workouts", schedule_id);

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        let runner = Arc::clone(&runner);
        let path = path.clone();
        tasks.spawn(async move {
            app.call(&runner, "POST", &path, Some(json!({ "workout_id": "p1" })))
                .await
                .0
        });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    let (_, reloaded) = app
        .call(&runner, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    let week1 = week_workouts(&reloaded, 1);
    assert_eq!(week1.len(), 8);

    let mut ids: Vec<&str> = week1.iter().map(|w| w["instance_id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_completion_survives_concurrent_place() {
    let app = TestApp::new().await;
    let runner = app.account("runner").await;

    for round in 0..5 {
        let schedule_id = app.create_schedule(&runner, &format!("Race {}", round)).await;
        app.place(&runner, &schedule_id, 3, "p1").await;

        let complete_path = format!("/api/v1/schedules/{}/weeks/3/workouts/0/complete", schedule_id);
        let place_path = format!("/api/v1/schedules/{}/weeks/3/workouts", schedule_id);
        let ((completed, body), (placed, _)) = tokio::join!(
            app.call(
                &runner,
                "POST",
                &complete_path,
                Some(json!({ "date": "2025-01-20", "rating": 7 })),
            ),
            app.call(&runner, "POST", &place_path, Some(json!({ "workout_id": "s2" }))),
        );
        assert_eq!(completed, StatusCode::OK, "{}", body);
        assert_eq!(placed, StatusCode::OK);

        let (_, reloaded) = app
            .call(&runner, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
            .await;
        let week3 = week_workouts(&reloaded, 3);
        assert_eq!(week3.len(), 2, "round {}", round);
        assert_eq!(week3[0]["original_id"], "p1");
        assert_eq!(week3[0]["completed"], true, "round {}", round);
        assert_eq!(week3[1]["completed"], false);
    }

    let (_, history) = app.call(&runner, "GET", "/api/v1/history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 5);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_completion_with_overlong_weather_is_rejected() {
    let app = TestApp::new().await;
    let runner = app.account("runner").await;
    let schedule_id = app.create_schedule(&runner, "Weather").await;
    app.place(&runner, &schedule_id, 2, "p2").await;

    let (status, body) = app
        .call(
            &runner,
            "POST",
            &format!("/api/v1/schedules/{}/weeks/2/workouts/0/complete", schedule_id),
            Some(json!({ "date": "2025-01-14", "rating": 5, "weather": "w".repeat(2001) })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "weather");

    let (_, reloaded) = app
        .call(&runner, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(week_workouts(&reloaded, 2)[0]["completed"], false);
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_mileage_keeps_leading_number() {
    let app = TestApp::new().await;
    let runner = app.account("runner").await;
    let schedule_id = app.create_schedule(&runner, "Miles").await;
    let path = format!("/api/v1/schedules/{}/weeks/4/mileage", schedule_id);
    let detail = format!("/api/v1/schedules/{}", schedule_id);

    let (status, body) = app
        .call(&runner, "PUT", &path, Some(json!({ "field": "actual_mileage", "value": "25 miles" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["weeks"][3]["actual_mileage"], "25");

    let (_, reloaded) = app.call(&runner, "GET", &detail, None).await;
    assert_eq!(reloaded["weeks"][3]["actual_mileage"], "25");
}

#[tokio::test]
#[cfg_attr(not(feature = "integration"), ignore = "requires database")]
async fn test_unstorable_mileage_is_rejected() {
    let app = TestApp::new().await;
    let runner = app.account("runner").await;
    let schedule_id = app.create_schedule(&runner, "Too far").await;
    let path = format!("/api/v1/schedules/{}/weeks/5/mileage", schedule_id);

    app.call(&runner, "PUT", &path, Some(json!({ "field": "mileage_goal", "value": "30" })))
        .await;

    for value in ["12345", "25.555", "miles", "-4"] {
        let (status, body) = app
            .call(&runner, "PUT", &path, Some(json!({ "field": "mileage_goal", "value": value })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", value, body);
        assert_eq!(body["error"]["field"], "mileage");
    }

    // Rejected input leaves the stored value alone
    let (_, reloaded) = app
        .call(&runner, "GET", &format!("/api/v1/schedules/{}", schedule_id), None)
        .await;
    assert_eq!(reloaded["weeks"][4]["mileage_goal"], "30");

    let (status, body) = app
        .call(&runner, "PUT", &path, Some(json!({ "field": "mileage_goal", "value": "" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["weeks"][4]["mileage_goal"].is_null());
}
