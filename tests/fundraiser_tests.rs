mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{register_and_login, send, test_app};
use serde_json::{json, Value};

async fn my_fund_id(app: &Router, token: &str) -> i64 {
    let (_, body) = send(app, "GET", "/api/my-funds", Some(token), None).await;
    body[0]["id"].as_i64().unwrap()
}

fn fundraiser_payload(fund_id: i64, title: &str) -> Value {
    json!({
        "fund": fund_id,
        "title": title,
        "description": "Winter supplies for families",
        "goal_amount": 1000.0,
        "start_date": "2025-07-01T00:00:00Z",
        "end_date": "2025-09-01T00:00:00Z",
    })
}

#[tokio::test]
async fn test_create_requires_fund_creator_role() {
    let (app, _db) = test_app().await;

    let creator = register_and_login(&app, "creator", "fund").await;
    let donor = register_and_login(&app, "donor", "user").await;
    let fund_id = my_fund_id(&app, &creator).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&donor),
        Some(fundraiser_payload(fund_id, "Not allowed")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/fundraisers",
        None,
        Some(fundraiser_payload(fund_id, "Not allowed")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator),
        Some(fundraiser_payload(fund_id, "Winter drive")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Winter drive");
    assert_eq!(body["fund_name"], "creator fund");
    assert_eq!(body["current_amount"], 0.0);
    assert_eq!(body["progress_percentage"], 0.0);
}

#[tokio::test]
async fn test_create_checks_fund_ownership() {
    let (app, _db) = test_app().await;

    let creator_a = register_and_login(&app, "creator_a", "fund").await;
    let creator_b = register_and_login(&app, "creator_b", "fund").await;
    let fund_a = my_fund_id(&app, &creator_a).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_b),
        Some(fundraiser_payload(fund_a, "Hijack attempt")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("not the owner"));

    // A fundraiser against a nonexistent fund is a validation error
    let (status, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_b),
        Some(fundraiser_payload(99_999, "Ghost fund")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "fund");
}

#[tokio::test]
async fn test_progress_percentage_is_clamped() {
    use helpmap::entities::{fundraiser, Fundraiser};
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    let (app, db) = test_app().await;

    let creator = register_and_login(&app, "creator", "fund").await;
    let fund_id = my_fund_id(&app, &creator).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator),
        Some(fundraiser_payload(fund_id, "Overfunded drive")),
    )
    .await;
    let fundraiser_id = body["id"].as_i64().unwrap();

    // Donations land in the store outside the API; simulate an overshoot
    let model = Fundraiser::find_by_id(fundraiser_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: fundraiser::ActiveModel = model.into();
    active.current_amount = Set(2500.0);
    active.update(&db).await.unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/fundraisers/{}", fundraiser_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_amount"], 2500.0);
    assert_eq!(body["progress_percentage"], 100.0);
}

#[tokio::test]
async fn test_list_filters_by_fund_and_hides_inactive() {
    let (app, _db) = test_app().await;

    let creator_a = register_and_login(&app, "creator_a", "fund").await;
    let creator_b = register_and_login(&app, "creator_b", "fund").await;
    let fund_a = my_fund_id(&app, &creator_a).await;
    let fund_b = my_fund_id(&app, &creator_b).await;

    send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_a),
        Some(fundraiser_payload(fund_a, "Drive A")),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_b),
        Some(fundraiser_payload(fund_b, "Drive B")),
    )
    .await;
    let drive_b = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, "GET", "/api/fundraisers", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", &format!("/api/fundraisers?fund={}", fund_a), None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Drive A"]);

    // Cancelling a fundraiser removes it from public listings
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/fundraisers/{}", drive_b),
        Some(&creator_b),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/fundraisers", None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Drive A"]);

    let (status, _) = send(&app, "GET", &format!("/api/fundraisers/{}", drive_b), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_require_fund_ownership() {
    let (app, _db) = test_app().await;

    let creator_a = register_and_login(&app, "creator_a", "fund").await;
    let creator_b = register_and_login(&app, "creator_b", "fund").await;
    let fund_a = my_fund_id(&app, &creator_a).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_a),
        Some(fundraiser_payload(fund_a, "Drive A")),
    )
    .await;
    let drive = body["id"].as_i64().unwrap();
    let drive_uri = format!("/api/fundraisers/{}", drive);

    let (status, _) = send(
        &app,
        "PUT",
        &drive_uri,
        Some(&creator_b),
        Some(json!({ "title": "Stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &drive_uri, Some(&creator_b), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &drive_uri,
        Some(&creator_a),
        Some(json!({ "goal_amount": 2000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal_amount"], 2000.0);

    let (status, _) = send(&app, "DELETE", &drive_uri, Some(&creator_a), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_my_fundraisers_scoped_to_caller() {
    let (app, _db) = test_app().await;

    let creator_a = register_and_login(&app, "creator_a", "fund").await;
    let creator_b = register_and_login(&app, "creator_b", "fund").await;
    let donor = register_and_login(&app, "donor", "user").await;
    let fund_a = my_fund_id(&app, &creator_a).await;
    let fund_b = my_fund_id(&app, &creator_b).await;

    send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_a),
        Some(fundraiser_payload(fund_a, "Drive A")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/fundraisers",
        Some(&creator_b),
        Some(fundraiser_payload(fund_b, "Drive B")),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/my-fundraisers", Some(&creator_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Drive A"]);

    let (status, _) = send(&app, "GET", "/api/my-fundraisers", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
