mod common;

use axum::http::StatusCode;
use common::{register_and_login, send, test_app};
use serde_json::{json, Value};

fn request_payload(title: &str, lat: f64, lng: f64) -> Value {
    json!({
        "title": title,
        "description": "Need a hand",
        "category": "food",
        "urgency": "high",
        "address": "12 Riverside St",
        "latitude": lat,
        "longitude": lng,
        "contact_name": "Dana",
        "contact_phone": "+1555000222",
    })
}

#[tokio::test]
async fn test_anonymous_and_linked_creation() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(request_payload("Groceries needed", 55.75, 37.62)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"].is_null());
    assert_eq!(body["category_display"], "Food");
    assert_eq!(body["urgency_display"], "Urgent");

    let alice = register_and_login(&app, "alice", "user").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/help-requests",
        Some(&alice),
        Some(request_payload("Winter coat", 55.75, 37.62)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");

    // The dedicated authenticated creation path refuses anonymous callers
    let (status, _) = send(
        &app,
        "POST",
        "/api/requests/create",
        None,
        Some(request_payload("No account", 55.75, 37.62)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/requests/create",
        Some(&alice),
        Some(request_payload("Linked request", 55.75, 37.62)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_listing_excludes_closed_requests() {
    let (app, _db) = test_app().await;

    let alice = register_and_login(&app, "alice", "user").await;

    let mut ids = Vec::new();
    for title in ["Open", "Fulfilled", "Deactivated"] {
        let (_, body) = send(
            &app,
            "POST",
            "/api/requests/create",
            Some(&alice),
            Some(request_payload(title, 55.75, 37.62)),
        )
        .await;
        ids.push(body["id"].as_i64().unwrap());
    }

    send(
        &app,
        "PUT",
        &format!("/api/help-requests/{}", ids[1]),
        Some(&alice),
        Some(json!({ "is_fulfilled": true })),
    )
    .await;
    send(
        &app,
        "PUT",
        &format!("/api/help-requests/{}", ids[2]),
        Some(&alice),
        Some(json!({ "is_active": false })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/help-requests", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Open"]);

    // Closed requests 404 on direct fetch
    let (status, _) = send(&app, "GET", &format!("/api/help-requests/{}", ids[1]), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // But the owner still sees all of them
    let (_, body) = send(&app, "GET", "/api/my-requests", Some(&alice), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_category_and_urgency_filters() {
    let (app, _db) = test_app().await;

    send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(json!({
            "title": "Food parcel",
            "description": "Weekly groceries",
            "category": "food",
            "urgency": "low",
            "address": "1 Main St",
            "latitude": 55.75,
            "longitude": 37.62,
            "contact_name": "Dana",
            "contact_phone": "+1555000222",
        })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(json!({
            "title": "Insulin run",
            "description": "Prescription pickup",
            "category": "medicine",
            "urgency": "critical",
            "address": "2 Main St",
            "latitude": 55.75,
            "longitude": 37.62,
            "contact_name": "Sam",
            "contact_phone": "+1555000333",
        })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/help-requests?category=medicine", None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Insulin run"]);

    let (_, body) = send(&app, "GET", "/api/help-requests?urgency=low", None, None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Food parcel"]);

    let (_, body) = send(
        &app,
        "GET",
        "/api/help-requests?category=food&urgency=critical",
        None,
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_nearby_returns_only_requests_inside_the_box() {
    let (app, _db) = test_app().await;

    let alice = register_and_login(&app, "alice", "user").await;

    // Right at the centre
    send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(request_payload("Centre", 55.75, 37.62)),
    )
    .await;
    // ~0.2 degrees north: inside a 10 km box (±0.9), outside a 1 km box (±0.09)
    send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(request_payload("North of centre", 55.95, 37.62)),
    )
    .await;
    // Far away
    send(
        &app,
        "POST",
        "/api/help-requests",
        None,
        Some(request_payload("Another city", 60.0, 37.62)),
    )
    .await;
    // Inside the box but already fulfilled
    let (_, body) = send(
        &app,
        "POST",
        "/api/requests/create",
        Some(&alice),
        Some(request_payload("Done already", 55.75, 37.62)),
    )
    .await;
    let fulfilled = body["id"].as_i64().unwrap();
    send(
        &app,
        "PUT",
        &format!("/api/help-requests/{}", fulfilled),
        Some(&alice),
        Some(json!({ "is_fulfilled": true })),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/help-requests/nearby?lat=55.75&lng=37.62",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mut titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Centre", "North of centre"]);

    // A tighter radius shrinks the box
    let (_, body) = send(
        &app,
        "GET",
        "/api/help-requests/nearby?lat=55.75&lng=37.62&radius=1",
        None,
        None,
    )
    .await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Centre"]);
}

#[tokio::test]
async fn test_nearby_requires_coordinates() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, "GET", "/api/help-requests/nearby", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("lat and lng parameters are required"));

    let (status, _) = send(&app, "GET", "/api/help-requests/nearby?lat=55.75", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutation_rights() {
    let (app, db) = test_app().await;

    let alice = register_and_login(&app, "alice", "user").await;
    let bob = register_and_login(&app, "bob", "user").await;
    let admin = common::create_admin(&app, &db, "root").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/requests/create",
        Some(&alice),
        Some(request_payload("Alice's request", 55.75, 37.62)),
    )
    .await;
    let id = body["id"].as_i64().unwrap();
    let uri = format!("/api/help-requests/{}", id);

    let patch = json!({ "urgency": "critical" });

    let (status, _) = send(&app, "PUT", &uri, None, Some(patch.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "PUT", &uri, Some(&bob), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "PUT", &uri, Some(&admin), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], "critical");
    assert_eq!(body["username"], "alice");

    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
