//! HTTP-level tests for the employee, event and ticket endpoints.
//!
//! Requests go straight to the router through `tower::ServiceExt`, without
//! a TCP listener.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{
    body_json, build_test_app, build_test_app_with_config, delete, get, get_with_origin,
    new_store, post_json, put_json, today,
};
use registry_server::config::Config;
use serde_json::{json, Value};

fn employee(service_number: i64) -> Value {
    json!({
        "service_number": service_number,
        "name": "Ann",
        "surname": "Lee",
        "post": "Clerk",
        "phone_number": "555-0100",
    })
}

fn event(id: i64, date: chrono::NaiveDate) -> Value {
    json!({
        "id": id,
        "name": "Expo",
        "event_date": date.to_string(),
        "event_type": "Exhibition",
    })
}

fn ticket(ticket_number: i64, sale_date: chrono::NaiveDate) -> Value {
    json!({
        "ticket_number": ticket_number,
        "service_number": 1,
        "event_id": 10,
        "sale_date": sale_date.to_string(),
        "ticket_type": "Adult",
        "payment_method": "Card",
    })
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_employee_returns_201_with_full_name() {
    let store = new_store();
    let response = post_json(build_test_app(store.clone()), "/employees", employee(1)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["full_name"], "Lee Ann");

    let response = get(build_test_app(store), "/employees").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_employee_is_a_validation_error() {
    let store = new_store();
    post_json(build_test_app(store.clone()), "/employees", employee(1)).await;

    let mut second = employee(1);
    second["name"] = json!("Bob");
    let response = post_json(build_test_app(store.clone()), "/employees", second).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["details"]["fields"]["service_number"][0],
        "An employee with this service number already exists"
    );
    assert_eq!(json["error"]["details"]["candidate"]["name"], "Bob");

    let json = body_json(get(build_test_app(store), "/employees/1").await).await;
    assert_eq!(json["data"]["name"], "Ann");
}

#[tokio::test]
async fn test_non_positive_key_is_never_persisted() {
    let store = new_store();
    let response = post_json(build_test_app(store.clone()), "/employees", employee(0)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(build_test_app(store.clone()), "/events", event(-2, today())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(build_test_app(store.clone()), "/employees").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
    let json = body_json(get(build_test_app(store), "/events").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_employee_malformed_vs_missing() {
    let store = new_store();
    let response = get(build_test_app(store.clone()), "/employees/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(build_test_app(store.clone()), "/employees/-1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(build_test_app(store), "/employees/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_with_mismatched_key_returns_404() {
    let store = new_store();
    post_json(build_test_app(store.clone()), "/employees", employee(1)).await;

    let mut changed = employee(2);
    changed["post"] = json!("Manager");
    let response = put_json(build_test_app(store.clone()), "/employees/1", changed).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(build_test_app(store), "/employees/1").await).await;
    assert_eq!(json["data"]["post"], "Clerk");
}

#[tokio::test]
async fn test_update_employee() {
    let store = new_store();
    post_json(build_test_app(store.clone()), "/employees", employee(1)).await;

    let mut changed = employee(1);
    changed["post"] = json!("Manager");
    let response = put_json(build_test_app(store.clone()), "/employees/1", changed).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["post"], "Manager");
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let response = post_json(
        build_test_app(new_store()),
        "/employees",
        json!("not an employee"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_non_integer_key_is_a_field_error() {
    let mut body = employee(1);
    body["service_number"] = json!("one");
    body["surname"] = json!("");
    let response = post_json(build_test_app(new_store()), "/employees", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let details = &json["error"]["details"];
    assert_eq!(
        details["fields"]["service_number"][0],
        "Service number must be a whole number"
    );
    assert_eq!(details["fields"]["surname"][0], "Surname is required");
    assert_eq!(details["candidate"]["service_number"], "one");
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_event_in_the_past_is_rejected() {
    let store = new_store();
    let yesterday = today() - Duration::days(1);
    let response = post_json(build_test_app(store.clone()), "/events", event(10, yesterday)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"]["details"]["fields"]["event_date"][0],
        "Event date cannot be in the past"
    );

    let response = post_json(build_test_app(store), "/events", event(10, today())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["event_date"], "2026-10-19");
}

#[tokio::test]
async fn test_unparseable_event_date_is_reported_with_other_fields() {
    let body = json!({
        "id": 0,
        "name": "Expo",
        "event_date": "19.10.2026",
        "event_type": "Forum",
    });
    let response = post_json(build_test_app(new_store()), "/events", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let details = &json["error"]["details"];
    assert_eq!(details["fields"]["event_date"][0], "Event date is not a valid date");
    assert_eq!(details["fields"]["id"][0], "Event ID must be a positive number");
    assert_eq!(details["candidate"]["event_date"], "19.10.2026");
    assert_eq!(details["candidate"]["event_type"], "Forum");
}

#[tokio::test]
async fn test_event_date_time_is_truncated() {
    let mut body = event(10, today());
    body["event_date"] = json!("2026-10-25T18:30:00");
    let response = post_json(build_test_app(new_store()), "/events", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["event_date"], "2026-10-25");
}

#[tokio::test]
async fn test_event_options_list_categories() {
    let response = get(build_test_app(new_store()), "/events/options").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["event_types"][0], "Conference");
}

// ---------------------------------------------------------------------------
// Tickets and dependencies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ticket_lifecycle_and_dependency_checks() {
    let store = new_store();
    post_json(build_test_app(store.clone()), "/employees", employee(1)).await;
    post_json(build_test_app(store.clone()), "/events", event(10, today())).await;

    let tomorrow = today() + Duration::days(1);
    let response = post_json(build_test_app(store.clone()), "/tickets", ticket(5, tomorrow)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"]["details"]["fields"]["sale_date"][0],
        "Sale date cannot be in the future"
    );

    let response = post_json(build_test_app(store.clone()), "/tickets", ticket(5, today())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete(build_test_app(store.clone()), "/employees/1").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "DEPENDENCY_CONFLICT");
    assert_eq!(
        json["error"]["details"]["fields"]["tickets"][0],
        "Cannot delete an employee who has tickets"
    );

    let response = delete(build_test_app(store.clone()), "/events/10").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(get(build_test_app(store.clone()), "/tickets/5").await).await;
    assert_eq!(json["data"]["employee_full_name"], "Lee Ann");
    assert_eq!(json["data"]["event_name"], "Expo");

    let response = delete(build_test_app(store.clone()), "/tickets/5").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete(build_test_app(store.clone()), "/employees/1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(store), "/employees/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_for_unknown_employee_and_event() {
    let store = new_store();
    let response = post_json(build_test_app(store.clone()), "/tickets", ticket(5, today())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let fields = &json["error"]["details"]["fields"];
    assert_eq!(fields["service_number"][0], "Employee not found");
    assert_eq!(fields["event_id"][0], "Event not found");

    let json = body_json(get(build_test_app(store), "/tickets").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ticket_options_include_records_and_choices() {
    let store = new_store();
    post_json(build_test_app(store.clone()), "/employees", employee(1)).await;
    post_json(build_test_app(store.clone()), "/events", event(10, today())).await;

    let json = body_json(get(build_test_app(store), "/tickets/options").await).await;
    assert_eq!(json["data"]["employees"][0]["label"], "Lee Ann");
    assert_eq!(json["data"]["events"][0]["value"], 10);
    assert_eq!(json["data"]["ticket_types"].as_array().unwrap().len(), 6);
    assert_eq!(json["data"]["payment_methods"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_delete_absent_ticket_is_a_no_op() {
    let response = delete(build_test_app(new_store()), "/tickets/77").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Ticket already absent");
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_carries_security_headers() {
    let response = get(build_test_app(new_store()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_wildcard_cors_origin_allows_any_origin() {
    let config = Config::from_lookup(|key| (key == "CORS_ALLOWED_ORIGINS").then(|| "*".to_string()));
    let app = build_test_app_with_config(new_store(), &config);

    let response = get_with_origin(app, "/health", "https://elsewhere.example").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    assert!(response.headers().get("access-control-allow-credentials").is_none());
}
