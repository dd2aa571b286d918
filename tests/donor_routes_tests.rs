mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Days, Local, Months};
use common::{body_json, json_request, send, spawn_app};
use meddonate::config::Config;
use meddonate::db::models::NgoInput;
use serde_json::json;

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let t = spawn_app(Config::default()).await;
    let resp = send(
        &t.app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn ngo_city_match_ignores_case() {
    let t = spawn_app(Config::default()).await;

    for city in ["Mumbai", "mumbai", "MUMBAI"] {
        let resp = send(&t.app, common::get(&format!("/api/ngos?city={city}"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let names: Vec<&str> = body
            .as_array()
            .expect("array of ngos")
            .iter()
            .filter_map(|n| n["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Care for All"], "city={city}");
    }

    let resp = send(&t.app, common::get("/api/ngos?city=Atlantis")).await;
    assert!(body_json(resp).await.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn ngo_city_match_folds_non_ascii_case() {
    let t = spawn_app(Config::default()).await;
    t.storage
        .insert_ngo(&NgoInput {
            name: "Tafel".to_string(),
            city: "MÜNCHEN".to_string(),
            contact: String::new(),
            accepts: String::new(),
        })
        .await
        .expect("insert ngo");

    // MÜNCHEN, münchen
    for city in ["M%C3%9CNCHEN", "m%C3%BCnchen"] {
        let resp = send(&t.app, common::get(&format!("/api/ngos?city={city}"))).await;
        let body = body_json(resp).await;
        let ngos = body.as_array().expect("array of ngos");
        assert_eq!(ngos.len(), 1, "city={city}");
        assert_eq!(ngos[0]["name"], "Tafel");
    }
}

#[tokio::test]
async fn shelf_life_reference_makes_recent_batch_eligible() {
    let t = spawn_app(Config::default()).await;
    let today = Local::now().date_naive();
    let batch = today.checked_sub_days(Days::new(30)).expect("valid date");

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/eligibility",
            &json!({
                "donor_name": "Asha",
                "donor_city": "bengaluru",
                "medicine_name": "PARACETAMOL",
                "batch_date": iso(batch),
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    let expected_expiry = batch.checked_add_months(Months::new(36)).expect("valid date");
    assert_eq!(body["eligibility"]["outcome"], "eligible");
    assert_eq!(body["eligibility"]["reason"], "Eligible based on shelf life.");
    assert_eq!(body["eligibility"]["expiry_source"], "shelf_life");
    assert_eq!(body["eligibility"]["effective_expiry"], iso(expected_expiry));
    assert_eq!(body["matches"][0]["name"], "Helping Hands Trust");

    // nothing is written by a check
    assert_eq!(t.storage.count_donations().await.expect("count"), 0);
}

#[tokio::test]
async fn printed_expiry_too_close_is_ineligible() {
    let t = spawn_app(Config::default()).await;
    let today = Local::now().date_naive();

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/eligibility",
            &json!({
                "donor_name": "Asha",
                "medicine_name": "Paracetamol",
                "batch_date": iso(today.checked_sub_days(Days::new(400)).expect("valid date")),
                "expiry_date": iso(today.checked_add_days(Days::new(179)).expect("valid date")),
            }),
        ),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["eligibility"]["outcome"], "ineligible");
    assert_eq!(body["eligibility"]["reason"], "Too close to expiry.");
    assert_eq!(body["eligibility"]["days_left"], 179);
}

#[tokio::test]
async fn unknown_medicine_without_expiry_is_undetermined() {
    let t = spawn_app(Config::default()).await;

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/eligibility",
            &json!({
                "donor_name": "Asha",
                "medicine_name": "Unobtainium",
                "batch_date": "2025-01-10",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["eligibility"]["outcome"], "undetermined");
    assert_eq!(
        body["eligibility"]["reason"],
        "No shelf-life reference; cannot determine expiry."
    );
    assert!(body["eligibility"]["effective_expiry"].is_null());
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let t = spawn_app(Config::default()).await;

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/donations",
            &json!({ "donor_name": "", "medicine_name": "Paracetamol", "batch_date": "2025-01-10" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["code"], "VALIDATION_ERROR");

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/eligibility",
            &json!({
                "donor_name": "Asha",
                "medicine_name": "Paracetamol",
                "batch_date": "2025-01-10",
                "expiry_date": "not a date",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message = body_json(resp).await["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(message.starts_with("Expiry parse error"), "{message}");
}

#[tokio::test]
async fn recorded_donation_is_pledged_and_linked() {
    let t = spawn_app(Config::default()).await;
    let today = Local::now().date_naive();

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/donations",
            &json!({
                "donor_name": "Ravi",
                "donor_city": "Mumbai",
                "medicine_name": "Multivitamin",
                "batch_date": iso(today.checked_sub_days(Days::new(10)).expect("valid date")),
                "ngo_id": 2,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["donation"]["status"], "pledged");
    assert_eq!(body["donation"]["matched_ngo_id"], 2);
    assert_eq!(body["eligibility"]["outcome"], "eligible");

    let resp = send(
        &t.app,
        json_request(
            "POST",
            "/api/donations",
            &json!({
                "donor_name": "Ravi",
                "medicine_name": "Multivitamin",
                "batch_date": iso(today),
                "ngo_id": 9999,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(t.storage.count_donations().await.expect("count"), 1);
}
