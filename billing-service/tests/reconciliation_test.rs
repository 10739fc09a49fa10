//! Reconciliation integration tests: batch penalty recomputation over
//! unpaid bills.

mod common;

use chrono::Utc;
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn penalty_of(bill: &Value) -> Decimal {
    bill["penalty"]
        .as_str()
        .expect("penalty should be a string")
        .parse()
        .expect("penalty should parse as a decimal")
}

async fn generate_bill(app: &TestApp, client: &reqwest::Client, amount: &str) -> String {
    let tenant_id = app.seed_tenant(Some(30)).await;
    let today = Utc::now().date_naive();
    let bill: Value = client
        .post(format!("{}/bills/generate", app.address))
        .json(&json!({
            "tenant_id": tenant_id,
            "bill_date": today.to_string(),
            "amount": amount
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    bill["bill_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn reconcile_reports_no_unpaid_bills() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("TEST_DATABASE_URL not set or unreachable; skipping");
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .patch(format!("{}/bills/reconcile", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "no unpaid bills");
    assert_eq!(body["bills_processed"], 0);

    app.cleanup().await;
}

#[tokio::test]
async fn reconcile_recomputes_overdue_penalty() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("TEST_DATABASE_URL not set or unreachable; skipping");
        return;
    };
    let client = reqwest::Client::new();

    let bill_id = generate_bill(&app, &client, "1000.00").await;
    // Due 30 days out; shifting everything back 40 days leaves the bill
    // 10 days overdue.
    app.backdate_bill(bill_id.parse().unwrap(), 40).await;

    let response = client
        .patch(format!("{}/bills/reconcile", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["bills_processed"], 1);
    assert_eq!(body["bills_updated"], 1);
    assert_eq!(body["bills_failed"], 0);

    let bill: Value = client
        .get(format!("{}/bills/{}", app.address, bill_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // 1000 * 1% * 10 days
    assert_eq!(penalty_of(&bill), dec!(100.00));
    assert_eq!(bill["payment_status"], "pending");

    app.cleanup().await;
}

#[tokio::test]
async fn reconcile_overwrites_instead_of_accumulating() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("TEST_DATABASE_URL not set or unreachable; skipping");
        return;
    };
    let client = reqwest::Client::new();

    let bill_id = generate_bill(&app, &client, "500.00").await;
    app.backdate_bill(bill_id.parse().unwrap(), 36).await;

    for _ in 0..2 {
        let response = client
            .patch(format!("{}/bills/reconcile", app.address))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let bill: Value = client
        .get(format!("{}/bills/{}", app.address, bill_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // 500 * 1% * 6 days, unchanged by the second pass
    assert_eq!(penalty_of(&bill), dec!(30.00));

    app.cleanup().await;
}

#[tokio::test]
async fn reconcile_skips_paid_bills() {
    let Some(app) = TestApp::try_spawn().await else {
        eprintln!("TEST_DATABASE_URL not set or unreachable; skipping");
        return;
    };
    let client = reqwest::Client::new();

    let bill_id = generate_bill(&app, &client, "1000.00").await;

    client
        .patch(format!("{}/bills/{}/proof", app.address, bill_id))
        .json(&json!({ "proof_url": "https://proofs.example.com/receipt.png" }))
        .send()
        .await
        .unwrap();
    let response = client
        .patch(format!("{}/bills/{}/approve", app.address, bill_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Even with its dates pushed into the past, a paid cycle accrues
    // nothing.
    app.backdate_bill(bill_id.parse().unwrap(), 90).await;

    let response = client
        .patch(format!("{}/bills/reconcile", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["bills_processed"], 0);

    let bill: Value = client
        .get(format!("{}/bills/{}", app.address, bill_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(penalty_of(&bill), dec!(0));

    app.cleanup().await;
}
