//! Test helper module for billing-service integration tests.
//!
//! Provides PostgreSQL-backed setup with schema-per-test isolation. Tests
//! that need a database call [`TestApp::try_spawn`] and return early when
//! `TEST_DATABASE_URL` is unset or unreachable, so the suite stays
//! runnable on machines without Postgres.

#![allow(dead_code)]

use billing_service::config::{BillingConfig, DatabaseConfig, ReconciliationConfig};
use billing_service::models::CreateTenant;
use billing_service::services::Database;
use billing_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

// Counter for unique schema names
static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Get the database URL for testing, if one is configured.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Generate a unique schema name for test isolation.
fn unique_schema_name() -> String {
    let counter = SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("test_billing_{}_{}", std::process::id(), counter)
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Database,
    schema_name: String,
}

impl TestApp {
    /// Spawn the service on a random port against an isolated schema, or
    /// return `None` when no test database is reachable.
    pub async fn try_spawn() -> Option<Self> {
        let base_url = test_database_url()?;
        let schema_name = unique_schema_name();

        // Create schema for test isolation
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&base_url)
            .await
            .ok()?;

        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name))
            .execute(&pool)
            .await
            .ok();
        sqlx::query(&format!("CREATE SCHEMA {}", schema_name))
            .execute(&pool)
            .await
            .ok()?;
        pool.close().await;

        // Point the connection at the schema via search_path
        let separator = if base_url.contains('?') { "&" } else { "?" };
        let db_url = format!(
            "{}{}options=-c search_path%3D{}",
            base_url, separator, schema_name
        );

        let config = BillingConfig {
            common: CoreConfig { port: 0 }, // Random port
            service_name: "billing-service-test".to_string(),
            service_version: "0.1.0".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: db_url.clone(),
                max_connections: 5,
                min_connections: 1,
            },
            reconciliation: ReconciliationConfig { interval_secs: 0 },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let db = Database::new(&db_url, 5, 1)
            .await
            .expect("Failed to create test database handle");

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Some(TestApp {
            address,
            port,
            db,
            schema_name,
        })
    }

    /// Seed a tenant and return its id.
    pub async fn seed_tenant(&self, payment_term: Option<i32>) -> Uuid {
        let tenant = self
            .db
            .create_tenant(&CreateTenant {
                full_name: "Abebe Kebede".to_string(),
                email: Some("abebe@example.com".to_string()),
                phone: None,
                unit_label: Some("A-12".to_string()),
                payment_term,
            })
            .await
            .expect("Failed to seed tenant");
        tenant.tenant_id
    }

    /// Shift a bill's cycle dates `days` days into the past, keeping the
    /// due dates aligned, so penalty accrual can be exercised.
    pub async fn backdate_bill(&self, bill_id: Uuid, days: i32) {
        sqlx::query(
            r#"
            UPDATE bills
            SET bill_date = bill_date - make_interval(days => $2),
                due_date = due_date - make_interval(days => $2),
                original_due_date = original_due_date - make_interval(days => $2)
            WHERE bill_id = $1
            "#,
        )
        .bind(bill_id)
        .bind(days)
        .execute(self.db.pool())
        .await
        .expect("Failed to backdate bill");
    }

    /// Cleanup test resources (schema).
    pub async fn cleanup(&self) {
        if let Some(base_url) = test_database_url() {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(1)
                .connect(&base_url)
                .await
                .ok();

            if let Some(pool) = pool {
                let _ = sqlx::query(&format!(
                    "DROP SCHEMA IF EXISTS {} CASCADE",
                    self.schema_name
                ))
                .execute(&pool)
                .await;
                pool.close().await;
            }
        }
    }
}
