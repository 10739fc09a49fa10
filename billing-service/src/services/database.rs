//! Database service for billing-service.

use crate::billing::cycle::CycleSchedule;
use crate::models::{Bill, CreateBill, CreateTenant, ListBillsFilter, Tenant};
use crate::services::metrics::DB_QUERY_DURATION;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "billing-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // =========================================================================
    // Tenant Operations
    // =========================================================================

    /// Create a new tenant.
    #[instrument(skip(self, input))]
    pub async fn create_tenant(&self, input: &CreateTenant) -> Result<Tenant, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_tenant"])
            .start_timer();

        let tenant_id = Uuid::new_v4();
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (tenant_id, full_name, email, phone, unit_label, payment_term)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING tenant_id, full_name, email, phone, unit_label, payment_term, created_utc, updated_utc
            "#,
        )
        .bind(tenant_id)
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.unit_label)
        .bind(input.payment_term)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create tenant: {}", e)))?;

        timer.observe_duration();
        info!(tenant_id = %tenant.tenant_id, "Tenant created");

        Ok(tenant)
    }

    /// Fetch a tenant by id.
    #[instrument(skip(self))]
    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_tenant"])
            .start_timer();

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT tenant_id, full_name, email, phone, unit_label, payment_term, created_utc, updated_utc
            FROM tenants
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch tenant: {}", e)))?;

        timer.observe_duration();
        Ok(tenant)
    }

    /// List all tenants, newest first.
    #[instrument(skip(self))]
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_tenants"])
            .start_timer();

        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT tenant_id, full_name, email, phone, unit_label, payment_term, created_utc, updated_utc
            FROM tenants
            ORDER BY created_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list tenants: {}", e)))?;

        timer.observe_duration();
        Ok(tenants)
    }

    // =========================================================================
    // Bill Operations
    // =========================================================================

    /// Create a new bill with a pending cycle and zero penalty.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn create_bill(&self, input: &CreateBill) -> Result<Bill, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_bill"])
            .start_timer();

        let bill_id = Uuid::new_v4();
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, 'pending')
            RETURNING bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status, payment_proof_url, created_utc, updated_utc
            "#,
        )
        .bind(bill_id)
        .bind(input.tenant_id)
        .bind(input.kind.as_str())
        .bind(input.bill_date)
        .bind(input.due_date)
        .bind(input.original_due_date)
        .bind(input.amount)
        .bind(input.payment_term)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create bill: {}", e)))?;

        timer.observe_duration();
        info!(bill_id = %bill.bill_id, kind = %bill.kind, due_date = %bill.due_date, "Bill created");

        Ok(bill)
    }

    /// Fetch a bill by id.
    #[instrument(skip(self))]
    pub async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_bill"])
            .start_timer();

        let bill = sqlx::query_as::<_, Bill>(
            r#"
            SELECT bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status, payment_proof_url, created_utc, updated_utc
            FROM bills
            WHERE bill_id = $1
            "#,
        )
        .bind(bill_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch bill: {}", e)))?;

        timer.observe_duration();
        Ok(bill)
    }

    /// List bills, optionally filtered by kind, status, or tenant.
    #[instrument(skip(self, filter))]
    pub async fn list_bills(&self, filter: &ListBillsFilter) -> Result<Vec<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_bills"])
            .start_timer();

        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status, payment_proof_url, created_utc, updated_utc
            FROM bills
            WHERE ($1::text IS NULL OR kind = $1)
              AND ($2::text IS NULL OR payment_status = $2)
              AND ($3::uuid IS NULL OR tenant_id = $3)
            ORDER BY created_utc DESC
            "#,
        )
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list bills: {}", e)))?;

        timer.observe_duration();
        Ok(bills)
    }

    /// Attach a payment proof and force the bill to `submitted`.
    /// Re-submission overwrites the previous proof.
    #[instrument(skip(self, proof_url))]
    pub async fn submit_proof(
        &self,
        bill_id: Uuid,
        proof_url: &str,
    ) -> Result<Option<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["submit_proof"])
            .start_timer();

        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills
            SET payment_proof_url = $2, payment_status = 'submitted', updated_utc = now()
            WHERE bill_id = $1
            RETURNING bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status, payment_proof_url, created_utc, updated_utc
            "#,
        )
        .bind(bill_id)
        .bind(proof_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to submit proof: {}", e)))?;

        timer.observe_duration();
        if let Some(bill) = &bill {
            info!(bill_id = %bill.bill_id, "Payment proof submitted");
        }

        Ok(bill)
    }

    /// Mark a submitted bill paid and roll it into the next cycle in one
    /// conditional update. Returns false when the bill is missing or its
    /// status is no longer `submitted` at write time.
    #[instrument(skip(self, schedule))]
    pub async fn approve_bill(
        &self,
        bill_id: Uuid,
        schedule: &CycleSchedule,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["approve_bill"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE bills
            SET payment_status = 'paid',
                bill_date = $2,
                due_date = $3,
                original_due_date = $3,
                penalty = 0,
                payment_proof_url = NULL,
                updated_utc = now()
            WHERE bill_id = $1 AND payment_status = 'submitted'
            "#,
        )
        .bind(bill_id)
        .bind(schedule.bill_date)
        .bind(schedule.due_date)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to approve bill: {}", e)))?;

        timer.observe_duration();

        let approved = result.rows_affected() > 0;
        if approved {
            info!(bill_id = %bill_id, new_due_date = %schedule.due_date, "Bill approved and rolled over");
        }

        Ok(approved)
    }

    /// Fetch every bill whose current cycle has not been paid.
    #[instrument(skip(self))]
    pub async fn list_unpaid_bills(&self) -> Result<Vec<Bill>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_unpaid_bills"])
            .start_timer();

        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT bill_id, tenant_id, kind, bill_date, due_date, original_due_date, amount, penalty, payment_term, payment_status, payment_proof_url, created_utc, updated_utc
            FROM bills
            WHERE payment_status <> 'paid'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list unpaid bills: {}", e))
        })?;

        timer.observe_duration();
        Ok(bills)
    }

    /// Overwrite a bill's penalty. The reconciliation job is the only
    /// writer of this column.
    #[instrument(skip(self))]
    pub async fn update_penalty(&self, bill_id: Uuid, penalty: Decimal) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_penalty"])
            .start_timer();

        sqlx::query("UPDATE bills SET penalty = $2 WHERE bill_id = $1")
            .bind(bill_id)
            .bind(penalty)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update penalty: {}", e))
            })?;

        timer.observe_duration();
        Ok(())
    }
}
