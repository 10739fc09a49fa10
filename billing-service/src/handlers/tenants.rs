//! Tenant handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{CreateTenant, Tenant};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_label: Option<String>,
    pub payment_term: Option<i32>,
}

/// Create a tenant.
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), AppError> {
    let full_name = payload
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("full_name is required")))?;

    let tenant = state
        .db
        .create_tenant(&CreateTenant {
            full_name: full_name.to_string(),
            email: payload.email,
            phone: payload.phone,
            unit_label: payload.unit_label,
            payment_term: payload.payment_term,
        })
        .await?;

    tracing::info!(tenant_id = %tenant.tenant_id, "Tenant created");
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// List all tenants.
pub async fn list_tenants(State(state): State<AppState>) -> Result<Json<Vec<Tenant>>, AppError> {
    let tenants = state.db.list_tenants().await?;
    Ok(Json(tenants))
}

/// Get a tenant by id.
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Tenant>, AppError> {
    let tenant = state
        .db
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tenant not found")))?;

    Ok(Json(tenant))
}
