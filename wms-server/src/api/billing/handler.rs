//! Billing API Handlers

use axum::extract::{Query, State};
use shared::models::{BillingEvent, BillingEventQuery};

use crate::billing;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /billing-events?client_id&month=YYYY-MM&service_code
///
/// Live events only; this is the feed invoice generation prices.
pub async fn list_events(
    State(state): State<ServerState>,
    Query(query): Query<BillingEventQuery>,
) -> AppResult<AppResponse<Vec<BillingEvent>>> {
    let events = billing::list_billing_events(&state.pool, &query).await?;
    Ok(ok(events))
}
