//! Stock API Handlers

use axum::extract::{Query, State};
use shared::models::{StockBalance, StockBalanceQuery, StockTransaction, StockTransactionQuery};

use crate::core::ServerState;
use crate::ledger;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /stock-balances
pub async fn list_balances(
    State(state): State<ServerState>,
    Query(query): Query<StockBalanceQuery>,
) -> AppResult<AppResponse<Vec<StockBalance>>> {
    let balances = ledger::list_balances(&state.pool, &query).await?;
    Ok(ok(balances))
}

/// GET /stock-transactions - newest first
pub async fn list_transactions(
    State(state): State<ServerState>,
    Query(query): Query<StockTransactionQuery>,
) -> AppResult<AppResponse<Vec<StockTransaction>>> {
    let txns = ledger::list_stock_txns(&state.pool, &query).await?;
    Ok(ok(txns))
}
