//! Expense ledger API endpoints.

use api_types::expense::{ExpenseUpdate, ExpensesAdd};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseItem, ExpenseSummary, NewExpenseCmd, UpdateExpenseCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

pub async fn add(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ExpensesAdd>,
) -> Result<(StatusCode, Json<Vec<ExpenseItem>>), ServerError> {
    let items = payload
        .items
        .into_iter()
        .map(|item| {
            NewExpenseCmd::new(item.description, item.amount_minor)
                .quantity(item.quantity.unwrap_or(1))
        })
        .collect();

    let created = state
        .engine
        .add_expenses(session_id, identity.user_id, items)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path((session_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseItem>, ServerError> {
    let cmd = UpdateExpenseCmd {
        description: payload.description,
        amount_minor: payload.amount_minor,
        quantity: payload.quantity,
    };
    let item = state
        .engine
        .update_expense(session_id, expense_id, identity.user_id, cmd)
        .await?;
    Ok(Json(item))
}

pub async fn remove(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path((session_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(session_id, expense_id, identity.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ExpenseSummary>, ServerError> {
    let summary = state
        .engine
        .expense_summary(session_id, identity.user_id)
        .await?;
    Ok(Json(summary))
}
