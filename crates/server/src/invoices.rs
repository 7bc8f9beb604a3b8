//! Invoice intake endpoints.

use api_types::{
    Created,
    invoice::{InvoiceNew, InvoiceSummary, InvoiceUpdate, InvoiceView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Invoice, MoneyCents};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn invoice_view(invoice: Invoice) -> InvoiceView {
    InvoiceView {
        id: invoice.id,
        box_id: invoice.box_id,
        amount: invoice.amount.cents(),
        vendor: invoice.vendor,
        note: invoice.note,
        paid: invoice.paid,
        issued_at: invoice.issued_at,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
    Json(payload): Json<InvoiceNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_invoice(
            box_id,
            MoneyCents::new(payload.amount),
            &payload.vendor,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
) -> Result<Json<Vec<InvoiceView>>, ServerError> {
    let invoices = state.engine.list_invoices(box_id).await?;
    Ok(Json(invoices.into_iter().map(invoice_view).collect()))
}

pub async fn summary(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
) -> Result<Json<InvoiceSummary>, ServerError> {
    let summary = state.engine.invoice_summary(box_id).await?;
    Ok(Json(InvoiceSummary {
        box_id: summary.box_id,
        invoice_count: summary.invoice_count,
        total_amount: summary.total_amount.cents(),
        paid_amount: summary.paid_amount.cents(),
        unpaid_amount: summary.unpaid_amount.cents(),
    }))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_invoice(
            id,
            payload.amount.map(MoneyCents::new),
            payload.vendor.as_deref(),
            payload.note.as_deref(),
            payload.paid,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
