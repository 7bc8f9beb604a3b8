//! Financial box endpoints.

use api_types::{
    Created,
    boxes::{BoxNew, BoxStatusSet, BoxUpdate, BoxView, RosterMemberView, RosterSet},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::FinancialBox;
use uuid::Uuid;

use crate::{ServerError, crew::member_view, server::ServerState, user};

fn status_to_engine(status: api_types::boxes::BoxStatus) -> engine::BoxStatus {
    match status {
        api_types::boxes::BoxStatus::Draft => engine::BoxStatus::Draft,
        api_types::boxes::BoxStatus::Completed => engine::BoxStatus::Completed,
        api_types::boxes::BoxStatus::Cancelled => engine::BoxStatus::Cancelled,
    }
}

fn status_to_api(status: engine::BoxStatus) -> api_types::boxes::BoxStatus {
    match status {
        engine::BoxStatus::Draft => api_types::boxes::BoxStatus::Draft,
        engine::BoxStatus::Completed => api_types::boxes::BoxStatus::Completed,
        engine::BoxStatus::Cancelled => api_types::boxes::BoxStatus::Cancelled,
    }
}

fn box_view(fbox: FinancialBox) -> BoxView {
    BoxView {
        id: fbox.id,
        name: fbox.name,
        status: status_to_api(fbox.status),
        total_amount: fbox.total_amount.cents(),
        crew_count: fbox.crew_count,
        description: fbox.description,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BoxNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_box(
            &payload.name,
            payload.crew_count,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BoxView>>, ServerError> {
    let boxes = state.engine.list_boxes().await?;
    Ok(Json(boxes.into_iter().map(box_view).collect()))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoxView>, ServerError> {
    let fbox = state.engine.financial_box(id).await?;
    Ok(Json(box_view(fbox)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BoxUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_box(
            id,
            payload.name.as_deref(),
            payload.crew_count,
            payload.description.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_box(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BoxStatusSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_box_status(id, status_to_engine(payload.status))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_roster(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RosterSet>,
) -> Result<StatusCode, ServerError> {
    state.engine.assign_crew(id, &payload.member_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn roster(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RosterMemberView>>, ServerError> {
    let roster = state.engine.box_roster(id).await?;
    let views = roster
        .into_iter()
        .map(|(member, status)| RosterMemberView {
            member: member_view(member),
            payment_status: match status {
                engine::PaymentStatus::Unpaid => api_types::boxes::PaymentStatus::Unpaid,
                engine::PaymentStatus::Pending => api_types::boxes::PaymentStatus::Pending,
                engine::PaymentStatus::Paid => api_types::boxes::PaymentStatus::Paid,
            },
        })
        .collect();
    Ok(Json(views))
}
