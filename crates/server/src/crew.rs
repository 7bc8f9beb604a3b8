//! Crew roster and debt ledger endpoints.

use api_types::{
    Created,
    crew::{CrewMemberNew, CrewMemberUpdate, CrewMemberView, DebtEntryNew, DebtEntryView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CrewMember, DebtEntry, MoneyCents};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn role_to_engine(role: api_types::crew::CrewRole) -> engine::CrewRole {
    match role {
        api_types::crew::CrewRole::Captain => engine::CrewRole::Captain,
        api_types::crew::CrewRole::Crew => engine::CrewRole::Crew,
    }
}

fn role_to_api(role: engine::CrewRole) -> api_types::crew::CrewRole {
    match role {
        engine::CrewRole::Captain => api_types::crew::CrewRole::Captain,
        engine::CrewRole::Crew => api_types::crew::CrewRole::Crew,
    }
}

fn kind_to_engine(kind: api_types::crew::DebtEntryKind) -> engine::DebtEntryKind {
    match kind {
        api_types::crew::DebtEntryKind::Add => engine::DebtEntryKind::Add,
        api_types::crew::DebtEntryKind::Subtract => engine::DebtEntryKind::Subtract,
    }
}

pub(crate) fn member_view(member: CrewMember) -> CrewMemberView {
    CrewMemberView {
        id: member.id,
        name: member.name,
        role: role_to_api(member.role),
        current_debt: member.current_debt.cents(),
    }
}

fn entry_view(entry: DebtEntry) -> DebtEntryView {
    DebtEntryView {
        id: entry.id,
        kind: match entry.kind {
            engine::DebtEntryKind::Add => api_types::crew::DebtEntryKind::Add,
            engine::DebtEntryKind::Subtract => api_types::crew::DebtEntryKind::Subtract,
        },
        amount: entry.amount.cents(),
        note: entry.note,
        recorded_at: entry.recorded_at,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CrewMemberNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_crew_member(&payload.name, role_to_engine(payload.role))
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CrewMemberView>>, ServerError> {
    let members = state.engine.list_crew().await?;
    Ok(Json(members.into_iter().map(member_view).collect()))
}

pub async fn get(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CrewMemberView>, ServerError> {
    let member = state.engine.crew_member(id).await?;
    Ok(Json(member_view(member)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CrewMemberUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_crew_member(
            id,
            payload.name.as_deref(),
            payload.role.map(role_to_engine),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_crew_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_debt(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DebtEntryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let entry_id = state
        .engine
        .add_debt_entry(
            id,
            kind_to_engine(payload.kind),
            MoneyCents::new(payload.amount),
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id: entry_id })))
}

pub async fn debt_history(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DebtEntryView>>, ServerError> {
    let entries = state.engine.debt_history(id).await?;
    Ok(Json(entries.into_iter().map(entry_view).collect()))
}

pub async fn delete_debt(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_debt_entry(id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
