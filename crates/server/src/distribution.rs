//! Profit distribution and payment cycle endpoints.

use api_types::distribution::{
    AllocationView, DistributionView, FinalPaymentView, PaymentBatch, PreviewRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{DeductionOverride, Distribution, MoneyCents};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn distribution_view(distribution: Distribution) -> DistributionView {
    DistributionView {
        total_amount: distribution.total_amount.cents(),
        owner_share: distribution.owner_share.cents(),
        total_crew_share: distribution.total_crew_share.cents(),
        individual_share: distribution.individual_share.cents(),
        captain_share: distribution.captain_share.cents(),
        captain_extra_share: distribution.captain_extra_share.cents(),
        crew_count: distribution.crew_count,
        allocations: distribution
            .allocations
            .into_iter()
            .map(|a| AllocationView {
                member_id: a.member_id,
                role: match a.role {
                    engine::CrewRole::Captain => api_types::crew::CrewRole::Captain,
                    engine::CrewRole::Crew => api_types::crew::CrewRole::Crew,
                },
                base_share: a.base_share.cents(),
                debt_deduction: a.debt_deduction.cents(),
                net_payout: a.net_payout.cents(),
                forgiven_debt: a.forgiven_debt.cents(),
            })
            .collect(),
    }
}

pub async fn preview(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<DistributionView>, ServerError> {
    let adjustments: Vec<DeductionOverride> = payload
        .adjustments
        .iter()
        .map(|a| DeductionOverride {
            member_id: a.member_id,
            deduction: MoneyCents::new(a.deduction),
        })
        .collect();

    let distribution = state
        .engine
        .preview_distribution(box_id, payload.override_crew_count, &adjustments)
        .await?;
    Ok(Json(distribution_view(distribution)))
}

pub async fn select_for_payment(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
    Json(payload): Json<PaymentBatch>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .select_for_payment(box_id, &payload.member_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn confirm_payments(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
    Json(payload): Json<PaymentBatch>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .confirm_member_payments(box_id, &payload.member_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn confirm_final(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
) -> Result<Json<FinalPaymentView>, ServerError> {
    let outcome = state.engine.confirm_final_payment(box_id).await?;
    Ok(Json(FinalPaymentView {
        distribution: distribution_view(outcome.distribution),
        remaining_total: outcome.remaining_total.cents(),
    }))
}

pub async fn reset_cycle(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(box_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.reset_distribution_cycle(box_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
