use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BoxStatus, DebtEntry, DebtEntryKind, Distribution, EngineError, MoneyCents, PaymentStatus,
    ResultEngine, RosterMember, box_members, boxes, compute_distribution, debts,
    recompute_with_count,
};

use super::{
    Engine,
    boxes::{load_roster, require_box, require_open},
    with_tx,
};

/// One ad-hoc deduction applied on top of a computed distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionOverride {
    pub member_id: Uuid,
    pub deduction: MoneyCents,
}

impl Engine {
    /// Compute the distribution for a box without touching any state.
    ///
    /// `override_count` swaps the share divisor for what-if scenarios; the
    /// stored headcount is enforced otherwise. `adjustments` replace the
    /// default per-member debt deductions.
    pub async fn preview_distribution(
        &self,
        box_id: Uuid,
        override_count: Option<u32>,
        adjustments: &[DeductionOverride],
    ) -> ResultEngine<Distribution> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            let total = MoneyCents::new(model.total_amount);
            let expected = u32::try_from(model.crew_count)
                .map_err(|_| EngineError::InvalidCrewCount("stored crew count".to_string()))?;

            let roster = snapshot_roster(&db_tx, box_id).await?;
            let mut distribution = match override_count {
                Some(count) => recompute_with_count(total, &roster, count)?,
                None => compute_distribution(total, &roster, expected)?,
            };

            for adjustment in adjustments {
                distribution.apply_deduction(adjustment.member_id, adjustment.deduction)?;
            }
            Ok(distribution)
        })
    }

    /// Mark the given members as selected for payment (`unpaid -> pending`).
    ///
    /// Re-selecting a pending member is a no-op; selecting a paid member
    /// fails, their cycle is over.
    pub async fn select_for_payment(&self, box_id: Uuid, member_ids: &[Uuid]) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            for member_id in member_ids {
                let assignment = require_assignment(&db_tx, box_id, *member_id).await?;
                match PaymentStatus::try_from(assignment.payment_status.as_str())? {
                    PaymentStatus::Unpaid => {
                        set_payment_status(&db_tx, box_id, *member_id, PaymentStatus::Pending)
                            .await?;
                    }
                    PaymentStatus::Pending => {}
                    PaymentStatus::Paid => {
                        return Err(EngineError::InvalidStatus(format!(
                            "member {member_id} is already paid"
                        )));
                    }
                }
            }
            Ok(())
        })
    }

    /// Confirm payment for pending members (`pending -> paid`).
    ///
    /// Confirmation settles the member's debt: a `subtract` ledger entry for
    /// their full outstanding balance is appended, so the balance reads zero
    /// afterwards while the history stays intact. Confirming an already-paid
    /// member is idempotent.
    pub async fn confirm_member_payments(
        &self,
        box_id: Uuid,
        member_ids: &[Uuid],
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            for member_id in member_ids {
                let assignment = require_assignment(&db_tx, box_id, *member_id).await?;
                match PaymentStatus::try_from(assignment.payment_status.as_str())? {
                    PaymentStatus::Pending => {
                        settle_debt(&db_tx, *member_id, &model.name).await?;
                        set_payment_status(&db_tx, box_id, *member_id, PaymentStatus::Paid)
                            .await?;
                    }
                    PaymentStatus::Paid => {}
                    PaymentStatus::Unpaid => {
                        return Err(EngineError::InvalidStatus(format!(
                            "member {member_id} was never selected for payment"
                        )));
                    }
                }
            }
            Ok(())
        })
    }

    /// Close the cycle once every roster member is paid.
    ///
    /// Deducts the grand total just distributed (owner and crew shares) from
    /// the box total, floored at zero, and marks the box completed. Shares
    /// conserve the total, so a closed box normally ends at zero. Completed
    /// is terminal.
    pub async fn confirm_final_payment(&self, box_id: Uuid) -> ResultEngine<FinalPayment> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            let roster = load_roster(&db_tx, box_id).await?;
            if roster.is_empty() {
                return Err(EngineError::InvalidCrewCount(
                    "box has no crew assigned".to_string(),
                ));
            }
            if let Some((member, _)) = roster
                .iter()
                .find(|(_, status)| *status != PaymentStatus::Paid)
            {
                return Err(EngineError::InvalidStatus(format!(
                    "member '{name}' is not paid yet",
                    name = member.name
                )));
            }

            let total = MoneyCents::new(model.total_amount);
            let expected = u32::try_from(model.crew_count)
                .map_err(|_| EngineError::InvalidCrewCount("stored crew count".to_string()))?;
            let snapshot = snapshot_roster(&db_tx, box_id).await?;
            let distribution = compute_distribution(total, &snapshot, expected)?;

            let distributed = distribution.owner_share + distribution.total_crew_share;
            let remaining = total.saturating_deduct(distributed);
            super::invoices::set_box_total(&db_tx, box_id, remaining).await?;

            let active = boxes::ActiveModel {
                id: ActiveValue::Set(box_id.to_string()),
                status: ActiveValue::Set(BoxStatus::Completed.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(FinalPayment {
                distribution,
                remaining_total: remaining,
            })
        })
    }

    /// Put every roster member back to `unpaid` for a fresh cycle.
    ///
    /// Completed boxes cannot be reset; their cycle is history.
    pub async fn reset_distribution_cycle(&self, box_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            if BoxStatus::try_from(model.status.as_str())? == BoxStatus::Completed {
                return Err(EngineError::AlreadyCompleted(model.name));
            }

            let rows = box_members::Entity::find()
                .filter(box_members::Column::BoxId.eq(box_id.to_string()))
                .all(&db_tx)
                .await?;
            for row in rows {
                let member_id = Uuid::parse_str(&row.member_id)
                    .map_err(|_| EngineError::KeyNotFound(row.member_id.clone()))?;
                set_payment_status(&db_tx, box_id, member_id, PaymentStatus::Unpaid).await?;
            }
            Ok(())
        })
    }
}

/// Outcome of closing a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPayment {
    pub distribution: Distribution,
    /// What stays in the box after the distributed total leaves it.
    pub remaining_total: MoneyCents,
}

async fn snapshot_roster(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
) -> ResultEngine<Vec<RosterMember>> {
    let roster = load_roster(db_tx, box_id).await?;
    Ok(roster
        .into_iter()
        .map(|(member, _)| RosterMember {
            id: member.id,
            role: member.role,
            current_debt: member.current_debt,
        })
        .collect())
}

async fn require_assignment(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
    member_id: Uuid,
) -> ResultEngine<box_members::Model> {
    box_members::Entity::find_by_id((box_id.to_string(), member_id.to_string()))
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("member not assigned to box".to_string()))
}

async fn set_payment_status(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
    member_id: Uuid,
    status: PaymentStatus,
) -> ResultEngine<()> {
    let active = box_members::ActiveModel {
        box_id: ActiveValue::Set(box_id.to_string()),
        member_id: ActiveValue::Set(member_id.to_string()),
        payment_status: ActiveValue::Set(status.as_str().to_string()),
    };
    active.update(db_tx).await?;
    Ok(())
}

async fn settle_debt(
    db_tx: &impl ConnectionTrait,
    member_id: Uuid,
    box_name: &str,
) -> ResultEngine<()> {
    let balance = super::crew::member_debt(db_tx, member_id).await?;
    if balance.is_zero() {
        return Ok(());
    }

    let mut entry = DebtEntry::new(member_id, DebtEntryKind::Subtract, balance);
    entry.note = Some(format!("settled on payout from box '{box_name}'"));
    let active: debts::ActiveModel = (&entry).into();
    active.insert(db_tx).await?;
    Ok(())
}
