//! The module contains the crew debt ledger.
//!
//! Debts are append-only entries against a crew member. A member's balance is
//! never stored; it is the sum of their entries, clamped at zero when exposed
//! as a snapshot. Settlements on payment confirmation are recorded as
//! [`DebtEntryKind::Subtract`] entries, so the history survives the payout.
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Direction of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtEntryKind {
    /// Increases the member's debt (an advance, a damage charge).
    Add,
    /// Decreases it (a repayment or a payout settlement).
    Subtract,
}

impl DebtEntryKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtEntryKind::Add => "add",
            DebtEntryKind::Subtract => "subtract",
        }
    }
}

impl TryFrom<&str> for DebtEntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "add" => Ok(DebtEntryKind::Add),
            "subtract" => Ok(DebtEntryKind::Subtract),
            other => Err(EngineError::InvalidStatus(format!(
                "unknown debt entry kind '{other}'"
            ))),
        }
    }
}

/// One ledger entry. `amount` is always positive; the sign comes from `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub kind: DebtEntryKind,
    pub amount: MoneyCents,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl DebtEntry {
    pub fn new(member_id: Uuid, kind: DebtEntryKind, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            kind,
            amount,
            note: None,
            recorded_at: Utc::now(),
        }
    }

    /// The entry's contribution to the raw balance.
    #[must_use]
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            DebtEntryKind::Add => self.amount,
            DebtEntryKind::Subtract => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crew_debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub kind: String,
    pub amount: i64,
    pub note: Option<String>,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::crew::Entity",
        from = "Column::MemberId",
        to = "super::crew::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DebtEntry> for ActiveModel {
    fn from(entry: &DebtEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            member_id: ActiveValue::Set(entry.member_id.to_string()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount: ActiveValue::Set(entry.amount.cents()),
            note: ActiveValue::Set(entry.note.clone()),
            recorded_at: ActiveValue::Set(entry.recorded_at),
        }
    }
}

impl TryFrom<Model> for DebtEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let member_id = Uuid::parse_str(&model.member_id)
            .map_err(|_| EngineError::KeyNotFound(model.member_id.clone()))?;
        Ok(DebtEntry {
            id,
            member_id,
            kind: DebtEntryKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount),
            note: model.note,
            recorded_at: model.recorded_at,
        })
    }
}
