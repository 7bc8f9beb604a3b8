//! The module contains the box/crew join table with per-member payment state.
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Per-member payment state inside one box cycle.
///
/// `unpaid -> pending -> paid`, forward only. `paid` is terminal for the
/// cycle; a reset puts everyone back to `unpaid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(EngineError::InvalidStatus(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// One roster assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxMember {
    pub box_id: Uuid,
    pub member_id: Uuid,
    pub payment_status: PaymentStatus,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "box_crew_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub box_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,
    pub payment_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::boxes::Entity",
        from = "Column::BoxId",
        to = "super::boxes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Box,
    #[sea_orm(
        belongs_to = "super::crew::Entity",
        from = "Column::MemberId",
        to = "super::crew::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::boxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Box.def()
    }
}

impl Related<super::crew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BoxMember> for ActiveModel {
    fn from(member: &BoxMember) -> Self {
        Self {
            box_id: ActiveValue::Set(member.box_id.to_string()),
            member_id: ActiveValue::Set(member.member_id.to_string()),
            payment_status: ActiveValue::Set(member.payment_status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for BoxMember {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let box_id = Uuid::parse_str(&model.box_id)
            .map_err(|_| EngineError::KeyNotFound(model.box_id.clone()))?;
        let member_id = Uuid::parse_str(&model.member_id)
            .map_err(|_| EngineError::KeyNotFound(model.member_id.clone()))?;
        Ok(BoxMember {
            box_id,
            member_id,
            payment_status: PaymentStatus::try_from(model.payment_status.as_str())?,
        })
    }
}
