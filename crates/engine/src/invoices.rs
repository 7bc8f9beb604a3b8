//! The module contains invoices, the income records that feed a box total.
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// An invoice booked against a financial box.
///
/// Creating one increments the box total by `amount`; deleting or editing one
/// adjusts the total accordingly, never letting it go below zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub box_id: Uuid,
    pub amount: MoneyCents,
    pub vendor: String,
    pub note: Option<String>,
    /// Whether the vendor has been paid. Bookkeeping only, does not touch
    /// the box total.
    pub paid: bool,
    pub issued_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(box_id: Uuid, amount: MoneyCents, vendor: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            box_id,
            amount,
            vendor,
            note: None,
            paid: false,
            issued_at: Utc::now(),
        }
    }
}

/// Aggregate view over a box's invoices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub box_id: Uuid,
    pub invoice_count: u64,
    pub total_amount: MoneyCents,
    pub paid_amount: MoneyCents,
    pub unpaid_amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub box_id: String,
    pub amount: i64,
    pub vendor: String,
    pub note: Option<String>,
    pub paid: bool,
    pub issued_at: DateTimeUtc,
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
}

impl Related<super::boxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Box.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invoice> for ActiveModel {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: ActiveValue::Set(invoice.id.to_string()),
            box_id: ActiveValue::Set(invoice.box_id.to_string()),
            amount: ActiveValue::Set(invoice.amount.cents()),
            vendor: ActiveValue::Set(invoice.vendor.clone()),
            note: ActiveValue::Set(invoice.note.clone()),
            paid: ActiveValue::Set(invoice.paid),
            issued_at: ActiveValue::Set(invoice.issued_at),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let box_id = Uuid::parse_str(&model.box_id)
            .map_err(|_| EngineError::KeyNotFound(model.box_id.clone()))?;
        Ok(Invoice {
            id,
            box_id,
            amount: MoneyCents::new(model.amount),
            vendor: model.vendor,
            note: model.note,
            paid: model.paid,
            issued_at: model.issued_at,
        })
    }
}
