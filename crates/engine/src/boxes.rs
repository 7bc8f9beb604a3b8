//! The module contains the representation of a financial box.
//!
//! A box is the accounting pool for one trip or season. Invoices feed its
//! total while it is a draft; the distribution cycle drains it and marks it
//! completed. Completed and cancelled boxes are terminal.
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Lifecycle state of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxStatus {
    /// Accepting invoices and roster changes.
    Draft,
    /// Cycle closed; the total has been paid out. Terminal.
    Completed,
    /// Abandoned without payout. Terminal.
    Cancelled,
}

impl BoxStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxStatus::Draft => "draft",
            BoxStatus::Completed => "completed",
            BoxStatus::Cancelled => "cancelled",
        }
    }

    /// A terminal box accepts no further mutations.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, BoxStatus::Completed | BoxStatus::Cancelled)
    }
}

impl TryFrom<&str> for BoxStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(BoxStatus::Draft),
            "completed" => Ok(BoxStatus::Completed),
            "cancelled" => Ok(BoxStatus::Cancelled),
            other => Err(EngineError::InvalidStatus(format!(
                "unknown box status '{other}'"
            ))),
        }
    }
}

/// A financial box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialBox {
    pub id: Uuid,
    pub name: String,
    pub status: BoxStatus,
    /// Running pool total, fed by invoices.
    pub total_amount: MoneyCents,
    /// Headcount the distribution expects. Validated against the roster.
    pub crew_count: u32,
    pub description: Option<String>,
}

impl FinancialBox {
    pub fn new(name: String, crew_count: u32, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            status: BoxStatus::Draft,
            total_amount: MoneyCents::ZERO,
            crew_count,
            description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_boxes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub status: String,
    pub total_amount: i64,
    pub crew_count: i32,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
    #[sea_orm(has_many = "super::box_members::Entity")]
    Members,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::box_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FinancialBox> for ActiveModel {
    fn from(fbox: &FinancialBox) -> Self {
        Self {
            id: ActiveValue::Set(fbox.id.to_string()),
            name: ActiveValue::Set(fbox.name.clone()),
            status: ActiveValue::Set(fbox.status.as_str().to_string()),
            total_amount: ActiveValue::Set(fbox.total_amount.cents()),
            crew_count: ActiveValue::Set(fbox.crew_count as i32),
            description: ActiveValue::Set(fbox.description.clone()),
        }
    }
}

impl TryFrom<Model> for FinancialBox {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        let crew_count = u32::try_from(model.crew_count).map_err(|_| {
            EngineError::InvalidCrewCount(format!(
                "stored crew count {count} is negative",
                count = model.crew_count
            ))
        })?;
        Ok(FinancialBox {
            id,
            name: model.name,
            status: BoxStatus::try_from(model.status.as_str())?,
            total_amount: MoneyCents::new(model.total_amount),
            crew_count,
            description: model.description,
        })
    }
}
