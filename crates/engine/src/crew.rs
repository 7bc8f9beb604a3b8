//! The module contains the representation of a crew member.
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// The role a member holds on board.
///
/// Captains earn one and a half shares in a distribution; everyone else earns
/// one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrewRole {
    Captain,
    Crew,
}

impl CrewRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewRole::Captain => "captain",
            CrewRole::Crew => "crew",
        }
    }
}

impl TryFrom<&str> for CrewRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "captain" => Ok(CrewRole::Captain),
            "crew" => Ok(CrewRole::Crew),
            other => Err(EngineError::InvalidStatus(format!(
                "unknown crew role '{other}'"
            ))),
        }
    }
}

/// A crew member with their running debt balance.
///
/// `current_debt` is the clamped view of the debt ledger: the raw sum of
/// ledger deltas, floored at zero. The ledger itself keeps the raw history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: Uuid,
    pub name: String,
    pub role: CrewRole,
    pub current_debt: MoneyCents,
}

impl CrewMember {
    pub fn new(name: String, role: CrewRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
            current_debt: MoneyCents::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crew_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
    #[sea_orm(has_many = "super::box_members::Entity")]
    BoxMemberships,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl Related<super::box_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoxMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CrewMember> for ActiveModel {
    fn from(member: &CrewMember) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            name: ActiveValue::Set(member.name.clone()),
            role: ActiveValue::Set(member.role.as_str().to_string()),
        }
    }
}

impl TryFrom<(Model, MoneyCents)> for CrewMember {
    type Error = EngineError;

    fn try_from((model, current_debt): (Model, MoneyCents)) -> ResultEngine<Self> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
        Ok(CrewMember {
            id,
            name: model.name,
            role: CrewRole::try_from(model.role.as_str())?,
            current_debt,
        })
    }
}
