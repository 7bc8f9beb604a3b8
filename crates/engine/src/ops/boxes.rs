use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    BoxMember, BoxStatus, CrewMember, EngineError, FinancialBox, PaymentStatus, ResultEngine,
    box_members, boxes, crew,
};

use super::{Engine, crew::member_debt, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Create a new draft box with a zero total.
    pub async fn new_box(
        &self,
        name: &str,
        crew_count: u32,
        description: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "box")?;
        if crew_count == 0 {
            return Err(EngineError::InvalidCrewCount(
                "box crew count must be positive".to_string(),
            ));
        }
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let exists = boxes::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let fbox = FinancialBox::new(name, crew_count, description);
            let model: boxes::ActiveModel = (&fbox).into();
            model.insert(&db_tx).await?;
            Ok(fbox.id)
        })
    }

    /// Return one box snapshot.
    pub async fn financial_box(&self, box_id: Uuid) -> ResultEngine<FinancialBox> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            FinancialBox::try_from(model)
        })
    }

    /// List all boxes, sorted by name.
    pub async fn list_boxes(&self) -> ResultEngine<Vec<FinancialBox>> {
        with_tx!(self, |db_tx| {
            let models = boxes::Entity::find()
                .order_by_asc(boxes::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(FinancialBox::try_from).collect()
        })
    }

    /// Edit a draft box's name, headcount or description.
    ///
    /// Terminal boxes reject any edit.
    pub async fn update_box(
        &self,
        box_id: Uuid,
        name: Option<&str>,
        crew_count: Option<u32>,
        description: Option<&str>,
    ) -> ResultEngine<()> {
        let name = name.map(|n| normalize_required_name(n, "box")).transpose()?;
        if crew_count == Some(0) {
            return Err(EngineError::InvalidCrewCount(
                "box crew count must be positive".to_string(),
            ));
        }
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            if let Some(ref new_name) = name {
                let clash = boxes::Entity::find()
                    .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                    .filter(boxes::Column::Id.ne(box_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if clash {
                    return Err(EngineError::ExistingKey(new_name.clone()));
                }
            }

            let active = boxes::ActiveModel {
                id: ActiveValue::Set(box_id.to_string()),
                name: name.map_or(ActiveValue::NotSet, ActiveValue::Set),
                crew_count: crew_count.map_or(ActiveValue::NotSet, |c| ActiveValue::Set(c as i32)),
                description: description.map_or(ActiveValue::NotSet, |d| ActiveValue::Set(Some(d))),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a box. Its invoices and roster assignments cascade away.
    pub async fn delete_box(&self, box_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_box(&db_tx, box_id).await?;
            boxes::Entity::delete_by_id(box_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Move a box between lifecycle states.
    ///
    /// Only `draft -> cancelled` and `cancelled -> draft` are allowed here;
    /// `completed` is reached exclusively through the payment cycle and is
    /// terminal.
    pub async fn set_box_status(&self, box_id: Uuid, status: BoxStatus) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            let current = BoxStatus::try_from(model.status.as_str())?;

            if current == BoxStatus::Completed {
                return Err(EngineError::AlreadyCompleted(model.name));
            }
            if status == BoxStatus::Completed {
                return Err(EngineError::InvalidStatus(
                    "a box completes through payment confirmation, not a status edit".to_string(),
                ));
            }

            let active = boxes::ActiveModel {
                id: ActiveValue::Set(box_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Replace the box roster with the given members.
    ///
    /// Every assignment restarts at `unpaid`, dropping any in-flight payment
    /// state. Duplicate ids are rejected.
    pub async fn assign_crew(&self, box_id: Uuid, member_ids: &[Uuid]) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            let mut seen = std::collections::HashSet::new();
            for member_id in member_ids {
                if !seen.insert(*member_id) {
                    return Err(EngineError::ExistingKey(member_id.to_string()));
                }
                super::crew::require_member(&db_tx, *member_id).await?;
            }

            box_members::Entity::delete_many()
                .filter(box_members::Column::BoxId.eq(box_id.to_string()))
                .exec(&db_tx)
                .await?;

            for member_id in member_ids {
                let assignment = BoxMember {
                    box_id,
                    member_id: *member_id,
                    payment_status: PaymentStatus::Unpaid,
                };
                let active: box_members::ActiveModel = (&assignment).into();
                active.insert(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// The box roster with each member's payment state and debt balance.
    pub async fn box_roster(&self, box_id: Uuid) -> ResultEngine<Vec<(CrewMember, PaymentStatus)>> {
        with_tx!(self, |db_tx| {
            require_box(&db_tx, box_id).await?;
            load_roster(&db_tx, box_id).await
        })
    }
}

pub(super) async fn require_box(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
) -> ResultEngine<boxes::Model> {
    boxes::Entity::find_by_id(box_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("financial box not exists".to_string()))
}

pub(super) fn require_open(model: &boxes::Model) -> ResultEngine<()> {
    let status = BoxStatus::try_from(model.status.as_str())?;
    match status {
        BoxStatus::Draft => Ok(()),
        BoxStatus::Completed => Err(EngineError::AlreadyCompleted(model.name.clone())),
        BoxStatus::Cancelled => Err(EngineError::InvalidStatus(format!(
            "box '{name}' is cancelled",
            name = model.name
        ))),
    }
}

pub(super) async fn load_roster(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
) -> ResultEngine<Vec<(CrewMember, PaymentStatus)>> {
    let rows = box_members::Entity::find()
        .filter(box_members::Column::BoxId.eq(box_id.to_string()))
        .find_also_related(crew::Entity)
        .all(db_tx)
        .await?;

    let mut roster = Vec::with_capacity(rows.len());
    for (assignment, member_model) in rows {
        let member_model = member_model
            .ok_or_else(|| EngineError::KeyNotFound(assignment.member_id.clone()))?;
        let assignment = BoxMember::try_from(assignment)?;
        let debt = member_debt(db_tx, assignment.member_id).await?;
        let member = CrewMember::try_from((member_model, debt))?;
        roster.push((member, assignment.payment_status));
    }
    // Stable order for display and deterministic allocation lists.
    roster.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
    Ok(roster)
}
