use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    CrewMember, CrewRole, DebtEntry, DebtEntryKind, EngineError, MoneyCents, ResultEngine, crew,
    debts,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Add a new crew member with a zero debt balance.
    ///
    /// Names are unique case-insensitively across the roster.
    pub async fn new_crew_member(&self, name: &str, role: CrewRole) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "crew member")?;
        with_tx!(self, |db_tx| {
            let exists = crew::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let member = CrewMember::new(name, role);
            let model: crew::ActiveModel = (&member).into();
            model.insert(&db_tx).await?;
            Ok(member.id)
        })
    }

    /// Return a crew member snapshot with their clamped debt balance.
    pub async fn crew_member(&self, member_id: Uuid) -> ResultEngine<CrewMember> {
        with_tx!(self, |db_tx| {
            let model = require_member(&db_tx, member_id).await?;
            let debt = member_debt(&db_tx, member_id).await?;
            CrewMember::try_from((model, debt))
        })
    }

    /// List the whole roster, sorted by name, each with their debt balance.
    pub async fn list_crew(&self) -> ResultEngine<Vec<CrewMember>> {
        with_tx!(self, |db_tx| {
            let models = crew::Entity::find()
                .order_by_asc(crew::Column::Name)
                .all(&db_tx)
                .await?;

            let mut members = Vec::with_capacity(models.len());
            for model in models {
                let member_id = Uuid::parse_str(&model.id)
                    .map_err(|_| EngineError::KeyNotFound(model.id.clone()))?;
                let debt = member_debt(&db_tx, member_id).await?;
                members.push(CrewMember::try_from((model, debt))?);
            }
            Ok(members)
        })
    }

    /// Rename a member and/or change their role.
    pub async fn update_crew_member(
        &self,
        member_id: Uuid,
        name: Option<&str>,
        role: Option<CrewRole>,
    ) -> ResultEngine<()> {
        let name = name.map(|n| normalize_required_name(n, "crew member")).transpose()?;
        with_tx!(self, |db_tx| {
            require_member(&db_tx, member_id).await?;

            if let Some(ref new_name) = name {
                let clash = crew::Entity::find()
                    .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                    .filter(crew::Column::Id.ne(member_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if clash {
                    return Err(EngineError::ExistingKey(new_name.clone()));
                }
            }

            let active = crew::ActiveModel {
                id: ActiveValue::Set(member_id.to_string()),
                name: name.map_or(ActiveValue::NotSet, ActiveValue::Set),
                role: role.map_or(ActiveValue::NotSet, |r| {
                    ActiveValue::Set(r.as_str().to_string())
                }),
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Remove a member. Their debt history and roster assignments go with
    /// them (cascade).
    pub async fn delete_crew_member(&self, member_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_member(&db_tx, member_id).await?;
            crew::Entity::delete_by_id(member_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Append a debt ledger entry for a member.
    ///
    /// The amount must be positive; the direction comes from `kind`.
    pub async fn add_debt_entry(
        &self,
        member_id: Uuid,
        kind: DebtEntryKind,
        amount: MoneyCents,
        note: Option<&str>,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "debt entry amount must be positive, got {amount}"
            )));
        }
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            require_member(&db_tx, member_id).await?;

            let mut entry = DebtEntry::new(member_id, kind, amount);
            entry.note = note;
            let model: debts::ActiveModel = (&entry).into();
            model.insert(&db_tx).await?;
            Ok(entry.id)
        })
    }

    /// Remove one ledger entry, rolling its delta out of the balance.
    pub async fn delete_debt_entry(&self, member_id: Uuid, entry_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let entry = debts::Entity::find_by_id(entry_id.to_string())
                .filter(debts::Column::MemberId.eq(member_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("debt entry not exists".to_string()))?;
            debts::Entity::delete_by_id(entry.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Full ledger history for a member, newest first.
    pub async fn debt_history(&self, member_id: Uuid) -> ResultEngine<Vec<DebtEntry>> {
        with_tx!(self, |db_tx| {
            require_member(&db_tx, member_id).await?;
            let models = debts::Entity::find()
                .filter(debts::Column::MemberId.eq(member_id.to_string()))
                .order_by_desc(debts::Column::RecordedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(DebtEntry::try_from).collect()
        })
    }
}

pub(super) async fn require_member(
    db_tx: &impl ConnectionTrait,
    member_id: Uuid,
) -> ResultEngine<crew::Model> {
    crew::Entity::find_by_id(member_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("crew member not exists".to_string()))
}

/// Raw ledger sum clamped at zero. Over-settled ledgers read as no debt.
pub(super) async fn member_debt(
    db_tx: &impl ConnectionTrait,
    member_id: Uuid,
) -> ResultEngine<MoneyCents> {
    let entries = debts::Entity::find()
        .filter(debts::Column::MemberId.eq(member_id.to_string()))
        .all(db_tx)
        .await?;

    let raw: MoneyCents = entries
        .into_iter()
        .map(DebtEntry::try_from)
        .collect::<ResultEngine<Vec<_>>>()?
        .iter()
        .map(DebtEntry::signed_amount)
        .sum();

    Ok(raw.max(MoneyCents::ZERO))
}
