use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Invoice, InvoiceSummary, MoneyCents, ResultEngine, boxes, invoices,
};

use super::{
    Engine,
    boxes::{require_box, require_open},
    normalize_optional_text, normalize_required_name, with_tx,
};

impl Engine {
    /// Book an invoice against a draft box, growing its total.
    pub async fn new_invoice(
        &self,
        box_id: Uuid,
        amount: MoneyCents,
        vendor: &str,
        note: Option<&str>,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "invoice amount must be positive, got {amount}"
            )));
        }
        let vendor = normalize_required_name(vendor, "vendor")?;
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            let model = require_box(&db_tx, box_id).await?;
            require_open(&model)?;

            let mut invoice = Invoice::new(box_id, amount, vendor);
            invoice.note = note;
            let active: invoices::ActiveModel = (&invoice).into();
            active.insert(&db_tx).await?;

            let grown = MoneyCents::new(model.total_amount)
                .checked_add(amount)
                .ok_or_else(|| EngineError::InvalidAmount("box total overflow".to_string()))?;
            set_box_total(&db_tx, box_id, grown).await?;
            Ok(invoice.id)
        })
    }

    /// List a box's invoices, newest first.
    pub async fn list_invoices(&self, box_id: Uuid) -> ResultEngine<Vec<Invoice>> {
        with_tx!(self, |db_tx| {
            require_box(&db_tx, box_id).await?;
            let models = invoices::Entity::find()
                .filter(invoices::Column::BoxId.eq(box_id.to_string()))
                .order_by_desc(invoices::Column::IssuedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Invoice::try_from).collect()
        })
    }

    /// Edit an invoice's amount, vendor, note or paid flag, adjusting the box
    /// total by the amount delta. The paid flag is bookkeeping only.
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        amount: Option<MoneyCents>,
        vendor: Option<&str>,
        note: Option<&str>,
        paid: Option<bool>,
    ) -> ResultEngine<()> {
        if let Some(amount) = amount
            && !amount.is_positive()
        {
            return Err(EngineError::InvalidAmount(format!(
                "invoice amount must be positive, got {amount}"
            )));
        }
        let vendor = vendor.map(|v| normalize_required_name(v, "vendor")).transpose()?;
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            let invoice = require_invoice(&db_tx, invoice_id).await?;
            let box_id = Uuid::parse_str(&invoice.box_id)
                .map_err(|_| EngineError::KeyNotFound(invoice.box_id.clone()))?;
            let box_model = require_box(&db_tx, box_id).await?;
            require_open(&box_model)?;

            if let Some(new_amount) = amount {
                let adjusted = MoneyCents::new(box_model.total_amount)
                    .checked_sub(MoneyCents::new(invoice.amount))
                    .and_then(|total| total.checked_add(new_amount))
                    .ok_or_else(|| {
                        EngineError::InvalidAmount("box total overflow".to_string())
                    })?;
                set_box_total(&db_tx, box_id, adjusted.max(MoneyCents::ZERO)).await?;
            }

            let active = invoices::ActiveModel {
                id: ActiveValue::Set(invoice_id.to_string()),
                amount: amount.map_or(ActiveValue::NotSet, |a| ActiveValue::Set(a.cents())),
                vendor: vendor.map_or(ActiveValue::NotSet, ActiveValue::Set),
                note: note.map_or(ActiveValue::NotSet, |n| ActiveValue::Set(Some(n))),
                paid: paid.map_or(ActiveValue::NotSet, ActiveValue::Set),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Remove an invoice, rolling its amount out of the box total.
    ///
    /// The total never drops below zero, even if the ledger drifted.
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let invoice = require_invoice(&db_tx, invoice_id).await?;
            let box_id = Uuid::parse_str(&invoice.box_id)
                .map_err(|_| EngineError::KeyNotFound(invoice.box_id.clone()))?;
            let box_model = require_box(&db_tx, box_id).await?;
            require_open(&box_model)?;

            let adjusted = MoneyCents::new(box_model.total_amount)
                .saturating_deduct(MoneyCents::new(invoice.amount));
            set_box_total(&db_tx, box_id, adjusted).await?;

            invoices::Entity::delete_by_id(invoice_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Count and sum of a box's invoices, split by the paid flag.
    pub async fn invoice_summary(&self, box_id: Uuid) -> ResultEngine<InvoiceSummary> {
        with_tx!(self, |db_tx| {
            require_box(&db_tx, box_id).await?;
            let models = invoices::Entity::find()
                .filter(invoices::Column::BoxId.eq(box_id.to_string()))
                .all(&db_tx)
                .await?;
            let total_amount = models.iter().map(|m| MoneyCents::new(m.amount)).sum();
            let paid_amount = models
                .iter()
                .filter(|m| m.paid)
                .map(|m| MoneyCents::new(m.amount))
                .sum::<MoneyCents>();
            Ok(InvoiceSummary {
                box_id,
                invoice_count: models.len() as u64,
                total_amount,
                paid_amount,
                unpaid_amount: total_amount - paid_amount,
            })
        })
    }
}

async fn require_invoice(
    db_tx: &impl ConnectionTrait,
    invoice_id: Uuid,
) -> ResultEngine<invoices::Model> {
    invoices::Entity::find_by_id(invoice_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("invoice not exists".to_string()))
}

pub(super) async fn set_box_total(
    db_tx: &impl ConnectionTrait,
    box_id: Uuid,
    total: MoneyCents,
) -> ResultEngine<()> {
    let active = boxes::ActiveModel {
        id: ActiveValue::Set(box_id.to_string()),
        total_amount: ActiveValue::Set(total.cents()),
        ..Default::default()
    };
    active.update(db_tx).await?;
    Ok(())
}
