use sea_orm::{Database, DatabaseConnection};

use engine::{
    BoxStatus, CrewRole, DebtEntryKind, DeductionOverride, Engine, EngineError, MoneyCents,
    PaymentStatus,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// One captain, three crew, assigned to a box worth 1000.00 SAR.
async fn seeded_box(engine: &Engine) -> (Uuid, Uuid, Vec<Uuid>) {
    let captain = engine
        .new_crew_member("Salem", CrewRole::Captain)
        .await
        .unwrap();
    let mut members = vec![captain];
    for name in ["Fahad", "Nasser", "Omar"] {
        members.push(engine.new_crew_member(name, CrewRole::Crew).await.unwrap());
    }

    let box_id = engine
        .new_box("Spring trip", 4, Some("first season"))
        .await
        .unwrap();
    engine
        .new_invoice(box_id, MoneyCents::new(100_000), "Fish market", None)
        .await
        .unwrap();
    engine.assign_crew(box_id, &members).await.unwrap();

    (box_id, captain, members)
}

#[tokio::test]
async fn preview_splits_the_pool() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, captain, _) = seeded_box(&engine).await;

    let dist = engine.preview_distribution(box_id, None, &[]).await.unwrap();

    assert_eq!(dist.total_amount.cents(), 100_000);
    assert_eq!(dist.individual_share.cents(), 12_500);
    assert_eq!(dist.captain_share.cents(), 18_750);
    assert_eq!(dist.owner_share.cents(), 43_750);

    let captain_alloc = dist
        .allocations
        .iter()
        .find(|a| a.member_id == captain)
        .unwrap();
    assert_eq!(captain_alloc.base_share.cents(), 18_750);
}

#[tokio::test]
async fn preview_nets_debts_against_shares() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine
        .add_debt_entry(
            members[1],
            DebtEntryKind::Add,
            MoneyCents::new(4_000),
            Some("fuel advance"),
        )
        .await
        .unwrap();

    let dist = engine.preview_distribution(box_id, None, &[]).await.unwrap();
    let debtor = dist
        .allocations
        .iter()
        .find(|a| a.member_id == members[1])
        .unwrap();
    assert_eq!(debtor.debt_deduction.cents(), 4_000);
    assert_eq!(debtor.net_payout.cents(), 12_500 - 4_000);
    assert_eq!(debtor.forgiven_debt, MoneyCents::ZERO);
}

#[tokio::test]
async fn preview_rejects_roster_mismatch() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    // Shrink the roster without touching the box headcount.
    engine
        .assign_crew(box_id, &members[..3])
        .await
        .unwrap();

    let err = engine
        .preview_distribution(box_id, None, &[])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::CrewCountMismatch {
            expected: 4,
            actual: 3
        }
    );
}

#[tokio::test]
async fn preview_with_override_count_changes_the_divisor() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, _) = seeded_box(&engine).await;

    let dist = engine
        .preview_distribution(box_id, Some(5), &[])
        .await
        .unwrap();
    assert_eq!(dist.crew_count, 5);
    assert_eq!(dist.individual_share.cents(), 10_000);
    assert_eq!(dist.allocations.len(), 4);

    let err = engine
        .preview_distribution(box_id, Some(0), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCrewCount(_)));
}

#[tokio::test]
async fn preview_applies_adhoc_deductions() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    let dist = engine
        .preview_distribution(
            box_id,
            None,
            &[DeductionOverride {
                member_id: members[2],
                deduction: MoneyCents::new(2_000),
            }],
        )
        .await
        .unwrap();

    let adjusted = dist
        .allocations
        .iter()
        .find(|a| a.member_id == members[2])
        .unwrap();
    assert_eq!(adjusted.net_payout.cents(), 12_500 - 2_000);
}

#[tokio::test]
async fn full_payment_cycle_completes_the_box() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine
        .add_debt_entry(members[1], DebtEntryKind::Add, MoneyCents::new(4_000), None)
        .await
        .unwrap();

    engine.select_for_payment(box_id, &members).await.unwrap();
    engine.confirm_member_payments(box_id, &members).await.unwrap();

    // Confirmation settles the debt through the ledger.
    let debtor = engine.crew_member(members[1]).await.unwrap();
    assert_eq!(debtor.current_debt, MoneyCents::ZERO);
    let history = engine.debt_history(members[1]).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, DebtEntryKind::Subtract);

    let outcome = engine.confirm_final_payment(box_id).await.unwrap();
    // The whole distributed total leaves the box: owner share plus crew
    // shares conserve the total, so the box drains to zero.
    let distributed = outcome.distribution.owner_share + outcome.distribution.total_crew_share;
    assert_eq!(distributed.cents(), 100_000);
    assert_eq!(outcome.remaining_total, MoneyCents::ZERO);

    let fbox = engine.financial_box(box_id).await.unwrap();
    assert_eq!(fbox.status, BoxStatus::Completed);
    assert_eq!(fbox.total_amount, MoneyCents::ZERO);
}

#[tokio::test]
async fn confirm_is_idempotent_for_paid_members() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine.select_for_payment(box_id, &members).await.unwrap();
    engine.confirm_member_payments(box_id, &members).await.unwrap();
    // A second confirmation must not double-settle debts.
    engine.confirm_member_payments(box_id, &members).await.unwrap();

    let history = engine.debt_history(members[0]).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn confirm_requires_prior_selection() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    let err = engine
        .confirm_member_payments(box_id, &members[..1])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}

#[tokio::test]
async fn final_payment_requires_everyone_paid() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine
        .select_for_payment(box_id, &members[..2])
        .await
        .unwrap();
    engine
        .confirm_member_payments(box_id, &members[..2])
        .await
        .unwrap();

    let err = engine.confirm_final_payment(box_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}

#[tokio::test]
async fn completed_box_is_terminal() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine.select_for_payment(box_id, &members).await.unwrap();
    engine.confirm_member_payments(box_id, &members).await.unwrap();
    engine.confirm_final_payment(box_id).await.unwrap();

    let err = engine.confirm_final_payment(box_id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCompleted(_)));

    let err = engine
        .new_invoice(box_id, MoneyCents::new(500), "Late vendor", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCompleted(_)));

    let err = engine.reset_distribution_cycle(box_id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCompleted(_)));
}

#[tokio::test]
async fn reset_returns_everyone_to_unpaid() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine.select_for_payment(box_id, &members).await.unwrap();
    engine.reset_distribution_cycle(box_id).await.unwrap();

    let roster = engine.box_roster(box_id).await.unwrap();
    assert!(
        roster
            .iter()
            .all(|(_, status)| *status == PaymentStatus::Unpaid)
    );
}

#[tokio::test]
async fn invoices_feed_and_drain_the_box_total() {
    let (engine, _db) = engine_with_db().await;

    let box_id = engine.new_box("Autumn trip", 3, None).await.unwrap();
    let first = engine
        .new_invoice(box_id, MoneyCents::new(30_000), "Market", None)
        .await
        .unwrap();
    engine
        .new_invoice(box_id, MoneyCents::new(20_000), "Charter", Some("night haul"))
        .await
        .unwrap();

    let fbox = engine.financial_box(box_id).await.unwrap();
    assert_eq!(fbox.total_amount.cents(), 50_000);

    let summary = engine.invoice_summary(box_id).await.unwrap();
    assert_eq!(summary.invoice_count, 2);
    assert_eq!(summary.total_amount.cents(), 50_000);
    assert_eq!(summary.paid_amount.cents(), 0);

    engine
        .update_invoice(first, Some(MoneyCents::new(10_000)), None, None, Some(true))
        .await
        .unwrap();
    let fbox = engine.financial_box(box_id).await.unwrap();
    assert_eq!(fbox.total_amount.cents(), 30_000);

    // Settling the vendor splits the summary but leaves the box total alone.
    let summary = engine.invoice_summary(box_id).await.unwrap();
    assert_eq!(summary.paid_amount.cents(), 10_000);
    assert_eq!(summary.unpaid_amount.cents(), 20_000);

    engine.delete_invoice(first).await.unwrap();
    let fbox = engine.financial_box(box_id).await.unwrap();
    assert_eq!(fbox.total_amount.cents(), 20_000);
}

#[tokio::test]
async fn box_total_growth_is_overflow_checked() {
    let (engine, _db) = engine_with_db().await;
    let box_id = engine.new_box("Ledger stress", 1, None).await.unwrap();

    engine
        .new_invoice(box_id, MoneyCents::new(i64::MAX), "Market", None)
        .await
        .unwrap();
    let err = engine
        .new_invoice(box_id, MoneyCents::new(1), "Market", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn deleting_a_member_cascades_their_records() {
    let (engine, _db) = engine_with_db().await;
    let (box_id, _, members) = seeded_box(&engine).await;

    engine
        .add_debt_entry(members[3], DebtEntryKind::Add, MoneyCents::new(1_000), None)
        .await
        .unwrap();
    engine.delete_crew_member(members[3]).await.unwrap();

    let err = engine.crew_member(members[3]).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let roster = engine.box_roster(box_id).await.unwrap();
    assert_eq!(roster.len(), 3);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    engine.new_crew_member("Salem", CrewRole::Crew).await.unwrap();
    let err = engine
        .new_crew_member("  salem ", CrewRole::Captain)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine.new_box("Spring trip", 2, None).await.unwrap();
    let err = engine.new_box("SPRING TRIP", 3, None).await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn cancelled_boxes_reject_invoices_but_can_reopen() {
    let (engine, _db) = engine_with_db().await;
    let box_id = engine.new_box("Winter trip", 2, None).await.unwrap();

    engine
        .set_box_status(box_id, BoxStatus::Cancelled)
        .await
        .unwrap();
    let err = engine
        .new_invoice(box_id, MoneyCents::new(100), "Vendor", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));

    engine.set_box_status(box_id, BoxStatus::Draft).await.unwrap();
    engine
        .new_invoice(box_id, MoneyCents::new(100), "Vendor", None)
        .await
        .unwrap();

    // Completion is reserved for the payment cycle.
    let err = engine
        .set_box_status(box_id, BoxStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}
