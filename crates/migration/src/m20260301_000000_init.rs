//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Markab:
//!
//! - `users`: authentication
//! - `crew_members`: the vessel roster
//! - `crew_debts`: append-only debt ledger per member
//! - `financial_boxes`: accounting pools per trip/season
//! - `invoices`: income records feeding a box total
//! - `box_crew_members`: roster assignments with payment state

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum CrewMembers {
    Table,
    Id,
    Name,
    Role,
}

#[derive(Iden)]
enum CrewDebts {
    Table,
    Id,
    MemberId,
    Kind,
    Amount,
    Note,
    RecordedAt,
}

#[derive(Iden)]
enum FinancialBoxes {
    Table,
    Id,
    Name,
    Status,
    TotalAmount,
    CrewCount,
    Description,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    BoxId,
    Amount,
    Vendor,
    Note,
    Paid,
    IssuedAt,
}

#[derive(Iden)]
enum BoxCrewMembers {
    Table,
    BoxId,
    MemberId,
    PaymentStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Crew members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CrewMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrewMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrewMembers::Name).string().not_null())
                    .col(ColumnDef::new(CrewMembers::Role).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-crew_members-name-unique")
                    .table(CrewMembers::Table)
                    .col(CrewMembers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Crew debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CrewDebts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrewDebts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrewDebts::MemberId).string().not_null())
                    .col(ColumnDef::new(CrewDebts::Kind).string().not_null())
                    .col(ColumnDef::new(CrewDebts::Amount).big_integer().not_null())
                    .col(ColumnDef::new(CrewDebts::Note).string())
                    .col(ColumnDef::new(CrewDebts::RecordedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-crew_debts-member_id")
                            .from(CrewDebts::Table, CrewDebts::MemberId)
                            .to(CrewMembers::Table, CrewMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-crew_debts-member_id-recorded_at")
                    .table(CrewDebts::Table)
                    .col(CrewDebts::MemberId)
                    .col(CrewDebts::RecordedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Financial boxes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FinancialBoxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialBoxes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinancialBoxes::Name).string().not_null())
                    .col(
                        ColumnDef::new(FinancialBoxes::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(FinancialBoxes::TotalAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FinancialBoxes::CrewCount)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialBoxes::Description).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-financial_boxes-name-unique")
                    .table(FinancialBoxes::Table)
                    .col(FinancialBoxes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::BoxId).string().not_null())
                    .col(ColumnDef::new(Invoices::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::Vendor).string().not_null())
                    .col(ColumnDef::new(Invoices::Note).string())
                    .col(
                        ColumnDef::new(Invoices::Paid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Invoices::IssuedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-box_id")
                            .from(Invoices::Table, Invoices::BoxId)
                            .to(FinancialBoxes::Table, FinancialBoxes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-box_id-issued_at")
                    .table(Invoices::Table)
                    .col(Invoices::BoxId)
                    .col(Invoices::IssuedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Box crew members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BoxCrewMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BoxCrewMembers::BoxId).string().not_null())
                    .col(ColumnDef::new(BoxCrewMembers::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(BoxCrewMembers::PaymentStatus)
                            .string()
                            .not_null()
                            .default("unpaid"),
                    )
                    .primary_key(
                        Index::create()
                            .col(BoxCrewMembers::BoxId)
                            .col(BoxCrewMembers::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-box_crew_members-box_id")
                            .from(BoxCrewMembers::Table, BoxCrewMembers::BoxId)
                            .to(FinancialBoxes::Table, FinancialBoxes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-box_crew_members-member_id")
                            .from(BoxCrewMembers::Table, BoxCrewMembers::MemberId)
                            .to(CrewMembers::Table, CrewMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-box_crew_members-member_id")
                    .table(BoxCrewMembers::Table)
                    .col(BoxCrewMembers::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(BoxCrewMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialBoxes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrewDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrewMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
