//! Shared request/response bodies for the HTTP API.
//!
//! All monetary fields are integer cents (halalas).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body for any create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod crew {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CrewRole {
        Captain,
        Crew,
    }

    impl CrewRole {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Captain => "captain",
                Self::Crew => "crew",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CrewMemberNew {
        pub name: String,
        pub role: CrewRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CrewMemberUpdate {
        pub name: Option<String>,
        pub role: Option<CrewRole>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CrewMemberView {
        pub id: Uuid,
        pub name: String,
        pub role: CrewRole,
        /// Outstanding debt in cents, never negative.
        pub current_debt: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DebtEntryKind {
        Add,
        Subtract,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtEntryNew {
        /// Must be > 0; `kind` carries the direction.
        pub amount: i64,
        pub kind: DebtEntryKind,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtEntryView {
        pub id: Uuid,
        pub kind: DebtEntryKind,
        pub amount: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp.
        pub recorded_at: DateTime<Utc>,
    }
}

pub mod boxes {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BoxStatus {
        Draft,
        Completed,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoxNew {
        pub name: String,
        pub crew_count: u32,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoxUpdate {
        pub name: Option<String>,
        pub crew_count: Option<u32>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoxStatusSet {
        pub status: BoxStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BoxView {
        pub id: Uuid,
        pub name: String,
        pub status: BoxStatus,
        pub total_amount: i64,
        pub crew_count: u32,
        pub description: Option<String>,
    }

    /// Request body for replacing a box roster.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RosterSet {
        pub member_ids: Vec<Uuid>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Unpaid,
        Pending,
        Paid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RosterMemberView {
        pub member: super::crew::CrewMemberView,
        pub payment_status: PaymentStatus,
    }
}

pub mod invoice {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceNew {
        /// Must be > 0.
        pub amount: i64,
        pub vendor: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceUpdate {
        pub amount: Option<i64>,
        pub vendor: Option<String>,
        pub note: Option<String>,
        pub paid: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceView {
        pub id: Uuid,
        pub box_id: Uuid,
        pub amount: i64,
        pub vendor: String,
        pub note: Option<String>,
        pub paid: bool,
        /// RFC3339 timestamp.
        pub issued_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceSummary {
        pub box_id: Uuid,
        pub invoice_count: u64,
        pub total_amount: i64,
        pub paid_amount: i64,
        pub unpaid_amount: i64,
    }
}

pub mod distribution {
    use super::*;

    /// Request body for a distribution preview.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PreviewRequest {
        /// Replaces the share divisor for what-if scenarios.
        pub override_crew_count: Option<u32>,
        #[serde(default)]
        pub adjustments: Vec<DeductionAdjustment>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeductionAdjustment {
        pub member_id: Uuid,
        /// Replaces the member's default debt deduction. Cents, must exceed
        /// the server-side minimum.
        pub deduction: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationView {
        pub member_id: Uuid,
        pub role: super::crew::CrewRole,
        pub base_share: i64,
        pub debt_deduction: i64,
        pub net_payout: i64,
        pub forgiven_debt: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DistributionView {
        pub total_amount: i64,
        pub owner_share: i64,
        pub total_crew_share: i64,
        pub individual_share: i64,
        pub captain_share: i64,
        pub captain_extra_share: i64,
        pub crew_count: u32,
        pub allocations: Vec<AllocationView>,
    }

    /// Request body for selecting or confirming member payments.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentBatch {
        pub member_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinalPaymentView {
        pub distribution: DistributionView,
        /// What stays in the box once the distributed total is paid out.
        pub remaining_total: i64,
    }
}
