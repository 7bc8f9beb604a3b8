//! Core bookkeeping for a fishing vessel's finances: the crew roster with its
//! debt ledger, financial boxes fed by invoices, and the profit distribution
//! cycle that pays the crew out of a box.
//!
//! All state lives in the database; [`Engine`] holds only the connection and
//! wraps every operation in a transaction.
pub use box_members::{BoxMember, PaymentStatus};
pub use boxes::{BoxStatus, FinancialBox};
pub use crew::{CrewMember, CrewRole};
pub use debts::{DebtEntry, DebtEntryKind};
pub use distribution::{
    Distribution, MIN_ADHOC_DEDUCTION, MemberAllocation, RosterMember, compute_distribution,
    recompute_with_count,
};
pub use error::EngineError;
pub use invoices::{Invoice, InvoiceSummary};
pub use money::MoneyCents;
pub use ops::{DeductionOverride, Engine, EngineBuilder, FinalPayment};

pub mod box_members;
pub mod boxes;
pub mod crew;
pub mod debts;
mod distribution;
mod error;
pub mod invoices;
mod money;
mod ops;

pub type ResultEngine<T> = Result<T, EngineError>;
