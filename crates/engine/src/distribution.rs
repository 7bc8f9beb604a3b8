//! Profit distribution over a financial box.
//!
//! This module is pure: it takes a pool total and a crew roster snapshot and
//! returns a deterministic allocation. No I/O, no persistence. The calling
//! layer decides when to apply the side effects (settling debts, deducting
//! the box total, closing the cycle).
//!
//! The split rule:
//!
//! - the pool is halved between owner and crew;
//! - the crew half is divided evenly into one share per member;
//! - every captain receives an extra half share, carved out of the owner's
//!   half (not out of the crew pool);
//! - each member's payout is netted against their outstanding debt, floored
//!   at zero, with any unrecovered remainder reported as forgiven.
//!
//! Amounts are integer cents, so division leaves a remainder of at most
//! `crew_count - 1` cents. The owner absorbs that remainder: `owner_share`
//! is defined as `total - sum(base shares)`, which makes the conservation
//! invariant `owner_share + sum(base shares) == total` hold exactly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CrewRole, EngineError, MoneyCents};

/// Smallest ad-hoc deduction accepted by [`Distribution::apply_deduction`].
///
/// Deductions at or below one riyal are rejected as data-entry noise.
pub const MIN_ADHOC_DEDUCTION: MoneyCents = MoneyCents::new(100);

/// Input snapshot for one crew member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: Uuid,
    pub role: CrewRole,
    /// Outstanding debt, clamped at zero by the snapshot layer.
    pub current_debt: MoneyCents,
}

/// Computed payout for one crew member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAllocation {
    pub member_id: Uuid,
    pub role: CrewRole,
    /// One share for crew, one and a half for captains.
    pub base_share: MoneyCents,
    /// What is withheld from the base share. Defaults to the member's
    /// outstanding debt; may be overridden per member.
    pub debt_deduction: MoneyCents,
    /// `max(0, base_share - debt_deduction)`.
    pub net_payout: MoneyCents,
    /// Debt that could not be recovered because it exceeded the share.
    /// Reported explicitly so callers can decide carry-forward policy
    /// instead of the amount being silently dropped.
    pub forgiven_debt: MoneyCents,
}

/// The result of one distribution computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub total_amount: MoneyCents,
    /// The owner's half, minus every captain's extra half share, plus any
    /// integer-division remainder.
    pub owner_share: MoneyCents,
    /// Sum of all member base shares.
    pub total_crew_share: MoneyCents,
    /// Value of one share.
    pub individual_share: MoneyCents,
    /// `individual_share * 1.5`.
    pub captain_share: MoneyCents,
    /// The premium paid per captain, funded by the owner.
    pub captain_extra_share: MoneyCents,
    /// The headcount used as the share divisor.
    pub crew_count: u32,
    pub allocations: Vec<MemberAllocation>,
}

impl Distribution {
    /// Overrides one member's debt deduction with an ad-hoc amount.
    ///
    /// Policy (matching the allocation-table rules):
    /// - the deduction must exceed [`MIN_ADHOC_DEDUCTION`];
    /// - the member's existing debt must be strictly below their base share.
    ///
    /// Violations return [`EngineError::DebtExceedsShare`] and leave the
    /// distribution untouched.
    pub fn apply_deduction(
        &mut self,
        member_id: Uuid,
        deduction: MoneyCents,
    ) -> Result<(), EngineError> {
        let allocation = self
            .allocations
            .iter_mut()
            .find(|a| a.member_id == member_id)
            .ok_or_else(|| EngineError::KeyNotFound(member_id.to_string()))?;

        if deduction <= MIN_ADHOC_DEDUCTION {
            return Err(EngineError::DebtExceedsShare(format!(
                "additional deduction must exceed {MIN_ADHOC_DEDUCTION}"
            )));
        }

        // The policy compares the *recorded* debt against the share, not the
        // override itself.
        let current_debt = allocation.debt_deduction;
        if current_debt >= allocation.base_share {
            return Err(EngineError::DebtExceedsShare(format!(
                "member debt {current_debt} is not below base share {share}",
                share = allocation.base_share
            )));
        }

        allocation.debt_deduction = deduction;
        allocation.net_payout = allocation.base_share.saturating_deduct(deduction);
        allocation.forgiven_debt = deduction.saturating_deduct(allocation.base_share);
        Ok(())
    }

    /// The grand total that leaves the box when every member is paid.
    #[must_use]
    pub fn total_net_payout(&self) -> MoneyCents {
        self.allocations.iter().map(|a| a.net_payout).sum()
    }
}

/// Computes the distribution for a box whose configured headcount must match
/// the roster.
///
/// The roster size is validated against `expected_crew_count` before any
/// arithmetic; a mismatch fails with [`EngineError::CrewCountMismatch`]
/// carrying both numbers.
pub fn compute_distribution(
    total_amount: MoneyCents,
    roster: &[RosterMember],
    expected_crew_count: u32,
) -> Result<Distribution, EngineError> {
    let actual = u32::try_from(roster.len())
        .map_err(|_| EngineError::InvalidCrewCount("roster too large".to_string()))?;
    if actual != expected_crew_count {
        return Err(EngineError::CrewCountMismatch {
            expected: expected_crew_count,
            actual,
        });
    }
    distribute(total_amount, roster, actual)
}

/// What-if recomputation with an operator-supplied headcount.
///
/// The roster is not mutated; only the share divisor changes. A zero count
/// is rejected with [`EngineError::InvalidCrewCount`].
pub fn recompute_with_count(
    total_amount: MoneyCents,
    roster: &[RosterMember],
    crew_count: u32,
) -> Result<Distribution, EngineError> {
    if crew_count == 0 {
        return Err(EngineError::InvalidCrewCount(
            "override crew count must be positive".to_string(),
        ));
    }
    distribute(total_amount, roster, crew_count)
}

fn distribute(
    total_amount: MoneyCents,
    roster: &[RosterMember],
    crew_count: u32,
) -> Result<Distribution, EngineError> {
    if total_amount.is_negative() {
        return Err(EngineError::InvalidTotalAmount(format!(
            "pool total must not be negative, got {total_amount}"
        )));
    }
    if roster.is_empty() {
        return Err(EngineError::InvalidCrewCount(
            "crew roster is empty".to_string(),
        ));
    }

    let crew_pool = MoneyCents::new(total_amount.cents() / 2);
    let individual_share = MoneyCents::new(crew_pool.cents() / i64::from(crew_count));
    let captain_extra_share = MoneyCents::new(individual_share.cents() / 2);
    let captain_share = individual_share + captain_extra_share;

    let allocations: Vec<MemberAllocation> = roster
        .iter()
        .map(|member| {
            let base_share = match member.role {
                CrewRole::Captain => captain_share,
                CrewRole::Crew => individual_share,
            };
            let debt_deduction = member.current_debt.max(MoneyCents::ZERO);
            MemberAllocation {
                member_id: member.id,
                role: member.role,
                base_share,
                debt_deduction,
                net_payout: base_share.saturating_deduct(debt_deduction),
                forgiven_debt: debt_deduction.saturating_deduct(base_share),
            }
        })
        .collect();

    let total_crew_share: MoneyCents = allocations.iter().map(|a| a.base_share).sum();
    // Remainder cents stay with the owner, keeping conservation exact.
    let owner_share = total_amount - total_crew_share;

    Ok(Distribution {
        total_amount,
        owner_share,
        total_crew_share,
        individual_share,
        captain_share,
        captain_extra_share,
        crew_count,
        allocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(role: CrewRole, debt_cents: i64) -> RosterMember {
        RosterMember {
            id: Uuid::new_v4(),
            role,
            current_debt: MoneyCents::new(debt_cents),
        }
    }

    fn standard_roster() -> Vec<RosterMember> {
        vec![
            member(CrewRole::Captain, 0),
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
        ]
    }

    #[test]
    fn thousand_riyals_one_captain_three_crew() {
        let roster = standard_roster();
        let dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();

        assert_eq!(dist.individual_share.cents(), 12_500);
        assert_eq!(dist.captain_extra_share.cents(), 6_250);
        assert_eq!(dist.captain_share.cents(), 18_750);
        assert_eq!(dist.owner_share.cents(), 43_750);
        assert_eq!(dist.total_crew_share.cents(), 56_250);
    }

    #[test]
    fn conservation_holds_exactly() {
        let roster = standard_roster();
        let dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();

        let members: MoneyCents = dist.allocations.iter().map(|a| a.base_share).sum();
        assert_eq!(dist.owner_share + members, dist.total_amount);
    }

    #[test]
    fn conservation_holds_with_awkward_remainders() {
        // 1000.01 SAR over 3 members does not divide evenly; the dust must
        // end up with the owner, never be lost.
        let roster = vec![
            member(CrewRole::Captain, 0),
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
        ];
        let total = MoneyCents::new(100_001);
        let dist = compute_distribution(total, &roster, 3).unwrap();

        let members: MoneyCents = dist.allocations.iter().map(|a| a.base_share).sum();
        assert_eq!(dist.owner_share + members, total);
        assert!(dist.owner_share.is_positive());
    }

    #[test]
    fn captain_premium_is_half_a_share_funded_by_owner() {
        let roster = standard_roster();
        let dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();

        assert_eq!(
            dist.captain_share,
            dist.individual_share + dist.captain_extra_share
        );
        assert!(dist.captain_share > dist.individual_share);
        // Owner's half minus one captain premium.
        assert_eq!(
            dist.owner_share.cents(),
            dist.total_amount.cents() / 2 - dist.captain_extra_share.cents()
        );
    }

    #[test]
    fn zero_total_distributes_zeroes_without_error() {
        let roster = standard_roster();
        let dist = compute_distribution(MoneyCents::ZERO, &roster, 4).unwrap();

        assert_eq!(dist.owner_share, MoneyCents::ZERO);
        assert_eq!(dist.individual_share, MoneyCents::ZERO);
        assert_eq!(dist.captain_share, MoneyCents::ZERO);
        assert!(dist.allocations.iter().all(|a| a.net_payout.is_zero()));
    }

    #[test]
    fn no_captains_leaves_owner_exactly_half() {
        let roster = vec![
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
            member(CrewRole::Crew, 0),
        ];
        let dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();

        assert_eq!(dist.owner_share.cents(), 50_000);
        assert_eq!(dist.individual_share.cents(), 12_500);
    }

    #[test]
    fn negative_total_is_rejected() {
        let roster = standard_roster();
        let err = compute_distribution(MoneyCents::new(-1), &roster, 4).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTotalAmount(_)));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = compute_distribution(MoneyCents::new(100_000), &[], 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCrewCount(_)));
    }

    #[test]
    fn roster_box_mismatch_reports_both_counts() {
        let roster = standard_roster();
        let err = compute_distribution(MoneyCents::new(100_000), &roster, 6).unwrap_err();
        assert_eq!(
            err,
            EngineError::CrewCountMismatch {
                expected: 6,
                actual: 4
            }
        );
    }

    #[test]
    fn net_payout_floors_at_zero_and_reports_forgiven_debt() {
        let mut roster = standard_roster();
        // Debt far above any share.
        roster[1].current_debt = MoneyCents::new(1_000_000);
        let dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();

        let drowned = &dist.allocations[1];
        assert_eq!(drowned.net_payout, MoneyCents::ZERO);
        assert_eq!(
            drowned.forgiven_debt.cents(),
            1_000_000 - drowned.base_share.cents()
        );
    }

    #[test]
    fn adhoc_deduction_below_threshold_is_rejected() {
        let roster = standard_roster();
        let mut dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();
        let id = roster[1].id;

        let err = dist.apply_deduction(id, MoneyCents::new(100)).unwrap_err();
        assert!(matches!(err, EngineError::DebtExceedsShare(_)));
        // Distribution untouched.
        assert_eq!(dist.allocations[1].debt_deduction, MoneyCents::ZERO);
    }

    #[test]
    fn adhoc_deduction_rejected_when_debt_swallows_share() {
        let mut roster = standard_roster();
        roster[2].current_debt = MoneyCents::new(20_000); // above the 125.00 share
        let mut dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();
        let id = roster[2].id;

        let err = dist.apply_deduction(id, MoneyCents::new(5_000)).unwrap_err();
        assert!(matches!(err, EngineError::DebtExceedsShare(_)));
    }

    #[test]
    fn adhoc_deduction_overrides_the_default() {
        let mut roster = standard_roster();
        roster[1].current_debt = MoneyCents::new(3_000);
        let mut dist = compute_distribution(MoneyCents::new(100_000), &roster, 4).unwrap();
        let id = roster[1].id;

        dist.apply_deduction(id, MoneyCents::new(5_000)).unwrap();
        let allocation = &dist.allocations[1];
        assert_eq!(allocation.debt_deduction.cents(), 5_000);
        assert_eq!(allocation.net_payout.cents(), 12_500 - 5_000);
        assert_eq!(allocation.forgiven_debt, MoneyCents::ZERO);
    }

    #[test]
    fn recompute_overrides_the_divisor_without_touching_the_roster() {
        let roster = standard_roster();
        let dist = recompute_with_count(MoneyCents::new(100_000), &roster, 5).unwrap();

        assert_eq!(dist.crew_count, 5);
        assert_eq!(dist.individual_share.cents(), 10_000);
        assert_eq!(dist.allocations.len(), 4);
    }

    #[test]
    fn recompute_rejects_zero_count() {
        let roster = standard_roster();
        let err = recompute_with_count(MoneyCents::new(100_000), &roster, 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCrewCount(_)));
    }
}
