//! Per-payer amount derivation.
//!
//! The divisor is always the number of active non-host participants; the host
//! is the payee and never owes. Amounts are rounded half-up to the nearest
//! minor unit and the remainder is reported rather than redistributed.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// The result of splitting a total among payers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub total_minor: i64,
    pub payer_count: usize,
    pub per_person_minor: i64,
    /// `total - per_person × payers`. Positive means nobody collects the
    /// difference; negative means payers collectively overpay.
    pub remainder_minor: i64,
}

impl SplitPlan {
    /// Σ of every obligation created from this plan.
    pub fn obligations_total_minor(&self) -> i64 {
        self.total_minor - self.remainder_minor
    }
}

pub struct SplitCalculator;

impl SplitCalculator {
    /// Splits `total_minor` among `payers`. A zero payer count is
    /// unrepresentable; callers turn it into [`EngineError::NoParticipants`].
    pub fn plan(total_minor: i64, payers: NonZeroUsize) -> ResultEngine<SplitPlan> {
        if total_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "split total must be >= 0".to_string(),
            ));
        }
        let n = payers.get() as i128;
        let total = i128::from(total_minor);
        let per_person = (2 * total + n) / (2 * n);
        let per_person_minor = i64::try_from(per_person)
            .map_err(|_| EngineError::InvalidAmount("per-person amount overflow".to_string()))?;
        let remainder = total - per_person * n;
        let remainder_minor = i64::try_from(remainder)
            .map_err(|_| EngineError::InvalidAmount("split remainder overflow".to_string()))?;
        Ok(SplitPlan {
            total_minor,
            payer_count: payers.get(),
            per_person_minor,
            remainder_minor,
        })
    }

    /// Per-person amount for read-only views; `None` when nobody pays.
    pub fn per_person(total_minor: i64, payer_count: usize) -> Option<i64> {
        let payers = NonZeroUsize::new(payer_count)?;
        Self::plan(total_minor, payers)
            .ok()
            .map(|plan| plan.per_person_minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn exact_division_has_no_remainder() {
        let plan = SplitCalculator::plan(200_000, payers(4)).unwrap();
        assert_eq!(plan.per_person_minor, 50_000);
        assert_eq!(plan.remainder_minor, 0);
        assert_eq!(plan.obligations_total_minor(), 200_000);
    }

    #[test]
    fn host_is_not_a_divisor() {
        let plan = SplitCalculator::plan(135_000, payers(4)).unwrap();
        assert_eq!(plan.per_person_minor, 33_750);
        assert_eq!(plan.remainder_minor, 0);
    }

    #[test]
    fn rounds_down_below_half() {
        let plan = SplitCalculator::plan(100, payers(3)).unwrap();
        assert_eq!(plan.per_person_minor, 33);
        assert_eq!(plan.remainder_minor, 1);
    }

    #[test]
    fn rounds_half_up() {
        let plan = SplitCalculator::plan(5, payers(2)).unwrap();
        assert_eq!(plan.per_person_minor, 3);
        assert_eq!(plan.remainder_minor, -1);

        let plan = SplitCalculator::plan(200, payers(3)).unwrap();
        assert_eq!(plan.per_person_minor, 67);
        assert_eq!(plan.remainder_minor, -1);
    }

    #[test]
    fn zero_total_splits_to_zero() {
        let plan = SplitCalculator::plan(0, payers(7)).unwrap();
        assert_eq!(plan.per_person_minor, 0);
        assert_eq!(plan.remainder_minor, 0);
    }

    #[test]
    fn large_totals_do_not_overflow() {
        let plan = SplitCalculator::plan(i64::MAX, payers(1)).unwrap();
        assert_eq!(plan.per_person_minor, i64::MAX);
    }

    #[test]
    fn negative_total_is_rejected() {
        assert!(matches!(
            SplitCalculator::plan(-1, payers(1)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn view_helper_handles_empty_roster() {
        assert_eq!(SplitCalculator::per_person(1_000, 0), None);
        assert_eq!(SplitCalculator::per_person(1_000, 4), Some(250));
    }
}
