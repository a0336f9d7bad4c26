//! Loyalty tiers and the tier assignment rule
//!
//! Pure data types and functions, no database access. The persistence side
//! of tier assignment lives in `services::loyalty_service`.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Label reported when a balance falls outside every tier band
pub const NO_TIER: &str = "No Tier";

/// A named band of point-balance thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: i32,
    pub name: String,
    /// Inclusive lower bound
    pub min_points: i64,
    /// Inclusive upper bound, `None` means unbounded
    pub max_points: Option<i64>,
    pub description: Option<String>,
}

impl Tier {
    pub fn contains(&self, balance: i64) -> bool {
        balance >= self.min_points && self.max_points.map_or(true, |max| balance <= max)
    }
}

/// Returns the first tier whose band contains `balance`.
///
/// `tiers` must be sorted ascending by `min_points`. Overlapping bands are
/// not rejected here; the first match wins.
pub fn resolve_tier(balance: i64, tiers: &[Tier]) -> Option<&Tier> {
    tiers.iter().find(|tier| tier.contains(balance))
}

/// Name of the tier containing `balance`, or [`NO_TIER`].
pub fn tier_name(balance: i64, tiers: &[Tier]) -> &str {
    resolve_tier(balance, tiers)
        .map(|tier| tier.name.as_str())
        .unwrap_or(NO_TIER)
}

/// Checks a tier definition before it is stored.
pub fn validate_tier_bounds(
    name: &str,
    min_points: i64,
    max_points: Option<i64>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Tier name is required".to_string());
    }
    if min_points < 0 {
        return Err("min_points must be zero or positive".to_string());
    }
    if let Some(max) = max_points {
        if max < min_points {
            return Err("max_points must be greater than or equal to min_points".to_string());
        }
    }
    Ok(())
}

/// Kind of a points movement on a loyalty account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Points awarded for a purchase
    Earn,
    /// Points spent on a reward
    Redeem,
    /// Manual correction by staff, either sign
    Adjust,
    /// Undo of an earlier earn (cancelled order)
    Reversal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earn => "earn",
            TransactionKind::Redeem => "redeem",
            TransactionKind::Adjust => "adjust",
            TransactionKind::Reversal => "reversal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "earn" => Some(TransactionKind::Earn),
            "redeem" => Some(TransactionKind::Redeem),
            "adjust" => Some(TransactionKind::Adjust),
            "reversal" => Some(TransactionKind::Reversal),
            _ => None,
        }
    }
}

fn out_of_range() -> DomainError {
    DomainError::Validation("Points out of range".to_string())
}

/// Signed points delta for a requested movement, checked against the balance.
///
/// Earn must be positive and redeem is given as a positive cost. Reversals
/// are clamped so the balance never drops below zero; every other debit
/// that would overdraw the account is refused. Amounts that would overflow
/// the balance are rejected as out of range.
pub fn points_delta(
    kind: TransactionKind,
    points: i64,
    balance: i64,
) -> Result<i64, DomainError> {
    match kind {
        TransactionKind::Earn => {
            if points <= 0 {
                return Err(DomainError::Validation(
                    "Earned points must be positive".to_string(),
                ));
            }
            balance.checked_add(points).ok_or_else(out_of_range)?;
            Ok(points)
        }
        TransactionKind::Redeem => {
            if points <= 0 {
                return Err(DomainError::Validation(
                    "Redeemed points must be positive".to_string(),
                ));
            }
            if points > balance {
                return Err(DomainError::InvalidState(format!(
                    "Insufficient points: balance {} is lower than {}",
                    balance, points
                )));
            }
            Ok(-points)
        }
        TransactionKind::Adjust => {
            if points == 0 {
                return Err(DomainError::Validation(
                    "Adjustment cannot be zero".to_string(),
                ));
            }
            let after = balance.checked_add(points).ok_or_else(out_of_range)?;
            if after < 0 {
                return Err(DomainError::InvalidState(format!(
                    "Adjustment of {} would make the balance negative",
                    points
                )));
            }
            Ok(points)
        }
        TransactionKind::Reversal => {
            let requested = points.checked_abs().ok_or_else(out_of_range)?;
            Ok(-requested.min(balance.max(0)))
        }
    }
}

/// Points earned for an order total
pub fn points_for_amount(amount: f64, points_per_unit: f64) -> i64 {
    if amount <= 0.0 || points_per_unit <= 0.0 {
        return 0;
    }
    (amount * points_per_unit).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: i32, name: &str, min: i64, max: Option<i64>) -> Tier {
        Tier {
            id,
            name: name.to_string(),
            min_points: min,
            max_points: max,
            description: None,
        }
    }

    fn standard_tiers() -> Vec<Tier> {
        vec![
            tier(1, "Bronze", 0, Some(999)),
            tier(2, "Silver", 1000, Some(4999)),
            tier(3, "Gold", 5000, None),
        ]
    }

    #[test]
    fn test_resolves_documented_examples() {
        let tiers = standard_tiers();
        assert_eq!(tier_name(1000, &tiers), "Silver");
        assert_eq!(tier_name(10000, &tiers), "Gold");
        assert_eq!(tier_name(-5, &tiers), NO_TIER);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let tiers = standard_tiers();
        assert_eq!(tier_name(0, &tiers), "Bronze");
        assert_eq!(tier_name(999, &tiers), "Bronze");
        assert_eq!(tier_name(4999, &tiers), "Silver");
        assert_eq!(tier_name(5000, &tiers), "Gold");
    }

    #[test]
    fn test_gap_between_bands_yields_no_tier() {
        let tiers = vec![tier(1, "Bronze", 0, Some(99)), tier(2, "Silver", 200, None)];
        assert!(resolve_tier(150, &tiers).is_none());
        assert_eq!(tier_name(150, &tiers), NO_TIER);
        assert_eq!(tier_name(200, &tiers), "Silver");
    }

    #[test]
    fn test_empty_tier_list() {
        assert_eq!(tier_name(500, &[]), NO_TIER);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let tiers = vec![tier(1, "Early", 0, Some(500)), tier(2, "Late", 100, None)];
        assert_eq!(resolve_tier(300, &tiers).map(|t| t.id), Some(1));
    }

    #[test]
    fn test_every_balance_maps_to_its_containing_band() {
        let tiers = standard_tiers();
        for balance in (-50..7000).step_by(7) {
            let containing: Vec<&Tier> = tiers.iter().filter(|t| t.contains(balance)).collect();
            match resolve_tier(balance, &tiers) {
                Some(found) => {
                    assert_eq!(containing.len(), 1);
                    assert_eq!(found.id, containing[0].id);
                }
                None => assert!(containing.is_empty()),
            }
        }
    }

    #[test]
    fn test_validate_tier_bounds() {
        assert!(validate_tier_bounds("Gold", 5000, None).is_ok());
        assert!(validate_tier_bounds("  ", 0, None).is_err());
        assert!(validate_tier_bounds("Bad", -1, None).is_err());
        assert!(validate_tier_bounds("Bad", 100, Some(50)).is_err());
        assert!(validate_tier_bounds("Single", 100, Some(100)).is_ok());
    }

    #[test]
    fn test_points_delta_rules() {
        assert_eq!(points_delta(TransactionKind::Earn, 50, 0), Ok(50));
        assert!(points_delta(TransactionKind::Earn, 0, 0).is_err());
        assert_eq!(points_delta(TransactionKind::Redeem, 30, 100), Ok(-30));
        assert!(points_delta(TransactionKind::Redeem, 130, 100).is_err());
        assert_eq!(points_delta(TransactionKind::Adjust, -40, 100), Ok(-40));
        assert!(points_delta(TransactionKind::Adjust, -140, 100).is_err());
        assert_eq!(points_delta(TransactionKind::Reversal, 80, 50), Ok(-50));
        assert_eq!(points_delta(TransactionKind::Reversal, 20, 50), Ok(-20));
    }

    #[test]
    fn test_points_delta_rejects_overflow() {
        let out_of_range = Err(DomainError::Validation("Points out of range".to_string()));

        assert_eq!(points_delta(TransactionKind::Adjust, i64::MAX, 10), out_of_range);
        assert_eq!(points_delta(TransactionKind::Earn, 1, i64::MAX), out_of_range);
        assert_eq!(points_delta(TransactionKind::Earn, i64::MAX, 1), out_of_range);
        assert_eq!(points_delta(TransactionKind::Reversal, i64::MIN, 10), out_of_range);

        assert_eq!(points_delta(TransactionKind::Earn, i64::MAX, 0), Ok(i64::MAX));
        assert_eq!(points_delta(TransactionKind::Adjust, i64::MIN + 1, i64::MAX), Ok(i64::MIN + 1));
        assert_eq!(points_delta(TransactionKind::Reversal, i64::MAX, 5), Ok(-5));
        assert_eq!(points_delta(TransactionKind::Reversal, -30, 50), Ok(-30));
    }

    #[test]
    fn test_points_for_amount() {
        assert_eq!(points_for_amount(123.99, 1.0), 123);
        assert_eq!(points_for_amount(10.0, 2.5), 25);
        assert_eq!(points_for_amount(-3.0, 1.0), 0);
        assert_eq!(points_for_amount(50.0, 0.0), 0);
    }

    #[test]
    fn test_transaction_kind_round_trip() {
        for kind in [
            TransactionKind::Earn,
            TransactionKind::Redeem,
            TransactionKind::Adjust,
            TransactionKind::Reversal,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("bonus"), None);
    }
}
