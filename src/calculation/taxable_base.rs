//! Taxable-base reduction and the fixed table allowances.
//!
//! The annual wage is reduced by the pension and age reliefs and the
//! personal allowance. The table allowances (lump sums, single-parent
//! relief, child allowance) are then derived from the reduced base and the
//! tax class.

use rust_decimal::Decimal;

use super::annualize::AnnualAmounts;
use super::rounding::{floor_zero, round_down, round_up};
use crate::config::AllowanceConfig;
use crate::models::TaxClass;

/// The reduced annual amounts the tariff is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxableBase {
    /// Annual wage after reliefs, allowance and add-back, floored at zero.
    pub wage: Decimal,
    /// Annual wage used as the base of the insurance provision.
    pub provision_base: Decimal,
    /// Annual pension income after pension relief, floored at zero.
    pub pension: Decimal,
}

/// Reduces the annual wage by the reliefs and allowances.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::{AnnualAmounts, reduce_taxable_base};
/// use rust_decimal::Decimal;
///
/// let amounts = AnnualAmounts {
///     wage: Decimal::from(40_000),
///     pension: Decimal::ZERO,
///     allowance: Decimal::from(1_200),
///     add_back: Decimal::ZERO,
/// };
/// let base = reduce_taxable_base(&amounts, Decimal::ZERO, Decimal::ZERO);
/// assert_eq!(base.wage, Decimal::from(38_800));
/// assert_eq!(base.provision_base, Decimal::from(40_000));
/// ```
pub fn reduce_taxable_base(
    amounts: &AnnualAmounts,
    pension_relief: Decimal,
    age_relief: Decimal,
) -> TaxableBase {
    let wage = round_down(
        amounts.wage - pension_relief - age_relief - amounts.allowance + amounts.add_back,
        2,
    );
    let pension = round_down(amounts.pension - pension_relief, 2);

    TaxableBase {
        wage: floor_zero(wage),
        provision_base: amounts.wage,
        pension: floor_zero(pension),
    }
}

/// The fixed allowances built into the withholding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAllowances {
    /// Employee and pension lump sums combined.
    pub lump_sum: Decimal,
    /// Pension supplement after limiting to the remaining pension.
    pub pension_supplement: Decimal,
    /// Special-expenses lump sum.
    pub special_expenses: Decimal,
    /// Single-parent relief.
    pub single_parent: Decimal,
    /// Child allowance. Not part of `total`; it only reduces the base of
    /// the solidarity surcharge and church tax.
    pub child_allowance: Decimal,
    /// Tariff divisor (2 for the splitting table).
    pub divisor: Decimal,
    /// Sum of the allowances deducted before the tariff.
    pub total: Decimal,
}

/// Derives the table allowances for a reduced base.
///
/// # Arguments
///
/// * `base` - The reduced annual amounts
/// * `pension_supplement` - The pension supplement from the relief stage
/// * `tax_class` - The wage-tax class
/// * `child_allowance_units` - Child-allowance units from the tax record
/// * `config` - The year's allowance amounts
pub fn table_allowances(
    base: &TaxableBase,
    pension_supplement: Decimal,
    tax_class: TaxClass,
    child_allowance_units: Decimal,
    config: &AllowanceConfig,
) -> TableAllowances {
    let mut pension_supplement = pension_supplement;
    if base.pension >= Decimal::ZERO && base.pension < pension_supplement {
        pension_supplement = base.pension.trunc();
    }

    let mut lump_sum = Decimal::ZERO;
    if tax_class == TaxClass::VI {
        pension_supplement = Decimal::ZERO;
    } else {
        if base.pension > Decimal::ZERO {
            let remaining = base.pension - pension_supplement;
            lump_sum = if remaining < config.pension_lump_sum {
                round_up(remaining, 0)
            } else {
                config.pension_lump_sum
            };
        }
        if base.wage > base.pension {
            let remaining = base.wage - base.pension;
            lump_sum = if remaining < config.employee_lump_sum {
                round_up(lump_sum + remaining, 0)
            } else {
                lump_sum + config.employee_lump_sum
            };
        }
    }

    let special_expenses = match tax_class {
        TaxClass::VI => Decimal::ZERO,
        _ => config.special_expenses_lump_sum,
    };
    let single_parent = match tax_class {
        TaxClass::II => config.single_parent_relief,
        _ => Decimal::ZERO,
    };
    let child_allowance = match tax_class {
        TaxClass::I | TaxClass::II | TaxClass::III => {
            round_down(child_allowance_units * config.child_allowance_full, 0)
        }
        TaxClass::IV => round_down(child_allowance_units * config.child_allowance_half, 0),
        TaxClass::V | TaxClass::VI => Decimal::ZERO,
    };

    let total = round_down(
        single_parent + lump_sum + special_expenses + pension_supplement,
        2,
    );

    TableAllowances {
        lump_sum,
        pension_supplement,
        special_expenses,
        single_parent,
        child_allowance,
        divisor: tax_class.tariff_divisor(),
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> AllowanceConfig {
        AllowanceConfig {
            employee_lump_sum: dec("1230"),
            pension_lump_sum: dec("102"),
            special_expenses_lump_sum: dec("36"),
            single_parent_relief: dec("4260"),
            child_allowance_full: dec("9756"),
            child_allowance_half: dec("4878"),
        }
    }

    fn wage_only(wage: &str) -> TaxableBase {
        TaxableBase {
            wage: dec(wage),
            provision_base: dec(wage),
            pension: Decimal::ZERO,
        }
    }

    #[test]
    fn test_reduction_floors_at_zero() {
        let amounts = AnnualAmounts {
            wage: dec("1000"),
            pension: dec("500"),
            allowance: dec("2000"),
            add_back: Decimal::ZERO,
        };
        let base = reduce_taxable_base(&amounts, dec("600"), Decimal::ZERO);
        assert_eq!(base.wage, Decimal::ZERO);
        assert_eq!(base.pension, Decimal::ZERO);
        assert_eq!(base.provision_base, dec("1000"));
    }

    #[test]
    fn test_add_back_increases_base() {
        let amounts = AnnualAmounts {
            wage: dec("30000"),
            pension: Decimal::ZERO,
            allowance: Decimal::ZERO,
            add_back: dec("1500.55"),
        };
        let base = reduce_taxable_base(&amounts, Decimal::ZERO, dec("100"));
        assert_eq!(base.wage, dec("31400.55"));
    }

    #[test]
    fn test_class_one_allowances() {
        let result = table_allowances(&wage_only("50000"), Decimal::ZERO, TaxClass::I, Decimal::ZERO, &config());
        assert_eq!(result.lump_sum, dec("1230"));
        assert_eq!(result.special_expenses, dec("36"));
        assert_eq!(result.total, dec("1266"));
        assert_eq!(result.divisor, Decimal::ONE);
    }

    #[test]
    fn test_class_two_includes_single_parent_relief() {
        let result = table_allowances(&wage_only("50000"), Decimal::ZERO, TaxClass::II, Decimal::ONE, &config());
        assert_eq!(result.total, dec("5526"));
        assert_eq!(result.child_allowance, dec("9756"));
    }

    #[test]
    fn test_class_three_splits_and_class_four_halves_child_allowance() {
        let three = table_allowances(&wage_only("50000"), Decimal::ZERO, TaxClass::III, dec("1.5"), &config());
        assert_eq!(three.divisor, Decimal::TWO);
        assert_eq!(three.child_allowance, dec("14634"));

        let four = table_allowances(&wage_only("50000"), Decimal::ZERO, TaxClass::IV, dec("0.5"), &config());
        assert_eq!(four.child_allowance, dec("2439"));
    }

    #[test]
    fn test_class_five_has_no_child_allowance_and_class_six_no_lump_sums() {
        let five = table_allowances(&wage_only("50000"), Decimal::ZERO, TaxClass::V, Decimal::TWO, &config());
        assert_eq!(five.child_allowance, Decimal::ZERO);
        assert_eq!(five.total, dec("1266"));

        let six = table_allowances(&wage_only("50000"), dec("300"), TaxClass::VI, Decimal::ZERO, &config());
        assert_eq!(six.total, Decimal::ZERO);
        assert_eq!(six.pension_supplement, Decimal::ZERO);
    }

    #[test]
    fn test_low_wage_limits_employee_lump_sum() {
        let result = table_allowances(&wage_only("800.20"), Decimal::ZERO, TaxClass::I, Decimal::ZERO, &config());
        assert_eq!(result.lump_sum, dec("801"));
    }

    #[test]
    fn test_pension_lump_sum_and_supplement() {
        let base = TaxableBase {
            wage: dec("20000"),
            provision_base: dec("21200"),
            pension: dec("10000"),
        };
        let result = table_allowances(&base, dec("360"), TaxClass::I, Decimal::ZERO, &config());
        assert_eq!(result.pension_supplement, dec("360"));
        // 102 pension lump sum + 1,230 employee lump sum
        assert_eq!(result.lump_sum, dec("1332"));
        assert_eq!(result.total, dec("1728"));
    }

    #[test]
    fn test_supplement_limited_to_remaining_pension() {
        let base = TaxableBase {
            wage: dec("150.75"),
            provision_base: dec("150.75"),
            pension: dec("150.75"),
        };
        let result = table_allowances(&base, dec("360"), TaxClass::I, Decimal::ZERO, &config());
        assert_eq!(result.pension_supplement, dec("150"));
        // Remaining pension 0.75 rounds up to 1.
        assert_eq!(result.lump_sum, dec("1"));
    }
}
