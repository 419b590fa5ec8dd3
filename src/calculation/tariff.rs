//! Income-tax tariff (§ 32a EStG) and the class V/VI procedure.
//!
//! The general tariff has five zones: a zero zone up to the basic allowance,
//! two polynomial progression zones and two flat marginal zones. Classes V
//! and VI use the split procedure of § 39b Abs. 2 Satz 7 EStG, which
//! evaluates the tariff at 125 % and 75 % of the base.

use rust_decimal::Decimal;

use super::provision_allowance::{ProvisionAllowance, provision_allowance};
use super::rounding::round_down;
use super::taxable_base::TaxableBase;
use crate::config::{RateYear, SplitTariffConfig, TariffConfig};
use crate::models::{ProvisionInput, TaxClass};

/// Applies the general tariff to a whole-euro income.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::income_tax_tariff;
/// use gross_net_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let rates = ConfigLoader::builtin().unwrap().rate_year(2026).unwrap();
/// assert_eq!(income_tax_tariff(Decimal::from(12_348), &rates.tariff), Decimal::ZERO);
/// assert!(income_tax_tariff(Decimal::from(12_349), &rates.tariff) >= Decimal::ZERO);
/// ```
pub fn income_tax_tariff(x: Decimal, tariff: &TariffConfig) -> Decimal {
    let ten_thousand = Decimal::from(10_000);

    if x < tariff.basic_allowance + Decimal::ONE {
        Decimal::ZERO
    } else if x < tariff.zone2_limit {
        let y = round_down((x - tariff.basic_allowance) / ten_thousand, 6);
        let rw = y * tariff.zone2_coefficient + tariff.zone2_base_rate;
        round_down(rw * y, 0)
    } else if x < tariff.zone3_limit {
        let y = round_down((x - tariff.zone3_start) / ten_thousand, 6);
        let rw = (y * tariff.zone3_coefficient + tariff.zone3_base_rate) * y;
        round_down(rw + tariff.zone3_constant, 0)
    } else if x < tariff.zone4_limit {
        round_down(x * tariff.zone4_rate - tariff.zone4_deduction, 0)
    } else {
        round_down(x * tariff.zone5_rate - tariff.zone5_deduction, 0)
    }
}

/// Twice the tariff difference between 125 % and 75 % of `zx`, at least the
/// minimum rate of `zx`.
fn split_tax_at(zx: Decimal, tariff: &TariffConfig, split: &SplitTariffConfig) -> Decimal {
    let upper = income_tax_tariff(round_down(zx * split.upper_factor, 0), tariff);
    let lower = income_tax_tariff(round_down(zx * split.lower_factor, 0), tariff);
    let difference = (upper - lower) * Decimal::TWO;
    let minimum = round_down(zx * split.minimum_rate, 0);
    minimum.max(difference)
}

/// Annual tax for classes V and VI.
pub fn split_procedure_tax(x: Decimal, tariff: &TariffConfig, split: &SplitTariffConfig) -> Decimal {
    if x > split.second_threshold {
        let tax = split_tax_at(split.second_threshold, tariff, split);
        if x > split.third_threshold {
            let tax = round_down(
                tax + (split.third_threshold - split.second_threshold) * tariff.zone4_rate,
                0,
            );
            round_down(tax + (x - split.third_threshold) * tariff.zone5_rate, 0)
        } else {
            round_down(tax + (x - split.second_threshold) * tariff.zone4_rate, 0)
        }
    } else {
        let tax = split_tax_at(x, tariff, split);
        if x > split.first_threshold {
            let at_threshold = split_tax_at(split.first_threshold, tariff, split);
            let linear = round_down(at_threshold + (x - split.first_threshold) * tariff.zone4_rate, 0);
            linear.min(tax)
        } else {
            tax
        }
    }
}

/// Tariff result for a taxable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TariffTax {
    /// Taxable income, zero if below one euro.
    pub taxable_income: Decimal,
    /// Whole-euro income the tariff is applied to (per tariff half).
    pub x: Decimal,
    /// Annual tax in whole euros.
    pub tax: Decimal,
}

/// Applies the tariff appropriate to the tax class to a taxable income.
pub fn tariff_tax(taxable_income: Decimal, tax_class: TaxClass, rates: &RateYear) -> TariffTax {
    let divisor = tax_class.tariff_divisor();
    let (taxable_income, x) = if taxable_income < Decimal::ONE {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (taxable_income, round_down(taxable_income / divisor, 0))
    };

    let tax = if tax_class.uses_split_procedure() {
        split_procedure_tax(x, &rates.tariff, &rates.split_tariff)
    } else {
        income_tax_tariff(x, &rates.tariff) * divisor
    };

    TariffTax {
        taxable_income,
        x,
        tax,
    }
}

/// Provision and tariff for one pass over a reduced base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeTaxAssessment {
    /// The provision allowance.
    pub provision: ProvisionAllowance,
    /// The tariff result.
    pub tariff: TariffTax,
}

/// Deducts the table allowances and the provision from the reduced wage and
/// applies the tariff.
///
/// # Arguments
///
/// * `base` - The reduced annual amounts
/// * `table_allowance_total` - Sum of the table allowances to deduct
/// * `tax_class` - The wage-tax class
/// * `provision` - Insurance parameters for the provision
/// * `rates` - The fiscal year's rate table
pub fn assess_income_tax(
    base: &TaxableBase,
    table_allowance_total: Decimal,
    tax_class: TaxClass,
    provision: &ProvisionInput,
    rates: &RateYear,
) -> IncomeTaxAssessment {
    let provision = provision_allowance(base.provision_base, tax_class, provision, rates);
    let taxable_income = base.wage - table_allowance_total - provision.total;
    IncomeTaxAssessment {
        provision,
        tariff: tariff_tax(taxable_income, tax_class, rates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates() -> &'static RateYear {
        ConfigLoader::builtin().unwrap().rate_year(2026).unwrap()
    }

    #[test]
    fn test_basic_allowance_is_tax_free() {
        let tariff = &rates().tariff;
        assert_eq!(income_tax_tariff(dec("0"), tariff), Decimal::ZERO);
        assert_eq!(income_tax_tariff(dec("12348"), tariff), Decimal::ZERO);
    }

    #[test]
    fn test_first_progression_zone() {
        // y = 0.0001; (0.0001 * 914.51 + 1400) * 0.0001 = 0.14 -> 0
        assert_eq!(income_tax_tariff(dec("12349"), &rates().tariff), Decimal::ZERO);
        // y = 0.4652; (0.4652 * 914.51 + 1400) * 0.4652 = 849.19...
        assert_eq!(income_tax_tariff(dec("17000"), &rates().tariff), dec("849"));
    }

    #[test]
    fn test_second_progression_zone() {
        // y = 0.02; (0.02 * 173.1 + 2397) * 0.02 + 1034.87 = 1082.87...
        assert_eq!(income_tax_tariff(dec("17999"), &rates().tariff), dec("1082"));
        // y = 2.0001; (2.0001 * 173.1 + 2397) * 2.0001 + 1034.87 = 6521.8...
        assert_eq!(income_tax_tariff(dec("37800"), &rates().tariff), dec("6521"));
    }

    #[test]
    fn test_flat_zones() {
        // 100,000 * 0.42 - 11,135.63
        assert_eq!(income_tax_tariff(dec("100000"), &rates().tariff), dec("30864"));
        // 300,000 * 0.45 - 19,470.38
        assert_eq!(income_tax_tariff(dec("300000"), &rates().tariff), dec("115529"));
    }

    #[test]
    fn test_splitting_doubles_half_income_tax() {
        let rates = rates();
        let single = tariff_tax(dec("30000"), TaxClass::I, rates);
        let split = tariff_tax(dec("60000"), TaxClass::III, rates);

        assert_eq!(split.x, dec("30000"));
        assert_eq!(split.tax, single.tax * Decimal::TWO);
    }

    #[test]
    fn test_taxable_income_below_one_euro_is_zero() {
        let result = tariff_tax(dec("0.99"), TaxClass::I, rates());
        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.x, Decimal::ZERO);
        assert_eq!(result.tax, Decimal::ZERO);

        let negative = tariff_tax(dec("-500"), TaxClass::V, rates());
        assert_eq!(negative.tax, Decimal::ZERO);
    }

    #[test]
    fn test_split_procedure_minimum_rate() {
        let rates = rates();
        // Low incomes are taxed at least at 14 %.
        let tax = split_procedure_tax(dec("5000"), &rates.tariff, &rates.split_tariff);
        assert_eq!(tax, dec("700"));
    }

    #[test]
    fn test_split_procedure_top_zone_is_linear() {
        let rates = rates();
        let at_third = split_procedure_tax(dec("222260"), &rates.tariff, &rates.split_tariff);
        let above = split_procedure_tax(dec("232260"), &rates.tariff, &rates.split_tariff);
        assert_eq!(above - at_third, dec("4500"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_tariff_is_monotonic(x in 0u32..400_000) {
            let tariff = &rates().tariff;
            let a = income_tax_tariff(Decimal::from(x), tariff);
            let b = income_tax_tariff(Decimal::from(x + 1), tariff);
            prop_assert!(b >= a);
        }

        #[test]
        fn prop_split_procedure_not_below_general_tariff(x in 0u32..300_000u32) {
            let rates = rates();
            let x = Decimal::from(x);
            let general = income_tax_tariff(x, &rates.tariff);
            let split = split_procedure_tax(x, &rates.tariff, &rates.split_tariff);
            prop_assert!(split >= general);
        }
    }
}
