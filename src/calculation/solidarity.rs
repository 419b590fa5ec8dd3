//! Solidarity surcharge (SolZG 1995).
//!
//! No surcharge is levied up to the free threshold of annual income tax.
//! Above it the surcharge is 5.5 % of the tax, phased in at 11.9 % of the
//! excess over the threshold.

use rust_decimal::Decimal;

use super::rounding::round_down;
use crate::config::SolidarityConfig;

/// The free threshold for a tariff divisor (doubled for the splitting table).
pub fn solidarity_threshold(divisor: Decimal, config: &SolidarityConfig) -> Decimal {
    config.free_threshold * divisor
}

/// Annual surcharge in euros (2 dp) on an annual assessment base.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::annual_solidarity_surcharge;
/// use gross_net_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let solidarity = &ConfigLoader::builtin().unwrap().rate_year(2026).unwrap().solidarity;
/// let threshold = Decimal::from(20_350);
/// assert_eq!(annual_solidarity_surcharge(Decimal::from(20_350), threshold, solidarity), Decimal::ZERO);
/// assert_eq!(annual_solidarity_surcharge(Decimal::from(20_450), threshold, solidarity), Decimal::new(1190, 2));
/// ```
pub fn annual_solidarity_surcharge(
    assessment_base: Decimal,
    threshold: Decimal,
    config: &SolidarityConfig,
) -> Decimal {
    if assessment_base <= threshold {
        return Decimal::ZERO;
    }

    let full = round_down(assessment_base * config.rate_percent / Decimal::ONE_HUNDRED, 2);
    let phase_in = round_down(
        (assessment_base - threshold) * config.phase_in_percent / Decimal::ONE_HUNDRED,
        2,
    );
    full.min(phase_in)
}

/// Surcharge in cents on the tax of a one-time payment.
///
/// Levied at the full rate only if the annual tax including the payment
/// exceeds the threshold.
pub fn one_time_solidarity_surcharge(
    one_time_tax_cents: Decimal,
    assessment_base: Decimal,
    threshold: Decimal,
    config: &SolidarityConfig,
) -> Decimal {
    if assessment_base > threshold {
        round_down(one_time_tax_cents * config.rate_percent / Decimal::ONE_HUNDRED, 0)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> SolidarityConfig {
        SolidarityConfig {
            free_threshold: dec("20350"),
            rate_percent: dec("5.5"),
            phase_in_percent: dec("11.9"),
        }
    }

    #[test]
    fn test_threshold_doubles_for_splitting() {
        assert_eq!(solidarity_threshold(Decimal::ONE, &config()), dec("20350"));
        assert_eq!(solidarity_threshold(Decimal::TWO, &config()), dec("40700"));
    }

    #[test]
    fn test_no_surcharge_at_threshold() {
        assert_eq!(annual_solidarity_surcharge(dec("20350"), dec("20350"), &config()), Decimal::ZERO);
        assert_eq!(annual_solidarity_surcharge(dec("8000"), dec("20350"), &config()), Decimal::ZERO);
    }

    #[test]
    fn test_phase_in_above_threshold() {
        // 1,000 * 11.9 % = 119.00 < 21,350 * 5.5 % = 1,174.25
        assert_eq!(annual_solidarity_surcharge(dec("21350"), dec("20350"), &config()), dec("119"));
    }

    #[test]
    fn test_full_rate_well_above_threshold() {
        // 50,000 * 5.5 % = 2,750 < 29,650 * 11.9 %
        assert_eq!(annual_solidarity_surcharge(dec("50000"), dec("20350"), &config()), dec("2750"));
    }

    #[test]
    fn test_one_time_surcharge_needs_base_above_threshold() {
        assert_eq!(
            one_time_solidarity_surcharge(dec("100000"), dec("30000"), dec("20350"), &config()),
            dec("5500")
        );
        assert_eq!(
            one_time_solidarity_surcharge(dec("100000"), dec("20000"), dec("20350"), &config()),
            Decimal::ZERO
        );
    }
}
