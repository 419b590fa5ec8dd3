//! Age relief (Altersentlastungsbetrag, § 24a EStG).

use rust_decimal::Decimal;

use super::rounding::round_up;
use crate::config::{AgeReliefRow, CohortTable};
use crate::error::EngineResult;

/// Computes the annual age relief in euros.
///
/// The relief applies to the wage excluding pension income. Rate and cap are
/// those of the cohort year, which is the calendar year following the 64th
/// birthday.
///
/// # Arguments
///
/// * `cohort_year` - The cohort year, or `None` if the employee does not qualify
/// * `annual_wage` - Annual gross wage in euros
/// * `annual_pension` - Annual pension income contained in the wage
/// * `table` - The age-relief cohort table
pub fn age_relief(
    cohort_year: Option<u16>,
    annual_wage: Decimal,
    annual_pension: Decimal,
    table: &CohortTable<AgeReliefRow>,
) -> EngineResult<Decimal> {
    let Some(year) = cohort_year else {
        return Ok(Decimal::ZERO);
    };

    let row = table.row_for(year, "age_relief")?;
    let base = annual_wage - annual_pension;
    Ok(round_up(base * row.rate, 0).min(row.max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table() -> CohortTable<AgeReliefRow> {
        CohortTable {
            first_cohort: 2005,
            final_cohort: 2058,
            rows: vec![
                AgeReliefRow {
                    cohort: 2005,
                    rate: dec("0.4"),
                    max: dec("1900"),
                },
                AgeReliefRow {
                    cohort: 2026,
                    rate: dec("0.128"),
                    max: dec("608"),
                },
            ],
        }
    }

    #[test]
    fn test_not_eligible_gives_zero() {
        let relief = age_relief(None, dec("50000"), Decimal::ZERO, &table()).unwrap();
        assert_eq!(relief, Decimal::ZERO);
    }

    #[test]
    fn test_relief_capped_at_cohort_maximum() {
        let relief = age_relief(Some(2026), dec("50000"), Decimal::ZERO, &table()).unwrap();
        assert_eq!(relief, dec("608"));
    }

    #[test]
    fn test_relief_rounded_up_to_whole_euros() {
        let relief = age_relief(Some(2026), dec("3000.10"), Decimal::ZERO, &table()).unwrap();
        assert_eq!(relief, dec("385"));
    }

    #[test]
    fn test_pension_income_excluded_from_base() {
        // (6,000 - 4,000) * 0.4 = 800
        let relief = age_relief(Some(2005), dec("6000"), dec("4000"), &table()).unwrap();
        assert_eq!(relief, dec("800"));
    }

    #[test]
    fn test_early_cohort_clamped_to_first_row() {
        let relief = age_relief(Some(1998), dec("100000"), Decimal::ZERO, &table()).unwrap();
        assert_eq!(relief, dec("1900"));
    }
}
