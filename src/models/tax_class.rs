//! Wage-tax class (Steuerklasse).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;

/// The six wage-tax classes.
///
/// Classes are serialized as their number (1 to 6). Any other number is
/// rejected with [`EngineError::InvalidInput`].
///
/// # Example
///
/// ```
/// use gross_net_engine::models::TaxClass;
///
/// let class = TaxClass::try_from(3).unwrap();
/// assert_eq!(class, TaxClass::III);
/// assert!(TaxClass::try_from(7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaxClass {
    /// Single, widowed or divorced.
    I,
    /// Single parent.
    II,
    /// Married, spouse in class V or without wage.
    III,
    /// Married, both spouses earning.
    IV,
    /// Married, spouse in class III.
    V,
    /// Second and further employments.
    VI,
}

impl TaxClass {
    /// All tax classes in order.
    pub const ALL: [TaxClass; 6] = [
        TaxClass::I,
        TaxClass::II,
        TaxClass::III,
        TaxClass::IV,
        TaxClass::V,
        TaxClass::VI,
    ];

    /// The class number (1 to 6).
    pub fn number(self) -> u8 {
        match self {
            TaxClass::I => 1,
            TaxClass::II => 2,
            TaxClass::III => 3,
            TaxClass::IV => 4,
            TaxClass::V => 5,
            TaxClass::VI => 6,
        }
    }

    /// Divisor of the tariff: 2 for the splitting table (class III), else 1.
    pub fn tariff_divisor(self) -> Decimal {
        match self {
            TaxClass::III => Decimal::TWO,
            _ => Decimal::ONE,
        }
    }

    /// Classes V and VI are taxed with the split procedure.
    pub fn uses_split_procedure(self) -> bool {
        matches!(self, TaxClass::V | TaxClass::VI)
    }

    /// Child allowances reduce withholding only in classes I to IV.
    pub fn allows_child_allowance(self) -> bool {
        !self.uses_split_procedure()
    }
}

impl TryFrom<u8> for TaxClass {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TaxClass::I),
            2 => Ok(TaxClass::II),
            3 => Ok(TaxClass::III),
            4 => Ok(TaxClass::IV),
            5 => Ok(TaxClass::V),
            6 => Ok(TaxClass::VI),
            other => Err(EngineError::invalid_input(
                "tax_class",
                format!("must be between 1 and 6, got {}", other),
            )),
        }
    }
}

impl From<TaxClass> for u8 {
    fn from(class: TaxClass) -> u8 {
        class.number()
    }
}

impl fmt::Display for TaxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
