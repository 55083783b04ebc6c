use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// One of the four nested coin units, smallest to largest.
///
/// Every unit is an exact multiple of copper, so cross-unit arithmetic is
/// done on integer copper values (see `Purse`). Copper doubles as the minor
/// unit of the reference scalar: one copper is one hundredth of an EGP
/// (equivalent gold piece).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    Copper,
    Silver,
    Gold,
    Platinum,
}

impl Coin {
    pub const ALL: [Coin; 4] = [Coin::Copper, Coin::Silver, Coin::Gold, Coin::Platinum];

    /// Canonical unit code, uppercase.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Coin::Copper => "CP",
            Coin::Silver => "SP",
            Coin::Gold => "GP",
            Coin::Platinum => "PP",
        }
    }

    /// Value of one coin of this unit in copper.
    #[must_use]
    pub const fn weight(self) -> i64 {
        match self {
            Coin::Copper => 1,
            Coin::Silver => 10,
            Coin::Gold => 100,
            Coin::Platinum => 1000,
        }
    }

    /// Converts `amount` coins of `self` into `target` coins.
    ///
    /// Returns `None` when the conversion is not integral in the target
    /// unit (e.g. 5 CP to SP).
    #[must_use]
    pub const fn convert(self, amount: i64, target: Coin) -> Option<i64> {
        let copper = amount * self.weight();
        if copper % target.weight() != 0 {
            None
        } else {
            Some(copper / target.weight())
        }
    }
}

impl core::fmt::Display for Coin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Coin {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cp" => Ok(Coin::Copper),
            "sp" => Ok(Coin::Silver),
            "gp" => Ok(Coin::Gold),
            "pp" => Ok(Coin::Platinum),
            other => Err(LedgerError::UnknownUnit(other.to_string())),
        }
    }
}
