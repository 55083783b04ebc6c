use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Coin;

/// A fixed record of coin amounts, one signed count per unit.
///
/// On an account the counts are non-negative by convention; inside a
/// transaction or an offset computation they are signed deltas. All
/// cross-unit arithmetic goes through the exact copper value (one copper is
/// one centi-EGP), so no floating point is involved anywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purse {
    pub cp: i64,
    pub sp: i64,
    pub gp: i64,
    pub pp: i64,
}

impl Purse {
    pub const EMPTY: Purse = Purse {
        cp: 0,
        sp: 0,
        gp: 0,
        pp: 0,
    };

    /// Returns the count for one unit.
    #[must_use]
    pub const fn get(&self, coin: Coin) -> i64 {
        match coin {
            Coin::Copper => self.cp,
            Coin::Silver => self.sp,
            Coin::Gold => self.gp,
            Coin::Platinum => self.pp,
        }
    }

    /// Adds `amount` coins of one unit.
    pub const fn add(&mut self, coin: Coin, amount: i64) {
        match coin {
            Coin::Copper => self.cp += amount,
            Coin::Silver => self.sp += amount,
            Coin::Gold => self.gp += amount,
            Coin::Platinum => self.pp += amount,
        }
    }

    /// Adds `other` scaled by `sign` to every unit.
    pub fn add_scaled(&mut self, other: &Purse, sign: i64) {
        for coin in Coin::ALL {
            self.add(coin, other.get(coin) * sign);
        }
    }

    #[must_use]
    pub fn scaled(&self, sign: i64) -> Purse {
        let mut out = Purse::EMPTY;
        out.add_scaled(self, sign);
        out
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cp == 0 && self.sp == 0 && self.gp == 0 && self.pp == 0
    }

    /// Exact total value in copper (centi-EGP).
    #[must_use]
    pub fn to_copper(&self) -> i64 {
        Coin::ALL
            .into_iter()
            .map(|coin| self.get(coin) * coin.weight())
            .sum()
    }

    /// Accumulates a copper value as its canonical gold/silver/copper
    /// decomposition, coarsest first. Platinum is never produced.
    ///
    /// The magnitude is decomposed and the sign of the input is applied
    /// uniformly to every contributed bucket, so negative values (possible
    /// through a large negative percentage offset) keep consistent signs
    /// across units.
    pub const fn add_copper(&mut self, copper: i64) {
        let sign = if copper < 0 { -1 } else { 1 };
        let magnitude = copper.abs();
        self.gp += sign * (magnitude / 100);
        self.sp += sign * (magnitude % 100 / 10);
        self.cp += sign * (magnitude % 10);
    }

    /// Canonical decomposition of a copper value into a fresh purse.
    #[must_use]
    pub const fn from_copper(copper: i64) -> Purse {
        let mut purse = Purse::EMPTY;
        purse.add_copper(copper);
        purse
    }

    /// Applies a signed percentage offset in reference units and
    /// re-decomposes the result, rounding half away from zero at the copper
    /// level. Discounts and price hikes go through here, so the whole purse
    /// is flattened into its canonical gp/sp/cp form.
    #[must_use]
    pub fn with_offset(&self, percent: i64) -> Purse {
        let scaled = self.to_copper() * (100 + percent);
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Purse::from_copper(rounded)
    }

    /// The total rendered in the reference unit, e.g. `12.34 EGP`.
    #[must_use]
    pub fn egp_string(&self) -> String {
        let copper = self.to_copper();
        let sign = if copper < 0 { "-" } else { "" };
        let abs = copper.unsigned_abs();
        format!("{sign}{}.{:02} EGP", abs / 100, abs % 100)
    }

    /// Nonzero amounts as `N CP, M SP, ...`, smallest unit first.
    #[must_use]
    pub fn describe_amounts(&self) -> String {
        let mut parts = Vec::new();
        for coin in Coin::ALL {
            let amount = self.get(coin);
            if amount != 0 {
                parts.push(format!("{amount} {coin}"));
            }
        }
        parts.join(", ")
    }
}

impl fmt::Display for Purse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} CP | {} SP | {} GP | {} PP]",
            self.cp, self.sp, self.gp, self.pp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copper_roundtrip_for_canonical_purses() {
        for gp in 0..4 {
            for sp in 0..10 {
                for cp in 0..10 {
                    let purse = Purse {
                        cp,
                        sp,
                        gp,
                        pp: 0,
                    };
                    assert_eq!(Purse::from_copper(purse.to_copper()), purse);
                }
            }
        }
    }

    #[test]
    fn decomposition_is_coarsest_first() {
        let purse = Purse::from_copper(2450);
        assert_eq!(
            purse,
            Purse {
                cp: 0,
                sp: 5,
                gp: 24,
                pp: 0
            }
        );
    }

    #[test]
    fn decomposition_never_produces_platinum() {
        let purse = Purse::from_copper(10_000);
        assert_eq!(purse.gp, 100);
        assert_eq!(purse.pp, 0);
    }

    #[test]
    fn negative_values_keep_uniform_signs() {
        let purse = Purse::from_copper(-2461);
        assert_eq!(
            purse,
            Purse {
                cp: -1,
                sp: -6,
                gp: -24,
                pp: 0
            }
        );
        assert_eq!(purse.to_copper(), -2461);
    }

    #[test]
    fn add_copper_accumulates_onto_existing_amounts() {
        let mut purse = Purse {
            cp: 2,
            sp: 0,
            gp: 1,
            pp: 0,
        };
        purse.add_copper(2450);
        assert_eq!(purse.gp, 25);
        assert_eq!(purse.sp, 5);
        assert_eq!(purse.cp, 2);
    }

    #[test]
    fn offset_discount_rounds_at_copper_level() {
        let mut purse = Purse::EMPTY;
        purse.gp = 45;
        assert_eq!(purse.with_offset(-20), Purse::from_copper(3600));

        // 1 SP at +25% is 12.5 copper, rounded half away from zero.
        let mut purse = Purse::EMPTY;
        purse.sp = 1;
        assert_eq!(purse.with_offset(25), Purse::from_copper(13));
    }

    #[test]
    fn offset_flattens_platinum_into_gold() {
        let mut purse = Purse::EMPTY;
        purse.pp = 1;
        let offset = purse.with_offset(0);
        assert_eq!(offset.pp, 0);
        assert_eq!(offset.gp, 10);
    }

    #[test]
    fn offset_below_minus_hundred_goes_negative() {
        let mut purse = Purse::EMPTY;
        purse.gp = 10;
        let offset = purse.with_offset(-150);
        assert_eq!(offset.to_copper(), -500);
        assert_eq!(offset.gp, -5);
    }

    #[test]
    fn egp_display_uses_two_decimals() {
        let purse = Purse {
            cp: 3,
            sp: 2,
            gp: 1,
            pp: 0,
        };
        assert_eq!(purse.egp_string(), "1.23 EGP");
        assert_eq!(purse.scaled(-1).egp_string(), "-1.23 EGP");
    }

    #[test]
    fn describe_amounts_skips_zero_units() {
        let purse = Purse {
            cp: 0,
            sp: 3,
            gp: 0,
            pp: 1,
        };
        assert_eq!(purse.describe_amounts(), "3 SP, 1 PP");
        assert_eq!(Purse::EMPTY.describe_amounts(), "");
    }
}
