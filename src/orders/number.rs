//! Order numbers
//!
//! Format: `PS` + two-digit year + two-digit month + four random digits, e.g.
//! `PS26100042`. Randomness alone does not guarantee uniqueness; callers must check
//! for collisions before persisting.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed order number prefix.
pub const ORDER_NUMBER_PREFIX: &str = "PS";

/// Human-facing order reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a number for an order placed at `now`.
    pub fn generate<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> Self {
        let placed = now.to_zoned(TimeZone::UTC);
        let year = placed.year().rem_euclid(100);
        let month = placed.month();
        let suffix: u16 = rng.gen_range(0..10_000);

        Self(format!("{ORDER_NUMBER_PREFIX}{year:02}{month:02}{suffix:04}"))
    }

    /// The number as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn embeds_prefix_year_and_month() -> TestResult {
        let now: Timestamp = "2026-03-09T10:00:00Z".parse()?;
        let mut rng = StdRng::seed_from_u64(7);

        let number = OrderNumber::generate(now, &mut rng);

        assert!(number.as_str().starts_with("PS2603"), "got {number}");
        assert_eq!(number.as_str().len(), 10);
        assert!(number.as_str().chars().skip(2).all(|c| c.is_ascii_digit()));

        Ok(())
    }

    #[test]
    fn suffix_is_zero_padded() -> TestResult {
        let now: Timestamp = "2031-12-31T23:59:59Z".parse()?;
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..200 {
            let number = OrderNumber::generate(now, &mut rng);

            assert_eq!(number.as_str().len(), 10, "got {number}");
        }

        Ok(())
    }
}
