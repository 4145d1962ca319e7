//! Pre-built Test Fixtures
//!
//! Fixed, predictable values for unit tests, plus generated free text
//! where the content does not matter.

use chrono::NaiveDate;
use core_kernel::Money;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical annual premium
    pub fn premium() -> Money {
        Money::new(dec!(1500.00))
    }

    /// A typical coverage amount
    pub fn coverage() -> Money {
        Money::new(dec!(500000.00))
    }

    /// A partial payment
    pub fn installment() -> Money {
        Money::new(dec!(250.00))
    }
}

/// Fixture for policy periods and loss dates
pub struct DateFixtures;

impl DateFixtures {
    /// Standard policy start date (Jan 1, 2025)
    pub fn policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }

    /// Standard policy end date (Jan 1, 2026)
    pub fn policy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
    }

    /// A loss date inside the standard period
    pub fn loss_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }
}

/// Generated free text
pub struct TextFixtures;

impl TextFixtures {
    /// A random claim description
    pub fn claim_description() -> String {
        Sentence(4..10).fake()
    }

    /// A random, practically unique payment reference
    pub fn payment_reference() -> String {
        format!("REF-{}", (100_000_000u64..999_999_999u64).fake::<u64>())
    }
}
