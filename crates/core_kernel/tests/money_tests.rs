//! Money arithmetic as used by balance computation

use core_kernel::{Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod construction {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_places() {
        let m = Money::new(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert_eq!(Money::non_negative(dec!(0)).unwrap(), Money::zero());
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let err = Money::non_negative(dec!(-0.01)).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(_)));
    }

    #[test]
    fn test_zero_is_neither_positive_nor_negative() {
        let m = Money::new(dec!(0.00));
        assert!(!m.is_negative());
        assert!(!m.is_positive());
        assert!(m.is_zero());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_sum_of_amounts() {
        let amounts = [Money::new(dec!(60)), Money::new(dec!(40))];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::new(dec!(100)));
    }

    #[test]
    fn test_checked_sum_empty_is_zero() {
        let total = Money::checked_sum(&Vec::<Money>::new()).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(&max), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_saturating_sub_exact() {
        let premium = Money::new(dec!(100));
        assert_eq!(premium.saturating_sub(&Money::new(dec!(60))), Money::new(dec!(40)));
        assert_eq!(premium.saturating_sub(&Money::new(dec!(100))), Money::zero());
    }

    #[test]
    fn test_decimal_fractions_are_exact() {
        let a = Money::new(dec!(0.1));
        let b = Money::new(dec!(0.2));
        assert_eq!(a + b, Money::new(dec!(0.3)));
    }

    #[test]
    fn test_ordering() {
        assert!(Money::new(dec!(75)) > Money::new(dec!(50)));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_transparently() {
        let json = serde_json::to_value(Money::new(dec!(12.5))).unwrap();
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, Money::new(dec!(12.5)));
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let m: Money = serde_json::from_str("60.25").unwrap();
        assert_eq!(m.amount(), dec!(60.25));
    }
}
