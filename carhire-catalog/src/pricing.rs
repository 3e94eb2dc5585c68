use crate::car::Car;

/// Total charge for renting at `price_per_day` over `days` whole days.
///
/// Days come from a half-open date range, so a range of whole calendar
/// dates is already the rounded-up day count.
pub fn rental_total(price_per_day: i64, days: i64) -> Result<i64, PricingError> {
    if days <= 0 {
        return Err(PricingError::NonPositiveDuration(days));
    }
    if price_per_day < 0 {
        return Err(PricingError::NegativeRate(price_per_day));
    }
    price_per_day
        .checked_mul(days)
        .ok_or(PricingError::Overflow { price_per_day, days })
}

impl Car {
    pub fn quote(&self, days: i64) -> Result<i64, PricingError> {
        rental_total(self.price_per_day, days)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Rental must last at least one day, got {0}")]
    NonPositiveDuration(i64),

    #[error("Daily rate cannot be negative: {0}")]
    NegativeRate(i64),

    #[error("Price overflow: {price_per_day} x {days}")]
    Overflow {
        price_per_day: i64,
        days: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_days_at_one_hundred() {
        // $100/day in cents
        assert_eq!(rental_total(10_000, 3), Ok(30_000));
    }

    #[test]
    fn test_rejects_empty_or_negative_duration() {
        assert_eq!(rental_total(10_000, 0), Err(PricingError::NonPositiveDuration(0)));
        assert_eq!(rental_total(10_000, -2), Err(PricingError::NonPositiveDuration(-2)));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(rental_total(i64::MAX, 2), Err(PricingError::Overflow { .. })));
    }
}
