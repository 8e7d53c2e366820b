//! European number rendering (comma as decimal separator).

use rust_decimal::Decimal;

/// Render a decimal without trailing zeros, using `,` as the separator.
pub fn european_decimal(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

/// Render a ratio in `[0, 1]` as a percentage with at most two decimals.
pub fn percentage(ratio: Decimal) -> String {
    let pct = (ratio * Decimal::ONE_HUNDRED).round_dp(2);
    format!("{}%", european_decimal(pct))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_european_decimal() {
        assert_eq!(european_decimal(d("2.5")), "2,5");
        assert_eq!(european_decimal(d("5.00")), "5");
        assert_eq!(european_decimal(d("12.75")), "12,75");
        assert_eq!(european_decimal(Decimal::ZERO), "0");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(d("0.7")), "70%");
        assert_eq!(percentage(Decimal::ONE), "100%");
        assert_eq!(percentage(Decimal::from(2) / Decimal::from(3)), "66,67%");
        assert_eq!(percentage(Decimal::ZERO), "0%");
    }
}
