use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Rounds `value` to `precision` decimal digits, ties to even.
///
/// Rounding is done on the shortest decimal representation of `value` (what
/// `{}` prints), so `3.145` is treated as the decimal 3.145 and rounds to
/// `3.14`, not as its binary approximation. Non-finite values pass through.
///
/// | Input  | Precision | Output |
/// |--------|-----------|--------|
/// | 3.145  | 2         | 3.14   |
/// | 3.155  | 2         | 3.16   |
/// | 2.675  | 2         | 2.68   |
/// | 2.5    | 0         | 2      |
pub fn round_half_even(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let decimal = match Decimal::from_str(&value.to_string()) {
        Ok(d) => d,
        Err(_) => match Decimal::from_f64_retain(value) {
            Some(d) => d,
            None => return value,
        },
    };

    decimal
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
        .to_string()
        .parse()
        .unwrap_or(value)
}
