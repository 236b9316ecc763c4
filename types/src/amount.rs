//! Token amounts.
//!
//! Stakes, fees, balances and ranks are all fixed-point integers (u128) in raw
//! units. One whole token is [`TOKEN`] raw units.

/// Raw units per whole token (18 decimals).
pub const TOKEN: u128 = 1_000_000_000_000_000_000;

/// Render a raw amount as whole tokens with up to four decimals, e.g. `"12.5"`.
pub fn format_tokens(raw: u128) -> String {
    let whole = raw / TOKEN;
    let frac = (raw % TOKEN) / (TOKEN / 10_000);
    if frac == 0 {
        format!("{}", whole)
    } else {
        let digits = format!("{:04}", frac);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_tokens_have_no_fraction() {
        assert_eq!(format_tokens(300 * TOKEN), "300");
        assert_eq!(format_tokens(0), "0");
    }

    #[test]
    fn fractions_are_trimmed() {
        assert_eq!(format_tokens(TOKEN / 2), "0.5");
        assert_eq!(format_tokens(12 * TOKEN + TOKEN / 20), "12.05");
    }

    #[test]
    fn dust_below_four_decimals_is_dropped() {
        assert_eq!(format_tokens(1), "0");
    }
}
