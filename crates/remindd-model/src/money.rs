//! Minor-currency-unit formatting.

/// Decimal places used by a currency's minor unit.
///
/// Covers the common zero- and three-decimal currencies; everything else
/// uses two.
pub fn minor_unit_exponent(currency: &str) -> u32 {
    match currency {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// Format an amount of minor units as a human-readable string, e.g.
/// `1250` + `"USD"` → `"12.50 USD"`.
pub fn format_minor(amount: i64, currency: &str) -> String {
    let exponent = minor_unit_exponent(currency);
    if exponent == 0 {
        return format!("{} {}", amount, currency);
    }

    let scale = 10_i64.pow(exponent);
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let units = abs / scale.unsigned_abs();
    let fraction = abs % scale.unsigned_abs();
    format!(
        "{}{}.{:0width$} {}",
        sign,
        units,
        fraction,
        currency,
        width = exponent as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_two_decimals() {
        assert_eq!(format_minor(1250, "USD"), "12.50 USD");
        assert_eq!(format_minor(5, "EUR"), "0.05 EUR");
        assert_eq!(format_minor(100_000, "GBP"), "1000.00 GBP");
    }

    #[test]
    fn test_format_zero_decimals() {
        assert_eq!(format_minor(1250, "JPY"), "1250 JPY");
    }

    #[test]
    fn test_format_three_decimals() {
        assert_eq!(format_minor(1250, "KWD"), "1.250 KWD");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_minor(-305, "USD"), "-3.05 USD");
    }
}
