/// Upper bound for the quantity of a single cart row or order line.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// `price × quantity`, or `None` when it does not fit in an `i64`.
pub fn line_total(price: i64, quantity: i32) -> Option<i64> {
    price.checked_mul(i64::from(quantity))
}

/// Renders an amount in pesewas as Ghana cedis, e.g. `GH₵12.50`.
pub fn format_cedis(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}GH₵{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_cedis(0), "GH₵0.00");
        assert_eq!(format_cedis(1250), "GH₵12.50");
        assert_eq!(format_cedis(5), "GH₵0.05");
        assert_eq!(format_cedis(-199), "-GH₵1.99");
    }

    #[test]
    fn line_total_reports_overflow() {
        assert_eq!(line_total(2500, 3), Some(7500));
        assert_eq!(line_total(i64::MAX, 2), None);
    }
}
