//! Display formatting. Totals carry full precision until they reach here.

/// Renders an amount in minor units as `$d.dd`.
pub fn format_price(minor_units: f64) -> String {
    format!("${:.2}", minor_units / 100.0)
}

#[cfg(test)]
mod tests {
    use super::format_price;

    #[test]
    fn rounds_only_at_display_time() {
        assert_eq!(format_price(9720.000000000002), "$97.20");
        assert_eq!(format_price(100.0), "$1.00");
        assert_eq!(format_price(0.0), "$0.00");
    }
}
